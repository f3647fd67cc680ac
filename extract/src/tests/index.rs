use geometry::prelude::*;
use test_log::test;

use crate::drawing::Layer;
use crate::index::{brute_force_pairs, Indexed, OverlapIndex};
use crate::shape::{Shape, ShapeRef, ShapeStatus};

/// A deterministic linear congruential generator.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: i64) -> i64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as i64
    }
}

fn random_shapes(seed: u64, count: usize) -> Vec<Shape> {
    let layers = [Layer::Diff, Layer::Poly, Layer::Metal, Layer::Contact];
    let mut rng = Lcg(seed);
    (0..count)
        .map(|index| {
            let layer = layers[rng.next(layers.len() as i64) as usize];
            let (l, b) = (rng.next(200), rng.next(200));
            let (w, h) = (1 + rng.next(30), 1 + rng.next(30));
            let polygon = if w >= 4 && rng.next(4) == 0 {
                // An L-shape.
                Polygon::from_verts(vec![
                    Point::new(l, b),
                    Point::new(l + w, b),
                    Point::new(l + w, b + h / 2 + 1),
                    Point::new(l + w / 2 + 1, b + h / 2 + 1),
                    Point::new(l + w / 2 + 1, b + h + 1),
                    Point::new(l, b + h + 1),
                ])
            } else {
                Polygon::from_rect(Rect::from_sides(l, b, l + w, b + h))
            };
            Shape {
                origin: ShapeRef {
                    index,
                    source: None,
                    layer,
                },
                polygon,
                label: None,
                status: ShapeStatus::Valid,
            }
        })
        .collect()
}

#[test]
fn sweep_matches_brute_force() {
    for seed in [1, 7, 42, 1234] {
        let shapes = random_shapes(seed, 80);
        let index = OverlapIndex::build(&shapes);
        assert_eq!(index.pairs(), brute_force_pairs(&shapes), "seed {seed}");
    }
}

#[test]
fn overlapping_filters_by_layer() {
    let shapes = random_shapes(99, 60);
    let index = OverlapIndex::build(&shapes);
    for (i, shape) in shapes.iter().enumerate() {
        let mut expected: Vec<usize> = (0..shapes.len())
            .filter(|&j| {
                j != i
                    && shapes[j].layer() == Layer::Poly
                    && shapes[j].polygon.overlaps(&shape.polygon)
            })
            .collect();
        expected.sort_unstable();
        let mut found: Vec<usize> = index.overlapping(i, Layer::Poly).collect();
        found.sort_unstable();
        assert_eq!(found, expected, "shape {i}");
    }
}

#[test]
fn queries_match_exact_tests() {
    let shapes = random_shapes(5, 60);
    let index = OverlapIndex::build(&shapes);
    let window = Polygon::from_rect(Rect::from_sides(50, 50, 120, 90));
    let expected: Vec<usize> = (0..shapes.len())
        .filter(|&j| shapes[j].layer() == Layer::Metal && shapes[j].polygon.overlaps(&window))
        .collect();
    assert_eq!(index.query(&window, Layer::Metal), expected);

    let p = Point::new(100, 100);
    let expected: Vec<usize> = (0..shapes.len())
        .filter(|&j| shapes[j].layer() == Layer::Diff && shapes[j].polygon().encloses(&p))
        .collect();
    assert_eq!(index.query_point(p, Layer::Diff), expected);
}

#[test]
fn rect_queries_match_a_full_scan() {
    let mut shapes = random_shapes(17, 120);
    // One very wide shape so that the scan has to reach far to the left.
    shapes.push(Shape {
        origin: ShapeRef {
            index: shapes.len(),
            source: None,
            layer: Layer::Metal,
        },
        polygon: Polygon::from_rect(Rect::from_sides(-500, 40, 400, 45)),
        label: None,
        status: ShapeStatus::Valid,
    });
    let index = OverlapIndex::build(&shapes);
    let windows = [
        Rect::from_sides(0, 0, 10, 10),
        Rect::from_sides(300, 42, 310, 43),
        Rect::from_sides(150, 150, 230, 230),
        Rect::from_point(Point::new(60, 60)),
        Rect::from_sides(-1000, -1000, -900, -900),
    ];
    for layer in [Layer::Diff, Layer::Poly, Layer::Metal, Layer::Contact] {
        for rect in windows {
            let expected: Vec<usize> = (0..shapes.len())
                .filter(|&j| {
                    shapes[j].layer() == layer
                        && shapes[j]
                            .polygon
                            .bbox()
                            .is_some_and(|b| b.intersection(rect).is_some())
                })
                .collect();
            assert_eq!(index.query_rect(rect, layer), expected, "{layer:?} {rect:?}");
        }
    }
    let wide = shapes.len() - 1;
    assert_eq!(
        index.query_rect(Rect::from_sides(300, 42, 310, 43), Layer::Metal),
        vec![wide]
    );
}
