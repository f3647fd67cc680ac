//! Splits diffusion into transistor gates and the electrode pieces around them.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon as GeoPolygon};
use geometry::prelude::*;
use rayon::prelude::*;
use tracing::{span, Level};

use crate::config::Config;
use crate::drawing::Layer;
use crate::index::OverlapIndex;
use crate::shape::{Shape, ShapeRef};
use petgraph::unionfind::UnionFind;

use crate::union_find::components;

/// A piece of diffusion left after cutting out transistor gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// The piece outline.
    pub polygon: Polygon,
    /// Indices of the diffusion shapes the piece was cut from.
    pub shapes: Vec<usize>,
}

/// A place where polysilicon crosses diffusion and forms a transistor gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSite {
    /// The gate region.
    pub region: Polygon,
    /// Indices of the polysilicon shapes over the region.
    pub poly: Vec<usize>,
    /// Indices into [`Diffusion::pieces`] of the pieces touching the region.
    pub electrodes: Vec<usize>,
}

/// All diffusion of a drawing, cut up at its gates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diffusion {
    /// Diffusion conductors.
    pub pieces: Vec<Piece>,
    /// Transistor gates.
    pub sites: Vec<GateSite>,
}

/// Cuts the diffusion in `shapes` at every polysilicon crossing.
///
/// Overlapping diffusion shapes are merged first. A crossing sharing area
/// with a contact is a buried contact and stays diffusion.
pub fn split_diffusion(
    shapes: &[Shape],
    index: &OverlapIndex<'_, Shape>,
    config: &Config,
) -> Diffusion {
    let span = span!(Level::INFO, "split diffusion");
    let _guard = span.enter();

    let clusters = clusters(shapes, index);
    let cut: Vec<(Vec<Piece>, Vec<GateSite>)> = clusters
        .par_iter()
        .map(|cluster| split_cluster(cluster, shapes, index, config))
        .collect();

    let mut out = Diffusion::default();
    for (pieces, sites) in cut {
        let offset = out.pieces.len();
        out.pieces.extend(pieces);
        out.sites.extend(sites.into_iter().map(|mut site| {
            site.electrodes.iter_mut().for_each(|e| *e += offset);
            site
        }));
    }
    tracing::info!(
        clusters = clusters.len(),
        pieces = out.pieces.len(),
        gates = out.sites.len(),
        "diffusion split"
    );
    out
}

/// Groups overlapping diffusion shapes.
fn clusters(shapes: &[Shape], index: &OverlapIndex<'_, Shape>) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(shapes.len());
    for (i, shape) in shapes.iter().enumerate() {
        if shape.layer() == Layer::Diff {
            for j in index.overlapping(i, Layer::Diff) {
                uf.union(i, j);
            }
        }
    }
    components(uf)
        .into_iter()
        .filter(|group| shapes[group[0]].layer() == Layer::Diff)
        .collect()
}

fn split_cluster(
    cluster: &[usize],
    shapes: &[Shape],
    index: &OverlapIndex<'_, Shape>,
    config: &Config,
) -> (Vec<Piece>, Vec<GateSite>) {
    let mut poly: Vec<usize> = cluster
        .iter()
        .flat_map(|&i| index.overlapping(i, Layer::Poly))
        .collect();
    poly.sort_unstable();
    poly.dedup();

    if poly.is_empty() && cluster.len() == 1 {
        let piece = Piece {
            polygon: shapes[cluster[0]].polygon.clone(),
            shapes: cluster.to_vec(),
        };
        return (vec![piece], Vec::new());
    }

    let diff = union_all(cluster.iter().map(|&i| &shapes[i].polygon));
    if poly.is_empty() {
        return (pieces_of(&diff, cluster, shapes), Vec::new());
    }

    let mut contacts: Vec<usize> = cluster
        .iter()
        .flat_map(|&i| index.overlapping(i, Layer::Contact))
        .collect();
    contacts.sort_unstable();
    contacts.dedup();

    let crossing = diff.intersection(&union_all(poly.iter().map(|&i| &shapes[i].polygon)));
    let mut gates = Vec::new();
    let mut sites = Vec::new();
    for component in crossing.0.iter() {
        let Some(region) = from_geo(component) else {
            continue;
        };
        if contacts
            .iter()
            .any(|&c| shares_area(&shapes[c].polygon, &region))
        {
            continue;
        }
        gates.push(component.clone());
        sites.push(GateSite {
            poly: poly
                .iter()
                .copied()
                .filter(|&p| shapes[p].polygon.overlaps(&region))
                .collect(),
            region,
            electrodes: Vec::new(),
        });
    }

    let rest = if gates.is_empty() {
        diff
    } else {
        diff.difference(&MultiPolygon::new(gates))
    };
    let pieces = pieces_of(&rest, cluster, shapes);
    let tolerance = config.touch_tolerance as f64;
    for site in sites.iter_mut() {
        site.electrodes = pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| piece.polygon.distance(&site.region) <= tolerance)
            .map(|(i, _)| i)
            .collect();
    }
    (pieces, sites)
}

fn pieces_of(region: &MultiPolygon<f64>, cluster: &[usize], shapes: &[Shape]) -> Vec<Piece> {
    region
        .0
        .iter()
        .filter_map(from_geo)
        .map(|polygon| Piece {
            shapes: cluster
                .iter()
                .copied()
                .filter(|&i| shapes[i].polygon.overlaps(&polygon))
                .collect(),
            polygon,
        })
        .collect()
}

/// The drawn shapes a piece was cut from.
pub(crate) fn piece_sources(piece: &Piece, shapes: &[Shape]) -> Vec<ShapeRef> {
    let mut refs: Vec<ShapeRef> = piece.shapes.iter().map(|&i| shapes[i].origin.clone()).collect();
    refs.dedup();
    refs
}

/// Returns `true` if `a` and `b` overlap with positive area.
///
/// Shapes that only meet along an edge or at a corner do not.
pub(crate) fn shares_area(a: &Polygon, b: &Polygon) -> bool {
    a.overlaps(b) && to_geo(a).intersection(&to_geo(b)).unsigned_area() > AREA_EPSILON
}

/// Smallest intersection area, in square grid units, counted as overlap.
const AREA_EPSILON: f64 = 1e-6;

fn union_all<'a>(polygons: impl Iterator<Item = &'a Polygon>) -> MultiPolygon<f64> {
    polygons.fold(MultiPolygon::new(Vec::new()), |acc, p| {
        acc.union(&MultiPolygon::new(vec![to_geo(p)]))
    })
}

fn to_ring(ring: &Ring) -> LineString<f64> {
    LineString::new(
        ring.points()
            .iter()
            .map(|p| Coord {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect(),
    )
}

pub(crate) fn to_geo(polygon: &Polygon) -> GeoPolygon<f64> {
    GeoPolygon::new(
        to_ring(polygon.outer()),
        polygon.holes().iter().map(to_ring).collect(),
    )
}

fn from_ring(line: &LineString<f64>) -> Option<Ring> {
    let ring = Ring::new(
        line.coords()
            .map(|c| Point::new(c.x.round() as i64, c.y.round() as i64))
            .collect(),
    );
    (ring.len() >= 3 && ring.signed_area2() != 0).then_some(ring)
}

/// Rounds a boolean-operation result back onto the grid.
///
/// Returns `None` if nothing with area survives the rounding.
pub(crate) fn from_geo(polygon: &GeoPolygon<f64>) -> Option<Polygon> {
    let outer = from_ring(polygon.exterior())?;
    let holes = polygon.interiors().iter().filter_map(from_ring).collect();
    Some(Polygon::with_holes(outer, holes).orient())
}
