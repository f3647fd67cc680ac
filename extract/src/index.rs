//! Sweep-line overlap index.
//!
//! Candidate pairs come from a single sweep over bounding boxes along x. Each
//! candidate is then confirmed with an exact polygon overlap test, and the
//! confirmed adjacency is stored so that later lookups are cheap.

use std::collections::{BTreeMap, BTreeSet};

use geometry::prelude::*;
use rayon::prelude::*;
use tracing::{span, Level};

use crate::drawing::Layer;

/// Something that can be placed in an [`OverlapIndex`].
pub trait Indexed {
    /// The layer the item is on.
    fn layer(&self) -> Layer;
    /// The item's outline.
    fn polygon(&self) -> &Polygon;
}

/// Answers "which items on layer X overlap this one".
///
/// Overlap is closed: items whose boundaries merely touch overlap.
#[derive(Debug, Clone)]
pub struct OverlapIndex<'a, T> {
    items: &'a [T],
    bboxes: Vec<Option<Rect>>,
    columns: BTreeMap<Layer, Column>,
    adjacency: Vec<Vec<usize>>,
}

/// The items of one layer, sorted by left edge.
#[derive(Debug, Clone, Default)]
struct Column {
    /// `(left, index)` pairs, ascending.
    by_left: Vec<(i64, usize)>,
    /// The widest bounding box on the layer.
    max_width: i64,
}

impl<'a, T: Indexed + Sync> OverlapIndex<'a, T> {
    /// Builds the index over `items`.
    pub fn build(items: &'a [T]) -> Self {
        let span = span!(Level::DEBUG, "overlap index", items = items.len());
        let _guard = span.enter();

        let bboxes: Vec<Option<Rect>> = items.iter().map(|i| i.polygon().bbox()).collect();
        let mut by_left: Vec<usize> = (0..items.len()).filter(|&i| bboxes[i].is_some()).collect();
        by_left.sort_by_key(|&i| (bboxes[i].map(|b| b.left()), i));

        let candidates = sweep(&bboxes, &by_left);
        let confirmed: Vec<(usize, usize)> = candidates
            .par_iter()
            .filter(|(a, b)| items[*a].polygon().overlaps(items[*b].polygon()))
            .copied()
            .collect();

        let mut columns: BTreeMap<Layer, Column> = BTreeMap::new();
        for &i in by_left.iter() {
            let Some(b) = bboxes[i] else { continue };
            let column = columns.entry(items[i].layer()).or_default();
            column.by_left.push((b.left(), i));
            column.max_width = column.max_width.max(b.right() - b.left());
        }

        let mut adjacency = vec![Vec::new(); items.len()];
        for &(a, b) in confirmed.iter() {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for list in adjacency.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }
        tracing::debug!(
            candidates = candidates.len(),
            overlaps = confirmed.len(),
            "overlap index built"
        );

        Self {
            items,
            bboxes,
            columns,
            adjacency,
        }
    }

    /// The indexed items.
    #[inline]
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    /// Every item overlapping `item`, in index order.
    #[inline]
    pub fn neighbors(&self, item: usize) -> &[usize] {
        &self.adjacency[item]
    }

    /// Items on `layer` overlapping `item`, in index order.
    pub fn overlapping(&self, item: usize, layer: Layer) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[item]
            .iter()
            .copied()
            .filter(move |&j| self.items[j].layer() == layer)
    }

    /// Every overlapping pair `(a, b)` with `a < b`, sorted.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, list)| list.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Items on `layer` overlapping an arbitrary polygon, in index order.
    pub fn query(&self, polygon: &Polygon, layer: Layer) -> Vec<usize> {
        let Some(rect) = polygon.bbox() else {
            return Vec::new();
        };
        self.query_rect(rect, layer)
            .into_iter()
            .filter(|&i| self.items[i].polygon().overlaps(polygon))
            .collect()
    }

    /// Items on `layer` containing the point `p`, in index order.
    pub fn query_point(&self, p: Point, layer: Layer) -> Vec<usize> {
        self.query_rect(Rect::from_point(p), layer)
            .into_iter()
            .filter(|&i| self.items[i].polygon().encloses(&p))
            .collect()
    }

    /// Items on `layer` whose bounding boxes meet `rect`, in index order.
    ///
    /// Only items whose left edge lies within the layer's widest box of
    /// `rect` are examined.
    pub fn query_rect(&self, rect: Rect, layer: Layer) -> Vec<usize> {
        let Some(column) = self.columns.get(&layer) else {
            return Vec::new();
        };
        let reach = rect.left() - column.max_width;
        let start = column.by_left.partition_point(|&(left, _)| left < reach);
        let end = column
            .by_left
            .partition_point(|&(left, _)| left <= rect.right());
        let mut hits: Vec<usize> = column.by_left[start..end]
            .iter()
            .map(|&(_, i)| i)
            .filter(|&i| self.bboxes[i].is_some_and(|b| b.intersection(rect).is_some()))
            .collect();
        hits.sort_unstable();
        hits
    }
}

/// Sweeps bounding boxes left to right, returning pairs `(a, b)`, `a < b`,
/// whose boxes intersect.
fn sweep(bboxes: &[Option<Rect>], by_left: &[usize]) -> Vec<(usize, usize)> {
    // Active boxes keyed by (right, index) for expiry and by (bot, index) for
    // the vertical range query.
    let mut expiry: BTreeSet<(i64, usize)> = BTreeSet::new();
    let mut active: BTreeMap<(i64, usize), i64> = BTreeMap::new();
    let mut pairs = Vec::new();

    for &i in by_left {
        let Some(b) = bboxes[i] else { continue };
        while let Some(&(right, j)) = expiry.first() {
            if right >= b.left() {
                break;
            }
            expiry.pop_first();
            if let Some(bj) = bboxes[j] {
                active.remove(&(bj.bot(), j));
            }
        }
        for (&(_, j), &top) in active.range(..=(b.top(), usize::MAX)) {
            if top >= b.bot() {
                pairs.push((i.min(j), i.max(j)));
            }
        }
        expiry.insert((b.right(), i));
        active.insert((b.bot(), i), b.top());
    }

    pairs.sort_unstable();
    pairs
}

/// All overlapping pairs `(a, b)`, `a < b`, by testing every pair exactly.
pub fn brute_force_pairs<T: Indexed>(items: &[T]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for a in 0..items.len() {
        for b in (a + 1)..items.len() {
            if items[a].polygon().overlaps(items[b].polygon()) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}
