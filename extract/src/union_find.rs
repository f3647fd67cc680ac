//! Connected components of a disjoint-set forest.

use petgraph::unionfind::UnionFind;

/// Groups every element by representative.
///
/// Groups are ordered by their smallest member; members are ascending.
pub(crate) fn components(uf: UnionFind<usize>) -> Vec<Vec<usize>> {
    let labels = uf.into_labeling();
    let mut slot = vec![usize::MAX; labels.len()];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (x, &root) in labels.iter().enumerate() {
        if slot[root] == usize::MAX {
            slot[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot[root]].push(x);
    }
    groups
}
