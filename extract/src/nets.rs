//! Electrical connectivity.
//!
//! Conductors (metal, polysilicon, and diffusion pieces) are joined when
//! they overlap on the same layer or when a contact bridges them. Each
//! connected component is one [`Net`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use arcstr::ArcStr;
use diagnostics::{IssueSet, Severity};
use geometry::prelude::*;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

use crate::config::{Config, Rail};
use crate::diffusion::{piece_sources, shares_area, Diffusion};
use crate::drawing::{Label, LabelKind, Layer};
use crate::error::{Error, Result};
use crate::index::{Indexed, OverlapIndex};
use crate::issues::{Cause, Issue};
use crate::shape::{Shape, ShapeRef};
use crate::union_find::components;

/// Identifies a net within one analysis.
#[derive(
    Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NetId(pub usize);

impl Display for NetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "net{}", self.0)
    }
}

/// What a net carries.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetClass {
    /// A power rail.
    Power,
    /// A ground rail.
    Ground,
    /// A named signal.
    Signal,
    /// An anonymous signal.
    Unassigned,
}

impl NetClass {
    /// Returns `true` for power and ground.
    #[inline]
    pub fn is_rail(&self) -> bool {
        matches!(self, Self::Power | Self::Ground)
    }
}

impl From<Rail> for NetClass {
    fn from(value: Rail) -> Self {
        match value {
            Rail::Power => Self::Power,
            Rail::Ground => Self::Ground,
        }
    }
}

/// One piece of geometry belonging to a net.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Member {
    /// The layer of the geometry.
    pub layer: Layer,
    /// The outline.
    pub polygon: Polygon,
    /// The drawn shapes the geometry came from.
    pub sources: Vec<ShapeRef>,
}

/// An electrical net.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Net {
    /// The net's identifier.
    pub id: NetId,
    /// The label name, or `$<id>` for anonymous nets.
    pub name: ArcStr,
    /// Whether the name came from a label.
    pub named: bool,
    /// The class of the net.
    pub class: NetClass,
    /// Whether a pin label was placed on the net.
    pub pin: bool,
    /// Conductors and bridging contacts of the net.
    pub members: Vec<Member>,
}

/// A conductor or contact taking part in connectivity.
#[derive(Debug, Clone)]
struct Item {
    layer: Layer,
    polygon: Polygon,
    sources: Vec<ShapeRef>,
}

impl Indexed for Item {
    fn layer(&self) -> Layer {
        self.layer
    }

    fn polygon(&self) -> &Polygon {
        &self.polygon
    }
}

/// The nets of a drawing, with a map from geometry back to nets.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    /// All nets, ordered by id.
    pub nets: Vec<Net>,
    shape_net: Vec<Option<NetId>>,
    piece_net: Vec<Option<NetId>>,
}

impl Connectivity {
    /// The net of a metal, polysilicon or contact shape.
    pub fn net_of_shape(&self, shape: usize) -> Option<NetId> {
        self.shape_net.get(shape).copied().flatten()
    }

    /// The net of a diffusion piece.
    pub fn net_of_piece(&self, piece: usize) -> Option<NetId> {
        self.piece_net.get(piece).copied().flatten()
    }
}

/// Builds nets from validated shapes and split diffusion.
///
/// Returns [`Error::FatalShort`] if a power name and a ground name end up on
/// the same net.
pub fn build_nets(
    shapes: &[Shape],
    diffusion: &Diffusion,
    labels: &[Label],
    config: &Config,
    issues: &mut IssueSet<Issue>,
) -> Result<Connectivity> {
    let span = span!(Level::INFO, "build nets");
    let _guard = span.enter();

    let mut items = Vec::new();
    let mut names: Vec<Vec<ArcStr>> = Vec::new();
    let mut shape_item = vec![None; shapes.len()];
    for (i, shape) in shapes.iter().enumerate() {
        if matches!(shape.layer(), Layer::Metal | Layer::Poly | Layer::Contact) {
            shape_item[i] = Some(items.len());
            items.push(Item {
                layer: shape.layer(),
                polygon: shape.polygon.clone(),
                sources: vec![shape.origin.clone()],
            });
            names.push(shape.label.iter().cloned().collect());
        }
    }
    let mut piece_item = Vec::with_capacity(diffusion.pieces.len());
    for piece in diffusion.pieces.iter() {
        piece_item.push(items.len());
        let mut labels: Vec<ArcStr> = piece
            .shapes
            .iter()
            .filter_map(|&i| shapes[i].label.clone())
            .collect();
        labels.sort();
        labels.dedup();
        items.push(Item {
            layer: Layer::Diff,
            polygon: piece.polygon.clone(),
            sources: piece_sources(piece, shapes),
        });
        names.push(labels);
    }

    let index = OverlapIndex::build(&items);
    let mut links: UnGraph<(), ()> = UnGraph::with_capacity(items.len(), items.len());
    for _ in 0..items.len() {
        links.add_node(());
    }
    let mut uf = UnionFind::new(items.len());
    let mut link = |uf: &mut UnionFind<usize>, a: usize, b: usize| {
        uf.union(a, b);
        links.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    };

    for (a, b) in index.pairs() {
        if items[a].layer == items[b].layer && items[a].layer.is_conductor() {
            link(&mut uf, a, b);
        }
    }
    let mut contacts = 0;
    for (c, item) in items.iter().enumerate() {
        if item.layer != Layer::Contact {
            continue;
        }
        contacts += 1;
        let touched: Vec<(Layer, Vec<usize>)> = [Layer::Metal, Layer::Poly, Layer::Diff]
            .into_iter()
            .map(|layer| {
                let hits: Vec<usize> = index
                    .overlapping(c, layer)
                    .filter(|&j| shares_area(&item.polygon, &items[j].polygon))
                    .collect();
                (layer, hits)
            })
            .filter(|(_, hits)| !hits.is_empty())
            .collect();
        let joined: Vec<usize> = match touched.as_slice() {
            [] => {
                issues.add(Issue::new_and_log(
                    Cause::IsolatedContact {
                        contact: item.sources[0].clone(),
                    },
                    Severity::Warning,
                ));
                Vec::new()
            }
            [(layer, hits)] => {
                issues.add(Issue::new_and_log(
                    Cause::ContactOneLayer {
                        contact: item.sources[0].clone(),
                        layer: *layer,
                    },
                    Severity::Warning,
                ));
                hits.clone()
            }
            [_, _] => touched.iter().flat_map(|(_, hits)| hits.iter().copied()).collect(),
            // All three layers: a buried contact joins only poly and diffusion.
            _ => touched
                .iter()
                .filter(|(layer, _)| *layer != Layer::Metal)
                .flat_map(|(_, hits)| hits.iter().copied())
                .collect(),
        };
        for j in joined {
            link(&mut uf, c, j);
        }
    }

    let mut pins = vec![false; items.len()];
    attach_labels(&mut names, &mut pins, &index, labels, config, issues);

    if config.join_same_names {
        let mut first: BTreeMap<ArcStr, usize> = BTreeMap::new();
        for (i, item_names) in names.iter().enumerate() {
            for name in item_names.iter() {
                match first.get(name) {
                    Some(&j) => link(&mut uf, j, i),
                    None => {
                        first.insert(name.clone(), i);
                    }
                }
            }
        }
    }

    let components: Vec<Vec<usize>> = components(uf)
        .into_iter()
        .filter(|group| group.iter().any(|&i| items[i].layer.is_conductor()))
        .collect();

    let mut named = Vec::with_capacity(components.len());
    for component in components.iter() {
        let found: BTreeSet<ArcStr> = component
            .iter()
            .flat_map(|&i| names[i].iter().cloned())
            .collect();
        let power = found.iter().find(|n| config.is_power(n));
        let ground = found.iter().find(|n| config.is_ground(n));
        if let (Some(power), Some(ground)) = (power, ground) {
            let path = short_path(&items, &names, &links, power, ground);
            tracing::error!(%power, %ground, shapes = path.len(), "power shorted to ground");
            return Err(Error::FatalShort {
                power: power.clone(),
                ground: ground.clone(),
                path,
                issues: issues.clone(),
            });
        }
        named.push(choose_name(&found, config, issues));
    }

    let mut order: Vec<usize> = (0..components.len()).collect();
    let keys: Vec<_> = components
        .iter()
        .map(|component| {
            component
                .iter()
                .filter(|&&i| items[i].layer.is_conductor())
                .map(|&i| geometric_key(&items[i]))
                .min()
        })
        .collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]).then(a.cmp(&b)));

    let mut item_net = vec![None; items.len()];
    let mut nets = Vec::with_capacity(components.len());
    for (id, &c) in order.iter().enumerate() {
        let id = NetId(id);
        let component = &components[c];
        let mut members: Vec<Member> = component
            .iter()
            .map(|&i| Member {
                layer: items[i].layer,
                polygon: items[i].polygon.clone(),
                sources: items[i].sources.clone(),
            })
            .collect();
        members.sort();
        for &i in component {
            item_net[i] = Some(id);
        }
        let (name, class) = match &named[c] {
            Some((name, class)) => (name.clone(), *class),
            None => (arcstr::format!("${}", id.0), NetClass::Unassigned),
        };
        nets.push(Net {
            id,
            named: named[c].is_some(),
            name,
            class,
            pin: component.iter().any(|&i| pins[i]),
            members,
        });
    }

    report_dangling(&items, &index, &shape_item, &piece_item, diffusion, issues);

    tracing::info!(
        conductors = items.len() - contacts,
        contacts,
        nets = nets.len(),
        "nets built"
    );

    Ok(Connectivity {
        nets,
        shape_net: shape_item
            .iter()
            .map(|item| item.and_then(|i| item_net[i]))
            .collect(),
        piece_net: piece_item.iter().map(|&i| item_net[i]).collect(),
    })
}

/// Attaches signal and pin labels to the conductor under their centre.
fn attach_labels(
    names: &mut [Vec<ArcStr>],
    pins: &mut [bool],
    index: &OverlapIndex<'_, Item>,
    labels: &[Label],
    config: &Config,
    issues: &mut IssueSet<Issue>,
) {
    let mut hits = Vec::new();
    for label in labels.iter() {
        if label.kind == LabelKind::Transistor {
            continue;
        }
        let [x, y] = label.center();
        let at = geometry::snap::quantize(x, y, config.resolution);
        let found = [Layer::Metal, Layer::Poly, Layer::Diff]
            .into_iter()
            .find_map(|layer| index.query_point(at, layer).first().copied());
        match found {
            Some(i) => hits.push((i, label)),
            None => issues.add(Issue::new_and_log(
                Cause::UnattachedLabel {
                    text: label.text.clone(),
                    at,
                },
                Severity::Warning,
            )),
        }
    }
    for (i, label) in hits {
        if !names[i].contains(&label.text) {
            names[i].push(label.text.clone());
        }
        pins[i] |= label.kind == LabelKind::Pin;
    }
}

/// Picks a net name, reporting conflicting names.
fn choose_name(
    names: &BTreeSet<ArcStr>,
    config: &Config,
    issues: &mut IssueSet<Issue>,
) -> Option<(ArcStr, NetClass)> {
    let rails: Vec<&ArcStr> = names.iter().filter(|n| config.rail(n).is_some()).collect();
    if let Some(&rail) = rails.first() {
        for signal in names.iter().filter(|n| config.rail(n).is_none()) {
            issues.add(Issue::new_and_log(
                Cause::SignalShortedToRail {
                    rail: rail.clone(),
                    signal: signal.clone(),
                },
                Severity::Error,
            ));
        }
        if rails.len() > 1 {
            issues.add(Issue::new_and_log(
                Cause::NamingConflict {
                    chosen: rail.clone(),
                    names: rails.iter().map(|&n| n.clone()).collect(),
                },
                Severity::Warning,
            ));
        }
        let class = config.rail(rail).map(NetClass::from)?;
        return Some((rail.clone(), class));
    }

    let chosen = names.first()?;
    if names.len() > 1 {
        issues.add(Issue::new_and_log(
            Cause::NamingConflict {
                chosen: chosen.clone(),
                names: names.iter().cloned().collect(),
            },
            Severity::Warning,
        ));
    }
    Some((chosen.clone(), NetClass::Signal))
}

/// A key that orders conductors by geometry alone.
fn geometric_key(item: &Item) -> (Option<Point>, Option<Rect>, i128, Layer) {
    let polygon = &item.polygon;
    let bbox = polygon.bbox();
    (polygon.min_point(), bbox, polygon.area2(), item.layer)
}

/// Finds a shortest chain of linked items from one carrying `power` to one
/// carrying `ground`.
fn short_path(
    items: &[Item],
    names: &[Vec<ArcStr>],
    links: &UnGraph<(), ()>,
    power: &ArcStr,
    ground: &ArcStr,
) -> Vec<ShapeRef> {
    let shortest = names
        .iter()
        .enumerate()
        .filter(|(_, item_names)| item_names.contains(power))
        .filter_map(|(i, _)| {
            astar(
                links,
                NodeIndex::new(i),
                |n| names[n.index()].contains(ground),
                |_| 1usize,
                |_| 0,
            )
        })
        .min_by_key(|(cost, _)| *cost);
    let Some((_, chain)) = shortest else {
        return Vec::new();
    };
    let mut path: Vec<ShapeRef> = chain
        .into_iter()
        .flat_map(|n| items[n.index()].sources.iter().cloned())
        .collect();
    path.dedup();
    path
}

/// Reports conductors that touch nothing and take no part in a transistor.
fn report_dangling(
    items: &[Item],
    index: &OverlapIndex<'_, Item>,
    shape_item: &[Option<usize>],
    piece_item: &[usize],
    diffusion: &Diffusion,
    issues: &mut IssueSet<Issue>,
) {
    let mut in_gate = vec![false; items.len()];
    for site in diffusion.sites.iter() {
        for &p in site.poly.iter() {
            if let Some(Some(i)) = shape_item.get(p) {
                in_gate[*i] = true;
            }
        }
        for &e in site.electrodes.iter() {
            in_gate[piece_item[e]] = true;
        }
    }
    for (i, item) in items.iter().enumerate() {
        if item.layer.is_conductor() && !in_gate[i] && index.neighbors(i).is_empty() {
            for shape in item.sources.iter() {
                issues.add(Issue::new_and_log(
                    Cause::DanglingShape {
                        shape: shape.clone(),
                    },
                    Severity::Warning,
                ));
            }
        }
    }
}
