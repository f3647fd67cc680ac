//! Logic gates: a load pulling a net up against a pulldown network.

use std::collections::{BTreeSet, VecDeque};

use diagnostics::Severity;
use petgraph::algo::{all_simple_paths, has_path_connecting};
use petgraph::graphmap::UnGraphMap;

use super::{Gate, GateDetail, GateKind, Recognizer, TruthTable};
use crate::error::Error;
use crate::groups::{Group, GroupId, Node};
use crate::issues::Cause;
use crate::nets::NetId;

/// The pulldown network below one pulled-up net.
#[derive(Debug, Clone)]
pub(super) struct Neighborhood {
    output: NetId,
    load: GroupId,
    /// Pulldown groups, ascending.
    groups: Vec<GroupId>,
    /// Nets strictly inside the network.
    internal: Vec<NetId>,
    /// Distinct gate nets, in input order.
    inputs: Vec<NetId>,
    /// Gates of groups running straight from the output to ground.
    ground_enables: Vec<NetId>,
}

/// A predicate naming the logic family of a neighborhood.
type Classifier = fn(&Neighborhood, &[&Group]) -> Option<GateKind>;

/// Tried in order; the first match wins.
const CLASSIFIERS: [(&str, Classifier); 4] = [
    ("INV", inv),
    ("NOR", nor),
    ("NAND", nand),
    ("LUT", lut),
];

fn inv(n: &Neighborhood, _: &[&Group]) -> Option<GateKind> {
    (n.inputs.len() == 1 && n.ground_enables == n.inputs).then_some(GateKind::Inv)
}

fn nor(n: &Neighborhood, _: &[&Group]) -> Option<GateKind> {
    n.inputs
        .iter()
        .all(|i| n.ground_enables.contains(i))
        .then_some(GateKind::Nor(n.inputs.len()))
}

fn nand(n: &Neighborhood, groups: &[&Group]) -> Option<GateKind> {
    if n.inputs.len() < 2 || groups.len() != n.inputs.len() {
        return None;
    }
    let network = network(groups.iter().copied());
    let (from, to) = (Node::Net(n.output), Node::Ground);
    if !network.contains_node(from) || !network.contains_node(to) {
        return None;
    }
    let paths: Vec<Vec<Node>> = all_simple_paths(&network, from, to, 0, None)
        .take(2)
        .collect();
    // A single chain through every group: nodes = groups + 1.
    (paths.len() == 1 && paths[0].len() == groups.len() + 1)
        .then_some(GateKind::Nand(n.inputs.len()))
}

fn lut(n: &Neighborhood, _: &[&Group]) -> Option<GateKind> {
    Some(GateKind::Lut(n.inputs.len()))
}

/// Recognizes INV, NOR, NAND and LUT gates on every uniquely pulled-up net.
pub(super) fn logic_gates(r: &mut Recognizer<'_>) {
    let loads: Vec<(NetId, Vec<GroupId>)> = r
        .loads()
        .iter()
        .map(|(net, loads)| (*net, loads.clone()))
        .collect();

    for (net, loads) in loads {
        if loads.len() > 1 {
            r.report(
                Cause::NonUniquePullup {
                    net: r.name(net),
                    loads: loads.len(),
                },
                Severity::Warning,
            );
            continue;
        }
        let load = loads[0];
        if r.is_claimed(load) {
            continue;
        }
        let Some(n) = neighborhood(r, net, load) else {
            continue;
        };
        let members: Vec<&Group> = n.groups.iter().map(|&id| r.group(id)).collect();
        let Some((name, kind)) = CLASSIFIERS
            .iter()
            .find_map(|(name, classify)| classify(&n, &members).map(|kind| (*name, kind)))
        else {
            continue;
        };
        tracing::trace!(template = name, net = %r.name(net), "logic neighborhood classified");

        let truth_table = tabulate(r, &n, &members);
        let mut groups = n.groups.clone();
        groups.push(load);
        groups.sort_unstable();
        let mut gate = Gate::new(kind, n.inputs.clone(), vec![net], groups);
        gate.truth_table = truth_table;
        gate.detail = GateDetail::Logic {
            load,
            ground_enables: n.ground_enables.clone(),
        };
        r.mark_logic(std::iter::once(net).chain(n.internal.iter().copied()));
        r.add(gate);
    }
}

/// Whether a group may take part in a pulldown network.
fn is_candidate(r: &Recognizer<'_>, g: &Group) -> bool {
    !r.is_claimed(g.id) && !g.is_powered() && g.ends[0] != g.ends[1]
}

/// Whether an internal net belongs to the network alone.
fn is_private(r: &Recognizer<'_>, net: NetId) -> bool {
    !r.loads().contains_key(&net) && !r.is_pin(net) && r.gated_by(net).is_empty()
}

/// Collects the pulldown network of `output`.
///
/// Groups from the output straight to ground always belong to it. Other
/// groups are taken a connected cluster of internal nets at a time, and
/// only if the cluster is private and reaches ground.
fn neighborhood(r: &Recognizer<'_>, output: NetId, load: GroupId) -> Option<Neighborhood> {
    let top = Node::Net(output);
    let mut direct = Vec::new();
    let mut seeds = BTreeSet::new();
    for &id in r.groups_at(top) {
        let g = r.group(id);
        if !is_candidate(r, g) {
            continue;
        }
        match g.other(top) {
            Some(Node::Ground) => direct.push(id),
            Some(Node::Net(x)) if x != output => {
                seeds.insert(x);
            }
            _ => {}
        }
    }

    let mut accepted: BTreeSet<GroupId> = direct.iter().copied().collect();
    let mut internal = Vec::new();
    let mut visited = BTreeSet::new();
    for seed in seeds {
        if !visited.insert(seed) {
            continue;
        }
        let mut cluster = vec![seed];
        let mut cluster_groups = BTreeSet::new();
        let mut queue = VecDeque::from([seed]);
        let mut ok = true;
        let mut grounded = false;
        while let Some(z) = queue.pop_front() {
            ok &= is_private(r, z);
            let here = Node::Net(z);
            for &id in r.groups_at(here) {
                let g = r.group(id);
                if !is_candidate(r, g) {
                    ok = false;
                    continue;
                }
                cluster_groups.insert(id);
                match g.other(here) {
                    Some(Node::Ground) => grounded = true,
                    Some(Node::Net(y)) if y == output => {}
                    Some(Node::Net(y)) => {
                        if visited.insert(y) {
                            cluster.push(y);
                            queue.push_back(y);
                        }
                    }
                    _ => ok = false,
                }
            }
        }
        if ok && grounded {
            accepted.extend(cluster_groups);
            internal.extend(cluster);
        }
    }
    if accepted.is_empty() {
        return None;
    }

    let by_name = |nets: BTreeSet<NetId>| {
        let mut nets: Vec<NetId> = nets.into_iter().collect();
        nets.sort_by_key(|&n| (r.name(n), n));
        nets
    };
    let inputs = by_name(accepted.iter().map(|&id| r.group(id).gate).collect());
    let ground_enables = by_name(direct.iter().map(|&id| r.group(id).gate).collect());
    internal.sort_unstable();

    Some(Neighborhood {
        output,
        load,
        groups: accepted.into_iter().collect(),
        internal,
        inputs,
        ground_enables,
    })
}

/// Computes the truth table: the output is low exactly when the conducting
/// groups connect it to ground.
fn tabulate(r: &mut Recognizer<'_>, n: &Neighborhood, members: &[&Group]) -> Option<TruthTable> {
    let names = n.inputs.iter().map(|&i| r.name(i)).collect();
    let result = TruthTable::tabulate(names, r.config().max_table_inputs, |row| {
        let on = |g: &Group| {
            n.inputs
                .iter()
                .position(|&i| i == g.gate)
                .is_some_and(|k| row >> k & 1 == 1)
        };
        !conducts(members, on, Node::Net(n.output), Node::Ground)
    });
    match result {
        Ok(table) => Some(table),
        Err(Error::TooManyInputs { inputs, limit }) => {
            r.report(
                Cause::TableTooWide {
                    output: r.name(n.output),
                    inputs,
                    limit,
                },
                Severity::Warning,
            );
            None
        }
        Err(_) => None,
    }
}

/// The nodes joined by `groups`, one edge per distinct pair of ends.
fn network<'a>(groups: impl Iterator<Item = &'a Group>) -> UnGraphMap<Node, ()> {
    groups.map(|g| (g.ends[0], g.ends[1])).collect()
}

/// Returns `true` if the groups for which `on` holds connect `from` to `to`.
fn conducts(groups: &[&Group], on: impl Fn(&Group) -> bool, from: Node, to: Node) -> bool {
    let network = network(groups.iter().copied().filter(|g| on(g)));
    network.contains_node(from)
        && network.contains_node(to)
        && has_path_connecting(&network, from, to, None)
}
