//! Single-group gates: switches, pullups and pulldowns.

use std::collections::BTreeMap;

use diagnostics::Severity;

use super::{Gate, GateDetail, GateKind, Recognizer};
use crate::groups::{GroupId, Node};
use crate::issues::Cause;
use crate::nets::NetId;

/// Groups to ground whose gate is ground.
pub(super) fn pulldowns(r: &mut Recognizer<'_>) {
    for g in r.groups() {
        if r.is_claimed(g.id) || r.node(g.gate) != Node::Ground {
            continue;
        }
        if let Some(Node::Net(net)) = g.other(Node::Ground) {
            r.add(Gate::new(GateKind::Pulldown, Vec::new(), vec![net], vec![g.id]));
        }
    }
}

/// Loads left over once logic and switches have been recognized.
pub(super) fn pullups(r: &mut Recognizer<'_>) {
    let loads: Vec<(NetId, GroupId)> = r
        .loads()
        .iter()
        .flat_map(|(net, loads)| loads.iter().map(move |&g| (*net, g)))
        .collect();
    for (net, g) in loads {
        if !r.is_claimed(g) {
            r.add(Gate::new(GateKind::Pullup, Vec::new(), vec![net], vec![g]));
        }
    }
}

/// A group treated as a switch onto `output`.
#[derive(Debug, Copy, Clone)]
struct Switch {
    id: GroupId,
    select: NetId,
    /// The far end.
    data: Node,
    data_net: NetId,
}

/// Groups that are neither loads nor part of a logic gate act as switches.
/// A group shorted across one node switches nothing.
///
/// Each switch is assigned the end shared with the most other switches as
/// its output. Several switches on one output form a MUX, or a POWERMUX if
/// they only pass power and ground; a lone switch between two signals is a
/// PASS transistor.
pub(super) fn switches(r: &mut Recognizer<'_>) {
    let free: Vec<GroupId> = r
        .groups()
        .iter()
        .filter(|g| {
            !r.is_claimed(g.id)
                && !r.is_load(g.id)
                && g.ends[0] != g.ends[1]
                && !(g.ends[0].is_rail() && g.ends[1].is_rail())
        })
        .map(|g| g.id)
        .collect();

    let candidate_ends = |r: &Recognizer<'_>, id: GroupId| -> Vec<NetId> {
        let g = r.group(id);
        let mut ends: Vec<NetId> = g
            .ends
            .iter()
            .filter_map(Node::net)
            .filter(|&n| !r.is_logic_net(n))
            .collect();
        ends.dedup();
        ends
    };

    let mut sharing: BTreeMap<NetId, usize> = BTreeMap::new();
    for &id in free.iter() {
        for net in candidate_ends(r, id) {
            *sharing.entry(net).or_default() += 1;
        }
    }

    let mut by_output: BTreeMap<NetId, Vec<Switch>> = BTreeMap::new();
    for &id in free.iter() {
        let Some(output) = candidate_ends(r, id)
            .into_iter()
            .max_by(|a, b| sharing[a].cmp(&sharing[b]).then(b.cmp(a)))
        else {
            continue;
        };
        let g = r.group(id);
        let (Some(data), Some(data_net)) = (g.other(Node::Net(output)), g.other_net(Node::Net(output)))
        else {
            continue;
        };
        by_output.entry(output).or_default().push(Switch {
            id,
            select: g.gate,
            data,
            data_net,
        });
    }

    for (output, switches) in by_output {
        match switches.as_slice() {
            [] => {}
            [s] => lone_switch(r, output, *s),
            _ => {
                let gate = mux(r, output, &switches);
                r.add(gate);
            }
        }
    }
}

fn lone_switch(r: &mut Recognizer<'_>, output: NetId, s: Switch) {
    match s.data {
        Node::Net(data) => {
            let mut gate = Gate::new(GateKind::Pass, vec![s.select, data], vec![output], vec![s.id]);
            gate.detail = GateDetail::Switch {
                data,
                select: s.select,
            };
            r.add(gate);
        }
        Node::Ground if !r.loads().contains_key(&output) => r.report(
            Cause::UnloadedPulldown {
                net: r.name(output),
                gate: r.name(s.select),
            },
            Severity::Info,
        ),
        Node::Ground | Node::Power => {}
    }
}

fn mux(r: &Recognizer<'_>, output: NetId, switches: &[Switch]) -> Gate {
    let groups: Vec<GroupId> = switches.iter().map(|s| s.id).collect();
    let powered = switches.iter().any(|s| s.data == Node::Power);
    let grounded = switches.iter().any(|s| s.data == Node::Ground);
    let only_rails = switches.iter().all(|s| s.data.is_rail());

    if only_rails && powered && grounded {
        let selects = |rail: Node| {
            let mut nets: Vec<NetId> = switches
                .iter()
                .filter(|s| s.data == rail)
                .map(|s| s.select)
                .collect();
            nets.sort_by_key(|&n| (r.name(n), n));
            nets.dedup();
            nets
        };
        let high = selects(Node::Power);
        let low = selects(Node::Ground);
        let inputs = high.iter().chain(low.iter()).copied().collect();
        let mut gate = Gate::new(GateKind::PowerMux, inputs, vec![output], groups);
        gate.detail = GateDetail::PowerMux { high, low };
        return gate;
    }

    let data: Vec<NetId> = switches.iter().map(|s| s.data_net).collect();
    let selects: Vec<NetId> = switches.iter().map(|s| s.select).collect();
    let inputs = data.iter().chain(selects.iter()).copied().collect();
    let mut gate = Gate::new(GateKind::Mux, inputs, vec![output], groups);
    gate.detail = GateDetail::Mux { data, selects };
    gate
}
