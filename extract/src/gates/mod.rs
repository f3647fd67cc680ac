//! Gate recognition.
//!
//! Recognition runs a fixed list of [`Template`]s over the logical
//! transistor groups. Each template claims the groups (or combines the
//! gates) it matches, so templates earlier in the list take priority over
//! later, more general ones.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use arcstr::ArcStr;
use diagnostics::{IssueSet, Severity};
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

use crate::config::Config;
use crate::groups::{Group, GroupId, Node};
use crate::issues::{Cause, Issue};
use crate::nets::{Net, NetId};

mod composite;
mod logic;
mod switch;
mod truth;

pub use truth::TruthTable;

/// The family of a recognized gate.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum GateKind {
    /// Inverter.
    Inv,
    /// NOR with the given number of inputs.
    Nor(usize),
    /// NAND with the given number of inputs.
    Nand(usize),
    /// OR with the given number of inputs: a NOR followed by an inverter.
    Or(usize),
    /// Any other pulldown network with the given number of inputs.
    Lut(usize),
    /// Pass transistors sharing an output.
    Mux,
    /// Switches from power and ground sharing an output.
    PowerMux,
    /// A NOR whose output and inputs drive a power multiplexer.
    PowerNor(usize),
    /// Non-inverting tristate driver.
    TristateBuf,
    /// Inverting tristate driver.
    TristateInv,
    /// A single pass transistor.
    Pass,
    /// A load with nothing pulling down against it.
    Pullup,
    /// A transistor to ground whose gate is ground.
    Pulldown,
    /// A multiplexer-based D latch.
    LatchMux,
    /// A power multiplexer driven by a signal and its inverse.
    Booster,
    /// An input pin buffer.
    PinIn,
    /// An output pin driver.
    PinOut,
    /// A bidirectional pin.
    PinIo,
}

impl GateKind {
    /// Returns `true` for kinds produced directly from a pulldown network.
    pub fn is_logic(&self) -> bool {
        matches!(self, Self::Inv | Self::Nor(_) | Self::Nand(_) | Self::Lut(_))
    }
}

impl Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inv => write!(f, "INV"),
            Self::Nor(n) => write!(f, "NOR_{n}"),
            Self::Nand(n) => write!(f, "NAND_{n}"),
            Self::Or(n) => write!(f, "OR_{n}"),
            Self::Lut(n) => write!(f, "LUT_{n}"),
            Self::Mux => write!(f, "MUX"),
            Self::PowerMux => write!(f, "POWERMUX"),
            Self::PowerNor(n) => write!(f, "POWER_NOR_{n}"),
            Self::TristateBuf => write!(f, "TRISTATE_BUF"),
            Self::TristateInv => write!(f, "TRISTATE_INV"),
            Self::Pass => write!(f, "PASS"),
            Self::Pullup => write!(f, "PULLUP"),
            Self::Pulldown => write!(f, "PULLDOWN"),
            Self::LatchMux => write!(f, "LATCH_MUX"),
            Self::Booster => write!(f, "BOOSTER"),
            Self::PinIn => write!(f, "PIN_IN"),
            Self::PinOut => write!(f, "PIN_OUT"),
            Self::PinIo => write!(f, "PIN_IO"),
        }
    }
}

/// Kind-specific roles of a gate's nets.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum GateDetail {
    /// Nothing beyond inputs and outputs.
    Plain,
    /// A pulldown network against a load.
    Logic {
        /// The load group.
        load: GroupId,
        /// Inputs that pull the output straight to ground.
        ground_enables: Vec<NetId>,
    },
    /// A pass transistor.
    Switch {
        /// The net passed through.
        data: NetId,
        /// The gate of the transistor.
        select: NetId,
    },
    /// A multiplexer; `data[i]` is passed when `selects[i]` is high.
    Mux {
        /// Data nets.
        data: Vec<NetId>,
        /// Select nets.
        selects: Vec<NetId>,
    },
    /// A power multiplexer.
    PowerMux {
        /// Selects connecting the output to power.
        high: Vec<NetId>,
        /// Selects connecting the output to ground.
        low: Vec<NetId>,
    },
    /// A tristate driver.
    Tristate {
        /// The driven value.
        input: NetId,
        /// Active-low enable.
        not_enable: NetId,
    },
    /// A latch.
    Latch {
        /// Data input.
        d: NetId,
        /// Clock selecting the data input.
        c: NetId,
        /// Clock selecting the feedback path.
        not_c: NetId,
        /// Output.
        q: NetId,
        /// Inverted output.
        not_q: NetId,
    },
    /// An input pin buffer.
    PinInput {
        /// The pin net.
        pin: NetId,
        /// Whether the output is the inverse of the pin.
        inverting: bool,
    },
}

/// A recognized gate.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The gate family.
    pub kind: GateKind,
    /// Ordered input nets.
    pub inputs: Vec<NetId>,
    /// Output nets; most gates have exactly one.
    pub outputs: Vec<NetId>,
    /// Groups making up the gate, including those of its subgates.
    pub groups: Vec<GroupId>,
    /// Gates combined into this one.
    pub subgates: Vec<Gate>,
    /// The function computed, for combinational gates.
    pub truth_table: Option<TruthTable>,
    /// Kind-specific net roles.
    pub detail: GateDetail,
}

impl Gate {
    /// A gate with no subgates, truth table or detail.
    pub fn new(kind: GateKind, inputs: Vec<NetId>, outputs: Vec<NetId>, groups: Vec<GroupId>) -> Self {
        Self {
            kind,
            inputs,
            outputs,
            groups,
            subgates: Vec::new(),
            truth_table: None,
            detail: GateDetail::Plain,
        }
    }

    /// Combines `subgates` into a gate of `kind`.
    ///
    /// The groups of the new gate are those of all subgates.
    pub fn combine(
        kind: GateKind,
        inputs: Vec<NetId>,
        outputs: Vec<NetId>,
        subgates: Vec<Gate>,
    ) -> Self {
        let mut groups: Vec<GroupId> = subgates.iter().flat_map(|g| g.groups.iter().copied()).collect();
        groups.sort_unstable();
        groups.dedup();
        Self {
            kind,
            inputs,
            outputs,
            groups,
            subgates,
            truth_table: None,
            detail: GateDetail::Plain,
        }
    }

    /// The first output.
    #[inline]
    pub fn output(&self) -> Option<NetId> {
        self.outputs.first().copied()
    }

    /// Inputs that pull the output straight to ground, for logic gates.
    pub fn ground_enables(&self) -> &[NetId] {
        match &self.detail {
            GateDetail::Logic { ground_enables, .. } => ground_enables,
            _ => &[],
        }
    }

    /// Power multiplexer selects, for power multiplexers.
    pub fn power_selects(&self) -> Option<(&[NetId], &[NetId])> {
        match &self.detail {
            GateDetail::PowerMux { high, low } if self.kind == GateKind::PowerMux => {
                Some((high, low))
            }
            _ => None,
        }
    }
}

/// One entry of the recognition priority list.
#[derive(Copy, Clone)]
pub struct Template {
    /// A short name, for logging.
    pub name: &'static str,
    apply: fn(&mut Recognizer<'_>),
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template").field("name", &self.name).finish()
    }
}

const TEMPLATES: [Template; 12] = [
    Template {
        name: "pulldown",
        apply: switch::pulldowns,
    },
    Template {
        name: "logic",
        apply: logic::logic_gates,
    },
    Template {
        name: "switch",
        apply: switch::switches,
    },
    Template {
        name: "power-nor",
        apply: composite::power_nors,
    },
    Template {
        name: "or",
        apply: composite::ors,
    },
    Template {
        name: "tristate",
        apply: composite::tristates,
    },
    Template {
        name: "latch",
        apply: composite::latches,
    },
    Template {
        name: "pullup",
        apply: switch::pullups,
    },
    Template {
        name: "booster",
        apply: composite::boosters,
    },
    Template {
        name: "pin-input",
        apply: composite::pin_inputs,
    },
    Template {
        name: "pin-io",
        apply: composite::pin_ios,
    },
    Template {
        name: "pin-output",
        apply: composite::pin_outputs,
    },
];

/// The recognition templates in the order they are tried.
pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

/// Working state shared by the templates.
pub struct Recognizer<'a> {
    nets: &'a [Net],
    groups: &'a [Group],
    config: &'a Config,
    issues: IssueSet<Issue>,
    claimed: Vec<bool>,
    /// Gates keyed by creation order.
    gates: BTreeMap<usize, Gate>,
    next: usize,
    at_node: BTreeMap<Node, Vec<GroupId>>,
    gated_by: BTreeMap<NetId, Vec<GroupId>>,
    /// Load groups keyed by the net they pull up.
    loads: BTreeMap<NetId, Vec<GroupId>>,
    /// Outputs and internal nets of logic gates.
    logic_nets: BTreeSet<NetId>,
}

impl<'a> Recognizer<'a> {
    fn new(nets: &'a [Net], groups: &'a [Group], config: &'a Config) -> Self {
        let mut at_node: BTreeMap<Node, Vec<GroupId>> = BTreeMap::new();
        let mut gated_by: BTreeMap<NetId, Vec<GroupId>> = BTreeMap::new();
        for g in groups.iter() {
            at_node.entry(g.ends[0]).or_default().push(g.id);
            if g.ends[1] != g.ends[0] {
                at_node.entry(g.ends[1]).or_default().push(g.id);
            }
            gated_by.entry(g.gate).or_default().push(g.id);
        }
        let mut this = Self {
            nets,
            groups,
            config,
            issues: IssueSet::new(),
            claimed: vec![false; groups.len()],
            gates: BTreeMap::new(),
            next: 0,
            at_node,
            gated_by,
            loads: BTreeMap::new(),
            logic_nets: BTreeSet::new(),
        };
        for g in groups.iter() {
            if let Some(net) = this.load_target(g) {
                this.loads.entry(net).or_default().push(g.id);
            }
        }
        this
    }

    /// The net a group pulls up, if the group is a load.
    ///
    /// A load runs from power to a net and is gated either by that net or
    /// by power.
    fn load_target(&self, g: &Group) -> Option<NetId> {
        let Some(Node::Net(net)) = g.other(Node::Power) else {
            return None;
        };
        (g.gate == net || self.node(g.gate) == Node::Power).then_some(net)
    }

    #[inline]
    pub(crate) fn config(&self) -> &Config {
        self.config
    }

    #[inline]
    pub(crate) fn group(&self, id: GroupId) -> &'a Group {
        &self.groups[id.0]
    }

    pub(crate) fn groups(&self) -> &'a [Group] {
        self.groups
    }

    pub(crate) fn node(&self, net: NetId) -> Node {
        self.nets.get(net.0).map(Node::of).unwrap_or(Node::Net(net))
    }

    pub(crate) fn net(&self, net: NetId) -> Option<&'a Net> {
        self.nets.get(net.0)
    }

    /// The name of a net, for diagnostics and truth tables.
    pub(crate) fn name(&self, net: NetId) -> ArcStr {
        match self.net(net) {
            Some(n) => n.name.clone(),
            None => arcstr::format!("{net}"),
        }
    }

    pub(crate) fn is_pin(&self, net: NetId) -> bool {
        self.net(net).is_some_and(|n| n.pin)
    }

    /// Groups with an end on `node`, ascending.
    pub(crate) fn groups_at(&self, node: Node) -> &[GroupId] {
        self.at_node.get(&node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Groups gated by `net`, ascending.
    pub(crate) fn gated_by(&self, net: NetId) -> &[GroupId] {
        self.gated_by.get(&net).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn loads(&self) -> &BTreeMap<NetId, Vec<GroupId>> {
        &self.loads
    }

    pub(crate) fn is_load(&self, id: GroupId) -> bool {
        self.load_target(self.group(id)).is_some()
    }

    #[inline]
    pub(crate) fn is_claimed(&self, id: GroupId) -> bool {
        self.claimed[id.0]
    }

    pub(crate) fn claim(&mut self, ids: &[GroupId]) {
        for id in ids {
            self.claimed[id.0] = true;
        }
    }

    pub(crate) fn mark_logic(&mut self, nets: impl IntoIterator<Item = NetId>) {
        self.logic_nets.extend(nets);
    }

    pub(crate) fn is_logic_net(&self, net: NetId) -> bool {
        self.logic_nets.contains(&net)
    }

    /// Adds a gate, claiming its groups.
    pub(crate) fn add(&mut self, gate: Gate) {
        self.claim(&gate.groups);
        tracing::debug!(kind = %gate.kind, outputs = ?gate.outputs, "gate recognized");
        self.gates.insert(self.next, gate);
        self.next += 1;
    }

    /// Removes and returns a gate.
    pub(crate) fn take(&mut self, key: usize) -> Option<Gate> {
        self.gates.remove(&key)
    }

    pub(crate) fn gate(&self, key: usize) -> Option<&Gate> {
        self.gates.get(&key)
    }

    /// Keys of the gates satisfying `pred`, in creation order.
    pub(crate) fn find(&self, pred: impl Fn(&Gate) -> bool) -> Vec<usize> {
        self.gates
            .iter()
            .filter(|(_, g)| pred(g))
            .map(|(&k, _)| k)
            .collect()
    }

    /// The key of the first gate driving `net` that satisfies `pred`.
    pub(crate) fn driver(&self, net: NetId, pred: impl Fn(&Gate) -> bool) -> Option<usize> {
        self.gates
            .iter()
            .find(|(_, g)| g.outputs.contains(&net) && pred(g))
            .map(|(&k, _)| k)
    }

    /// Number of gates and unclaimed groups reading `net`.
    pub(crate) fn fanout(&self, net: NetId) -> usize {
        let gates = self.gates.values().filter(|g| g.inputs.contains(&net)).count();
        let groups = self
            .gated_by(net)
            .iter()
            .filter(|&&id| !self.is_claimed(id))
            .count();
        gates + groups
    }

    pub(crate) fn report(&mut self, cause: Cause, severity: Severity) {
        self.issues.add(Issue::new_and_log(cause, severity));
    }
}

/// Recognizes gates among `groups`.
///
/// Gates are returned in the order they were recognized.
pub fn recognize_gates(
    nets: &[Net],
    groups: &[Group],
    config: &Config,
) -> (Vec<Gate>, IssueSet<Issue>) {
    let span = span!(Level::INFO, "recognize gates", groups = groups.len());
    let _guard = span.enter();

    let mut r = Recognizer::new(nets, groups, config);
    for template in templates() {
        let before = r.gates.len();
        (template.apply)(&mut r);
        tracing::debug!(
            template = template.name,
            gates = r.gates.len(),
            delta = r.gates.len() as isize - before as isize,
            "template applied"
        );
    }

    let ungated = r.claimed.iter().filter(|c| !**c).count();
    tracing::info!(gates = r.gates.len(), ungated, "recognition finished");
    (r.gates.into_values().collect(), r.issues)
}
