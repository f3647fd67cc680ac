//! Gate recognition over circuits written out transistor by transistor.

use arcstr::ArcStr;
use geometry::prelude::*;
use test_log::test;

use crate::gates::{templates, GateDetail};
use crate::{recognize, Cause, Circuit, Config, Gate, GateKind, Net, NetClass, NetId, Transistor};

/// Builds a circuit from named nets. Nets are created on first use and
/// classified by name.
#[derive(Debug, Default)]
struct Builder {
    config: Config,
    circuit: Circuit,
}

impl Builder {
    fn new() -> Self {
        Self::default()
    }

    fn net(&mut self, name: &str) -> NetId {
        if let Some(net) = self.circuit.net_named(name) {
            return net.id;
        }
        let id = NetId(self.circuit.nets.len());
        let class = match self.config.rail(name) {
            Some(rail) => NetClass::from(rail),
            None => NetClass::Signal,
        };
        self.circuit.nets.push(Net {
            id,
            name: ArcStr::from(name),
            named: true,
            class,
            pin: false,
            members: Vec::new(),
        });
        id
    }

    fn pin(&mut self, name: &str) -> &mut Self {
        let id = self.net(name);
        self.circuit.nets[id.0].pin = true;
        self
    }

    /// A transistor gated by `gate` between `a` and `b`.
    fn t(&mut self, gate: &str, a: &str, b: &str) -> &mut Self {
        let gate = self.net(gate);
        let mut electrodes = vec![self.net(a), self.net(b)];
        electrodes.sort();
        let name = arcstr::format!("q{}", self.circuit.transistors.len());
        self.circuit.transistors.push(Transistor {
            name,
            gate,
            electrodes,
            region: Polygon::default(),
            complete: true,
            at: Point::zero(),
        });
        self
    }

    /// A depletion load pulling `net` up.
    fn load(&mut self, net: &str) -> &mut Self {
        self.t(net, "VCC", net)
    }

    fn id(&self, name: &str) -> NetId {
        self.circuit
            .net_named(name)
            .map(|n| n.id)
            .unwrap_or_else(|| panic!("no net named {name}"))
    }

    fn ids(&self, names: &[&str]) -> Vec<NetId> {
        names.iter().map(|n| self.id(n)).collect()
    }

    fn gates(&self) -> Vec<Gate> {
        recognize(&self.circuit, &self.config).gates
    }
}

fn kinds(gates: &[Gate]) -> Vec<GateKind> {
    gates.iter().map(|g| g.kind).collect()
}

fn table(gate: &Gate) -> String {
    gate.truth_table
        .as_ref()
        .map(|t| t.as_output_string())
        .unwrap_or_default()
}

#[test]
fn templates_run_in_priority_order() {
    let names: Vec<&str> = templates().iter().map(|t| t.name).collect();
    assert_eq!(
        names,
        [
            "pulldown",
            "logic",
            "switch",
            "power-nor",
            "or",
            "tristate",
            "latch",
            "pullup",
            "booster",
            "pin-input",
            "pin-io",
            "pin-output",
        ]
    );
}

#[test]
fn single_pulldown_under_a_load_is_an_inverter() {
    let mut b = Builder::new();
    b.load("OUT").t("A", "OUT", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Inv]);
    assert_eq!(table(&gates[0]), "10");
}

#[test]
fn series_pulldowns_make_a_nand() {
    let mut b = Builder::new();
    b.load("OUT").t("A", "OUT", "X").t("B", "X", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Nand(2)]);
    assert_eq!(gates[0].inputs, b.ids(&["A", "B"]));
    assert_eq!(table(&gates[0]), "1110");
}

#[test]
fn parallel_branch_in_a_series_chain_is_not_a_nand() {
    // OUT = !((A | C) & B)
    let mut b = Builder::new();
    b.load("OUT")
        .t("A", "OUT", "X")
        .t("C", "OUT", "X")
        .t("B", "X", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Lut(3)]);
    assert_eq!(table(&gates[0]), "11101100");
}

#[test]
fn mixed_network_is_a_lut_with_canonical_table() {
    // OUT = !(C | (A & B))
    let mut b = Builder::new();
    b.load("OUT")
        .t("C", "OUT", "GND")
        .t("A", "OUT", "X")
        .t("B", "X", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Lut(3)]);

    let t = gates[0].truth_table.as_ref().unwrap();
    let inputs: Vec<&str> = t.inputs().iter().map(|i| i.as_str()).collect();
    assert_eq!(inputs, ["A", "B", "C"]);
    assert_eq!(t.table().len(), 8);
    assert_eq!(t.as_output_string(), "11100000");
}

#[test]
fn nor_followed_by_inverter_is_an_or() {
    let mut b = Builder::new();
    b.load("N")
        .t("A", "N", "GND")
        .t("B", "N", "GND")
        .load("OUT")
        .t("N", "OUT", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Or(2)]);
    let or = &gates[0];
    assert_eq!(or.inputs, b.ids(&["A", "B"]));
    assert_eq!(or.outputs, b.ids(&["OUT"]));
    assert_eq!(table(or), "0111");
    assert_eq!(or.subgates.len(), 2);
    assert_eq!(or.groups.len(), 5);
}

#[test]
fn two_loads_on_one_net_are_not_logic() {
    let mut b = Builder::new();
    b.load("N").t("VCC", "VCC", "N").t("A", "N", "GND");
    let recognition = recognize(&b.circuit, &b.config);
    assert!(recognition
        .gates
        .iter()
        .all(|g| !g.kind.is_logic()));
    assert!(recognition
        .issues
        .iter()
        .any(|i| matches!(i.cause(), Cause::NonUniquePullup { loads: 2, .. })));
}

#[test]
fn lone_switch_between_signals_is_a_pass_transistor() {
    let mut b = Builder::new();
    b.t("G", "A", "B");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Pass]);
    assert!(matches!(
        gates[0].detail,
        GateDetail::Switch { select, .. } if select == b.id("G")
    ));
}

#[test]
fn switches_sharing_an_output_make_a_mux() {
    let mut b = Builder::new();
    b.t("S0", "D0", "Y").t("S1", "D1", "Y");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Mux]);
    assert_eq!(gates[0].outputs, b.ids(&["Y"]));
    assert_eq!(gates[0].inputs, b.ids(&["D0", "D1", "S0", "S1"]));
}

#[test]
fn rail_switches_make_a_power_mux() {
    let mut b = Builder::new();
    b.t("H", "VCC", "Y").t("L", "Y", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::PowerMux]);
    assert_eq!(
        gates[0].power_selects(),
        Some((&b.ids(&["H"])[..], &b.ids(&["L"])[..]))
    );
}

#[test]
fn nor_driving_a_power_mux_is_a_power_nor() {
    let mut b = Builder::new();
    b.load("N")
        .t("A", "N", "GND")
        .t("B", "N", "GND")
        .t("N", "VCC", "Y")
        .t("A", "Y", "GND")
        .t("B", "Y", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::PowerNor(2)]);
    assert_eq!(gates[0].inputs, b.ids(&["A", "B"]));
    assert_eq!(gates[0].outputs, b.ids(&["Y"]));
    assert_eq!(table(&gates[0]), "1000");
}

#[test]
fn rail_tied_devices_are_pullups_and_pulldowns() {
    let mut b = Builder::new();
    b.load("P").t("GND", "Q", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Pulldown, GateKind::Pullup]);
    assert_eq!(gates[0].outputs, b.ids(&["Q"]));
    assert_eq!(gates[1].outputs, b.ids(&["P"]));
}

#[test]
fn power_mux_with_inverted_low_select_is_a_booster() {
    let mut b = Builder::new();
    b.load("L")
        .t("H", "L", "GND")
        .t("H", "VCC", "Y")
        .t("L", "Y", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::Booster]);
    assert_eq!(gates[0].inputs, b.ids(&["H"]));
    assert_eq!(gates[0].outputs, b.ids(&["Y"]));
}

#[test]
fn held_pin_read_by_an_inverter_is_a_pin_input() {
    let mut b = Builder::new();
    b.pin("P").load("P").load("O").t("P", "O", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::PinIn]);
    assert_eq!(gates[0].inputs, b.ids(&["P"]));
    assert_eq!(gates[0].outputs, b.ids(&["O"]));
    assert!(matches!(
        gates[0].detail,
        GateDetail::PinInput {
            inverting: true,
            ..
        }
    ));
}

/// A power multiplexer onto `Y` selected by `NOR(A, E)` and `NOR(!A, E)`.
fn tristate(b: &mut Builder) {
    b.load("H")
        .t("A", "H", "GND")
        .t("E", "H", "GND")
        .load("B")
        .t("A", "B", "GND")
        .load("L")
        .t("B", "L", "GND")
        .t("E", "L", "GND")
        .t("H", "VCC", "Y")
        .t("L", "Y", "GND");
}

#[test]
fn nor_pair_with_shared_enable_is_a_tristate() {
    let mut b = Builder::new();
    tristate(&mut b);
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::TristateInv]);
    assert_eq!(gates[0].inputs, b.ids(&["A", "E"]));
    assert_eq!(gates[0].outputs, b.ids(&["Y"]));
    assert_eq!(gates[0].subgates.len(), 4);
}

#[test]
fn tristate_onto_a_pin_is_a_pin_output() {
    let mut b = Builder::new();
    tristate(&mut b);
    b.pin("Y");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::PinOut]);
    assert_eq!(gates[0].subgates[0].kind, GateKind::TristateInv);
}

#[test]
fn tristate_with_identical_inputs_is_rejected() {
    let mut b = Builder::new();
    b.load("H")
        .t("A", "H", "GND")
        .t("E", "H", "GND")
        .load("L")
        .t("A", "L", "GND")
        .t("E", "L", "GND")
        .t("H", "VCC", "Y")
        .t("L", "Y", "GND");
    let recognition = recognize(&b.circuit, &b.config);
    assert!(recognition
        .gates
        .iter()
        .all(|g| !matches!(g.kind, GateKind::TristateBuf | GateKind::TristateInv)));
    assert!(recognition
        .issues
        .iter()
        .any(|i| matches!(i.cause(), Cause::NonExclusiveTristate { .. })));
}

#[test]
fn mux_with_cross_coupled_feedback_is_a_latch() {
    let mut b = Builder::new();
    b.t("C", "D", "M")
        .t("NC", "Q", "M")
        .load("NQ")
        .t("M", "NQ", "GND")
        .load("Q")
        .t("NQ", "Q", "GND");
    let gates = b.gates();
    assert_eq!(kinds(&gates), [GateKind::LatchMux]);
    let expected = GateDetail::Latch {
        d: b.id("D"),
        c: b.id("C"),
        not_c: b.id("NC"),
        q: b.id("Q"),
        not_q: b.id("NQ"),
    };
    assert_eq!(gates[0].detail, expected);
    assert_eq!(gates[0].outputs, b.ids(&["Q", "NQ"]));
}

#[test]
fn wide_networks_skip_the_truth_table() {
    let mut b = Builder::new();
    b.config.max_table_inputs = 2;
    b.load("OUT")
        .t("A", "OUT", "GND")
        .t("B", "OUT", "GND")
        .t("C", "OUT", "GND");
    let recognition = recognize(&b.circuit, &b.config);
    assert_eq!(kinds(&recognition.gates), [GateKind::Nor(3)]);
    assert!(recognition.gates[0].truth_table.is_none());
    assert!(recognition.issues.iter().any(|i| matches!(
        i.cause(),
        Cause::TableTooWide {
            inputs: 3,
            limit: 2,
            ..
        }
    )));
}
