//! Whole-pipeline runs over small layouts.

use std::collections::BTreeSet;

use arcstr::ArcStr;
use test_log::test;

use super::layouts::{nor, unloaded_pulldown, Layout};
use crate::drawing::Layer;
use crate::{analyze, Analysis, Cause, Config, Error, GateKind, NetClass};

fn has(analysis: &Analysis, pred: impl Fn(&Cause) -> bool) -> bool {
    analysis.issues.iter().any(|i| pred(i.cause()))
}

fn net_name(analysis: &Analysis, id: crate::NetId) -> &str {
    analysis
        .circuit
        .net(id)
        .map(|n| n.name.as_str())
        .unwrap_or_default()
}

#[test]
fn parallel_fingers_make_nor_n() {
    let config = Config::default();
    for n in 1..=6 {
        let analysis = analyze(&nor(n).drawing(), &config).unwrap();
        assert_eq!(analysis.summary.transistors, n + 1, "n = {n}");
        assert_eq!(analysis.summary.incomplete, 0, "n = {n}");
        assert_eq!(analysis.summary.nets, n + 3, "n = {n}");
        assert_eq!(analysis.issues.num_errors(), 0, "n = {n}");
        assert_eq!(analysis.gates.len(), 1, "n = {n}");

        let gate = &analysis.gates[0];
        let expected = if n == 1 {
            GateKind::Inv
        } else {
            GateKind::Nor(n)
        };
        assert_eq!(gate.kind, expected);

        let inputs: Vec<&str> = gate.inputs.iter().map(|&i| net_name(&analysis, i)).collect();
        let names: Vec<String> = (0..n).map(|k| format!("IN_{k}")).collect();
        assert_eq!(inputs, names);
        let out = analysis.circuit.net_named("OUT").unwrap();
        assert_eq!(gate.outputs, vec![out.id]);

        let table = gate.truth_table.as_ref().unwrap();
        let expected = format!("1{}", "0".repeat((1 << n) - 1));
        assert_eq!(table.as_output_string(), expected);
    }
}

#[test]
fn rails_are_classified_by_prefix() {
    let analysis = analyze(&nor(2).drawing(), &Config::default()).unwrap();
    let class = |name: &str| analysis.circuit.net_named(name).map(|n| n.class);
    assert_eq!(class("VCC"), Some(NetClass::Power));
    assert_eq!(class("GND"), Some(NetClass::Ground));
    assert_eq!(class("IN_0"), Some(NetClass::Signal));
    assert!(analysis.circuit.nets.iter().all(|n| n.named));
}

#[test]
fn unloaded_pulldown_is_not_an_inverter() {
    let analysis = analyze(&unloaded_pulldown().drawing(), &Config::default()).unwrap();
    assert_eq!(analysis.circuit.transistors.len(), 1);

    let t = &analysis.circuit.transistors[0];
    assert!(t.complete);
    assert_eq!(net_name(&analysis, t.gate), "IN");
    let electrodes: BTreeSet<&str> = t
        .electrodes
        .iter()
        .map(|&e| net_name(&analysis, e))
        .collect();
    assert_eq!(electrodes, BTreeSet::from(["GND", "OUT"]));

    assert!(analysis.gates.is_empty());
    assert!(has(&analysis, |c| matches!(c, Cause::UnloadedPulldown { .. })));
}

#[test]
fn self_crossing_shape_is_reported_and_skipped() {
    let mut layout = unloaded_pulldown();
    layout.outline(
        Layer::Poly,
        &[[100.0, 0.0], [106.0, 4.0], [106.0, 0.0], [100.0, 2.0]],
    );
    let drawing = layout.drawing();
    let bad = drawing.shapes.len() - 1;

    let analysis = analyze(&drawing, &Config::default()).unwrap();
    assert!(has(&analysis, |c| matches!(
        c,
        Cause::SelfCrossing { shape, .. } if shape.index == bad
    )));
    assert_eq!(analysis.summary.skipped, 1);
    assert!(analysis
        .circuit
        .nets
        .iter()
        .flat_map(|n| n.members.iter())
        .flat_map(|m| m.sources.iter())
        .all(|s| s.index != bad));
    assert_eq!(analysis.circuit.transistors.len(), 1);
}

#[test]
fn power_shorted_to_ground_is_fatal() {
    let mut layout = Layout::new();
    layout
        .rect(Layer::Metal, 0.0, 0.0, 4.0, 4.0)
        .signal("VDD_CORE", 1.0, 2.0)
        .rect(Layer::Poly, 3.0, 0.0, 8.0, 4.0)
        .signal("GND_IO", 7.0, 2.0)
        .rect(Layer::Contact, 3.2, 1.0, 3.8, 3.0);

    match analyze(&layout.drawing(), &Config::default()) {
        Err(Error::FatalShort {
            power,
            ground,
            path,
            ..
        }) => {
            assert_eq!(power.as_str(), "VDD_CORE");
            assert_eq!(ground.as_str(), "GND_IO");
            let sources: Vec<&str> = path
                .iter()
                .filter_map(|s| s.source.as_ref().map(|s| s.as_str()))
                .collect();
            assert_eq!(sources, ["s0", "s2", "s1"]);
        }
        other => panic!("expected a fatal short, got {other:?}"),
    }
}

#[test]
fn transistor_labels_name_gates() {
    let mut layout = nor(2);
    layout
        .transistor("pd", 3.0, 2.0)
        .transistor("pd", 7.0, 2.0)
        .transistor("stray", 50.0, 50.0);
    let analysis = analyze(&layout.drawing(), &Config::default()).unwrap();

    let names: BTreeSet<&str> = analysis
        .circuit
        .transistors
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, BTreeSet::from(["pd", "q0", "q1"]));
    let pd = analysis
        .circuit
        .transistors
        .iter()
        .find(|t| t.name.as_str() == "pd")
        .unwrap();
    assert_eq!(net_name(&analysis, pd.gate), "IN_0");

    assert!(has(&analysis, |c| matches!(
        c,
        Cause::DuplicateTransistorName { name, .. } if name == "pd"
    )));
    assert!(has(&analysis, |c| matches!(
        c,
        Cause::UnattachedTransistorLabel { text, .. } if text == "stray"
    )));
}

#[test]
fn contact_and_label_defects_are_reported() {
    let mut layout = unloaded_pulldown();
    layout
        .rect(Layer::Metal, 200.0, 0.0, 202.0, 2.0)
        .rect(Layer::Contact, 200.5, 0.5, 201.5, 1.5)
        .rect(Layer::Contact, 300.0, 0.0, 301.0, 1.0)
        .signal("NOWHERE", 400.0, 400.0);
    let analysis = analyze(&layout.drawing(), &Config::default()).unwrap();

    assert!(has(&analysis, |c| matches!(
        c,
        Cause::ContactOneLayer {
            layer: Layer::Metal,
            ..
        }
    )));
    assert!(has(&analysis, |c| matches!(c, Cause::IsolatedContact { .. })));
    assert!(has(&analysis, |c| matches!(
        c,
        Cause::UnattachedLabel { text, .. } if text == "NOWHERE"
    )));
}

#[test]
fn signal_name_on_rail_is_an_error() {
    let mut layout = unloaded_pulldown();
    layout.signal("OOPS", 2.0, 2.0);
    let analysis = analyze(&layout.drawing(), &Config::default()).unwrap();

    assert!(has(&analysis, |c| matches!(
        c,
        Cause::SignalShortedToRail { rail, signal } if rail == "GND" && signal == "OOPS"
    )));
    assert!(analysis.circuit.net_named("OOPS").is_none());
    assert!(analysis.issues.has_error());
}

#[test]
fn anonymous_nets_are_unassigned() {
    let mut layout = unloaded_pulldown();
    layout.rect(Layer::Metal, 50.0, 0.0, 52.0, 2.0);
    let analysis = analyze(&layout.drawing(), &Config::default()).unwrap();

    let anonymous: Vec<_> = analysis
        .circuit
        .nets
        .iter()
        .filter(|n| !n.named)
        .collect();
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[0].class, NetClass::Unassigned);
    assert_eq!(anonymous[0].name, arcstr::format!("${}", anonymous[0].id.0));
    assert!(has(&analysis, |c| matches!(c, Cause::DanglingShape { .. })));
}

/// Net names and the drawn shapes making up each net.
fn partition(analysis: &Analysis) -> BTreeSet<(ArcStr, BTreeSet<ArcStr>)> {
    analysis
        .circuit
        .nets
        .iter()
        .map(|n| {
            let sources = n
                .members
                .iter()
                .flat_map(|m| m.sources.iter())
                .filter_map(|s| s.source.clone())
                .collect();
            (n.name.clone(), sources)
        })
        .collect()
}

#[test]
fn shape_order_does_not_change_nets() {
    let config = Config::default();
    let forward = nor(3).drawing();
    let mut backward = forward.clone();
    backward.shapes.reverse();
    backward.labels.reverse();

    let a = analyze(&forward, &config).unwrap();
    let b = analyze(&backward, &config).unwrap();
    assert_eq!(partition(&a), partition(&b));
    assert!(a.circuit.netlist().is_equivalent(&b.circuit.netlist()));

    let kinds = |x: &Analysis| x.gates.iter().map(|g| g.kind).collect::<Vec<_>>();
    assert_eq!(kinds(&a), kinds(&b));
}

#[test]
fn contact_abutting_a_gate_is_an_ordinary_tap() {
    let mut layout = Layout::new();
    layout
        .rect(Layer::Diff, 0.0, 0.0, 10.0, 4.0)
        .rect(Layer::Poly, 4.0, -2.0, 6.0, 6.0)
        .signal("IN", 5.0, 5.5)
        .rect(Layer::Contact, 3.0, 1.0, 4.0, 3.0)
        .rect(Layer::Metal, 2.0, 0.5, 4.0, 3.5)
        .signal("GND", 3.0, 2.0)
        .tap(8.0, 2.0, "OUT");
    let analysis = analyze(&layout.drawing(), &Config::default()).unwrap();

    assert_eq!(analysis.circuit.transistors.len(), 1);
    let t = &analysis.circuit.transistors[0];
    assert!(t.complete);
    assert_eq!(net_name(&analysis, t.gate), "IN");
    let electrodes: BTreeSet<&str> = t
        .electrodes
        .iter()
        .map(|&e| net_name(&analysis, e))
        .collect();
    assert_eq!(electrodes, BTreeSet::from(["GND", "OUT"]));
    assert!(!has(&analysis, |c| matches!(c, Cause::NamingConflict { .. })));
    assert_eq!(analysis.issues.num_errors(), 0);
}

#[test]
fn gate_between_two_pieces_of_one_net_is_complete() {
    let mut layout = Layout::new();
    layout
        .rect(Layer::Diff, 0.0, 0.0, 10.0, 4.0)
        .rect(Layer::Poly, 4.0, -2.0, 6.0, 6.0)
        .signal("IN", 5.0, 5.5)
        .tap(2.0, 2.0, "GND")
        .tap(8.0, 2.0, "GND");
    let analysis = analyze(&layout.drawing(), &Config::default()).unwrap();

    assert_eq!(analysis.circuit.transistors.len(), 1);
    let t = &analysis.circuit.transistors[0];
    let gnd = analysis.circuit.net_named("GND").unwrap().id;
    assert!(t.complete);
    assert_eq!(t.electrodes, vec![gnd, gnd]);
    assert_eq!(t.ends(), Some([gnd, gnd]));
    assert_eq!(analysis.summary.incomplete, 0);
    assert!(!has(&analysis, |c| matches!(c, Cause::IncompleteTransistor { .. })));
    assert_eq!(analysis.issues.num_errors(), 0);
    assert!(analysis.gates.is_empty());

    let netlist = analysis.circuit.netlist();
    let on_gnd: Vec<_> = netlist.get("GND").unwrap().iter().map(|(_, t)| *t).collect();
    assert_eq!(on_gnd, [crate::Terminal::E0, crate::Terminal::E1]);
}

#[test]
fn netlist_keeps_separate_nets_with_one_name() {
    let mut layout = unloaded_pulldown();
    layout
        .rect(Layer::Diff, 20.0, 0.0, 30.0, 4.0)
        .rect(Layer::Poly, 24.0, -2.0, 26.0, 6.0)
        .signal("IN2", 25.0, 5.5)
        .tap(22.0, 2.0, "GND")
        .tap(28.0, 2.0, "OUT");
    let config = Config {
        join_same_names: false,
        ..Config::default()
    };
    let analysis = analyze(&layout.drawing(), &config).unwrap();

    let outs: Vec<_> = analysis
        .circuit
        .nets
        .iter()
        .filter(|n| n.name.as_str() == "OUT")
        .collect();
    assert_eq!(outs.len(), 2);

    let netlist = analysis.circuit.netlist();
    assert_eq!(netlist.len(), 6);
    let out_terminals: usize = netlist
        .iter()
        .filter(|(name, _)| name.as_str() == "OUT" || name.starts_with("OUT#"))
        .map(|(_, terminals)| terminals.len())
        .sum();
    assert_eq!(out_terminals, 2);
    let second = arcstr::format!("OUT#{}", outs[1].id.0);
    assert_eq!(netlist.get(&second).map(|t| t.len()), Some(1));
}
