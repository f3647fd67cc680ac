//! Gates built by combining already recognized gates.

use std::collections::BTreeSet;

use diagnostics::Severity;

use super::{Gate, GateDetail, GateKind, Recognizer};
use crate::issues::Cause;
use crate::nets::NetId;

fn is_nor_like(g: &Gate) -> bool {
    matches!(g.kind, GateKind::Inv | GateKind::Nor(_))
}

fn is_latch_half(g: &Gate) -> bool {
    matches!(g.kind, GateKind::Inv | GateKind::Nor(_) | GateKind::Lut(_))
        && !g.ground_enables().is_empty()
}

/// Single high and low selects of a two-way power multiplexer.
fn two_way_selects(g: &Gate) -> Option<(NetId, NetId)> {
    match g.power_selects() {
        Some(([high], [low])) => Some((*high, *low)),
        _ => None,
    }
}

/// A NOR driving a power multiplexer from its output (high side) and its
/// inputs (low side).
pub(super) fn power_nors(r: &mut Recognizer<'_>) {
    for nk in r.find(is_nor_like) {
        let Some(nor) = r.gate(nk) else { continue };
        let Some(out) = nor.output() else { continue };
        let inputs: BTreeSet<NetId> = nor.inputs.iter().copied().collect();
        let Some(&mk) = r
            .find(|g| {
                g.power_selects().is_some_and(|(high, low)| {
                    high == [out] && low.iter().copied().collect::<BTreeSet<_>>() == inputs
                })
            })
            .first()
        else {
            continue;
        };
        let (Some(nor), Some(mux)) = (r.take(nk), r.take(mk)) else {
            continue;
        };
        let kind = GateKind::PowerNor(nor.inputs.len());
        let (inputs, outputs) = (nor.inputs.clone(), mux.outputs.clone());
        let (truth_table, detail) = (nor.truth_table.clone(), nor.detail.clone());
        let mut gate = Gate::combine(kind, inputs, outputs, vec![nor, mux]);
        gate.truth_table = truth_table;
        gate.detail = detail;
        r.add(gate);
    }
}

/// A NOR whose only reader is an inverter.
pub(super) fn ors(r: &mut Recognizer<'_>) {
    for nk in r.find(|g| matches!(g.kind, GateKind::Nor(n) if n > 1)) {
        let Some(out) = r.gate(nk).and_then(Gate::output) else {
            continue;
        };
        if r.fanout(out) != 1 {
            continue;
        }
        let Some(&ik) = r
            .find(|g| g.kind == GateKind::Inv && g.inputs == [out])
            .first()
        else {
            continue;
        };
        let (Some(nor), Some(inv)) = (r.take(nk), r.take(ik)) else {
            continue;
        };
        let kind = GateKind::Or(nor.inputs.len());
        let (inputs, outputs) = (nor.inputs.clone(), inv.outputs.clone());
        let truth_table = nor.truth_table.as_ref().map(|t| t.negate());
        let detail = nor.detail.clone();
        let mut gate = Gate::combine(kind, inputs, outputs, vec![nor, inv]);
        gate.truth_table = truth_table;
        gate.detail = detail;
        r.add(gate);
    }
}

/// A two-way power multiplexer whose selects come from two NOR2 gates
/// sharing an active-low enable.
pub(super) fn tristates(r: &mut Recognizer<'_>) {
    for mk in r.find(|g| two_way_selects(g).is_some()) {
        let Some(mux) = r.gate(mk) else { continue };
        let (Some((high, low)), Some(out)) = (two_way_selects(mux), mux.output()) else {
            continue;
        };
        let nor2 = |g: &Gate| g.kind == GateKind::Nor(2);
        let (Some(hk), Some(lk)) = (r.driver(high, nor2), r.driver(low, nor2)) else {
            continue;
        };
        if hk == lk {
            continue;
        }
        let (Some(h_gate), Some(l_gate)) = (r.gate(hk), r.gate(lk)) else {
            continue;
        };
        let h_inputs: BTreeSet<NetId> = h_gate.inputs.iter().copied().collect();
        let l_inputs: BTreeSet<NetId> = l_gate.inputs.iter().copied().collect();
        if h_inputs == l_inputs {
            let input = h_gate.inputs[0];
            r.report(
                Cause::NonExclusiveTristate {
                    output: r.name(out),
                    input: r.name(input),
                },
                Severity::Warning,
            );
            continue;
        }
        let shared: Vec<NetId> = h_inputs.intersection(&l_inputs).copied().collect();
        let [not_enable] = shared[..] else { continue };
        let (Some(&h), Some(&l)) = (
            h_inputs.iter().find(|&&n| n != not_enable),
            l_inputs.iter().find(|&&n| n != not_enable),
        ) else {
            continue;
        };
        if r.fanout(high) != 1 || r.fanout(low) != 1 {
            continue;
        }

        let inverter = |from: NetId| move |g: &Gate| g.kind == GateKind::Inv && g.inputs == [from];
        let (kind, input, ik) = if let Some(ik) = r.driver(l, inverter(h)) {
            (GateKind::TristateInv, h, ik)
        } else if let Some(ik) = r.driver(h, inverter(l)) {
            (GateKind::TristateBuf, l, ik)
        } else {
            continue;
        };
        let consume_inverter = r
            .gate(ik)
            .and_then(Gate::output)
            .is_some_and(|o| r.fanout(o) == 1);

        let mut subgates: Vec<Gate> = [hk, lk].into_iter().filter_map(|k| r.take(k)).collect();
        if consume_inverter {
            subgates.extend(r.take(ik));
        }
        let Some(mux) = r.take(mk) else { continue };
        let outputs = mux.outputs.clone();
        subgates.push(mux);
        let mut gate = Gate::combine(kind, vec![input, not_enable], outputs, subgates);
        gate.detail = GateDetail::Tristate { input, not_enable };
        r.add(gate);
    }
}

/// A two-way multiplexer feeding back from a cross-coupled pair of logic
/// gates.
pub(super) fn latches(r: &mut Recognizer<'_>) {
    for mk in r.find(|g| matches!(&g.detail, GateDetail::Mux { data, .. } if data.len() == 2)) {
        let Some(mux) = r.gate(mk) else { continue };
        let GateDetail::Mux { data, selects } = &mux.detail else {
            continue;
        };
        let (Some(out), &[d0, d1], &[s0, s1]) = (mux.output(), data.as_slice(), selects.as_slice())
        else {
            continue;
        };

        let mut found = None;
        for (feedback, d, c, not_c) in [(d0, d1, s1, s0), (d1, d0, s0, s1)] {
            let Some(qk) = r.driver(feedback, is_latch_half) else {
                continue;
            };
            let Some(q_gate) = r.gate(qk) else { continue };
            let candidates = r.find(|g| {
                is_latch_half(g)
                    && g.ground_enables().contains(&out)
                    && g.output().is_some_and(|o| q_gate.ground_enables().contains(&o))
            });
            match candidates[..] {
                [xk] if xk != qk => {
                    if let Some(not_q) = r.gate(xk).and_then(Gate::output) {
                        found = Some((qk, xk, d, c, not_c, feedback, not_q));
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some((qk, xk, d, c, not_c, q, not_q)) = found else {
            continue;
        };

        let subgates: Vec<Gate> = [mk, qk, xk].into_iter().filter_map(|k| r.take(k)).collect();
        let mut gate = Gate::combine(GateKind::LatchMux, vec![d, c, not_c], vec![q, not_q], subgates);
        gate.detail = GateDetail::Latch {
            d,
            c,
            not_c,
            q,
            not_q,
        };
        r.add(gate);
    }
}

/// A two-way power multiplexer selected by a signal and its inverse.
pub(super) fn boosters(r: &mut Recognizer<'_>) {
    for mk in r.find(|g| two_way_selects(g).is_some()) {
        let Some((high, low)) = r.gate(mk).and_then(two_way_selects) else {
            continue;
        };
        let Some(ik) = r.driver(low, |g| g.kind == GateKind::Inv && g.inputs == [high]) else {
            continue;
        };
        if r.fanout(low) != 1 {
            continue;
        }
        let (Some(inv), Some(mux)) = (r.take(ik), r.take(mk)) else {
            continue;
        };
        let outputs = mux.outputs.clone();
        r.add(Gate::combine(GateKind::Booster, vec![high], outputs, vec![inv, mux]));
    }
}

/// An inverter reading a pin held by a pullup or pulldown, optionally
/// followed by a second inverter.
pub(super) fn pin_inputs(r: &mut Recognizer<'_>) {
    for ik in r.find(|g| g.kind == GateKind::Inv) {
        let Some(inv) = r.gate(ik) else { continue };
        let (Some(&pin), Some(first_out)) = (inv.inputs.first(), inv.output()) else {
            continue;
        };
        if !r.is_pin(pin) || r.fanout(pin) != 1 {
            continue;
        }
        let holders = r.find(|g| {
            matches!(g.kind, GateKind::Pullup | GateKind::Pulldown) && g.outputs == [pin]
        });
        if holders.is_empty() {
            continue;
        }
        let second = if r.fanout(first_out) == 1 {
            r.find(|g| g.kind == GateKind::Inv && g.inputs == [first_out])
                .first()
                .copied()
        } else {
            None
        };
        let output = match second.and_then(|k| r.gate(k)).and_then(Gate::output) {
            Some(o) => o,
            None => first_out,
        };
        let inverting = output == first_out;

        let subgates: Vec<Gate> = std::iter::once(ik)
            .chain(second.filter(|_| !inverting))
            .chain(holders)
            .filter_map(|k| r.take(k))
            .collect();
        let mut gate = Gate::combine(GateKind::PinIn, vec![pin], vec![output], subgates);
        gate.detail = GateDetail::PinInput { pin, inverting };
        r.add(gate);
    }
}

/// A pin read by a PIN_IN and driven by a tristate buffer.
pub(super) fn pin_ios(r: &mut Recognizer<'_>) {
    for pk in r.find(|g| g.kind == GateKind::PinIn) {
        let Some(pin_in) = r.gate(pk) else { continue };
        let (GateDetail::PinInput { pin, .. }, Some(read)) = (&pin_in.detail, pin_in.output())
        else {
            continue;
        };
        let pin = *pin;
        let Some(tk) = r.driver(pin, |g| g.kind == GateKind::TristateBuf) else {
            continue;
        };
        let (Some(tristate), Some(pin_in)) = (r.take(tk), r.take(pk)) else {
            continue;
        };
        let inputs = tristate.inputs.clone();
        r.add(Gate::combine(
            GateKind::PinIo,
            inputs,
            vec![read, pin],
            vec![tristate, pin_in],
        ));
    }
}

/// A tristate driver or booster driving a pin.
pub(super) fn pin_outputs(r: &mut Recognizer<'_>) {
    let drivers = r.find(|g| {
        matches!(
            g.kind,
            GateKind::TristateBuf | GateKind::TristateInv | GateKind::Booster
        ) && g.output().is_some_and(|o| r.is_pin(o))
    });
    for dk in drivers {
        let Some(driver) = r.take(dk) else { continue };
        let (inputs, outputs) = (driver.inputs.clone(), driver.outputs.clone());
        r.add(Gate::combine(GateKind::PinOut, inputs, outputs, vec![driver]));
    }
}
