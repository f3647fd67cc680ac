//! Netlist extraction and gate recognition for hand-traced NMOS layouts.
//!
//! [`analyze`] takes a [`Drawing`] of tagged shapes and labels through
//! validation, diffusion splitting, net building and transistor extraction,
//! then groups transistors and recognizes logic gates among them.
//!
//! Problems that do not stop the analysis are collected as [`Issue`]s and
//! returned alongside the result. The only fatal condition is a power net
//! shorted to a ground net ([`Error::FatalShort`]).

use std::time::Instant;

use diagnostics::IssueSet;
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

pub mod config;
pub mod diffusion;
pub mod drawing;
pub mod error;
pub mod gates;
pub mod graph;
pub mod groups;
pub mod index;
pub mod issues;
pub mod netlist;
pub mod nets;
pub mod shape;
pub mod transistors;
pub mod validate;

mod union_find;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use drawing::{Drawing, Label, LabelKind, Layer, RawShape, RawShell};
pub use error::{Error, Result};
pub use gates::{Gate, GateKind, TruthTable};
pub use graph::{export_graph, import_graph, CircuitGraph};
pub use groups::{Group, GroupId, Node};
pub use issues::{Cause, Issue};
pub use netlist::{Netlist, Terminal};
pub use nets::{Net, NetClass, NetId};
pub use transistors::Transistor;

use crate::diffusion::split_diffusion;
use crate::gates::recognize_gates;
use crate::groups::merge_transistors;
use crate::index::OverlapIndex;
use crate::nets::build_nets;
use crate::shape::Shape;
use crate::transistors::extract_transistors;
use crate::validate::validate;

/// Nets and the transistors connecting them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    /// Nets, ordered by id.
    pub nets: Vec<Net>,
    /// Transistors, ordered by the geometry of their gates.
    pub transistors: Vec<Transistor>,
}

impl Circuit {
    /// The textual netlist of the circuit.
    pub fn netlist(&self) -> Netlist {
        Netlist::from_circuit(&self.nets, &self.transistors)
    }

    /// Looks up a net by id.
    #[inline]
    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(id.0)
    }

    /// Looks up a net by name.
    pub fn net_named(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|n| n.name == name)
    }
}

/// Counts describing one analysis.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Validated shapes used by the analysis.
    pub shapes: usize,
    /// Drawn shapes skipped because they failed validation.
    pub skipped: usize,
    /// Nets.
    pub nets: usize,
    /// Transistors, complete or not.
    pub transistors: usize,
    /// Transistors without exactly two electrodes.
    pub incomplete: usize,
    /// Logical transistor groups.
    pub groups: usize,
    /// Top-level gates.
    pub gates: usize,
    /// Issues of severity error.
    pub errors: usize,
    /// Issues of severity warning.
    pub warnings: usize,
}

/// The result of [`analyze`].
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The extracted circuit.
    pub circuit: Circuit,
    /// Complete transistors merged by gate and electrodes.
    pub groups: Vec<Group>,
    /// Recognized gates, in recognition order.
    pub gates: Vec<Gate>,
    /// Every non-fatal issue found.
    pub issues: IssueSet<Issue>,
    /// Counts for reporting.
    pub summary: Summary,
}

/// The result of [`recognize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Logical transistor groups.
    pub groups: Vec<Group>,
    /// Recognized gates, in recognition order.
    pub gates: Vec<Gate>,
    /// Issues raised by the recognizer.
    pub issues: IssueSet<Issue>,
}

/// Groups the transistors of `circuit` and recognizes gates among them.
pub fn recognize(circuit: &Circuit, config: &Config) -> Recognition {
    let groups = merge_transistors(&circuit.nets, &circuit.transistors);
    let (gates, issues) = recognize_gates(&circuit.nets, &groups, config);
    Recognition {
        groups,
        gates,
        issues,
    }
}

/// Runs the full analysis of a drawing.
///
/// Returns [`Error::FatalShort`] if a power net and a ground net are
/// connected; every other problem is reported in [`Analysis::issues`].
pub fn analyze(drawing: &Drawing, config: &Config) -> Result<Analysis> {
    let span = span!(
        Level::INFO,
        "analyze",
        shapes = drawing.shapes.len(),
        labels = drawing.labels.len()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let mut issues = IssueSet::new();
    let validated = validate(drawing, config, &mut issues);
    let shapes: Vec<Shape> = validated.valid().cloned().collect();
    tracing::debug!(elapsed = ?start.elapsed(), "validation done");

    let index = OverlapIndex::build(&shapes);
    let diffusion = split_diffusion(&shapes, &index, config);
    tracing::debug!(elapsed = ?start.elapsed(), "diffusion split");

    let connectivity = build_nets(&shapes, &diffusion, &drawing.labels, config, &mut issues)?;
    tracing::debug!(elapsed = ?start.elapsed(), "nets built");

    let transistors =
        extract_transistors(&diffusion, &connectivity, &drawing.labels, config, &mut issues);
    let circuit = Circuit {
        nets: connectivity.nets,
        transistors,
    };

    let recognition = recognize(&circuit, config);
    issues.merge(recognition.issues);

    let summary = Summary {
        shapes: shapes.len(),
        skipped: validated.skipped,
        nets: circuit.nets.len(),
        transistors: circuit.transistors.len(),
        incomplete: circuit.transistors.iter().filter(|t| !t.complete).count(),
        groups: recognition.groups.len(),
        gates: recognition.gates.len(),
        errors: issues.num_errors(),
        warnings: issues.num_warnings(),
    };
    tracing::info!(?summary, elapsed = ?start.elapsed(), "analysis finished");

    Ok(Analysis {
        circuit,
        groups: recognition.groups,
        gates: recognition.gates,
        issues,
        summary,
    })
}

