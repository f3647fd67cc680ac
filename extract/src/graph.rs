//! Export and import of the extracted circuit graph.
//!
//! An exported graph can be read back to rerun gate recognition without
//! repeating the geometry stages.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gates::Gate;
use crate::groups::Group;
use crate::nets::Net;
use crate::transistors::Transistor;
use crate::{Analysis, Circuit};

/// Nets, transistors, groups and gates of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitGraph {
    /// Nets, ordered by id.
    pub nets: Vec<Net>,
    /// Transistors, in extraction order.
    pub transistors: Vec<Transistor>,
    /// Logical transistor groups.
    pub groups: Vec<Group>,
    /// Recognized gates.
    pub gates: Vec<Gate>,
}

impl CircuitGraph {
    /// Collects the graph of an analysis.
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self {
            nets: analysis.circuit.nets.clone(),
            transistors: analysis.circuit.transistors.clone(),
            groups: analysis.groups.clone(),
            gates: analysis.gates.clone(),
        }
    }

    /// The nets and transistors of the graph.
    pub fn circuit(&self) -> Circuit {
        Circuit {
            nets: self.nets.clone(),
            transistors: self.transistors.clone(),
        }
    }

    /// Serializes the graph to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes a graph from a JSON string.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Writes the graph as JSON to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a JSON graph from `path`.
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Exports the graph of an analysis as JSON.
pub fn export_graph(analysis: &Analysis) -> Result<String> {
    let graph = CircuitGraph::from_analysis(analysis);
    tracing::debug!(
        nets = graph.nets.len(),
        transistors = graph.transistors.len(),
        gates = graph.gates.len(),
        "exporting graph"
    );
    graph.to_json()
}

/// Imports a graph previously produced by [`export_graph`].
pub fn import_graph(s: &str) -> Result<CircuitGraph> {
    let graph = CircuitGraph::from_json(s)?;
    tracing::debug!(
        nets = graph.nets.len(),
        transistors = graph.transistors.len(),
        gates = graph.gates.len(),
        "imported graph"
    );
    Ok(graph)
}
