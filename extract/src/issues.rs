//! Non-fatal problems found while analysing a drawing.

use std::fmt::Display;

use arcstr::ArcStr;
use diagnostics::{Diagnostic, Severity};
use geometry::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::drawing::Layer;
use crate::shape::ShapeRef;

/// An issue identified during analysis.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    cause: Cause,
    severity: Severity,
}

/// The broad family an issue belongs to.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    /// Bad outlines.
    Geometry,
    /// Contacts, labels and shapes that do not connect as expected.
    Connectivity,
    /// Devices and nets that are electrically suspect.
    Electrical,
    /// Structures the gate recognizer refused to match.
    Recognition,
}

/// What went wrong.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cause {
    /// An outline crosses or touches itself.
    SelfCrossing { shape: ShapeRef, at: Point },
    /// An outline has fewer than three distinct points or no area.
    DegenerateShell { shape: ShapeRef },
    /// A shape has no outline at all.
    EmptyShape { shape: ShapeRef },
    /// Shapes left out of the analysis because they failed validation.
    SkippedShapes { count: usize },
    /// A contact touches conductors on only one layer.
    ContactOneLayer { contact: ShapeRef, layer: Layer },
    /// A contact touches no conductor.
    IsolatedContact { contact: ShapeRef },
    /// A conductor touches nothing and forms no transistor.
    DanglingShape { shape: ShapeRef },
    /// A signal or pin label is not over any conductor.
    UnattachedLabel { text: ArcStr, at: Point },
    /// Several names were found on one net.
    NamingConflict { chosen: ArcStr, names: Vec<ArcStr> },
    /// A signal name was found on a power or ground net.
    SignalShortedToRail { rail: ArcStr, signal: ArcStr },
    /// A transistor does not have exactly two electrodes.
    IncompleteTransistor {
        transistor: ArcStr,
        electrodes: usize,
        at: Point,
    },
    /// Two transistor labels carry the same text.
    DuplicateTransistorName { name: ArcStr, at: Point },
    /// A transistor label is not over any gate.
    UnattachedTransistorLabel { text: ArcStr, at: Point },
    /// A net is pulled up by more than one load.
    NonUniquePullup { net: ArcStr, loads: usize },
    /// A lone switch to ground drives a net nothing pulls up.
    UnloadedPulldown { net: ArcStr, gate: ArcStr },
    /// A tristate candidate whose two drivers share both inputs.
    NonExclusiveTristate { output: ArcStr, input: ArcStr },
    /// A truth table was not computed because the gate has too many inputs.
    TableTooWide {
        output: ArcStr,
        inputs: usize,
        limit: usize,
    },
}

impl Cause {
    /// The family this cause belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::SelfCrossing { .. }
            | Self::DegenerateShell { .. }
            | Self::EmptyShape { .. }
            | Self::SkippedShapes { .. } => Category::Geometry,
            Self::ContactOneLayer { .. }
            | Self::IsolatedContact { .. }
            | Self::DanglingShape { .. }
            | Self::UnattachedLabel { .. }
            | Self::NamingConflict { .. } => Category::Connectivity,
            Self::SignalShortedToRail { .. }
            | Self::IncompleteTransistor { .. }
            | Self::DuplicateTransistorName { .. }
            | Self::UnattachedTransistorLabel { .. } => Category::Electrical,
            Self::NonUniquePullup { .. }
            | Self::UnloadedPulldown { .. }
            | Self::NonExclusiveTristate { .. }
            | Self::TableTooWide { .. } => Category::Recognition,
        }
    }
}

impl Diagnostic for Issue {
    fn help(&self) -> Option<Box<dyn Display>> {
        let msg = match self.cause {
            Cause::SelfCrossing { .. } => "redraw the outline so that no two edges cross",
            Cause::ContactOneLayer { .. } => {
                "a contact must overlap conductors on two different layers"
            }
            Cause::SignalShortedToRail { .. } => {
                "check for an accidental overlap or contact joining the signal to the rail"
            }
            Cause::IncompleteTransistor { .. } => {
                "the poly crossing should cut the diffusion into two separate pieces"
            }
            _ => return None,
        };
        Some(Box::new(msg))
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}

impl Issue {
    /// Creates a new issue from the given cause and severity.
    pub(crate) fn new(cause: Cause, severity: Severity) -> Self {
        Self { cause, severity }
    }

    /// Gets the underlying cause of this issue.
    #[inline]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// The family of the underlying cause.
    #[inline]
    pub fn category(&self) -> Category {
        self.cause.category()
    }

    /// Creates a new issue and logs it immediately.
    ///
    /// The log level will be selected according to the given severity.
    pub(crate) fn new_and_log(cause: Cause, severity: Severity) -> Self {
        let result = Self::new(cause, severity);
        match severity {
            Severity::Info => tracing::event!(Level::INFO, issue = ?result.cause, "{}", result),
            Severity::Warning => tracing::event!(Level::WARN, issue = ?result.cause, "{}", result),
            Severity::Error => tracing::event!(Level::ERROR, issue = ?result.cause, "{}", result),
        }
        result
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.cause)
    }
}

impl Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfCrossing { shape, at } => {
                write!(f, "self-crossing outline: {shape} crosses itself at {at}")
            }
            Self::DegenerateShell { shape } => write!(
                f,
                "degenerate shell: {shape} has an outline with no area"
            ),
            Self::EmptyShape { shape } => write!(f, "empty shape: {shape} has no outline"),
            Self::SkippedShapes { count } => {
                write!(f, "{count} shape(s) failed validation and were skipped")
            }
            Self::ContactOneLayer { contact, layer } => write!(
                f,
                "contact connects only one layer: {contact} touches only {layer}"
            ),
            Self::IsolatedContact { contact } => {
                write!(f, "isolated contact: {contact} touches no conductor")
            }
            Self::DanglingShape { shape } => write!(
                f,
                "dangling shape: {shape} touches no other shape and forms no transistor"
            ),
            Self::UnattachedLabel { text, at } => {
                write!(f, "unattached label: `{text}` at {at} is not over a conductor")
            }
            Self::NamingConflict { chosen, names } => write!(
                f,
                "naming conflict: one net carries names {}; using `{chosen}`",
                names
                    .iter()
                    .map(|n| format!("`{n}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::SignalShortedToRail { rail, signal } => write!(
                f,
                "signal shorted to rail: signal `{signal}` is connected to `{rail}`"
            ),
            Self::IncompleteTransistor {
                transistor,
                electrodes,
                at,
            } => write!(
                f,
                "incomplete transistor: `{transistor}` at {at} has {electrodes} electrode(s), expected 2"
            ),
            Self::DuplicateTransistorName { name, at } => write!(
                f,
                "duplicate transistor name: `{name}` at {at} is already used; a synthetic name was assigned"
            ),
            Self::UnattachedTransistorLabel { text, at } => write!(
                f,
                "unattached transistor label: `{text}` at {at} is not over a gate"
            ),
            Self::NonUniquePullup { net, loads } => write!(
                f,
                "non-unique pullup: net `{net}` is pulled up by {loads} loads"
            ),
            Self::UnloadedPulldown { net, gate } => write!(
                f,
                "unloaded pulldown: transistor gated by `{gate}` pulls `{net}` to ground, but nothing pulls it up"
            ),
            Self::NonExclusiveTristate { output, input } => write!(
                f,
                "non-exclusive tristate: both drivers of `{output}` see the same input `{input}`"
            ),
            Self::TableTooWide {
                output,
                inputs,
                limit,
            } => write!(
                f,
                "truth table too wide: gate driving `{output}` has {inputs} inputs, limit is {limit}"
            ),
        }
    }
}
