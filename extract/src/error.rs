//! Fatal errors.

use arcstr::ArcStr;
use diagnostics::IssueSet;

use crate::issues::Issue;
use crate::shape::ShapeRef;

/// The result type returned by this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that stops an analysis or an import/export.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A power net and a ground net are one connected component.
    ///
    /// Nothing downstream of net building is meaningful, so no netlist is produced.
    #[error("power net `{power}` is shorted to ground net `{ground}` ({} shapes on the path)", .path.len())]
    FatalShort {
        /// A power name found on the shorted component.
        power: ArcStr,
        /// A ground name found on the shorted component.
        ground: ArcStr,
        /// Shapes linking a power-labelled conductor to a ground-labelled one.
        path: Vec<ShapeRef>,
        /// Issues collected before the analysis stopped.
        issues: IssueSet<Issue>,
    },
    /// A truth table was requested for more inputs than the configured limit.
    #[error("truth table with {inputs} inputs exceeds the limit of {limit}")]
    TooManyInputs {
        /// Number of inputs requested.
        inputs: usize,
        /// The configured limit.
        limit: usize,
    },
    /// A textual netlist could not be parsed.
    #[error("netlist line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// JSON (de)serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The configuration file is not valid TOML.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
