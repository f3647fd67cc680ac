//! The traced drawing handed over by a shape loader.
//!
//! Coordinates here are floating-point drawing units. The validator
//! quantizes them onto the integer grid.

use std::fmt::Display;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A traced layer.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    /// Diffusion.
    Diff,
    /// Polysilicon.
    Poly,
    /// Metal.
    Metal,
    /// A contact between two conductive layers.
    Contact,
}

impl Layer {
    /// Returns `true` for layers that carry current (everything but contacts).
    #[inline]
    pub fn is_conductor(&self) -> bool {
        !matches!(self, Self::Contact)
    }
}

impl Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Diff => write!(f, "DIFF"),
            Self::Poly => write!(f, "POLY"),
            Self::Metal => write!(f, "METAL"),
            Self::Contact => write!(f, "CONTACT"),
        }
    }
}

/// One segment of a traced outline.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathSegment {
    /// A straight line to `to`.
    Line {
        /// End point.
        to: [f64; 2],
    },
    /// A cubic Bézier curve to `to` with control points `c1` and `c2`.
    Cubic {
        /// First control point.
        c1: [f64; 2],
        /// Second control point.
        c2: [f64; 2],
        /// End point.
        to: [f64; 2],
    },
}

impl PathSegment {
    /// The end point of the segment.
    pub fn end(&self) -> [f64; 2] {
        match self {
            Self::Line { to } | Self::Cubic { to, .. } => *to,
        }
    }
}

/// A closed outline: a start point followed by segments.
///
/// The outline closes back to `start` implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShell {
    /// The first point of the outline.
    pub start: [f64; 2],
    /// Segments following the start point.
    pub segments: Vec<PathSegment>,
}

impl RawShell {
    /// A straight-edged outline through `points`.
    pub fn polyline(points: &[[f64; 2]]) -> Self {
        let start = points.first().copied().unwrap_or_default();
        Self {
            start,
            segments: points
                .iter()
                .skip(1)
                .map(|p| PathSegment::Line { to: *p })
                .collect(),
        }
    }

    /// A rectangle with the given sides, traced counter-clockwise.
    pub fn rect(left: f64, bot: f64, right: f64, top: f64) -> Self {
        Self::polyline(&[[left, bot], [right, bot], [right, top], [left, top]])
    }
}

/// A shape as produced by the loader, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShape {
    /// An identifier used when reporting problems with this shape.
    #[serde(default)]
    pub source: Option<ArcStr>,
    /// The layer the shape was traced on.
    pub layer: Layer,
    /// Outer shells and holes, in any order and orientation.
    pub shells: Vec<RawShell>,
    /// A signal name attached to the shape itself.
    #[serde(default)]
    pub label: Option<ArcStr>,
}

impl RawShape {
    /// Creates a shape from its shells.
    pub fn new(layer: Layer, shells: Vec<RawShell>) -> Self {
        Self {
            source: None,
            layer,
            shells,
            label: None,
        }
    }

    /// Creates a rectangular shape.
    pub fn rect(layer: Layer, left: f64, bot: f64, right: f64, top: f64) -> Self {
        Self::new(layer, vec![RawShell::rect(left, bot, right, top)])
    }

    /// Sets the source identifier.
    pub fn with_source(mut self, source: impl Into<ArcStr>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the attached signal name.
    pub fn with_label(mut self, label: impl Into<ArcStr>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The text layer a label was placed on.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// Names the net under the label's centre.
    Signal,
    /// Names the transistor whose gate the label overlaps.
    Transistor,
    /// Names the net under the label's centre and marks it as a pin.
    Pin,
}

/// A text label placed on the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Which text layer the label is on.
    pub kind: LabelKind,
    /// The label text.
    pub text: ArcStr,
    /// `[left, bot, right, top]` in drawing units.
    pub extents: [f64; 4],
}

impl Label {
    /// Creates a label with zero-size extents at `(x, y)`.
    pub fn at(kind: LabelKind, text: impl Into<ArcStr>, x: f64, y: f64) -> Self {
        Self {
            kind,
            text: text.into(),
            extents: [x, y, x, y],
        }
    }

    /// The centre of the label's extents.
    pub fn center(&self) -> [f64; 2] {
        let [l, b, r, t] = self.extents;
        [(l + r) / 2.0, (b + t) / 2.0]
    }
}

/// Everything the loader extracted from one drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// Shapes on the conductive and contact layers.
    pub shapes: Vec<RawShape>,
    /// Labels from the text layers.
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Drawing {
    /// Creates an empty drawing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape.
    pub fn add_shape(&mut self, shape: RawShape) -> &mut Self {
        self.shapes.push(shape);
        self
    }

    /// Adds a label.
    pub fn add_label(&mut self, label: Label) -> &mut Self {
        self.labels.push(label);
        self
    }

    /// Parses a drawing from loader JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
