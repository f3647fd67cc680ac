//! Validated shapes.

use std::fmt::Display;

use arcstr::ArcStr;
use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::drawing::Layer;
use crate::index::Indexed;

/// Whether a shape survived validation.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShapeStatus {
    /// Simple, oriented, and usable downstream.
    Valid,
    /// Failed validation; skipped by every later stage.
    Defective,
}

/// Identifies the drawn shape a record came from, for diagnostics.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ShapeRef {
    /// Position of the shape in the loader's shape list.
    pub index: usize,
    /// The loader's identifier, if it gave one.
    pub source: Option<ArcStr>,
    /// The layer of the shape.
    pub layer: Layer,
}

impl Display for ShapeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{} shape `{}`", self.layer, source),
            None => write!(f, "{} shape #{}", self.layer, self.index),
        }
    }
}

/// A validated shape: one outer shell with its holes, on one layer.
///
/// A raw shape with several disjoint outer shells becomes several
/// [`Shape`]s sharing the same [`ShapeRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    /// The drawn shape this came from.
    pub origin: ShapeRef,
    /// Outer ring counter-clockwise, holes clockwise.
    pub polygon: Polygon,
    /// Signal name attached to the drawn shape.
    pub label: Option<ArcStr>,
    /// Validation result.
    pub status: ShapeStatus,
}

impl Shape {
    /// The layer of the shape.
    #[inline]
    pub fn layer(&self) -> Layer {
        self.origin.layer
    }

    /// Returns `true` if the shape passed validation.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.status == ShapeStatus::Valid
    }
}

impl Indexed for Shape {
    fn layer(&self) -> Layer {
        self.origin.layer
    }

    fn polygon(&self) -> &Polygon {
        &self.polygon
    }
}
