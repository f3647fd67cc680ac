//! Turns raw loader shells into simple, oriented polygons.

use diagnostics::{IssueSet, Severity};
use geometry::curve::flatten_cubic;
use geometry::prelude::*;
use geometry::snap::quantize;
use tracing::{span, Level};

use crate::config::Config;
use crate::drawing::{Drawing, PathSegment, RawShape, RawShell};
use crate::issues::{Cause, Issue};
use crate::shape::{Shape, ShapeRef, ShapeStatus};

/// The output of validation.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    /// Every validated shape, defective ones included and tagged.
    pub shapes: Vec<Shape>,
    /// Number of drawn shapes that failed validation.
    pub skipped: usize,
}

impl Validated {
    /// Iterates over the shapes that passed validation.
    pub fn valid(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_valid())
    }
}

/// Validates every shape in the drawing.
///
/// Defects are recorded in `issues` and the offending shape is tagged
/// [`ShapeStatus::Defective`]; validation never stops early.
pub fn validate(drawing: &Drawing, config: &Config, issues: &mut IssueSet<Issue>) -> Validated {
    let span = span!(Level::INFO, "validate", shapes = drawing.shapes.len());
    let _guard = span.enter();

    let mut out = Validated::default();
    for (index, raw) in drawing.shapes.iter().enumerate() {
        let origin = ShapeRef {
            index,
            source: raw.source.clone(),
            layer: raw.layer,
        };
        match validate_shape(raw, &origin, config, issues) {
            Ok(polygons) => out.shapes.extend(polygons.into_iter().map(|polygon| Shape {
                origin: origin.clone(),
                polygon,
                label: raw.label.clone(),
                status: ShapeStatus::Valid,
            })),
            Err(polygon) => {
                out.skipped += 1;
                out.shapes.push(Shape {
                    origin,
                    polygon,
                    label: raw.label.clone(),
                    status: ShapeStatus::Defective,
                });
            }
        }
    }

    if out.skipped > 0 {
        issues.add(Issue::new_and_log(
            Cause::SkippedShapes { count: out.skipped },
            Severity::Info,
        ));
    }
    tracing::info!(
        valid = out.shapes.len() - out.skipped,
        skipped = out.skipped,
        "validation finished"
    );
    out
}

/// Validates one raw shape.
///
/// On failure, returns whatever geometry could be recovered so the defect
/// can still be located.
fn validate_shape(
    raw: &RawShape,
    origin: &ShapeRef,
    config: &Config,
    issues: &mut IssueSet<Issue>,
) -> Result<Vec<Polygon>, Polygon> {
    if raw.shells.is_empty() {
        issues.add(Issue::new_and_log(
            Cause::EmptyShape {
                shape: origin.clone(),
            },
            Severity::Error,
        ));
        return Err(Polygon::default());
    }

    let mut rings = Vec::with_capacity(raw.shells.len());
    let mut defective = false;
    for shell in raw.shells.iter() {
        let ring = flatten_shell(shell, config);
        if ring.len() < 3 || ring.signed_area2() == 0 {
            issues.add(Issue::new_and_log(
                Cause::DegenerateShell {
                    shape: origin.clone(),
                },
                Severity::Error,
            ));
            defective = true;
            continue;
        }
        if let Some(at) = ring.self_crossing() {
            issues.add(Issue::new_and_log(
                Cause::SelfCrossing {
                    shape: origin.clone(),
                    at,
                },
                Severity::Error,
            ));
            defective = true;
        }
        rings.push(ring);
    }

    if defective || rings.is_empty() {
        let fallback = rings
            .into_iter()
            .next()
            .map(|r| Polygon::with_holes(r, Vec::new()))
            .unwrap_or_default();
        return Err(fallback);
    }

    let polygons = assemble(rings);
    for polygon in polygons.iter() {
        if let Some(at) = polygon.self_crossing() {
            issues.add(Issue::new_and_log(
                Cause::SelfCrossing {
                    shape: origin.clone(),
                    at,
                },
                Severity::Error,
            ));
            return Err(polygon.clone());
        }
    }
    Ok(polygons)
}

/// Quantizes a shell onto the grid, flattening curves.
pub(crate) fn flatten_shell(shell: &RawShell, config: &Config) -> Ring {
    let q = |p: [f64; 2]| quantize(p[0], p[1], config.resolution);
    let mut points = vec![q(shell.start)];
    let mut prev = shell.start;
    for segment in shell.segments.iter() {
        match *segment {
            PathSegment::Line { to } => points.push(q(to)),
            PathSegment::Cubic { c1, c2, to } => {
                let ctrl = [
                    (prev[0], prev[1]),
                    (c1[0], c1[1]),
                    (c2[0], c2[1]),
                    (to[0], to[1]),
                ];
                points.extend(
                    flatten_cubic(ctrl, config.curve_segments)
                        .into_iter()
                        .map(|(x, y)| q([x, y])),
                );
            }
        }
        prev = segment.end();
    }
    Ring::new(points)
}

/// Sorts shells into outer boundaries and holes, then normalizes orientation.
///
/// Shells are taken largest first. A shell lying inside an outer boundary
/// (and not inside one of its holes) becomes a hole of the smallest such
/// boundary; any other shell starts a new polygon.
pub(crate) fn assemble(mut rings: Vec<Ring>) -> Vec<Polygon> {
    rings.sort_by(|a, b| {
        b.signed_area2()
            .abs()
            .cmp(&a.signed_area2().abs())
            .then_with(|| a.cmp(b))
    });

    let mut polygons: Vec<Polygon> = Vec::new();
    for ring in rings {
        let sample = ring.points()[0];
        match polygons
            .iter_mut()
            .rev()
            .find(|p| p.locate(sample) == Location::Inside)
        {
            Some(parent) => parent.push_hole(ring),
            None => polygons.push(Polygon::with_holes(ring, Vec::new())),
        }
    }
    polygons.into_iter().map(Polygon::orient).collect()
}
