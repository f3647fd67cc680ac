//! Transistors found at polysilicon/diffusion crossings.

use std::collections::BTreeSet;

use arcstr::ArcStr;
use diagnostics::{IssueSet, Severity};
use geometry::prelude::*;
use geometry::snap::quantize;
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

use crate::config::Config;
use crate::diffusion::Diffusion;
use crate::drawing::{Label, LabelKind};
use crate::issues::{Cause, Issue};
use crate::nets::{Connectivity, NetId};

/// An NMOS transistor.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transistor {
    /// The label name, or a synthetic `q<n>`.
    pub name: ArcStr,
    /// The net driving the gate.
    pub gate: NetId,
    /// The net of each diffusion piece beside the gate, ascending.
    ///
    /// Two pieces on the same net give that net twice. Electrode order
    /// carries no meaning.
    pub electrodes: Vec<NetId>,
    /// The gate region.
    pub region: Polygon,
    /// Whether the gate splits its diffusion into exactly two pieces.
    pub complete: bool,
    /// A representative location, for diagnostics.
    pub at: Point,
}

impl Transistor {
    /// Returns `true` if `net` is one of the electrodes.
    #[inline]
    pub fn touches(&self, net: NetId) -> bool {
        self.electrodes.contains(&net)
    }

    /// The electrode pair of a complete transistor.
    pub fn ends(&self) -> Option<[NetId; 2]> {
        match self.electrodes.as_slice() {
            [a, b] if self.complete => Some([*a, *b]),
            _ => None,
        }
    }
}

/// Creates one transistor per gate site.
///
/// Transistors are ordered by the geometry of their gate regions.
pub fn extract_transistors(
    diffusion: &Diffusion,
    connectivity: &Connectivity,
    labels: &[Label],
    config: &Config,
    issues: &mut IssueSet<Issue>,
) -> Vec<Transistor> {
    let span = span!(Level::INFO, "extract transistors", sites = diffusion.sites.len());
    let _guard = span.enter();

    let mut found: Vec<Site<'_>> = Vec::with_capacity(diffusion.sites.len());
    for site in diffusion.sites.iter() {
        let Some(gate) = site
            .poly
            .iter()
            .find_map(|&p| connectivity.net_of_shape(p))
        else {
            continue;
        };
        let mut electrodes: Vec<NetId> = site
            .electrodes
            .iter()
            .filter_map(|&e| connectivity.net_of_piece(e))
            .collect();
        electrodes.sort_unstable();
        let complete = site.electrodes.len() == 2 && electrodes.len() == 2;
        found.push(Site {
            gate,
            electrodes,
            pieces: site.electrodes.len(),
            complete,
            region: &site.region,
        });
    }
    found.sort_by(|a, b| region_key(a.region).cmp(&region_key(b.region)));

    let names = assign_names(&found, labels, config, issues);

    let transistors: Vec<Transistor> = found
        .into_iter()
        .zip(names)
        .map(|(site, name)| {
            let at = site.region.bbox().map(|r| r.center()).unwrap_or_default();
            if !site.complete {
                issues.add(Issue::new_and_log(
                    Cause::IncompleteTransistor {
                        transistor: name.clone(),
                        electrodes: site.pieces,
                        at,
                    },
                    Severity::Error,
                ));
            }
            Transistor {
                name,
                gate: site.gate,
                electrodes: site.electrodes,
                region: site.region.clone(),
                complete: site.complete,
                at,
            }
        })
        .collect();

    log_area_stats(&transistors, config);
    tracing::info!(
        transistors = transistors.len(),
        incomplete = transistors.iter().filter(|t| !t.complete).count(),
        "transistors extracted"
    );
    transistors
}

/// A gate site resolved to nets.
struct Site<'a> {
    gate: NetId,
    electrodes: Vec<NetId>,
    /// Diffusion pieces beside the gate.
    pieces: usize,
    complete: bool,
    region: &'a Polygon,
}

fn region_key(region: &Polygon) -> (Option<Point>, Option<Rect>, i128) {
    (region.min_point(), region.bbox(), region.area2())
}

/// Names each site from the transistor labels over it, falling back to
/// synthetic names that do not collide with any label.
fn assign_names(
    sites: &[Site<'_>],
    labels: &[Label],
    config: &Config,
    issues: &mut IssueSet<Issue>,
) -> Vec<ArcStr> {
    let mut names: Vec<Option<ArcStr>> = vec![None; sites.len()];
    let mut used: BTreeSet<ArcStr> = BTreeSet::new();

    for label in labels.iter().filter(|l| l.kind == LabelKind::Transistor) {
        let [l, b, r, t] = label.extents;
        let rect = Rect::new(
            quantize(l, b, config.resolution),
            quantize(r, t, config.resolution),
        );
        let area = Polygon::from_rect(rect);
        let at = rect.center();
        let hit = sites
            .iter()
            .enumerate()
            .find(|(i, site)| names[*i].is_none() && site.region.overlaps(&area));
        match hit {
            None => issues.add(Issue::new_and_log(
                Cause::UnattachedTransistorLabel {
                    text: label.text.clone(),
                    at,
                },
                Severity::Warning,
            )),
            Some(_) if used.contains(&label.text) => issues.add(Issue::new_and_log(
                Cause::DuplicateTransistorName {
                    name: label.text.clone(),
                    at,
                },
                Severity::Warning,
            )),
            Some((i, _)) => {
                used.insert(label.text.clone());
                names[i] = Some(label.text.clone());
            }
        }
    }

    let mut next = 0usize;
    names
        .into_iter()
        .map(|name| {
            name.unwrap_or_else(|| loop {
                let candidate = arcstr::format!("q{next}");
                next += 1;
                if !used.contains(&candidate) {
                    break candidate;
                }
            })
        })
        .collect()
}

/// Logs gate area statistics in square drawing units.
fn log_area_stats(transistors: &[Transistor], config: &Config) {
    if transistors.is_empty() {
        return;
    }
    let scale = config.resolution * config.resolution;
    let mut areas: Vec<f64> = transistors
        .iter()
        .map(|t| t.region.area() / scale)
        .collect();
    areas.sort_by(f64::total_cmp);
    let n = areas.len() as f64;
    let mean = areas.iter().sum::<f64>() / n;
    let mid = areas.len() / 2;
    let median = if areas.len() % 2 == 0 {
        (areas[mid - 1] + areas[mid]) / 2.0
    } else {
        areas[mid]
    };
    let stddev = (areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n).sqrt();
    tracing::debug!(
        mean,
        median,
        min = areas[0],
        max = areas[areas.len() - 1],
        stddev,
        "gate areas"
    );
}
