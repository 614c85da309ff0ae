//! Formwork synthesis pipeline.
//!
//! A run resolves the selection into host volumes, classifies which hosts
//! touch each other, extrudes panels from the host faces and tags them with
//! level, grid and area metadata:
//!
//! ```text
//! selection ─► resolve_hosts ─► classify ─► synthesize ─► tag ─► PipelineOutput
//! ```
//!
//! Each phase reports [`Progress`] after every item. Returning
//! `ControlFlow::Break` from the callback ends the run early; the panels
//! produced so far are returned with [`PipelineOutput::cancelled`] set.

pub mod algebra;
pub mod face_filter;
pub mod host;
pub mod panel;
pub mod tagger;

use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;

use tracing::info;

use crate::config::FormworkConfig;
use crate::error::Result;
use crate::kernel::SolidKernel;
use crate::model::{ElementId, ModelProvider};

pub use algebra::{classify, difference, is_intersecting, union_all, Contact};
pub use face_filter::FaceFilter;
pub use host::{resolve_hosts, HostArena, HostId, HostVolume};
pub use panel::{Panel, PanelParameter, PanelSynthesizer, ParameterValue};
pub use tagger::{front_area, HostTags, SpatialTagger};

/// Pipeline phase reported through [`Progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Classify,
    Synthesize,
    Tag,
}

/// Progress of the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    /// Items finished so far in this phase, starting at 1.
    pub done: usize,
    pub total: usize,
}

/// A recoverable per-host failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub host: ElementId,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host {}: {}", self.host, self.message)
    }
}

/// Result of a pipeline run.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub panels: Vec<Panel>,
    pub diagnostics: Vec<Diagnostic>,
    /// Sum of the rounded metric panel areas.
    pub total_area_m2: f64,
    /// Set when the progress callback stopped the run. Panels of an
    /// interrupted synthesis phase are untagged.
    pub cancelled: bool,
}

/// Runs formwork synthesis over `selection`.
///
/// # Errors
///
/// Fails only on run-level problems: an empty selection or a selected id
/// unknown to the model. Per-face and per-host failures end up in
/// [`PipelineOutput::diagnostics`].
pub fn run_pipeline<M, K, F>(
    model: &M,
    kernel: &K,
    selection: &[ElementId],
    config: &FormworkConfig,
    mut progress: F,
) -> Result<PipelineOutput>
where
    M: ModelProvider + ?Sized,
    K: SolidKernel + ?Sized,
    F: FnMut(Progress) -> ControlFlow<()>,
{
    let mut arena = resolve_hosts(model, kernel, selection)?;
    info!(selected = selection.len(), hosts = arena.len(), "hosts resolved");

    let mut output = PipelineOutput::default();

    let total = arena.len();
    let flow = arena.classify(kernel, &config.classification, |done| {
        progress(Progress {
            phase: Phase::Classify,
            done,
            total,
        })
    });
    if flow.is_break() {
        output.cancelled = true;
        return Ok(output);
    }

    let synthesizer = PanelSynthesizer::from_config(kernel, config);
    for (i, (id, host)) in arena.iter().enumerate() {
        let obstruction = arena.obstruction(id, kernel);
        output.panels.extend(synthesizer.synthesize(
            id,
            host,
            obstruction.as_ref(),
            &config.categories,
            &mut output.diagnostics,
        ));
        let step = progress(Progress {
            phase: Phase::Synthesize,
            done: i + 1,
            total,
        });
        if step.is_break() {
            output.cancelled = true;
            return Ok(output);
        }
    }

    let tagger = SpatialTagger::from_config(model, config);
    let mut tags: HashMap<HostId, HostTags> = HashMap::new();
    let total = output.panels.len();
    for (i, panel) in output.panels.iter_mut().enumerate() {
        let Some(host) = arena.get(panel.host()) else {
            continue;
        };
        let host_tags = tags
            .entry(panel.host())
            .or_insert_with(|| tagger.host_tags(host));
        tagger.tag(panel, host_tags);
        output.total_area_m2 += panel.area_m2();
        let step = progress(Progress {
            phase: Phase::Tag,
            done: i + 1,
            total,
        });
        if step.is_break() {
            output.cancelled = true;
            break;
        }
    }

    info!(
        panels = output.panels.len(),
        area_m2 = output.total_area_m2,
        diagnostics = output.diagnostics.len(),
        cancelled = output.cancelled,
        "formwork synthesized"
    );
    Ok(output)
}
