//! Generation workflow: validate, request a report, derive the memory graph.
//!
//! The workflow owns the generation result. It never awaits anything itself:
//! `submit` hands back a snapshot for the caller to dispatch, and the caller
//! feeds the backend's answer to `complete`.

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::diagram::{generate, DiagramSource};
use crate::models::{FormError, FormInputs, FormState};
use crate::report::ReportError;

/// Where the workflow is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationPhase {
    #[default]
    Idle,
    Generating,
    Success,
    Failure,
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a report is already being generated")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] FormError),
}

/// An accepted submission: the snapshot to send to the report backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub inputs: FormInputs,
}

/// Outputs shown by the report and graph panels.
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    pub report_text: Option<String>,
    pub diagram_source: Option<DiagramSource>,
    pub is_loading: bool,
    pub is_error: bool,
    /// When the current report arrived.
    pub completed_at: Option<DateTime<Local>>,
    /// Detail of the last failure, for the status line.
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct GenerationWorkflow {
    result: GenerationResult,
    phase: GenerationPhase,
    next_id: u64,
    /// In-flight submission: its id and the snapshot it was taken from.
    pending: Option<Submission>,
}

impl GenerationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.result.is_loading
    }

    /// Id of the submission currently awaiting completion.
    #[cfg(test)]
    pub fn pending_id(&self) -> Option<u64> {
        self.pending.as_ref().map(|s| s.id)
    }

    /// Start a generation cycle from the current form.
    ///
    /// Refused while a cycle is in flight or when the form is incomplete; the
    /// result is untouched in both cases. Prior outputs stay visible until the
    /// new cycle completes.
    pub fn submit(&mut self, form: &FormState) -> Result<Submission, SubmitError> {
        if self.result.is_loading {
            return Err(SubmitError::Busy);
        }
        form.validate()?;

        self.next_id += 1;
        let submission = Submission {
            id: self.next_id,
            inputs: form.snapshot(),
        };
        self.result.is_loading = true;
        self.result.is_error = false;
        self.phase = GenerationPhase::Generating;
        self.pending = Some(submission.clone());
        tracing::info!(
            id = submission.id,
            location = %submission.inputs.location,
            source = %submission.inputs.water_source,
            "report submitted"
        );
        Ok(submission)
    }

    /// Apply a backend answer. Returns `false` if the id is not in flight.
    pub fn complete(&mut self, id: u64, outcome: Result<String, ReportError>) -> bool {
        let submission = match self.pending.take() {
            Some(s) if s.id == id => s,
            other => {
                self.pending = other;
                tracing::debug!(id, "dropping stale report completion");
                return false;
            }
        };

        match outcome {
            Ok(text) => {
                let inputs = &submission.inputs;
                self.result.report_text = Some(text);
                self.result.diagram_source = Some(generate(
                    &inputs.location,
                    inputs.water_source,
                    &inputs.concerns,
                ));
                self.result.completed_at = Some(Local::now());
                self.result.last_error = None;
                self.phase = GenerationPhase::Success;
                tracing::info!(id, "report ready");
            }
            Err(e) => {
                self.result.is_error = true;
                self.result.last_error = Some(e.to_string());
                self.phase = GenerationPhase::Failure;
                tracing::warn!(id, error = %e, "report generation failed");
            }
        }
        self.result.is_loading = false;
        true
    }
}
