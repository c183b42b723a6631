// Analysis pipeline: cache lookup, the four-stage agent chain, score
// aggregation, and report assembly. All model calls go through llm_client.

pub mod chain;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod scoring;
pub mod stages;

use std::time::Duration;

use thiserror::Error;

use crate::analysis::stages::Stage;
use crate::intake::IntakeError;
use crate::llm_client::LlmError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("{stage} stage provider call failed: {source}")]
    Provider {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    #[error("{stage} stage returned unparsable output: {reason}")]
    StageParse { stage: Stage, reason: String },

    #[error("Analysis exceeded the {}s time budget", .0.as_secs())]
    Timeout(Duration),

    #[error("Analysis was cancelled")]
    Cancelled,
}
