//! Optional per-decision JSON traces for offline inspection.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;

use crate::{controller::DecisionSummary, state::TurnState};

#[derive(Clone, Debug)]
pub struct TraceConfig {
    /// Write every `interval`-th decision; 0 disables tracing.
    pub interval: u64,
    pub output_dir: PathBuf,
}

impl TraceConfig {
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            interval: 1,
            output_dir: PathBuf::from("traces"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("trace encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct TraceRecord<'a> {
    decision: &'a DecisionSummary,
    state: &'a TurnState,
}

pub struct TraceWriter {
    config: TraceConfig,
}

impl TraceWriter {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    pub fn maybe_write(
        &self,
        state: &TurnState,
        decision: &DecisionSummary,
    ) -> Result<Option<PathBuf>, TraceError> {
        if self.config.interval == 0 || decision.turn % self.config.interval != 0 {
            return Ok(None);
        }

        fs::create_dir_all(&self.config.output_dir)?;
        let file_path = self
            .config
            .output_dir
            .join(format!("turn_{:04}.json", decision.turn));
        let json = serde_json::to_string_pretty(&TraceRecord { decision, state })?;
        fs::write(&file_path, json)?;
        Ok(Some(file_path))
    }
}
