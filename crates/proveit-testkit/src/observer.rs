//! Observer that records every stage transition

use proveit_core::{ProofObserver, ProofStage};
use std::sync::{Arc, Mutex};

/// Captures stage transitions for assertions
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    stages: Arc<Mutex<Vec<ProofStage>>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded stages, in arrival order
    pub fn stages(&self) -> Vec<ProofStage> {
        self.stages.lock().unwrap().clone()
    }

    /// Token ids that passed the per-item check, in arrival order
    pub fn checked_tokens(&self) -> Vec<u64> {
        self.stages()
            .into_iter()
            .filter_map(|stage| match stage {
                ProofStage::PerItemChecked(id, _) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Last recorded stage
    pub fn last(&self) -> Option<ProofStage> {
        self.stages.lock().unwrap().last().cloned()
    }
}

impl ProofObserver for RecordingObserver {
    fn on_stage(&self, stage: &ProofStage) {
        self.stages.lock().unwrap().push(stage.clone());
    }
}
