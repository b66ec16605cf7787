use serde::{Deserialize, Serialize};

use crate::telemetry::counters::StageCounters;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub id: usize,
    pub kind: String,
    pub next: Option<usize>,
    pub counters: StageCounters,
}

/// Immutable copy of every live stage's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub stages: Vec<StageSnapshot>,
}

impl ChainSnapshot {
    pub fn stage(&self, id: usize) -> Option<&StageSnapshot> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn totals(&self) -> StageCounters {
        let mut total = StageCounters::default();
        for s in &self.stages {
            total.merge(&s.counters);
        }
        total
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
