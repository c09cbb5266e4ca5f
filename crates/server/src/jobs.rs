use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed { transactions: usize },
    Failed { reason: String },
}

/// Asynchronous callers poll job state through this store. All calls are
/// fire-and-forget from the pipeline's point of view: a tracker hiccup must
/// never fail a conversion.
pub trait JobTracker: Send + Sync {
    fn mark_processing(&self, id: Uuid);
    fn mark_completed(&self, id: Uuid, transactions: usize);
    fn mark_failed(&self, id: Uuid, reason: &str);
}

#[derive(Default)]
pub struct InMemoryJobs {
    states: Mutex<HashMap<Uuid, JobState>>,
}

impl InMemoryJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: Uuid) -> Option<JobState> {
        self.states.lock().ok().and_then(|s| s.get(&id).cloned())
    }

    fn set(&self, id: Uuid, state: JobState) {
        if let Ok(mut states) = self.states.lock() {
            states.insert(id, state);
        }
    }
}

impl JobTracker for InMemoryJobs {
    fn mark_processing(&self, id: Uuid) {
        tracing::debug!(%id, "job processing");
        self.set(id, JobState::Processing);
    }

    fn mark_completed(&self, id: Uuid, transactions: usize) {
        tracing::debug!(%id, transactions, "job completed");
        self.set(id, JobState::Completed { transactions });
    }

    fn mark_failed(&self, id: Uuid, reason: &str) {
        tracing::debug!(%id, reason, "job failed");
        self.set(id, JobState::Failed { reason: reason.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions_recorded() {
        let jobs = InMemoryJobs::new();
        let id = Uuid::new_v4();
        assert_eq!(jobs.state(id), None);

        jobs.mark_processing(id);
        assert_eq!(jobs.state(id), Some(JobState::Processing));

        jobs.mark_completed(id, 12);
        assert_eq!(jobs.state(id), Some(JobState::Completed { transactions: 12 }));
    }

    #[test]
    fn failure_keeps_reason() {
        let jobs = InMemoryJobs::new();
        let id = Uuid::new_v4();
        jobs.mark_failed(id, "no transactions found");
        assert_eq!(
            jobs.state(id),
            Some(JobState::Failed { reason: "no transactions found".to_string() })
        );
    }
}
