//! Per-job workability state machine.
//!
//! A job is Idle (`was_workable = false`) or Active (`was_workable = true`
//! since `last_change_block`). A job that stays Active for at least
//! `threshold` blocks means nobody is working it, and every observation past
//! that point raises an alert until the job is worked.

use serde::Serialize;
use tracing::debug;

use keepwatch_core::{Job, JobState};

use crate::error::MonitorError;
use crate::state::JobStateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Idle -> Active; `last_change_block` moves to the current block.
    BecameWorkable,
    StillWorkable,
    /// Active -> Idle; `last_change_block` moves to the current block.
    BecameIdle,
    StillIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub state: JobState,
    pub transition: Transition,
    /// Blocks since the last change, as of this observation.
    pub blocks_inactive: u64,
    pub alert: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct JobStateTracker {
    threshold: u64,
}

impl JobStateTracker {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Apply one observation to `prior`.
    ///
    /// Rules run in a fixed order: Idle -> Active first, then the alert test
    /// against the updated state, then Active -> Idle.
    pub fn evaluate(&self, prior: JobState, can_work: bool, block: u64) -> Evaluation {
        let mut state = prior;
        let mut transition = if prior.was_workable {
            Transition::StillWorkable
        } else {
            Transition::StillIdle
        };

        if can_work && !state.was_workable {
            state.last_change_block = block;
            state.was_workable = true;
            transition = Transition::BecameWorkable;
        }

        let blocks_inactive = block.saturating_sub(state.last_change_block);
        let alert = can_work && state.was_workable && blocks_inactive >= self.threshold;

        if !can_work && state.was_workable {
            state.was_workable = false;
            state.last_change_block = block;
            transition = Transition::BecameIdle;
        }

        Evaluation {
            state,
            transition,
            blocks_inactive,
            alert,
        }
    }

    /// Load the job's state, evaluate `job.can_work` at `block`, and persist
    /// the result whether or not it changed.
    pub async fn observe(
        &self,
        store: &dyn JobStateStore,
        job: &Job,
        block: u64,
    ) -> Result<Evaluation, MonitorError> {
        let key = job.key();
        let prior = store.load_or_init(&key, block).await?;
        let evaluation = self.evaluate(prior, job.can_work, block);
        store.save(&key, evaluation.state).await?;

        debug!(
            job = %job.address,
            network = %job.network.label(),
            block,
            transition = ?evaluation.transition,
            last_change_block = evaluation.state.last_change_block,
            alert = evaluation.alert,
            "Observed job"
        );
        Ok(evaluation)
    }
}
