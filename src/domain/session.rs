//! Per-user session context.
//!
//! A `Session` owns one user's deposits and goals. Entries get a stable id at
//! creation and are removed by id, never by display position. Each successful
//! mutation bumps the revision, captures an immutable snapshot and runs one
//! recompute pass against it; `view()` always pairs a result with the snapshot
//! it was computed from.

use crate::domain::coordinator::{Recompute, RecomputeCoordinator};
use crate::domain::deposit::{DepositId, DepositInput, DepositRecord};
use crate::domain::error::SavecastError;
use crate::domain::forecast::{ForecastModel, ForecastPoint};
use crate::domain::goal::{Goal, GoalId, GoalInput, GoalStatus};
use std::sync::Arc;
use tracing::debug;

/// Immutable copy of a session's inputs at one revision.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    revision: u64,
    deposits: Arc<[(DepositId, DepositRecord)]>,
    goals: Arc<[(GoalId, Goal)]>,
}

impl SessionSnapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn deposits(&self) -> &[(DepositId, DepositRecord)] {
        &self.deposits
    }

    pub fn goals(&self) -> &[(GoalId, Goal)] {
        &self.goals
    }

    pub fn records(&self) -> Vec<DepositRecord> {
        self.deposits.iter().map(|(_, r)| *r).collect()
    }

    pub fn goal_list(&self) -> Vec<Goal> {
        self.goals.iter().map(|(_, g)| g.clone()).collect()
    }

    fn goal_index(&self, id: GoalId) -> Option<usize> {
        self.goals.iter().position(|(gid, _)| *gid == id)
    }
}

/// What presentation renders: a recompute result and the snapshot behind it.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub snapshot: SessionSnapshot,
    pub result: Recompute,
}

impl Dashboard {
    pub fn revision(&self) -> u64 {
        self.snapshot.revision()
    }

    pub fn forecast(&self) -> &[ForecastPoint] {
        self.result.forecast_points()
    }

    pub fn status_of(&self, id: GoalId) -> Option<GoalStatus> {
        let index = self.snapshot.goal_index(id)?;
        self.result.statuses.get(&index).copied()
    }

    /// Goals with their ids and statuses, in snapshot order.
    pub fn goal_rows(&self) -> impl Iterator<Item = (GoalId, &Goal, GoalStatus)> + '_ {
        self.snapshot.goals().iter().enumerate().map(|(i, (id, goal))| {
            let status = self
                .result
                .statuses
                .get(&i)
                .copied()
                .unwrap_or(GoalStatus::Pending);
            (*id, goal, status)
        })
    }
}

#[derive(Debug)]
pub struct Session {
    deposits: Vec<(DepositId, DepositRecord)>,
    goals: Vec<(GoalId, Goal)>,
    next_deposit_id: u64,
    next_goal_id: u64,
    revision: u64,
    coordinator: RecomputeCoordinator,
    view: Dashboard,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ForecastModel::default())
    }
}

impl Session {
    pub fn new(model: ForecastModel) -> Self {
        let mut coordinator = RecomputeCoordinator::new(model);
        let snapshot = SessionSnapshot {
            revision: 0,
            deposits: Arc::from(Vec::new()),
            goals: Arc::from(Vec::new()),
        };
        let result = coordinator.on_data_changed(&[], &[]);
        Self {
            deposits: Vec::new(),
            goals: Vec::new(),
            next_deposit_id: 1,
            next_goal_id: 1,
            revision: 0,
            coordinator,
            view: Dashboard { snapshot, result },
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn view(&self) -> &Dashboard {
        &self.view
    }

    pub fn coordinator(&self) -> &RecomputeCoordinator {
        &self.coordinator
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            revision: self.revision,
            deposits: Arc::from(self.deposits.as_slice()),
            goals: Arc::from(self.goals.as_slice()),
        }
    }

    pub fn add_deposit(&mut self, input: &DepositInput) -> Result<DepositId, SavecastError> {
        let record = DepositRecord::try_from(input)?;
        let id = self.push_deposit(record);
        self.commit();
        Ok(id)
    }

    pub fn remove_deposit(&mut self, id: DepositId) -> bool {
        let before = self.deposits.len();
        self.deposits.retain(|(did, _)| *did != id);
        let removed = self.deposits.len() != before;
        if removed {
            self.commit();
        }
        removed
    }

    pub fn add_goal(&mut self, input: &GoalInput) -> Result<GoalId, SavecastError> {
        let goal = Goal::try_from(input)?;
        let id = self.push_goal(goal);
        self.commit();
        Ok(id)
    }

    pub fn remove_goal(&mut self, id: GoalId) -> bool {
        let before = self.goals.len();
        self.goals.retain(|(gid, _)| *gid != id);
        let removed = self.goals.len() != before;
        if removed {
            self.commit();
        }
        removed
    }

    pub fn reset_deposits(&mut self) {
        self.deposits.clear();
        self.commit();
    }

    pub fn reset_goals(&mut self) {
        self.goals.clear();
        self.commit();
    }

    /// Adds a batch in one pass. Nothing is applied if any entry is invalid.
    pub fn import(
        &mut self,
        deposits: &[DepositInput],
        goals: &[GoalInput],
    ) -> Result<(Vec<DepositId>, Vec<GoalId>), SavecastError> {
        let records = deposits
            .iter()
            .map(DepositRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let parsed_goals = goals
            .iter()
            .map(Goal::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let deposit_ids: Vec<DepositId> = records
            .into_iter()
            .map(|r| self.push_deposit(r))
            .collect();
        let goal_ids: Vec<GoalId> = parsed_goals
            .into_iter()
            .map(|g| self.push_goal(g))
            .collect();
        self.commit();
        Ok((deposit_ids, goal_ids))
    }

    fn push_deposit(&mut self, record: DepositRecord) -> DepositId {
        let id = DepositId(self.next_deposit_id);
        self.next_deposit_id += 1;
        self.deposits.push((id, record));
        id
    }

    fn push_goal(&mut self, goal: Goal) -> GoalId {
        let id = GoalId(self.next_goal_id);
        self.next_goal_id += 1;
        self.goals.push((id, goal));
        id
    }

    fn commit(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        let result = self
            .coordinator
            .on_data_changed(&snapshot.records(), &snapshot.goal_list());
        debug!(revision = self.revision, "session view refreshed");
        self.view = Dashboard { snapshot, result };
    }
}
