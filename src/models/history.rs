use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prediction::{PredictionStatus, PredictionTask, TaskError};
use crate::domain::{ModelId, Payload, TaskId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error(transparent)]
    Task(#[from] TaskError),
}

/// How [`PredictionHistory::get_user_history`] interprets its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserHistoryMode {
    /// Every task is returned whatever user id is asked for.
    #[default]
    Unfiltered,
    /// Only tasks attributed to the user via `with_submitter`.
    BySubmitter,
}

/// Append-only, insertion-ordered log of prediction tasks.
///
/// Task ids are not checked for uniqueness; lookups by id return the first
/// task added with that id.
#[derive(Debug, Clone, Default)]
pub struct PredictionHistory {
    tasks: Vec<PredictionTask>,
    mode: UserHistoryMode,
}

impl PredictionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_mode(mode: UserHistoryMode) -> Self {
        Self {
            tasks: Vec::new(),
            mode,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> UserHistoryMode {
        self.mode
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionTask> {
        self.tasks.iter()
    }

    pub fn add_task(&mut self, task: PredictionTask) {
        self.tasks.push(task);
    }

    #[must_use]
    pub fn get_user_history(&self, user_id: &UserId) -> Vec<&PredictionTask> {
        match self.mode {
            UserHistoryMode::Unfiltered => self.tasks.iter().collect(),
            UserHistoryMode::BySubmitter => self
                .tasks
                .iter()
                .filter(|t| t.submitted_by() == Some(user_id))
                .collect(),
        }
    }

    #[must_use]
    pub fn get_model_history(&self, model_id: &ModelId) -> Vec<&PredictionTask> {
        self.tasks
            .iter()
            .filter(|t| t.model_id() == model_id)
            .collect()
    }

    #[must_use]
    pub fn get_task_by_id(&self, task_id: &TaskId) -> Option<&PredictionTask> {
        self.tasks.iter().find(|t| t.task_id() == task_id)
    }

    #[must_use]
    pub fn pending_tasks(&self) -> Vec<&PredictionTask> {
        self.tasks
            .iter()
            .filter(|t| t.status() == PredictionStatus::Pending)
            .collect()
    }

    /// Completes the first task with `task_id`.
    ///
    /// # Errors
    ///
    /// - [`HistoryError::TaskNotFound`] if no task has that id
    /// - [`HistoryError::Task`] if the task already has an outcome
    pub fn complete_task(&mut self, task_id: &TaskId, result: Payload) -> Result<(), HistoryError> {
        self.task_mut(task_id)?.try_complete(result)?;
        Ok(())
    }

    /// Fails the first task with `task_id`.
    ///
    /// # Errors
    ///
    /// - [`HistoryError::TaskNotFound`] if no task has that id
    /// - [`HistoryError::Task`] if the task already has an outcome
    pub fn fail_task(
        &mut self,
        task_id: &TaskId,
        error: impl Into<String>,
    ) -> Result<(), HistoryError> {
        self.task_mut(task_id)?.try_fail(error)?;
        Ok(())
    }

    fn task_mut(&mut self, task_id: &TaskId) -> Result<&mut PredictionTask, HistoryError> {
        self.tasks
            .iter_mut()
            .find(|t| t.task_id() == task_id)
            .ok_or_else(|| HistoryError::TaskNotFound(task_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(id: &str, model: &str) -> PredictionTask {
        PredictionTask::new(id, model, Payload::new())
    }

    fn ids(tasks: &[&PredictionTask]) -> Vec<String> {
        tasks.iter().map(|t| t.task_id().to_string()).collect()
    }

    #[test]
    fn model_history_preserves_insertion_order() {
        let mut history = PredictionHistory::new();
        history.add_task(task("t1", "a"));
        history.add_task(task("t2", "b"));
        history.add_task(task("t3", "a"));
        history.add_task(task("t4", "a"));

        assert_eq!(
            ids(&history.get_model_history(&ModelId::new("a"))),
            vec!["t1", "t3", "t4"]
        );
        assert_eq!(ids(&history.get_model_history(&ModelId::new("b"))), vec!["t2"]);
        assert!(history.get_model_history(&ModelId::new("zzz")).is_empty());
    }

    #[test]
    fn task_lookup_returns_first_match() {
        let mut history = PredictionHistory::new();
        history.add_task(task("t1", "first"));
        history.add_task(task("t2", "other"));
        history.add_task(task("t1", "second"));

        let found = history.get_task_by_id(&TaskId::new("t1")).unwrap();
        assert_eq!(found.model_id().as_str(), "first");
        assert!(history.get_task_by_id(&TaskId::new("missing")).is_none());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn unfiltered_user_history_ignores_user_id() {
        let mut history = PredictionHistory::new();
        history.add_task(task("t1", "a").with_submitter("alice"));
        history.add_task(task("t2", "b"));

        let all = history.get_user_history(&UserId::new("nobody"));
        assert_eq!(ids(&all), vec!["t1", "t2"]);
    }

    #[test]
    fn by_submitter_user_history_filters() {
        let mut history = PredictionHistory::with_mode(UserHistoryMode::BySubmitter);
        history.add_task(task("t1", "a").with_submitter("alice"));
        history.add_task(task("t2", "a").with_submitter("bob"));
        history.add_task(task("t3", "b"));
        history.add_task(task("t4", "b").with_submitter("alice"));

        assert_eq!(
            ids(&history.get_user_history(&UserId::new("alice"))),
            vec!["t1", "t4"]
        );
        assert!(history.get_user_history(&UserId::new("carol")).is_empty());
    }

    #[test]
    fn complete_and_fail_through_history() {
        let mut history = PredictionHistory::new();
        history.add_task(task("t1", "a"));
        history.add_task(task("t2", "a"));

        let mut result = Payload::new();
        result.insert("prediction".to_string(), json!("x"));
        history.complete_task(&TaskId::new("t1"), result.clone()).unwrap();
        history.fail_task(&TaskId::new("t2"), "boom").unwrap();

        let t1 = history.get_task_by_id(&TaskId::new("t1")).unwrap();
        assert_eq!(t1.status(), PredictionStatus::Completed);
        assert_eq!(t1.result(), Some(&result));

        let t2 = history.get_task_by_id(&TaskId::new("t2")).unwrap();
        assert_eq!(t2.error(), Some("boom"));
        assert!(history.pending_tasks().is_empty());
    }

    #[test]
    fn transitions_report_missing_and_terminal_tasks() {
        let mut history = PredictionHistory::new();
        history.add_task(task("t1", "a"));

        assert_eq!(
            history.fail_task(&TaskId::new("nope"), "x"),
            Err(HistoryError::TaskNotFound(TaskId::new("nope")))
        );

        history.fail_task(&TaskId::new("t1"), "first").unwrap();
        assert!(matches!(
            history.complete_task(&TaskId::new("t1"), Payload::new()),
            Err(HistoryError::Task(TaskError::AlreadyTerminal { .. }))
        ));
        let t1 = history.get_task_by_id(&TaskId::new("t1")).unwrap();
        assert_eq!(t1.status(), PredictionStatus::Failed);
        assert!(t1.result().is_none());
    }
}
