//! Status reporting for queued batch jobs.
//!
//! The queue itself lives outside the engine. Anything that can report an id,
//! a state label and an outcome implements [`TaskHandle`], and
//! [`task_status`] turns it into one normalised value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only view of a job handle owned by some task queue.
pub trait TaskHandle {
    fn id(&self) -> &str;

    /// State label exactly as the queue reports it.
    fn state(&self) -> &str;

    /// Payload of a finished job.
    fn result(&self) -> Option<serde_json::Value>;

    /// Failure text of a failed job.
    fn error(&self) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Started,
    Retry,
    Success,
    Failure,
    Revoked,
}

impl TaskState {
    /// Case-insensitive; `None` for labels the engine does not know.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(TaskState::Pending),
            "STARTED" => Some(TaskState::Started),
            "RETRY" => Some(TaskState::Retry),
            "SUCCESS" => Some(TaskState::Success),
            "FAILURE" => Some(TaskState::Failure),
            "REVOKED" => Some(TaskState::Revoked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "PENDING",
            TaskState::Started => "STARTED",
            TaskState::Retry => "RETRY",
            TaskState::Success => "SUCCESS",
            TaskState::Failure => "FAILURE",
            TaskState::Revoked => "REVOKED",
        }
    }

    /// No further transitions expected.
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            TaskState::Success | TaskState::Failure | TaskState::Revoked
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: String,
    pub state: TaskState,
    /// Original label when it was not a known state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_state: Option<String>,
    pub ready: bool,
    pub successful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Normalise a job handle. Unknown state labels report as pending.
pub fn task_status(handle: &impl TaskHandle) -> TaskStatus {
    let label = handle.state();
    let (state, raw_state) = match TaskState::parse(label) {
        Some(state) => (state, None),
        None => {
            tracing::debug!(task_id = handle.id(), state = label, "unknown task state");
            (TaskState::Pending, Some(label.to_string()))
        }
    };

    let successful = state == TaskState::Success;
    TaskStatus {
        task_id: handle.id().to_string(),
        ready: state.is_ready(),
        successful,
        result: if successful { handle.result() } else { None },
        error: if state == TaskState::Failure {
            handle.error()
        } else {
            None
        },
        state,
        raw_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeJob {
        id: &'static str,
        state: &'static str,
        result: Option<serde_json::Value>,
        error: Option<String>,
    }

    impl TaskHandle for FakeJob {
        fn id(&self) -> &str {
            self.id
        }
        fn state(&self) -> &str {
            self.state
        }
        fn result(&self) -> Option<serde_json::Value> {
            self.result.clone()
        }
        fn error(&self) -> Option<String> {
            self.error.clone()
        }
    }

    fn job(state: &'static str) -> FakeJob {
        FakeJob {
            id: "job-1",
            state,
            result: Some(json!({"processed": 2, "failed": 1})),
            error: Some("worker lost".into()),
        }
    }

    #[test]
    fn test_success_carries_result() {
        let status = task_status(&job("SUCCESS"));
        assert_eq!(status.state, TaskState::Success);
        assert!(status.ready);
        assert!(status.successful);
        assert_eq!(status.result.unwrap()["processed"], 2);
        assert!(status.error.is_none());
    }

    #[test]
    fn test_failure_carries_error_only() {
        let status = task_status(&job("failure"));
        assert_eq!(status.state, TaskState::Failure);
        assert!(status.ready);
        assert!(!status.successful);
        assert!(status.result.is_none());
        assert_eq!(status.error.as_deref(), Some("worker lost"));
    }

    #[test]
    fn test_in_flight_states_are_not_ready() {
        for label in ["PENDING", "STARTED", "RETRY"] {
            let status = task_status(&job(label));
            assert!(!status.ready, "{label}");
            assert!(status.result.is_none());
        }
        assert!(task_status(&job("REVOKED")).ready);
    }

    #[test]
    fn test_unknown_label_reports_pending() {
        let status = task_status(&job("RECEIVED"));
        assert_eq!(status.state, TaskState::Pending);
        assert_eq!(status.raw_state.as_deref(), Some("RECEIVED"));
        assert!(!status.ready);
    }

    #[test]
    fn test_state_serializes_upper_case() {
        let status = task_status(&job("STARTED"));
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["state"], "STARTED");
        assert!(value.get("raw_state").is_none());
    }
}
