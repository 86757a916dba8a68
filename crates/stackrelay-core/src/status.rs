//! CloudFormation stack status model

use std::collections::BTreeMap;
use std::fmt;

/// Stack status as reported by DescribeStacks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackStatus {
    CreateInProgress,
    CreateComplete,
    CreateFailed,
    RollbackInProgress,
    RollbackComplete,
    RollbackFailed,
    DeleteInProgress,
    DeleteComplete,
    DeleteFailed,
    ReviewInProgress,
    /// Any status this crate does not model (update/import families, new values)
    Unknown(String),
}

/// Where a create operation stands, from the deployer's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPhase {
    InProgress,
    Succeeded,
    Failed,
}

impl StackStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateInProgress => "CREATE_IN_PROGRESS",
            Self::CreateComplete => "CREATE_COMPLETE",
            Self::CreateFailed => "CREATE_FAILED",
            Self::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            Self::RollbackComplete => "ROLLBACK_COMPLETE",
            Self::RollbackFailed => "ROLLBACK_FAILED",
            Self::DeleteInProgress => "DELETE_IN_PROGRESS",
            Self::DeleteComplete => "DELETE_COMPLETE",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::ReviewInProgress => "REVIEW_IN_PROGRESS",
            Self::Unknown(raw) => raw,
        }
    }

    /// Classify the status for a create operation.
    ///
    /// Only `CREATE_COMPLETE` is success. Rollback and delete end states can
    /// never turn into `CREATE_COMPLETE` without a new operation, so they
    /// count as failure alongside `CREATE_FAILED`.
    pub fn phase(&self) -> StackPhase {
        match self {
            Self::CreateComplete => StackPhase::Succeeded,
            Self::CreateFailed
            | Self::RollbackComplete
            | Self::RollbackFailed
            | Self::DeleteComplete
            | Self::DeleteFailed => StackPhase::Failed,
            Self::CreateInProgress
            | Self::RollbackInProgress
            | Self::DeleteInProgress
            | Self::ReviewInProgress
            | Self::Unknown(_) => StackPhase::InProgress,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase() != StackPhase::InProgress
    }
}

impl From<&str> for StackStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "CREATE_IN_PROGRESS" => Self::CreateInProgress,
            "CREATE_COMPLETE" => Self::CreateComplete,
            "CREATE_FAILED" => Self::CreateFailed,
            "ROLLBACK_IN_PROGRESS" => Self::RollbackInProgress,
            "ROLLBACK_COMPLETE" => Self::RollbackComplete,
            "ROLLBACK_FAILED" => Self::RollbackFailed,
            "DELETE_IN_PROGRESS" => Self::DeleteInProgress,
            "DELETE_COMPLETE" => Self::DeleteComplete,
            "DELETE_FAILED" => Self::DeleteFailed,
            "REVIEW_IN_PROGRESS" => Self::ReviewInProgress,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One DescribeStacks observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSnapshot {
    pub status: StackStatus,
    pub status_reason: Option<String>,
    pub stack_id: Option<String>,
    pub outputs: BTreeMap<String, String>,
}

impl StackSnapshot {
    pub fn new(status: StackStatus) -> Self {
        Self {
            status,
            status_reason: None,
            stack_id: None,
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }
}
