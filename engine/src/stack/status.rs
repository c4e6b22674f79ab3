use std::fmt;
use std::str::FromStr;

/// CloudFormation stack (and resource) status
///
/// Every known status has a row in [`STATUSES`] which decides whether it's terminal
/// and whether it means the operation failed. Statuses missing from the table
/// are kept as [`StackStatus::Unknown`] and classified by their name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StackStatus {
    CreateInProgress,
    CreateFailed,
    CreateComplete,
    RollbackInProgress,
    RollbackFailed,
    RollbackComplete,
    DeleteInProgress,
    DeleteFailed,
    DeleteComplete,
    UpdateInProgress,
    UpdateCompleteCleanupInProgress,
    UpdateComplete,
    UpdateFailed,
    UpdateRollbackInProgress,
    UpdateRollbackFailed,
    UpdateRollbackCompleteCleanupInProgress,
    UpdateRollbackComplete,
    ReviewInProgress,
    ImportInProgress,
    ImportComplete,
    ImportRollbackInProgress,
    ImportRollbackFailed,
    ImportRollbackComplete,
    Unknown(String),
}

/// How a status is shown to the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusStyle {
    Warning,
    Success,
    Error,
    Plain,
}

struct Row {
    status: StackStatus,
    literal: &'static str,
    terminal: bool,
    failure: bool,
}

const fn row(status: StackStatus, literal: &'static str, terminal: bool, failure: bool) -> Row {
    Row {
        status,
        literal,
        terminal,
        failure,
    }
}

// Terminal is "not IN_PROGRESS", failure is "contains FAILED"
const STATUSES: &[Row] = &[
    row(StackStatus::CreateInProgress, "CREATE_IN_PROGRESS", false, false),
    row(StackStatus::CreateFailed, "CREATE_FAILED", true, true),
    row(StackStatus::CreateComplete, "CREATE_COMPLETE", true, false),
    row(StackStatus::RollbackInProgress, "ROLLBACK_IN_PROGRESS", false, false),
    row(StackStatus::RollbackFailed, "ROLLBACK_FAILED", true, true),
    row(StackStatus::RollbackComplete, "ROLLBACK_COMPLETE", true, false),
    row(StackStatus::DeleteInProgress, "DELETE_IN_PROGRESS", false, false),
    row(StackStatus::DeleteFailed, "DELETE_FAILED", true, true),
    row(StackStatus::DeleteComplete, "DELETE_COMPLETE", true, false),
    row(StackStatus::UpdateInProgress, "UPDATE_IN_PROGRESS", false, false),
    row(
        StackStatus::UpdateCompleteCleanupInProgress,
        "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
        false,
        false,
    ),
    row(StackStatus::UpdateComplete, "UPDATE_COMPLETE", true, false),
    row(StackStatus::UpdateFailed, "UPDATE_FAILED", true, true),
    row(
        StackStatus::UpdateRollbackInProgress,
        "UPDATE_ROLLBACK_IN_PROGRESS",
        false,
        false,
    ),
    row(StackStatus::UpdateRollbackFailed, "UPDATE_ROLLBACK_FAILED", true, true),
    row(
        StackStatus::UpdateRollbackCompleteCleanupInProgress,
        "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
        false,
        false,
    ),
    row(StackStatus::UpdateRollbackComplete, "UPDATE_ROLLBACK_COMPLETE", true, false),
    row(StackStatus::ReviewInProgress, "REVIEW_IN_PROGRESS", false, false),
    row(StackStatus::ImportInProgress, "IMPORT_IN_PROGRESS", false, false),
    row(StackStatus::ImportComplete, "IMPORT_COMPLETE", true, false),
    row(
        StackStatus::ImportRollbackInProgress,
        "IMPORT_ROLLBACK_IN_PROGRESS",
        false,
        false,
    ),
    row(StackStatus::ImportRollbackFailed, "IMPORT_ROLLBACK_FAILED", true, true),
    row(StackStatus::ImportRollbackComplete, "IMPORT_ROLLBACK_COMPLETE", true, false),
];

impl StackStatus {
    fn row(&self) -> Option<&'static Row> {
        STATUSES.iter().find(|row| &row.status == self)
    }

    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::Unknown(literal) => literal,
            known => known.row().map(|row| row.literal).unwrap_or_default(),
        }
    }

    /// The stack is not being changed anymore
    pub fn is_terminal(&self) -> bool {
        match self.row() {
            Some(row) => row.terminal,
            None => !self.as_str().contains("IN_PROGRESS"),
        }
    }

    /// The stack operation has finished unsuccessfully
    pub fn is_failure(&self) -> bool {
        match self.row() {
            Some(row) => row.failure,
            None => self.as_str().contains("FAILED"),
        }
    }

    /// Display style, checked in order: in progress, complete, failed
    pub fn style(&self) -> StatusStyle {
        let literal = self.as_str();

        if literal.contains("IN_PROGRESS") {
            StatusStyle::Warning
        } else if literal.contains("COMPLETE") {
            StatusStyle::Success
        } else if literal.contains("FAILED") {
            StatusStyle::Error
        } else {
            StatusStyle::Plain
        }
    }
}

impl FromStr for StackStatus {
    type Err = std::convert::Infallible;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        Ok(STATUSES
            .iter()
            .find(|row| row.literal == literal)
            .map(|row| row.status.clone())
            .unwrap_or_else(|| StackStatus::Unknown(literal.to_string())))
    }
}

impl From<&str> for StackStatus {
    fn from(literal: &str) -> Self {
        match literal.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{StackStatus, StatusStyle, STATUSES};

    #[test]
    fn literals_round_trip() {
        for row in STATUSES {
            let status = StackStatus::from(row.literal);
            assert_eq!(status, row.status);
            assert_eq!(status.to_string(), row.literal);
        }
    }

    #[test]
    fn table_matches_status_names() {
        for row in STATUSES {
            assert_eq!(
                row.terminal,
                !row.literal.contains("IN_PROGRESS"),
                "{}",
                row.literal
            );
            assert_eq!(row.failure, row.literal.contains("FAILED"), "{}", row.literal);
        }
    }

    #[test]
    fn unknown_statuses_fall_back_to_names() {
        let status = StackStatus::from("EXPORT_IN_PROGRESS");
        assert_eq!(status, StackStatus::Unknown("EXPORT_IN_PROGRESS".into()));
        assert!(!status.is_terminal());

        let status = StackStatus::from("EXPORT_FAILED");
        assert!(status.is_terminal());
        assert!(status.is_failure());
    }

    #[test]
    fn styles() {
        assert_eq!(StackStatus::CreateInProgress.style(), StatusStyle::Warning);
        assert_eq!(
            StackStatus::UpdateRollbackCompleteCleanupInProgress.style(),
            StatusStyle::Warning
        );
        assert_eq!(StackStatus::UpdateRollbackComplete.style(), StatusStyle::Success);
        assert_eq!(StackStatus::RollbackFailed.style(), StatusStyle::Error);
        assert_eq!(StackStatus::from("SOMETHING").style(), StatusStyle::Plain);
    }

    #[test]
    fn rollback_complete_is_a_successful_observation() {
        // The stack did roll back, but the rollback itself went through
        assert!(StackStatus::UpdateRollbackComplete.is_terminal());
        assert!(!StackStatus::UpdateRollbackComplete.is_failure());
        assert!(StackStatus::UpdateRollbackFailed.is_failure());
    }
}
