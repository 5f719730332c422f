//! Logical tables of the record store and their column layouts.

use std::collections::HashMap;
use std::fmt;

/// One table row keyed by column title.
pub type FieldMap = HashMap<String, String>;

pub const USER_STORY_COLUMNS: &[&str] = &[
    "ID",
    "Timestamp",
    "User Story",
    "Category",
    "Priority",
    "Complexity",
    "Source",
];

pub const TEST_CASE_COLUMNS: &[&str] = &[
    "Test Case ID",
    "Test Case Name",
    "Category",
    "Priority",
    "Preconditions",
    "Test Steps",
    "Expected Results",
    "Test Data",
    "User Story Reference",
];

pub const UPLOADED_TEST_CASE_COLUMNS: &[&str] = &[
    "Test Case ID",
    "Test Case Name",
    "Category",
    "Priority",
    "Preconditions",
    "Test Steps",
    "Expected Results",
    "Test Data",
    "Source",
    "Upload Timestamp",
];

/// Step columns in detailed rows; cases with more steps keep them only in
/// the combined column.
pub const DETAILED_STEP_SLOTS: usize = 8;

pub const DETAILED_STEPS_COLUMNS: &[&str] = &[
    "Test Case ID",
    "Test Case Name",
    "Category",
    "Priority",
    "Preconditions",
    "Step 1",
    "Step 2",
    "Step 3",
    "Step 4",
    "Step 5",
    "Step 6",
    "Step 7",
    "Step 8",
    "All Test Steps (Combined)",
    "Expected Results",
    "Test Data",
    "User Story Reference",
    "Generated Timestamp",
];

pub const STEP_ROW_COLUMNS: &[&str] = &[
    "Step ID",
    "Test Case ID",
    "Test Case Name",
    "Step Number",
    "Step Description",
    "Step Type",
    "Category",
    "Priority",
    "Preconditions",
    "Expected Results",
    "Test Data",
    "User Story Reference",
    "Automation Complexity",
    "Estimated Duration (seconds)",
    "Generated Timestamp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    UserStory,
    /// Stories arriving through file upload. Shares the user-story main table
    /// but keeps its own snapshot prefix.
    UploadedUserStory,
    TestCase,
    UploadedTestCase,
    DetailedSteps,
    StepRow,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::UserStory,
        RecordKind::UploadedUserStory,
        RecordKind::TestCase,
        RecordKind::UploadedTestCase,
        RecordKind::DetailedSteps,
        RecordKind::StepRow,
    ];

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            RecordKind::UserStory | RecordKind::UploadedUserStory => USER_STORY_COLUMNS,
            RecordKind::TestCase => TEST_CASE_COLUMNS,
            RecordKind::UploadedTestCase => UPLOADED_TEST_CASE_COLUMNS,
            RecordKind::DetailedSteps => DETAILED_STEPS_COLUMNS,
            RecordKind::StepRow => STEP_ROW_COLUMNS,
        }
    }

    /// File stem of the cumulative table.
    pub fn main_table(&self) -> &'static str {
        match self {
            RecordKind::UserStory | RecordKind::UploadedUserStory => "UserStory",
            RecordKind::TestCase => "TestCases",
            RecordKind::UploadedTestCase => "TestCases_Upload",
            RecordKind::DetailedSteps => "DetailedTestSteps",
            RecordKind::StepRow => "TestCaseStep",
        }
    }

    /// Snapshot files are named `<prefix><timestamp>.csv`.
    pub fn snapshot_prefix(&self) -> &'static str {
        match self {
            RecordKind::UserStory => "UserStory_",
            RecordKind::UploadedUserStory => "UserStory_Upload_",
            RecordKind::TestCase => "TestCases_",
            RecordKind::UploadedTestCase => "TestCases_Upload_",
            RecordKind::DetailedSteps => "DetailedTestSteps_",
            RecordKind::StepRow => "TestCaseStep_",
        }
    }

    /// The main table is rewritten as a whole and guarded by a duplicate check.
    pub fn deduplicates(&self) -> bool {
        matches!(self, RecordKind::UserStory | RecordKind::UploadedUserStory)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.main_table())
    }
}

/// Builds a row from `(column, value)` pairs.
pub fn record_from<const N: usize>(pairs: [(&str, String); N]) -> FieldMap {
    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

pub fn field<'a>(record: &'a FieldMap, column: &str) -> Option<&'a str> {
    record
        .get(column)
        .map(|value| value.as_str())
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detailed_layout_has_one_column_per_step_slot() {
        let step_columns = DETAILED_STEPS_COLUMNS
            .iter()
            .filter(|column| column.starts_with("Step "))
            .count();
        assert_eq!(step_columns, DETAILED_STEP_SLOTS);
    }

    #[test]
    fn upload_kinds_share_or_split_tables() {
        assert_eq!(
            RecordKind::UploadedUserStory.main_table(),
            RecordKind::UserStory.main_table()
        );
        assert_ne!(
            RecordKind::UploadedTestCase.main_table(),
            RecordKind::TestCase.main_table()
        );
    }

    #[test]
    fn field_treats_blank_as_missing() {
        let mut record = FieldMap::new();
        record.insert("Category".into(), "  ".into());
        record.insert("Priority".into(), "High".into());
        assert_eq!(field(&record, "Category"), None);
        assert_eq!(field(&record, "Priority"), Some("High"));
        assert_eq!(field(&record, "Missing"), None);
    }
}
