use serde::{Deserialize, Serialize};
use std::fmt;

use super::user_story::{Category, Level};

/// Delimiter used when a step list is flattened into a single CSV cell.
pub const STEP_DELIMITER: &str = " | ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub test_case_id: String,
    #[serde(rename = "testCaseName", default)]
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Level,
    #[serde(default)]
    pub preconditions: String,
    #[serde(rename = "testSteps", default)]
    pub steps: Vec<String>,
    #[serde(rename = "expectedResults", default)]
    pub expected_result: String,
    #[serde(rename = "testData", default)]
    pub sample_data: String,
}

impl TestCase {
    pub fn joined_steps(&self) -> String {
        self.steps.join(STEP_DELIMITER)
    }
}

pub fn split_steps(joined: &str) -> Vec<String> {
    joined
        .split(STEP_DELIMITER)
        .map(|step| step.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepType {
    Navigation,
    Verification,
    #[serde(rename = "Data Entry")]
    DataEntry,
    #[serde(rename = "User Interaction")]
    UserInteraction,
    #[serde(rename = "Wait/Synchronization")]
    Wait,
    Authentication,
    Cleanup,
    Action,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Navigation => "Navigation",
            StepType::Verification => "Verification",
            StepType::DataEntry => "Data Entry",
            StepType::UserInteraction => "User Interaction",
            StepType::Wait => "Wait/Synchronization",
            StepType::Authentication => "Authentication",
            StepType::Cleanup => "Cleanup",
            StepType::Action => "Action",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One persisted row per (test case, step index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRow {
    pub step_id: String,
    pub test_case_id: String,
    pub test_case_name: String,
    pub step_number: usize,
    pub description: String,
    pub step_type: StepType,
    pub category: Category,
    pub priority: Level,
    pub preconditions: String,
    pub expected_result: String,
    pub sample_data: String,
    pub user_story_ref: String,
    pub complexity: Level,
    pub estimated_duration_seconds: u32,
}
