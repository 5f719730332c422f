use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::step_elaborator::{elaborate, step_rows, story_reference, DEFAULT_PRECONDITIONS};
use crate::domain::clock::{iso_timestamp, Clock};
use crate::domain::error::{AppError, Result};
use crate::domain::record::{record_from, FieldMap, RecordKind, DETAILED_STEP_SLOTS};
use crate::domain::test_case::{StepRow, TestCase};
use crate::domain::upload::UploadedFile;
use crate::domain::user_story::{Category, Level};
use crate::infrastructure::csv::{CsvParser, RecordStore, StoreReceipt};

/// Uploaded entries this short are treated as noise.
const MIN_UPLOADED_NAME_CHARS: usize = 6;
const MAX_UPLOADED_CASES: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsOutcome {
    pub detailed_test_cases: Vec<TestCase>,
    pub step_rows: Vec<StepRow>,
    pub total_test_cases: usize,
    pub total_steps: usize,
    pub detailed_steps: StoreReceipt,
    pub step_table: StoreReceipt,
    pub reused_from: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseUploadOutcome {
    pub test_cases: Vec<String>,
    pub receipt: StoreReceipt,
    pub original_name: String,
    pub file_type: Option<String>,
}

pub struct TestStepsUseCase {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl TestStepsUseCase {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Expands test-case names into detailed cases and per-step rows, and
    /// persists both.
    pub fn generate_steps(&self, names: &[String], story: &str) -> Result<StepsOutcome> {
        let names: Vec<String> = names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(AppError::ValidationError(
                "Test cases are required".to_string(),
            ));
        }

        let snapshot = self
            .store
            .read_latest_snapshot(RecordKind::TestCase)
            .map_err(AppError::in_stage("load stored test cases"))?;
        let (stored, reused_from) = match snapshot {
            Some(snapshot) => {
                debug!(path = %snapshot.path.display(), rows = snapshot.records.len(), "Loaded stored test cases");
                (snapshot.records, Some(snapshot.path.display().to_string()))
            }
            None => (Vec::new(), None),
        };

        let cases = elaborate(&names, story, &stored);
        let generated_at = iso_timestamp(&self.clock.now());

        let detailed: Vec<FieldMap> = cases
            .iter()
            .map(|case| detailed_fields(case, story, &generated_at))
            .collect();
        let detailed_receipt = self
            .store
            .append(RecordKind::DetailedSteps, &detailed)
            .map_err(AppError::in_stage("persist detailed steps"))?;

        let rows = step_rows(&cases, story);
        let row_fields: Vec<FieldMap> = rows
            .iter()
            .map(|row| step_row_fields(row, &generated_at))
            .collect();
        let step_receipt = self
            .store
            .append(RecordKind::StepRow, &row_fields)
            .map_err(AppError::in_stage("persist step rows"))?;

        info!(
            test_cases = cases.len(),
            steps = rows.len(),
            "Detailed test steps generated"
        );

        Ok(StepsOutcome {
            total_test_cases: cases.len(),
            total_steps: rows.len(),
            detailed_test_cases: cases,
            step_rows: rows,
            detailed_steps: detailed_receipt,
            step_table: step_receipt,
            reused_from,
        })
    }

    /// Stores test-case names from an uploaded CSV (second column of each
    /// data row) or text file (one per line).
    pub fn upload_test_cases(&self, file: &UploadedFile) -> Result<CaseUploadOutcome> {
        let names = names_from_upload(file)?;
        if names.is_empty() {
            return Err(AppError::ValidationError(
                "No valid test cases found in the file. Please check the file format and content."
                    .to_string(),
            ));
        }
        if names.len() > MAX_UPLOADED_CASES {
            return Err(AppError::ValidationError(format!(
                "Too many test cases ({}). Maximum {} test cases allowed per upload.",
                names.len(),
                MAX_UPLOADED_CASES
            )));
        }

        let uploaded_at = iso_timestamp(&self.clock.now());
        let source = file.source_label();
        let rows: Vec<FieldMap> = names
            .iter()
            .enumerate()
            .map(|(position, name)| uploaded_case_fields(position + 1, name, &source, &uploaded_at))
            .collect();
        let receipt = self
            .store
            .append(RecordKind::UploadedTestCase, &rows)
            .map_err(AppError::in_stage("persist uploaded test cases"))?;

        info!(file = %file.name, count = names.len(), "Uploaded test cases stored");

        Ok(CaseUploadOutcome {
            test_cases: names,
            receipt,
            original_name: file.name.clone(),
            file_type: file.file_type.clone(),
        })
    }
}

fn names_from_upload(file: &UploadedFile) -> Result<Vec<String>> {
    let candidates: Vec<String> = if file.is_csv() {
        let rows = CsvParser::new()
            .with_delimiter(CsvParser::detect_delimiter(&file.content))
            .parse_cells(&file.content)?;
        if rows.is_empty() {
            return Err(AppError::ValidationError(
                "CSV file appears to be empty or has no data rows".to_string(),
            ));
        }
        rows.into_iter()
            .filter_map(|row| row.into_iter().nth(1))
            .map(|cell| cell.replace('"', "").trim().to_string())
            .collect()
    } else {
        file.content.lines().map(|line| line.trim().to_string()).collect()
    };

    Ok(candidates
        .into_iter()
        .filter(|name| name.chars().count() >= MIN_UPLOADED_NAME_CHARS)
        .collect())
}

fn detailed_fields(case: &TestCase, story: &str, generated_at: &str) -> FieldMap {
    let mut row = record_from([
        ("Test Case ID", case.test_case_id.clone()),
        ("Test Case Name", case.name.clone()),
        ("Category", case.category.to_string()),
        ("Priority", case.priority.to_string()),
        ("Preconditions", case.preconditions.clone()),
        ("All Test Steps (Combined)", case.joined_steps()),
        ("Expected Results", case.expected_result.clone()),
        ("Test Data", case.sample_data.clone()),
        ("User Story Reference", story_reference(story)),
        ("Generated Timestamp", generated_at.to_string()),
    ]);
    for slot in 0..DETAILED_STEP_SLOTS {
        row.insert(
            format!("Step {}", slot + 1),
            case.steps.get(slot).cloned().unwrap_or_default(),
        );
    }
    row
}

fn step_row_fields(row: &StepRow, generated_at: &str) -> FieldMap {
    record_from([
        ("Step ID", row.step_id.clone()),
        ("Test Case ID", row.test_case_id.clone()),
        ("Test Case Name", row.test_case_name.clone()),
        ("Step Number", row.step_number.to_string()),
        ("Step Description", row.description.clone()),
        ("Step Type", row.step_type.to_string()),
        ("Category", row.category.to_string()),
        ("Priority", row.priority.to_string()),
        ("Preconditions", row.preconditions.clone()),
        ("Expected Results", row.expected_result.clone()),
        ("Test Data", row.sample_data.clone()),
        ("User Story Reference", row.user_story_ref.clone()),
        ("Automation Complexity", row.complexity.to_string()),
        (
            "Estimated Duration (seconds)",
            row.estimated_duration_seconds.to_string(),
        ),
        ("Generated Timestamp", generated_at.to_string()),
    ])
}

fn uploaded_case_fields(index: usize, name: &str, source: &str, uploaded_at: &str) -> FieldMap {
    record_from([
        ("Test Case ID", format!("TC_UPLOAD_{:03}", index)),
        ("Test Case Name", name.to_string()),
        ("Category", Category::General.to_string()),
        ("Priority", Level::Medium.to_string()),
        ("Preconditions", DEFAULT_PRECONDITIONS.to_string()),
        (
            "Test Steps",
            "Steps to be defined based on test case requirements".to_string(),
        ),
        (
            "Expected Results",
            format!("Test case \"{}\" should be completed successfully", name),
        ),
        ("Test Data", "Test data as per requirements".to_string()),
        ("Source", source.to_string()),
        ("Upload Timestamp", uploaded_at.to_string()),
    ])
}
