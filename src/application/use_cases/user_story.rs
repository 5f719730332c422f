use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::{info, warn};

use super::story_classifier::classify_story;
use super::test_case_catalog::synthesize_test_cases;
use crate::domain::clock::{iso_timestamp, Clock};
use crate::domain::error::{AppError, Result};
use crate::domain::record::{field, record_from, FieldMap, RecordKind};
use crate::domain::test_case::TestCase;
use crate::domain::upload::UploadedFile;
use crate::domain::user_story::{text_length, Category, Level, StoryAnalysis, UserStoryRecord};
use crate::infrastructure::csv::{CsvParser, RecordStore};

pub const MIN_STORY_CHARS: usize = 10;
const CATALOG_SEED: usize = 1;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFiles {
    pub user_story_main: PathBuf,
    pub user_story_snapshot: PathBuf,
    pub test_cases_main: PathBuf,
    pub test_cases_snapshot: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub record: UserStoryRecord,
    pub analysis: StoryAnalysis,
    pub test_cases: Vec<TestCase>,
    pub duplicate: bool,
    pub files: SubmissionFiles,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryUploadOutcome {
    pub record: UserStoryRecord,
    pub analysis: StoryAnalysis,
    pub duplicate: bool,
    pub main_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub original_name: String,
    pub file_type: Option<String>,
    pub content_length: usize,
}

pub struct UserStoryUseCase {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl UserStoryUseCase {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Classifies and stores the story, then stores its catalog test cases.
    pub fn submit(&self, text: &str) -> Result<SubmissionOutcome> {
        let text = validate_story_text(text)?;
        let analysis = classify_story(text);
        let record = self.new_record(text, analysis, None);

        let story_receipt = self
            .store
            .append(RecordKind::UserStory, &[story_fields(&record)])
            .map_err(AppError::in_stage("persist user story"))?;
        let duplicate = story_receipt.inserted == 0;
        if duplicate {
            info!(id = record.id, "User story already stored, skipping main table insert");
        }

        let test_cases = synthesize_test_cases(analysis.category, text, CATALOG_SEED);
        let rows: Vec<FieldMap> = test_cases
            .iter()
            .map(|case| test_case_fields(case, record.id))
            .collect();
        let cases_receipt = self
            .store
            .append(RecordKind::TestCase, &rows)
            .map_err(AppError::in_stage("persist test cases"))?;

        info!(
            id = record.id,
            category = %analysis.category,
            test_cases = test_cases.len(),
            "User story processed"
        );

        Ok(SubmissionOutcome {
            record,
            analysis,
            test_cases,
            duplicate,
            files: SubmissionFiles {
                user_story_main: story_receipt.main_path,
                user_story_snapshot: story_receipt.snapshot_path,
                test_cases_main: cases_receipt.main_path,
                test_cases_snapshot: cases_receipt.snapshot_path,
            },
        })
    }

    /// Stores a story read from an uploaded CSV (first cell of the first
    /// data row) or plain text file (whole content).
    pub fn upload(&self, file: &UploadedFile) -> Result<StoryUploadOutcome> {
        let text = story_from_upload(file)?;
        if text.is_empty() {
            return Err(AppError::ValidationError(
                "File content is empty or invalid".to_string(),
            ));
        }
        if text_length(&text) < MIN_STORY_CHARS {
            return Err(AppError::ValidationError(format!(
                "User story content is too short (minimum {} characters required)",
                MIN_STORY_CHARS
            )));
        }

        let analysis = classify_story(&text);
        let record = self.new_record(&text, analysis, Some(file.source_label()));
        let receipt = self
            .store
            .append(RecordKind::UploadedUserStory, &[story_fields(&record)])
            .map_err(AppError::in_stage("persist uploaded user story"))?;

        info!(file = %file.name, id = record.id, "Uploaded user story stored");

        Ok(StoryUploadOutcome {
            content_length: text_length(&text),
            record,
            analysis,
            duplicate: receipt.inserted == 0,
            main_path: receipt.main_path,
            snapshot_path: receipt.snapshot_path,
            original_name: file.name.clone(),
            file_type: file.file_type.clone(),
        })
    }

    /// Every stored story, newest first.
    pub fn list(&self) -> Result<Vec<UserStoryRecord>> {
        let mut stories = load_stories(self.store.as_ref())?;
        sort_newest_first(&mut stories);
        Ok(stories)
    }

    /// Stored stories whose category equals `category`, ignoring case.
    pub fn list_by_category(&self, category: &str) -> Result<Vec<UserStoryRecord>> {
        let wanted = category.trim();
        let mut stories: Vec<UserStoryRecord> = load_stories(self.store.as_ref())?
            .into_iter()
            .filter(|story| story.category.as_str().eq_ignore_ascii_case(wanted))
            .collect();
        sort_newest_first(&mut stories);
        Ok(stories)
    }

    fn new_record(
        &self,
        text: &str,
        analysis: StoryAnalysis,
        source: Option<String>,
    ) -> UserStoryRecord {
        UserStoryRecord {
            id: self.clock.next_id(),
            created_at: iso_timestamp(&self.clock.now()),
            text: text.to_string(),
            category: analysis.category,
            priority: analysis.priority,
            complexity: analysis.complexity,
            source,
        }
    }
}

/// Trimmed story text, or a validation error when it is blank or short.
pub fn validate_story_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            "User story is required and cannot be empty".to_string(),
        ));
    }
    if text_length(trimmed) < MIN_STORY_CHARS {
        return Err(AppError::ValidationError(format!(
            "User story too short: provide at least {} characters",
            MIN_STORY_CHARS
        )));
    }
    Ok(trimmed)
}

/// Most recently appended story with non-blank text.
pub fn latest_story(store: &dyn RecordStore) -> Result<Option<UserStoryRecord>> {
    Ok(load_stories(store)?.pop())
}

fn story_from_upload(file: &UploadedFile) -> Result<String> {
    if !file.is_csv() {
        return Ok(file.content.trim().to_string());
    }
    let rows = CsvParser::new()
        .with_delimiter(CsvParser::detect_delimiter(&file.content))
        .parse_cells(&file.content)?;
    let first = rows.into_iter().next().ok_or_else(|| {
        AppError::ValidationError("CSV file appears to be empty or has no data rows".to_string())
    })?;
    Ok(first
        .into_iter()
        .next()
        .map(|cell| cell.replace('"', "").trim().to_string())
        .unwrap_or_default())
}

fn load_stories(store: &dyn RecordStore) -> Result<Vec<UserStoryRecord>> {
    let rows = store
        .read_all(RecordKind::UserStory)
        .map_err(AppError::in_stage("load user stories"))?;
    Ok(rows.iter().filter_map(story_from_fields).collect())
}

fn sort_newest_first(stories: &mut [UserStoryRecord]) {
    // Unparseable timestamps sort last; equal keys keep insertion order.
    stories.sort_by_key(|story| {
        std::cmp::Reverse(DateTime::<FixedOffset>::parse_from_rfc3339(&story.created_at).ok())
    });
}

fn story_fields(record: &UserStoryRecord) -> FieldMap {
    record_from([
        ("ID", record.id.to_string()),
        ("Timestamp", record.created_at.clone()),
        ("User Story", record.text.clone()),
        ("Category", record.category.to_string()),
        ("Priority", record.priority.to_string()),
        ("Complexity", record.complexity.to_string()),
        ("Source", record.source.clone().unwrap_or_default()),
    ])
}

fn story_from_fields(row: &FieldMap) -> Option<UserStoryRecord> {
    let text = field(row, "User Story")?;
    let id = field(row, "ID")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or_else(|| {
            warn!("Stored user story has no numeric ID");
            0
        });
    Some(UserStoryRecord {
        id,
        created_at: field(row, "Timestamp").unwrap_or_default().to_string(),
        text: text.to_string(),
        category: field(row, "Category")
            .map(Category::parse_lossy)
            .unwrap_or_default(),
        priority: field(row, "Priority").map(Level::parse_lossy).unwrap_or_default(),
        complexity: field(row, "Complexity")
            .map(Level::parse_lossy)
            .unwrap_or_default(),
        source: field(row, "Source").map(str::to_string),
    })
}

fn test_case_fields(case: &TestCase, story_id: i64) -> FieldMap {
    record_from([
        ("Test Case ID", case.test_case_id.clone()),
        ("Test Case Name", case.name.clone()),
        ("Category", case.category.to_string()),
        ("Priority", case.priority.to_string()),
        ("Preconditions", case.preconditions.clone()),
        ("Test Steps", case.joined_steps()),
        ("Expected Results", case.expected_result.clone()),
        ("Test Data", case.sample_data.clone()),
        ("User Story Reference", story_id.to_string()),
    ])
}
