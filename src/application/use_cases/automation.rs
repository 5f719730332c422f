use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::code_generator::render_automation_source;
use super::context_extractor::extract_context;
use super::user_story::latest_story;
use crate::domain::clock::{file_timestamp, Clock};
use crate::domain::context::ExtractedContext;
use crate::domain::error::{AppError, Result};
use crate::domain::record::RecordKind;
use crate::domain::test_case::TestCase;
use crate::infrastructure::csv::RecordStore;

const FALLBACK_STORY: &str = "Default user story";
const SOURCE_PREFIX: &str = "AutomationTest_";
const SOURCE_EXT: &str = "java";

/// Which story the extracted context was mined from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StoryOrigin {
    Stored,
    Request,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaFile {
    pub path: PathBuf,
    pub filename: String,
    pub class_name: String,
    pub test_case_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvSource {
    pub file: PathBuf,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationOutcome {
    pub automation_code: String,
    pub extracted_context: ExtractedContext,
    pub story_origin: StoryOrigin,
    pub java_file: JavaFile,
    pub csv_source: CsvSource,
}

pub struct AutomationUseCase {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl AutomationUseCase {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Renders and writes a Java automation source for `cases`. Requires at
    /// least one detailed-steps snapshot to exist.
    pub fn generate_code(
        &self,
        cases: &[TestCase],
        request_story: Option<&str>,
    ) -> Result<AutomationOutcome> {
        if cases.is_empty() {
            return Err(AppError::ValidationError(
                "Detailed test cases are required".to_string(),
            ));
        }

        let snapshot = self
            .store
            .read_latest_snapshot(RecordKind::DetailedSteps)
            .map_err(AppError::in_stage("load detailed steps"))?
            .ok_or_else(|| {
                AppError::PreconditionNotMet(
                    "No test case steps CSV found. Please create test case steps first before generating automation code"
                        .to_string(),
                )
            })?;

        let stored = latest_story(self.store.as_ref())
            .map_err(AppError::in_stage("load latest user story"))?;
        let (story, story_origin) = match (stored, request_story.map(str::trim)) {
            (Some(record), _) => (record.text, StoryOrigin::Stored),
            (None, Some(text)) if !text.is_empty() => (text.to_string(), StoryOrigin::Request),
            _ => (FALLBACK_STORY.to_string(), StoryOrigin::Fallback),
        };

        let context = extract_context(&story);
        let now = self.clock.now();
        let source = render_automation_source(cases, &context, &story, &now);

        let path = self
            .store
            .write_document(SOURCE_PREFIX, &file_timestamp(&now), SOURCE_EXT, &source.code)
            .map_err(AppError::in_stage("write automation source"))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(
            class = %source.class_name,
            file = %path.display(),
            application = %context.application_name,
            "Automation source generated"
        );

        Ok(AutomationOutcome {
            automation_code: source.code,
            extracted_context: context,
            story_origin,
            java_file: JavaFile {
                path,
                filename,
                class_name: source.class_name,
                test_case_count: cases.len(),
            },
            csv_source: CsvSource {
                file: snapshot.path,
                record_count: snapshot.records.len(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::record::record_from;
    use crate::domain::user_story::{Category, Level};
    use crate::infrastructure::csv::CsvRecordStore;
    use chrono::{TimeZone, Utc};

    fn setup() -> (tempfile::TempDir, Arc<CsvRecordStore>, AutomationUseCase) {
        let dir = tempfile::tempdir().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
        ));
        let store = Arc::new(CsvRecordStore::new(dir.path(), clock.clone()));
        let use_case = AutomationUseCase::new(store.clone(), clock);
        (dir, store, use_case)
    }

    fn login_case() -> TestCase {
        TestCase {
            test_case_id: "TC_STEP_001".into(),
            name: "Verify successful login".into(),
            category: Category::Authentication,
            priority: Level::High,
            preconditions: String::new(),
            steps: vec![
                "Navigate to the application login page".into(),
                "Enter valid username in the username field".into(),
            ],
            expected_result: String::new(),
            sample_data: String::new(),
        }
    }

    fn seed_detailed_steps(store: &CsvRecordStore) {
        store
            .append(
                RecordKind::DetailedSteps,
                &[record_from([("Test Case ID", "TC_STEP_001".to_string())])],
            )
            .unwrap();
    }

    #[test]
    fn requires_detailed_steps_snapshot() {
        let (_dir, _store, use_case) = setup();
        let err = use_case.generate_code(&[login_case()], None).unwrap_err();
        assert_eq!(err.code(), "PRECONDITION_NOT_MET");
    }

    #[test]
    fn rejects_empty_case_list() {
        let (_dir, store, use_case) = setup();
        seed_detailed_steps(&store);
        let err = use_case.generate_code(&[], Some("story")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn request_story_is_used_when_nothing_is_stored() {
        let (dir, store, use_case) = setup();
        seed_detailed_steps(&store);

        let outcome = use_case
            .generate_code(
                &[login_case()],
                Some("As a shopper I want to login at https://www.saucedemo.com/"),
            )
            .unwrap();

        assert_eq!(outcome.story_origin, StoryOrigin::Request);
        assert_eq!(outcome.extracted_context.application_name, "SauceDemo");
        assert_eq!(outcome.java_file.filename, "AutomationTest_2026-03-04T05-06-07-000Z.java");
        assert_eq!(outcome.java_file.class_name, "AutomationTest_2026_03_04_05_06_07_000");
        assert_eq!(outcome.csv_source.record_count, 1);

        let written = std::fs::read_to_string(dir.path().join(&outcome.java_file.filename)).unwrap();
        assert_eq!(written, outcome.automation_code);
        assert!(written.contains("public class AutomationTest_2026_03_04_05_06_07_000"));
    }

    #[test]
    fn stored_story_wins_over_request_story() {
        let (_dir, store, use_case) = setup();
        seed_detailed_steps(&store);
        store
            .append(
                RecordKind::UserStory,
                &[record_from([
                    ("ID", "1".to_string()),
                    ("User Story", "Login to https://parabank.parasoft.com as a customer".to_string()),
                ])],
            )
            .unwrap();

        let outcome = use_case
            .generate_code(&[login_case()], Some("https://www.saucedemo.com/"))
            .unwrap();
        assert_eq!(outcome.story_origin, StoryOrigin::Stored);
        assert_eq!(outcome.extracted_context.application_name, "ParaBank");
    }

    #[test]
    fn blank_request_story_falls_back_to_default() {
        let (_dir, store, use_case) = setup();
        seed_detailed_steps(&store);
        let outcome = use_case.generate_code(&[login_case()], Some("   ")).unwrap();
        assert_eq!(outcome.story_origin, StoryOrigin::Fallback);
        assert!(outcome.extracted_context.has_default_application());
    }
}
