//! Expands test-case names into ordered, granular steps.
//!
//! A name is first matched against previously stored test-case rows; a hit
//! reuses the stored case. Otherwise the name is scanned against keyword
//! buckets that each carry canned steps and metadata.

use tracing::debug;

use super::step_profile::profile_step;
use crate::domain::record::{field, FieldMap};
use crate::domain::test_case::{split_steps, StepRow, TestCase};
use crate::domain::user_story::{Category, Level};

/// Length of the name prefix that must appear in a stored case name.
const REUSE_PREFIX_CHARS: usize = 20;
const STORY_REFERENCE_CHARS: usize = 100;

pub(crate) const DEFAULT_PRECONDITIONS: &str = "Application is accessible and ready for testing";
const DEFAULT_TEST_DATA: &str = "Valid test data as per requirements";

const GENERIC_STEPS: &[&str] = &[
    "Navigate to the relevant section of the application",
    "Verify the feature/functionality is accessible",
    "Perform the required action as described in the test case",
    "Verify the action completes successfully",
    "Check that the system state is updated correctly",
    "Verify any displayed messages or feedback",
];

const UPLOAD_STEPS: &[&str] = &[
    "Navigate to the file upload section",
    "Click on file upload button or drag-drop area",
    "Select a valid file from file system",
    "Verify file is selected and displayed",
    "Click upload button to start upload process",
    "Verify successful upload and file processing",
];
const UPLOAD_TEST_DATA: &str = "Test files: document.pdf, image.jpg (valid formats and sizes)";

const LOGIN_VALID_STEPS: &[&str] = &[
    "Navigate to the application login page",
    "Verify login form is displayed with username and password fields",
    "Enter valid username in the username field",
    "Enter valid password in the password field",
    "Click the Login/Sign In button",
    "Verify successful login and redirection to dashboard",
];

const LOGIN_INVALID_STEPS: &[&str] = &[
    "Navigate to the application login page",
    "Enter invalid username or password",
    "Click the Login/Sign In button",
    "Verify error message is displayed",
    "Verify user remains on login page",
];

const SEARCH_STEPS: &[&str] = &[
    "Navigate to the search section of the application",
    "Locate the search input field",
    "Enter search keywords in the search box",
    "Click the search button or press Enter",
    "Wait for search results to load",
    "Verify search results are displayed and relevant",
];

const REGISTRATION_STEPS: &[&str] = &[
    "Navigate to the registration page",
    "Fill in all mandatory fields with valid data",
    "Enter a valid email address",
    "Create a strong password meeting requirements",
    "Confirm password correctly",
    "Accept terms and conditions if required",
    "Submit the registration form",
    "Verify confirmation message or email",
];

const PASSWORD_MASK_STEPS: &[&str] = &[
    "Navigate to the login or registration page",
    "Click on the password input field",
    "Enter any characters in the password field",
    "Verify that characters are masked (shown as dots or asterisks)",
    "Check for password visibility toggle if available",
    "Test toggle functionality to show/hide password",
];

const RESPONSIVE_UI_STEPS: &[&str] = &[
    "Open the application in a desktop browser",
    "Verify all UI elements are properly displayed",
    "Resize browser window to test responsiveness",
    "Test on mobile device or use responsive mode",
    "Verify touch interactions work properly on mobile",
    "Test on different browsers (Chrome, Firefox, Safari)",
];

/// Steps plus the expected result and data that go with them.
struct Variant {
    keywords: &'static [&'static str],
    steps: &'static [&'static str],
    expected_result: &'static str,
    sample_data: Option<&'static str>,
}

struct Bucket {
    keywords: &'static [&'static str],
    category: Category,
    priority: Level,
    preconditions: &'static str,
    sample_data: &'static str,
    /// Tried in order; an empty keyword list always matches.
    variants: &'static [Variant],
}

const BUCKETS: &[Bucket] = &[
    Bucket {
        keywords: &["login", "sign in", "authenticate"],
        category: Category::Authentication,
        priority: Level::High,
        preconditions: "User has valid credentials, Application login page is accessible",
        sample_data: "Valid username: testuser@example.com, Valid password: Test@123",
        variants: &[
            // "invalid" contains "valid", so the negative variant is checked first.
            Variant {
                keywords: &["invalid", "error"],
                steps: LOGIN_INVALID_STEPS,
                expected_result: "System should display appropriate error message and prevent unauthorized access",
                sample_data: Some("Invalid username: invalid@test.com, Invalid password: wrongpass123"),
            },
            Variant {
                keywords: &["valid", "successful"],
                steps: LOGIN_VALID_STEPS,
                expected_result: "User should be successfully authenticated and redirected to the main dashboard",
                sample_data: None,
            },
        ],
    },
    Bucket {
        keywords: &["search", "find"],
        category: Category::Search,
        priority: Level::Medium,
        preconditions: "Application is loaded, Search functionality is accessible, Test data is available",
        sample_data: "Search keywords: \"laptop\", \"mobile phone\", \"electronics\"",
        variants: &[Variant {
            keywords: &[],
            steps: SEARCH_STEPS,
            expected_result: "Search should return relevant results based on the entered keywords",
            sample_data: None,
        }],
    },
    Bucket {
        keywords: &["register", "signup", "create account"],
        category: Category::Registration,
        priority: Level::High,
        preconditions: "Registration page is accessible, Email service is working",
        sample_data: "Email: newuser@test.com, Password: NewUser@123, Name: John Doe",
        variants: &[Variant {
            keywords: &[],
            steps: REGISTRATION_STEPS,
            expected_result: "User should be successfully registered and receive confirmation",
            sample_data: None,
        }],
    },
    Bucket {
        keywords: &["password"],
        category: Category::Authentication,
        priority: Level::Medium,
        preconditions: "Login or registration form is accessible",
        sample_data: DEFAULT_TEST_DATA,
        variants: &[Variant {
            keywords: &["mask", "hide"],
            steps: PASSWORD_MASK_STEPS,
            expected_result: "Password characters should be properly masked for security",
            sample_data: Some("Test password: MySecretPassword123"),
        }],
    },
    Bucket {
        keywords: &["ui", "interface", "responsive"],
        category: Category::General,
        priority: Level::Low,
        preconditions: "Application is accessible on different devices and browsers",
        sample_data: "Different browsers: Chrome, Firefox, Safari; Devices: Desktop, Mobile, Tablet",
        variants: &[Variant {
            keywords: &[],
            steps: RESPONSIVE_UI_STEPS,
            expected_result: "Application should be responsive and functional across all tested platforms",
            sample_data: None,
        }],
    },
];

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}

fn to_steps(steps: &[&str]) -> Vec<String> {
    steps.iter().map(|step| step.to_string()).collect()
}

fn default_expected_result(name: &str) -> String {
    format!("Test case \"{}\" should be completed successfully", name)
}

fn generated_id(index: usize) -> String {
    format!("TC_STEP_{:03}", index)
}

fn story_mentions_upload(story: &str) -> bool {
    let lower = story.to_lowercase();
    lower.contains("upload") || lower.contains("file")
}

/// Default skeleton, switched to the upload flow when the story talks about files.
fn default_steps(story: &str) -> &'static [&'static str] {
    if story_mentions_upload(story) {
        UPLOAD_STEPS
    } else {
        GENERIC_STEPS
    }
}

/// Generates a detailed case for `name` from the keyword buckets. `index`
/// is the 1-based position of the name in the request.
pub fn generate_case(name: &str, story: &str, index: usize) -> TestCase {
    let lower = name.to_lowercase();

    let Some(bucket) = BUCKETS
        .iter()
        .find(|bucket| contains_any(&lower, bucket.keywords))
    else {
        let upload = story_mentions_upload(story);
        return TestCase {
            test_case_id: generated_id(index),
            name: name.to_string(),
            category: if upload {
                Category::FileManagement
            } else {
                Category::General
            },
            priority: Level::Medium,
            preconditions: DEFAULT_PRECONDITIONS.to_string(),
            steps: to_steps(default_steps(story)),
            expected_result: default_expected_result(name),
            sample_data: if upload { UPLOAD_TEST_DATA } else { DEFAULT_TEST_DATA }.to_string(),
        };
    };

    let variant = bucket
        .variants
        .iter()
        .find(|variant| variant.keywords.is_empty() || contains_any(&lower, variant.keywords));

    let (steps, expected_result, sample_data) = match variant {
        Some(variant) => (
            to_steps(variant.steps),
            variant.expected_result.to_string(),
            variant.sample_data.unwrap_or(bucket.sample_data),
        ),
        None => (
            to_steps(default_steps(story)),
            default_expected_result(name),
            bucket.sample_data,
        ),
    };

    TestCase {
        test_case_id: generated_id(index),
        name: name.to_string(),
        category: bucket.category,
        priority: bucket.priority,
        preconditions: bucket.preconditions.to_string(),
        steps,
        expected_result,
        sample_data: sample_data.to_string(),
    }
}

fn find_stored<'a>(name: &str, stored: &'a [FieldMap]) -> Option<&'a FieldMap> {
    let prefix: String = name.to_lowercase().chars().take(REUSE_PREFIX_CHARS).collect();
    stored.iter().find(|row| {
        field(row, "Test Case Name")
            .map(|stored_name| stored_name.to_lowercase().contains(&prefix))
            .unwrap_or(false)
    })
}

fn reuse_case(name: &str, story: &str, index: usize, row: &FieldMap) -> TestCase {
    let steps = match field(row, "Test Steps") {
        Some(joined) => split_steps(joined),
        None => generate_case(name, story, index).steps,
    };
    TestCase {
        test_case_id: field(row, "Test Case ID")
            .map(str::to_string)
            .unwrap_or_else(|| generated_id(index)),
        name: field(row, "Test Case Name").unwrap_or(name).to_string(),
        category: field(row, "Category")
            .map(Category::parse_lossy)
            .unwrap_or(Category::General),
        priority: field(row, "Priority")
            .map(Level::parse_lossy)
            .unwrap_or(Level::Medium),
        preconditions: field(row, "Preconditions")
            .unwrap_or(DEFAULT_PRECONDITIONS)
            .to_string(),
        steps,
        expected_result: field(row, "Expected Results")
            .map(str::to_string)
            .unwrap_or_else(|| default_expected_result(name)),
        sample_data: field(row, "Test Data").unwrap_or(DEFAULT_TEST_DATA).to_string(),
    }
}

/// Elaborates every name in order, reusing `stored` rows where one matches.
pub fn elaborate(names: &[String], story: &str, stored: &[FieldMap]) -> Vec<TestCase> {
    names
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let index = position + 1;
            match find_stored(name, stored) {
                Some(row) => {
                    debug!(name = %name, "Reusing stored test case");
                    reuse_case(name, story, index, row)
                }
                None => generate_case(name, story, index),
            }
        })
        .collect()
}

/// First 100 characters of the story, with `...` when cut.
pub fn story_reference(story: &str) -> String {
    let mut chars = story.chars();
    let head: String = chars.by_ref().take(STORY_REFERENCE_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// One row per step, numbered from 1. Only the last step carries the
/// case's expected result.
pub fn step_rows(cases: &[TestCase], story: &str) -> Vec<StepRow> {
    let reference = story_reference(story);
    cases
        .iter()
        .flat_map(|case| {
            let last = case.steps.len().saturating_sub(1);
            let reference = reference.clone();
            case.steps.iter().enumerate().map(move |(position, step)| {
                let number = position + 1;
                let profile = profile_step(step);
                StepRow {
                    step_id: format!("STEP_{}_{:02}", case.test_case_id, number),
                    test_case_id: case.test_case_id.clone(),
                    test_case_name: case.name.clone(),
                    step_number: number,
                    description: step.clone(),
                    step_type: profile.step_type,
                    category: case.category,
                    priority: case.priority,
                    preconditions: case.preconditions.clone(),
                    expected_result: if position == last {
                        case.expected_result.clone()
                    } else {
                        format!("Step {} should be completed successfully", number)
                    },
                    sample_data: case.sample_data.clone(),
                    user_story_ref: reference.clone(),
                    complexity: profile.complexity,
                    estimated_duration_seconds: profile.estimated_duration_seconds,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::story_classifier::classify_story;
    use crate::application::use_cases::test_case_catalog::synthesize_test_cases;
    use crate::domain::test_case::StepType;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn valid_login_name_gets_six_login_steps() {
        let cases = elaborate(
            &names(&["Verify successful login with valid credentials"]),
            "As a user I want to login",
            &[],
        );
        let case = &cases[0];
        assert_eq!(case.test_case_id, "TC_STEP_001");
        assert_eq!(case.category, Category::Authentication);
        assert_eq!(case.priority, Level::High);
        assert_eq!(case.steps.len(), 6);
        assert_eq!(case.steps[0], "Navigate to the application login page");
    }

    #[test]
    fn invalid_login_overrides_test_data() {
        let case = generate_case("Login error path", "story", 2);
        assert_eq!(case.test_case_id, "TC_STEP_002");
        assert_eq!(case.steps.len(), 5);
        assert!(case.sample_data.starts_with("Invalid username"));

        let case = generate_case("Login with invalid credentials", "story", 1);
        assert_eq!(case.steps, to_steps(LOGIN_INVALID_STEPS));
        assert!(case.sample_data.starts_with("Invalid username"));
    }

    #[test]
    fn login_without_variant_keeps_metadata_and_default_steps() {
        let case = generate_case("Login page layout", "plain story", 1);
        assert_eq!(case.category, Category::Authentication);
        assert_eq!(case.priority, Level::High);
        assert_eq!(case.steps, to_steps(GENERIC_STEPS));
        assert_eq!(
            case.expected_result,
            "Test case \"Login page layout\" should be completed successfully"
        );
    }

    #[test]
    fn password_bucket_maps_to_authentication() {
        let case = generate_case("Verify password field masking", "story", 1);
        assert_eq!(case.category, Category::Authentication);
        assert_eq!(case.steps.len(), 6);
        assert_eq!(case.sample_data, "Test password: MySecretPassword123");

        let unmatched = generate_case("Password expiry reminder", "upload a file", 1);
        assert_eq!(unmatched.steps, to_steps(UPLOAD_STEPS));
    }

    #[test]
    fn ui_bucket_maps_to_general_low() {
        let case = generate_case("Check responsive layout", "story", 1);
        assert_eq!(case.category, Category::General);
        assert_eq!(case.priority, Level::Low);
    }

    #[test]
    fn unmatched_name_uses_upload_skeleton_for_file_stories() {
        let case = generate_case("Verify document appears", "As a user I want to upload a file", 3);
        assert_eq!(case.category, Category::FileManagement);
        assert_eq!(case.steps[0], "Navigate to the file upload section");
        assert_eq!(case.sample_data, UPLOAD_TEST_DATA);

        let plain = generate_case("Verify document appears", "As a user I want reports", 3);
        assert_eq!(plain.category, Category::General);
        assert_eq!(plain.steps.len(), 6);
    }

    #[test]
    fn stored_row_is_reused_by_name_prefix() {
        let mut row = FieldMap::new();
        row.insert("Test Case ID".into(), "TC_AUTH_002".into());
        row.insert(
            "Test Case Name".into(),
            "Verify login failure with invalid credentials".into(),
        );
        row.insert("Category".into(), "Authentication".into());
        row.insert("Priority".into(), "High".into());
        row.insert("Test Steps".into(), "Open page | Type bad password | Verify error".into());
        row.insert("Test Data".into(), "".into());

        let cases = elaborate(
            &names(&["VERIFY LOGIN FAILURE with anything"]),
            "story",
            &[row],
        );
        let case = &cases[0];
        assert_eq!(case.test_case_id, "TC_AUTH_002");
        assert_eq!(case.steps, ["Open page", "Type bad password", "Verify error"]);
        assert_eq!(case.sample_data, DEFAULT_TEST_DATA);
        assert_eq!(case.preconditions, DEFAULT_PRECONDITIONS);
    }

    #[test]
    fn reused_row_without_steps_gets_generated_steps() {
        let mut row = FieldMap::new();
        row.insert("Test Case Name".into(), "Search catalogue by keyword".into());
        let cases = elaborate(&names(&["Search catalogue"]), "story", &[row]);
        assert_eq!(cases[0].test_case_id, "TC_STEP_001");
        assert_eq!(cases[0].steps, to_steps(SEARCH_STEPS));
        assert_eq!(cases[0].category, Category::General);
    }

    #[test]
    fn every_case_has_steps() {
        let list = names(&["a", "login", "password", "find it", "signup", "ui"]);
        for case in elaborate(&list, "", &[]) {
            assert!(!case.steps.is_empty(), "{} has no steps", case.name);
        }
    }

    #[test]
    fn story_reference_truncates_at_100_chars() {
        assert_eq!(story_reference("short"), "short");
        let exact = "x".repeat(100);
        assert_eq!(story_reference(&exact), exact);
        let long = "é".repeat(120);
        let reference = story_reference(&long);
        assert!(reference.ends_with("..."));
        assert_eq!(reference.chars().count(), 103);
    }

    #[test]
    fn step_rows_number_and_annotate_steps() {
        let case = generate_case("Verify successful login", "story", 1);
        let rows = step_rows(std::slice::from_ref(&case), "story");
        assert_eq!(rows.len(), case.steps.len());
        assert_eq!(rows[0].step_id, "STEP_TC_STEP_001_01");
        assert_eq!(rows[0].step_type, StepType::Navigation);
        assert_eq!(rows[0].expected_result, "Step 1 should be completed successfully");
        let last = rows.last().unwrap();
        assert_eq!(last.step_number, 6);
        assert_eq!(last.expected_result, case.expected_result);
    }

    #[test]
    fn login_story_flows_from_classification_to_step_rows() {
        let story = "As a user, I want to login to the application";
        let analysis = classify_story(story);
        assert_eq!(analysis.category, Category::Authentication);
        assert_eq!(analysis.priority, Level::High);

        let synthesized = synthesize_test_cases(analysis.category, story, 1);
        let ids: Vec<_> = synthesized.iter().map(|c| c.test_case_id.as_str()).collect();
        assert_eq!(ids, ["TC_AUTH_001", "TC_AUTH_002", "TC_AUTH_003", "TC_AUTH_004"]);
        assert!(synthesized.iter().all(|c| c.category == Category::Authentication));

        let list: Vec<String> = synthesized.iter().map(|c| c.name.clone()).collect();
        let cases = elaborate(&list, story, &[]);
        let ids: Vec<_> = cases.iter().map(|c| c.test_case_id.as_str()).collect();
        assert_eq!(ids, ["TC_STEP_001", "TC_STEP_002", "TC_STEP_003", "TC_STEP_004"]);
        let categories: Vec<_> = cases.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            [
                Category::Authentication,
                Category::Authentication,
                Category::Authentication,
                Category::General,
            ]
        );

        let valid_login = &cases[0];
        assert_eq!(valid_login.name, "Verify successful login with valid credentials");
        assert!((5..=6).contains(&valid_login.steps.len()));

        let rows = step_rows(std::slice::from_ref(valid_login), story);
        assert_eq!(rows.first().unwrap().step_type, StepType::Navigation);
        let last = rows.last().unwrap();
        assert_eq!(last.step_type, StepType::Verification);
        assert_eq!(last.step_id, "STEP_TC_STEP_001_06");
        assert_eq!(last.expected_result, valid_login.expected_result);

        let all_rows = step_rows(&cases, story);
        let total: usize = cases.iter().map(|c| c.steps.len()).sum();
        assert_eq!(all_rows.len(), total);
        let invalid_last = all_rows
            .iter()
            .rfind(|row| row.test_case_id == "TC_STEP_002")
            .unwrap();
        assert_eq!(invalid_last.step_type, StepType::Verification);
        assert_eq!(invalid_last.description, "Verify user remains on login page");
    }
}
