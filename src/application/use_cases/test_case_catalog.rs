//! Hand-authored test-case skeletons per story category.

use crate::domain::test_case::TestCase;
use crate::domain::user_story::{Category, Level};

const STORY_PLACEHOLDER: &str = "{story}";

struct CatalogEntry {
    name: &'static str,
    priority: Level,
    preconditions: &'static str,
    steps: &'static [&'static str],
    expected_result: &'static str,
    sample_data: &'static str,
}

struct Catalog {
    id_prefix: &'static str,
    category: Category,
    entries: &'static [CatalogEntry],
}

const AUTHENTICATION: Catalog = Catalog {
    id_prefix: "TC_AUTH_",
    category: Category::Authentication,
    entries: &[
        CatalogEntry {
            name: "Verify successful login with valid credentials",
            priority: Level::High,
            preconditions: "User has a valid registered account, Application is accessible",
            steps: &[
                "Navigate to the login page",
                "Enter valid username/email in the username field",
                "Enter valid password in the password field",
                "Click on the Login/Sign In button",
                "Verify successful redirection to dashboard/home page",
            ],
            expected_result: "User should be successfully logged in and redirected to the main application dashboard",
            sample_data: "Valid username: testuser@example.com, Valid password: Test@123456",
        },
        CatalogEntry {
            name: "Verify login failure with invalid credentials",
            priority: Level::High,
            preconditions: "Application is accessible, Login page is available",
            steps: &[
                "Navigate to the login page",
                "Enter invalid username/email in the username field",
                "Enter invalid password in the password field",
                "Click on the Login/Sign In button",
                "Verify appropriate error message is displayed",
            ],
            expected_result: "System should display error message \"Invalid username or password\" and user should remain on login page",
            sample_data: "Invalid username: invalid@test.com, Invalid password: wrongpass123",
        },
        CatalogEntry {
            name: "Verify password field masking during input",
            priority: Level::Medium,
            preconditions: "Login page is accessible",
            steps: &[
                "Navigate to the login page",
                "Click on the password input field",
                "Type any password in the password field",
                "Verify that entered characters are masked (shown as dots or asterisks)",
                "Verify password visibility toggle functionality if available",
            ],
            expected_result: "Password characters should be masked for security, toggle should work if available",
            sample_data: "Test password: MySecretPassword123",
        },
        CatalogEntry {
            name: "Verify account lockout after multiple failed attempts",
            priority: Level::High,
            preconditions: "User account exists, Application security settings configured",
            steps: &[
                "Navigate to the login page",
                "Enter valid username but invalid password",
                "Repeat login attempts 5 times with wrong password",
                "Attempt to login with correct credentials after lockout",
                "Verify account lockout message and behavior",
            ],
            expected_result: "Account should be locked after maximum failed attempts, appropriate lockout message displayed",
            sample_data: "Valid username: testuser@example.com, Invalid password: wrongpass123",
        },
    ],
};

const SEARCH: Catalog = Catalog {
    id_prefix: "TC_SEARCH_",
    category: Category::Search,
    entries: &[
        CatalogEntry {
            name: "Verify search functionality with valid keywords",
            priority: Level::High,
            preconditions: "Application is loaded, Search functionality is accessible, Test data is available",
            steps: &[
                "Navigate to the search page/section",
                "Enter valid search keywords in search box",
                "Click search button or press Enter",
                "Verify search results are displayed",
                "Verify search results are relevant to entered keywords",
            ],
            expected_result: "Relevant search results should be displayed based on entered keywords",
            sample_data: "Search keywords: \"laptop\", \"mobile phone\", \"electronics\"",
        },
        CatalogEntry {
            name: "Verify search with partial keywords",
            priority: Level::Medium,
            preconditions: "Search functionality is available, Database contains searchable data",
            steps: &[
                "Navigate to search interface",
                "Enter partial keywords (e.g., first few characters)",
                "Verify auto-complete suggestions if available",
                "Execute search with partial keyword",
                "Verify results include items matching partial search",
            ],
            expected_result: "System should return results matching partial keywords and show auto-complete if available",
            sample_data: "Partial keywords: \"lap\", \"mob\", \"elect\"",
        },
        CatalogEntry {
            name: "Verify search with no results found",
            priority: Level::Medium,
            preconditions: "Search functionality is accessible",
            steps: &[
                "Navigate to search interface",
                "Enter search terms that have no matching results",
                "Execute the search",
                "Verify \"No results found\" message is displayed",
                "Verify suggested alternative searches if available",
            ],
            expected_result: "System should display appropriate \"No results found\" message with helpful suggestions",
            sample_data: "Non-existent search terms: \"xyzzyx\", \"nonexistentproduct123\"",
        },
        CatalogEntry {
            name: "Verify search filters and sorting functionality",
            priority: Level::Medium,
            preconditions: "Search results are available, Filter options are configured",
            steps: &[
                "Perform a search that returns multiple results",
                "Apply various filters (price, category, date, etc.)",
                "Verify filtered results match selected criteria",
                "Test different sorting options (relevance, price, date)",
                "Verify sorting works correctly",
            ],
            expected_result: "Filters should narrow down results appropriately, sorting should reorder results correctly",
            sample_data: "Search term: \"books\", Filters: price range $10-$50, category: fiction",
        },
    ],
};

const REGISTRATION: Catalog = Catalog {
    id_prefix: "TC_REG_",
    category: Category::Registration,
    entries: &[
        CatalogEntry {
            name: "Verify successful user registration with valid data",
            priority: Level::High,
            preconditions: "Registration page is accessible, Email service is working",
            steps: &[
                "Navigate to registration page",
                "Fill all mandatory fields with valid data",
                "Enter valid email address",
                "Create strong password meeting requirements",
                "Confirm password correctly",
                "Accept terms and conditions",
                "Submit registration form",
                "Verify confirmation message/email",
            ],
            expected_result: "User should be successfully registered and receive confirmation",
            sample_data: "Email: newuser@test.com, Password: NewUser@123, Name: John Doe",
        },
        CatalogEntry {
            name: "Verify registration with existing email address",
            priority: Level::High,
            preconditions: "User with test email already exists in system",
            steps: &[
                "Navigate to registration page",
                "Enter email address that already exists in system",
                "Fill other required fields with valid data",
                "Submit registration form",
                "Verify appropriate error message is displayed",
            ],
            expected_result: "System should display error message indicating email already exists",
            sample_data: "Existing email: existing@test.com",
        },
        CatalogEntry {
            name: "Verify password strength validation",
            priority: Level::Medium,
            preconditions: "Registration form has password strength requirements",
            steps: &[
                "Navigate to registration page",
                "Enter weak password (e.g., \"123456\")",
                "Verify password strength indicator shows weak",
                "Enter medium strength password",
                "Verify strength indicator updates",
                "Enter strong password meeting all criteria",
                "Verify strong password is accepted",
            ],
            expected_result: "Password strength should be validated and displayed to user in real-time",
            sample_data: "Weak: \"123456\", Medium: \"password123\", Strong: \"StrongPass@123\"",
        },
    ],
};

/// Fallback catalog. Names interpolate the story text.
const GENERIC: Catalog = Catalog {
    id_prefix: "TC_GEN_",
    category: Category::General,
    entries: &[
        CatalogEntry {
            name: "Verify {story} - positive flow",
            priority: Level::High,
            preconditions: "Application is accessible and user has necessary permissions",
            steps: &[
                "Navigate to the relevant application section",
                "Perform the action described in user story with valid inputs",
                "Verify successful completion of the action",
                "Verify appropriate success message is displayed",
                "Verify system state is updated correctly",
            ],
            expected_result: "User story requirements should be fulfilled successfully",
            sample_data: "Valid test data as per user story requirements",
        },
        CatalogEntry {
            name: "Verify {story} - error handling",
            priority: Level::Medium,
            preconditions: "Application is accessible",
            steps: &[
                "Navigate to the relevant application section",
                "Attempt to perform action with invalid inputs",
                "Verify appropriate error messages are displayed",
                "Verify system handles errors gracefully",
                "Verify system state remains consistent",
            ],
            expected_result: "System should handle errors gracefully with appropriate error messages",
            sample_data: "Invalid test data to trigger error conditions",
        },
        CatalogEntry {
            name: "Verify {story} - UI responsiveness and accessibility",
            priority: Level::Low,
            preconditions: "Application is accessible on different devices/browsers",
            steps: &[
                "Access application on desktop browser",
                "Verify UI elements are properly displayed",
                "Test on mobile device/responsive mode",
                "Verify accessibility features (keyboard navigation, screen reader compatibility)",
                "Test on different browsers (Chrome, Firefox, Safari)",
            ],
            expected_result: "Application should be responsive and accessible across different platforms",
            sample_data: "Different browsers, devices, and accessibility tools",
        },
    ],
};

fn catalog_for(category: Category) -> &'static Catalog {
    match category {
        Category::Authentication => &AUTHENTICATION,
        Category::Search => &SEARCH,
        Category::Registration => &REGISTRATION,
        Category::Payment
        | Category::UserManagement
        | Category::FileManagement
        | Category::Communication
        | Category::General => &GENERIC,
    }
}

/// Builds the catalog batch for `category`. Ids count up from `seed`,
/// zero-padded to three digits.
pub fn synthesize_test_cases(category: Category, story: &str, seed: usize) -> Vec<TestCase> {
    let catalog = catalog_for(category);
    catalog
        .entries
        .iter()
        .enumerate()
        .map(|(offset, entry)| TestCase {
            test_case_id: format!("{}{:03}", catalog.id_prefix, seed + offset),
            name: entry.name.replace(STORY_PLACEHOLDER, story),
            category: catalog.category,
            priority: entry.priority,
            preconditions: entry.preconditions.to_string(),
            steps: entry.steps.iter().map(|step| step.to_string()).collect(),
            expected_result: entry.expected_result.to_string(),
            sample_data: entry.sample_data.to_string(),
        })
        .collect()
}
