//! Renders a JUnit 5 + Playwright Java source file from detailed test cases.

use chrono::{DateTime, Utc};

use crate::domain::clock::file_timestamp;
use crate::domain::context::ExtractedContext;
use crate::domain::test_case::TestCase;

mod naming;
mod snippets;

use naming::{class_name, comment_safe, java_string, sanitize_identifier};
use snippets::{render_step, single_line};

const PACKAGE: &str = "com.qa.tests";
const BODY_INDENT: &str = "            ";

const IMPORTS: &[&str] = &[
    "com.microsoft.playwright.*",
    "com.microsoft.playwright.options.*",
    "org.junit.jupiter.api.*",
    "org.opentest4j.AssertionFailedError",
    "java.nio.file.Paths",
    "java.time.LocalDateTime",
    "java.time.format.DateTimeFormatter",
];

#[derive(Debug, Clone)]
pub struct GeneratedSource {
    pub class_name: String,
    pub code: String,
}

pub fn render_automation_source(
    cases: &[TestCase],
    context: &ExtractedContext,
    story: &str,
    generated_at: &DateTime<Utc>,
) -> GeneratedSource {
    let class_name = class_name(&file_timestamp(generated_at));
    let features = context.features.join(", ");

    let mut code = String::new();
    code.push_str(&format!("package {};\n\n", PACKAGE));
    for import in IMPORTS {
        code.push_str(&format!("import {};\n", import));
    }
    code.push_str("import static org.junit.jupiter.api.Assertions.*;\n\n");

    code.push_str("/**\n");
    code.push_str(" * Automated test suite\n");
    code.push_str(&format!(" * Generated from user story: {}\n", comment_safe(story)));
    code.push_str(" *\n");
    code.push_str(&format!(" * Application: {}\n", comment_safe(&context.application_name)));
    code.push_str(&format!(" * Base URL: {}\n", comment_safe(&context.base_url)));
    code.push_str(&format!(" * Test user: {}\n", comment_safe(&context.username)));
    code.push_str(&format!(
        " * Generated on: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    code.push_str(" *\n");
    code.push_str(&format!(" * Features to test: {}\n", comment_safe(&features)));
    code.push_str(" */\n");
    code.push_str("@TestMethodOrder(MethodOrderer.OrderAnnotation.class)\n");
    code.push_str(&format!("public class {} {{\n\n", class_name));

    code.push_str(&render_fields(context));
    code.push_str(&render_lifecycle(&features));

    for (position, case) in cases.iter().enumerate() {
        code.push_str(&render_test_method(case, position + 1, context));
    }

    code.push_str("}\n");

    GeneratedSource { class_name, code }
}

fn render_fields(context: &ExtractedContext) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "    private static final String BASE_URL = {};\n",
        java_string(&context.base_url)
    ));
    out.push_str(&format!(
        "    private static final String USERNAME = {};\n",
        java_string(&context.username)
    ));
    out.push_str(&format!(
        "    private static final String PASSWORD = {};\n",
        java_string(&context.password)
    ));
    out.push_str(&format!(
        "    private static final String APPLICATION_NAME = {};\n\n",
        java_string(&context.application_name)
    ));
    out.push_str("    private static Playwright playwright;\n");
    out.push_str("    private static Browser browser;\n");
    out.push_str("    private BrowserContext context;\n");
    out.push_str("    private Page page;\n\n");
    out
}

fn render_lifecycle(features: &str) -> String {
    let mut out = String::new();
    out.push_str("    @BeforeAll\n");
    out.push_str("    static void setUpClass() {\n");
    out.push_str("        System.out.println(\"Starting test suite for \" + APPLICATION_NAME);\n");
    out.push_str("        System.out.println(\"Base URL: \" + BASE_URL);\n");
    out.push_str("        System.out.println(\"Test user: \" + USERNAME);\n");
    out.push_str(&format!(
        "        System.out.println({});\n",
        java_string(&format!("Test features: {}", features))
    ));
    out.push_str("        playwright = Playwright.create();\n");
    out.push_str("        browser = playwright.chromium().launch(new BrowserType.LaunchOptions()\n");
    out.push_str("            .setHeadless(false)\n");
    out.push_str("            .setSlowMo(1000));\n");
    out.push_str("    }\n\n");

    out.push_str("    @BeforeEach\n");
    out.push_str("    void setUp() {\n");
    out.push_str("        context = browser.newContext(new Browser.NewContextOptions()\n");
    out.push_str("            .setViewportSize(1920, 1080));\n");
    out.push_str("        page = context.newPage();\n");
    out.push_str("        page.onRequest(request ->\n");
    out.push_str("            System.out.println(\"Request: \" + request.method() + \" \" + request.url()));\n");
    out.push_str("        page.onResponse(response ->\n");
    out.push_str("            System.out.println(\"Response: \" + response.status() + \" \" + response.url()));\n");
    out.push_str("    }\n\n");

    out.push_str("    @AfterEach\n");
    out.push_str("    void tearDown() {\n");
    out.push_str("        if (context != null) {\n");
    out.push_str("            context.close();\n");
    out.push_str("        }\n");
    out.push_str("    }\n\n");

    out.push_str("    @AfterAll\n");
    out.push_str("    static void tearDownClass() {\n");
    out.push_str("        if (browser != null) {\n");
    out.push_str("            browser.close();\n");
    out.push_str("        }\n");
    out.push_str("        if (playwright != null) {\n");
    out.push_str("            playwright.close();\n");
    out.push_str("        }\n");
    out.push_str("        System.out.println(\"Test suite completed\");\n");
    out.push_str("    }\n\n");

    out.push_str("    private void takeScreenshot(String testName) {\n");
    out.push_str("        try {\n");
    out.push_str("            String timestamp = LocalDateTime.now().format(DateTimeFormatter.ofPattern(\"yyyy-MM-dd_HH-mm-ss\"));\n");
    out.push_str("            String screenshotPath = \"screenshots/\" + testName + \"_\" + timestamp + \".png\";\n");
    out.push_str("            page.screenshot(new Page.ScreenshotOptions().setPath(Paths.get(screenshotPath)));\n");
    out.push_str("            System.out.println(\"Screenshot saved: \" + screenshotPath);\n");
    out.push_str("        } catch (Exception e) {\n");
    out.push_str("            System.out.println(\"Could not take screenshot: \" + e.getMessage());\n");
    out.push_str("        }\n");
    out.push_str("    }\n");
    out
}

fn render_steps(case: &TestCase, context: &ExtractedContext) -> String {
    let mut out = String::new();
    for (position, step) in case.steps.iter().enumerate() {
        out.push_str(&format!(
            "{}// Step {}: {}\n",
            BODY_INDENT,
            position + 1,
            single_line(step)
        ));
        let (_, lines) = render_step(step, context);
        for line in lines {
            out.push_str(BODY_INDENT);
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "{}takeScreenshot({});\n",
        BODY_INDENT,
        java_string(&sanitize_identifier(&case.test_case_id))
    ));
    out
}

fn render_test_method(case: &TestCase, order: usize, context: &ExtractedContext) -> String {
    let method_name = format!("test{}", sanitize_identifier(&case.test_case_id));
    let description = if case.name.trim().is_empty() {
        format!("Test Case {}", order)
    } else {
        case.name.clone()
    };

    let mut out = String::new();
    out.push_str("\n    /**\n");
    out.push_str(&format!("     * {}\n", comment_safe(&description)));
    out.push_str(&format!("     * Test Case ID: {}\n", comment_safe(&case.test_case_id)));
    out.push_str(&format!("     * Category: {}\n", case.category));
    out.push_str(&format!("     * Priority: {}\n", case.priority));
    out.push_str("     *\n");
    out.push_str(&format!("     * Preconditions: {}\n", comment_safe(&case.preconditions)));
    out.push_str(&format!("     * Expected Results: {}\n", comment_safe(&case.expected_result)));
    out.push_str("     */\n");
    out.push_str("    @Test\n");
    out.push_str(&format!("    @Order({})\n", order));
    out.push_str(&format!("    @DisplayName({})\n", java_string(&description)));
    out.push_str(&format!("    void {}() throws Exception {{\n", method_name));
    out.push_str("        try {\n");
    out.push_str(&format!(
        "            System.out.println({});\n",
        java_string(&format!("Starting test: {}", description))
    ));
    out.push_str(&format!(
        "            System.out.println({});\n",
        java_string(&format!("Test Case ID: {}", case.test_case_id))
    ));
    out.push_str(&format!(
        "            System.out.println({});\n\n",
        java_string(&format!("Category: {} | Priority: {}", case.category, case.priority))
    ));
    out.push_str(&render_steps(case, context));
    out.push('\n');
    out.push_str(&format!(
        "            System.out.println({});\n",
        java_string(&format!("Test completed: {}", description))
    ));

    let failures = [
        ("PlaywrightException", "Playwright error", "PLAYWRIGHT_ERROR"),
        ("AssertionFailedError", "Assertion failed", "ASSERTION_FAILED"),
        ("Exception", "Unexpected error", "FAILED"),
    ];
    for (exception, label, suffix) in failures {
        out.push_str(&format!("        }} catch ({} e) {{\n", exception));
        out.push_str(&format!(
            "            System.err.println({});\n",
            java_string(&format!("{} in test: {}", label, description))
        ));
        out.push_str("            System.err.println(\"Error: \" + e.getMessage());\n");
        out.push_str(&format!(
            "            takeScreenshot({});\n",
            java_string(&format!("{}_{}", method_name, suffix))
        ));
        out.push_str("            throw e;\n");
    }
    out.push_str("        }\n");
    out.push_str("    }\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user_story::{Category, Level};
    use chrono::TimeZone;

    fn case(id: &str, name: &str, steps: &[&str]) -> TestCase {
        TestCase {
            test_case_id: id.to_string(),
            name: name.to_string(),
            category: Category::Authentication,
            priority: Level::High,
            preconditions: "App is up".to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            expected_result: "Dashboard shown".to_string(),
            sample_data: String::new(),
        }
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn renders_one_ordered_method_per_case() {
        let cases = vec![
            case("TC_AUTH_001", "Login works", &["Navigate to the login page", "Click the Login button"]),
            case("TC_AUTH_002", "Login fails", &["Verify error message"]),
        ];
        let source = render_automation_source(
            &cases,
            &ExtractedContext::default(),
            "As a user I want to login",
            &instant(),
        );

        assert_eq!(source.class_name, "AutomationTest_2026_03_04_05_06_07_000");
        assert!(source.code.starts_with("package com.qa.tests;"));
        assert!(source.code.contains("public class AutomationTest_2026_03_04_05_06_07_000 {"));
        assert!(source.code.contains("private static final String BASE_URL = \"https://example.com\";"));

        let first = source.code.find("void testTC_AUTH_001()").unwrap();
        let second = source.code.find("void testTC_AUTH_002()").unwrap();
        assert!(first < second);
        assert!(source.code.contains("@Order(2)"));
        assert!(source.code.contains("// Step 2: Click the Login button"));
        assert!(source.code.contains("takeScreenshot(\"TC_AUTH_001\");"));
        assert!(source.code.trim_end().ends_with('}'));
    }

    #[test]
    fn story_quotes_cannot_break_literals_or_comments() {
        let cases = vec![case("TC-1", "Say \"hi\" */ now", &["Do a thing"])];
        let source = render_automation_source(
            &cases,
            &ExtractedContext::default(),
            "Story with */ and \"quotes\"",
            &instant(),
        );
        assert!(source.code.contains("@DisplayName(\"Say \\\"hi\\\" */ now\")"));
        assert!(source.code.contains(" * Say \"hi\" * / now"));
        assert!(source.code.contains("void testTC_1()"));
        assert!(source
            .code
            .contains(" * Generated from user story: Story with * / and \"quotes\""));
    }

    #[test]
    fn header_lists_features() {
        let mut context = ExtractedContext::default();
        context.features = vec!["view orders".into(), "add items".into()];
        let source = render_automation_source(&[], &context, "story", &instant());
        assert!(source.code.contains(" * Features to test: view orders, add items"));
        assert!(source.code.contains(" * Generated on: 2026-03-04 05:06:07 UTC"));
    }
}
