use once_cell::sync::Lazy;
use regex::Regex;

use super::naming::java_string;
use crate::domain::context::ExtractedContext;

const ERROR_SELECTOR: &str = ".error-message, .alert-danger, [role='alert'], .error";
const SEARCH_SELECTOR: &str = "input[type='search'], #search, .search-input, [placeholder*='search']";
const DEFAULT_SEARCH_TERM: &str = "test product";

const FALLBACK_RULE: &str = "fallback";

static QUOTED_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid quoted label regex"));
static QUOTED_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted text regex"));

pub(super) struct StepInput<'a> {
    pub(super) step: &'a str,
    pub(super) lower: &'a str,
    pub(super) context: &'a ExtractedContext,
}

impl StepInput<'_> {
    fn has(&self, keyword: &str) -> bool {
        self.lower.contains(keyword)
    }

    fn has_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| self.lower.contains(keyword))
    }
}

pub(super) struct SnippetRule {
    pub(super) name: &'static str,
    matches: fn(&StepInput) -> bool,
    render: fn(&StepInput) -> Vec<String>,
}

/// Ordered; the first matching rule renders the step. Steps no rule
/// matches go through `render_fallback`.
const SNIPPET_RULES: &[SnippetRule] = &[
    SnippetRule {
        name: "navigate",
        matches: |s| s.has_any(&["navigate", "open", "launch"]),
        render: render_navigate,
    },
    SnippetRule {
        name: "enter-username",
        matches: |s| s.has("enter") && s.has_any(&["username", "email", "user"]),
        render: |s| {
            let field = java_string(&s.context.selectors.username_field);
            vec![
                format!(
                    "page.waitForSelector({}, new Page.WaitForSelectorOptions().setTimeout(10000));",
                    field
                ),
                format!("page.fill({}, USERNAME);", field),
                "System.out.println(\"Entered username: \" + USERNAME);".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "enter-password",
        matches: |s| s.has("enter") && s.has("password"),
        render: |s| {
            let field = java_string(&s.context.selectors.password_field);
            vec![
                format!(
                    "page.waitForSelector({}, new Page.WaitForSelectorOptions().setTimeout(10000));",
                    field
                ),
                format!("page.fill({}, PASSWORD);", field),
                "System.out.println(\"Entered password\");".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "click-login",
        matches: |s| s.has("click") && s.has_any(&["login", "sign in"]),
        render: |s| {
            vec![
                format!("page.click({});", java_string(&s.context.selectors.login_button)),
                "page.waitForLoadState(LoadState.NETWORKIDLE);".to_string(),
                "System.out.println(\"Clicked login button\");".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "verify-success",
        matches: |s| s.has("verify") && s.has_any(&["login", "dashboard", "success"]),
        render: |s| {
            let dashboard = java_string(&s.context.selectors.dashboard);
            vec![
                format!(
                    "page.waitForSelector({}, new Page.WaitForSelectorOptions().setTimeout(15000));",
                    dashboard
                ),
                format!(
                    "assertTrue(page.isVisible({}), \"Dashboard should be visible after login\");",
                    dashboard
                ),
                "System.out.println(\"Verified login, dashboard is visible\");".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "verify-error",
        matches: |s| s.has("verify") && s.has("error"),
        render: |_| {
            let selector = java_string(ERROR_SELECTOR);
            vec![
                format!(
                    "page.waitForSelector({}, new Page.WaitForSelectorOptions().setTimeout(10000));",
                    selector
                ),
                format!(
                    "assertTrue(page.isVisible({}), \"Error message should be displayed\");",
                    selector
                ),
                format!("String errorText = page.textContent({});", selector),
                "System.out.println(\"Error message displayed: \" + errorText);".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "search",
        matches: |s| s.has("search"),
        render: |s| {
            let term = s
                .context
                .features
                .iter()
                .find(|feature| feature.contains("search"))
                .map(String::as_str)
                .unwrap_or(DEFAULT_SEARCH_TERM);
            let selector = java_string(SEARCH_SELECTOR);
            vec![
                format!("page.waitForSelector({});", selector),
                format!("page.fill({}, {});", selector, java_string(term)),
                format!("page.press({}, \"Enter\");", selector),
                "page.waitForLoadState(LoadState.NETWORKIDLE);".to_string(),
                format!("System.out.println({});", java_string(&format!("Searched for: {}", term))),
            ]
        },
    },
    SnippetRule {
        name: "add-to-cart",
        matches: |s| s.has("add") && s.has_any(&["cart", "basket"]),
        render: |_| {
            let selector = java_string("button:has-text('Add to Cart'), .add-to-cart, .btn-add-cart");
            vec![
                format!("page.waitForSelector({});", selector),
                format!("page.click({});", selector),
                "System.out.println(\"Added item to cart\");".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "select-product",
        matches: |s| s.has("select") && s.has("product"),
        render: |_| {
            vec![
                format!(
                    "page.waitForSelector({});",
                    java_string(".product-item, .product, [data-product-id]")
                ),
                format!(
                    "page.click({});",
                    java_string(".product-item:first-child, .product:first-child, [data-product-id]:first-child")
                ),
                "System.out.println(\"Selected product\");".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "click-button",
        matches: |s| s.has("click") && s.has("button"),
        render: render_click_button,
    },
    SnippetRule {
        name: "logout",
        matches: |s| s.has_any(&["logout", "sign out"]),
        render: |_| {
            vec![
                format!(
                    "page.click({});",
                    java_string(".logout, #logout, [href*='logout'], button:has-text('Logout')")
                ),
                "page.waitForLoadState(LoadState.NETWORKIDLE);".to_string(),
                "System.out.println(\"Logged out\");".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "wait",
        matches: |s| s.has_any(&["wait", "load"]),
        render: |_| {
            vec![
                "page.waitForLoadState(LoadState.NETWORKIDLE);".to_string(),
                "Thread.sleep(2000);".to_string(),
                "System.out.println(\"Waited for page to load\");".to_string(),
            ]
        },
    },
    SnippetRule {
        name: "verify-text",
        matches: |s| s.has("verify") && s.has("text"),
        render: |s| match QUOTED_TEXT.captures(s.step).and_then(|c| c.get(1)) {
            Some(text) => {
                let text = text.as_str();
                vec![
                    format!(
                        "assertTrue(page.textContent(\"body\").contains({}), {});",
                        java_string(text),
                        java_string(&format!("Page should contain text: {}", text))
                    ),
                    format!("System.out.println({});", java_string(&format!("Verified text: {}", text))),
                ]
            }
            None => vec!["System.out.println(\"Verified page content\");".to_string()],
        },
    },
    SnippetRule {
        name: "generic-assert",
        matches: |s| s.has_any(&["assert", "verify"]),
        render: |s| {
            vec![
                format!("// Custom verification for: {}", single_line(s.step)),
                "assertTrue(page.isVisible(\"body\"), \"Page should be loaded\");".to_string(),
                format!("System.out.println({});", java_string(&format!("Verified: {}", s.step))),
            ]
        },
    },
];

fn render_fallback(s: &StepInput) -> Vec<String> {
    vec![
        format!("// Executing: {}", single_line(s.step)),
        "Thread.sleep(1000);".to_string(),
        format!("System.out.println({});", java_string(&format!("Executed step: {}", s.step))),
    ]
}

fn render_navigate(s: &StepInput) -> Vec<String> {
    let target = if s.has("login") {
        "BASE_URL + \"/login\""
    } else if s.has_any(&["dashboard", "home"]) {
        "BASE_URL + \"/dashboard\""
    } else {
        "BASE_URL"
    };
    vec![
        format!("page.navigate({});", target),
        "page.waitForLoadState(LoadState.NETWORKIDLE);".to_string(),
        "System.out.println(\"Navigated to: \" + page.url());".to_string(),
    ]
}

fn render_click_button(s: &StepInput) -> Vec<String> {
    match QUOTED_LABEL.captures(s.step).and_then(|c| c.get(1)) {
        Some(label) => {
            let label = label.as_str();
            vec![
                format!(
                    "page.click({});",
                    java_string(&format!("button:has-text('{0}'), [value='{0}']", label))
                ),
                format!("System.out.println({});", java_string(&format!("Clicked button: {}", label))),
            ]
        }
        None => vec![
            "page.click(\"button, [type='button'], [type='submit']\");".to_string(),
            "System.out.println(\"Clicked button\");".to_string(),
        ],
    }
}

/// Text safe to place after `//`.
pub(super) fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Picks the first matching rule for `step` and renders its statements.
pub(super) fn render_step(step: &str, context: &ExtractedContext) -> (&'static str, Vec<String>) {
    let lower = step.to_lowercase();
    let input = StepInput {
        step,
        lower: &lower,
        context,
    };
    match SNIPPET_RULES.iter().find(|rule| (rule.matches)(&input)) {
        Some(rule) => (rule.name, (rule.render)(&input)),
        None => (FALLBACK_RULE, render_fallback(&input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for(step: &str) -> &'static str {
        render_step(step, &ExtractedContext::default()).0
    }

    #[test]
    fn rules_match_in_order() {
        assert_eq!(rule_for("Navigate to the login page"), "navigate");
        assert_eq!(rule_for("Enter valid username/email in the username field"), "enter-username");
        assert_eq!(rule_for("Enter valid password in the password field"), "enter-password");
        assert_eq!(rule_for("Click on the Login/Sign In button"), "click-login");
        assert_eq!(rule_for("Verify successful redirection to dashboard/home page"), "verify-success");
        assert_eq!(rule_for("Verify appropriate error message is displayed"), "verify-error");
        assert_eq!(rule_for("Enter search keywords in the search box"), "search");
        assert_eq!(rule_for("Add the item to the basket"), "add-to-cart");
        assert_eq!(rule_for("Select a product from the list"), "select-product");
        assert_eq!(rule_for("Click the 'Submit' button"), "click-button");
        assert_eq!(rule_for("Logout from the application"), "logout");
        assert_eq!(rule_for("Wait for results to appear"), "wait");
        assert_eq!(rule_for("Verify the text \"Welcome\" appears"), "verify-text");
        assert_eq!(rule_for("Verify system state remains consistent"), "generic-assert");
        assert_eq!(rule_for("Repeat attempts 5 times"), "fallback");
    }

    #[test]
    fn unmatched_step_is_rendered_by_fallback() {
        let step = "Repeat login attempts 5 times\nwith wrong password";
        let (rule, lines) = render_step(step, &ExtractedContext::default());
        assert_eq!(rule, "fallback");
        assert_eq!(
            lines,
            [
                "// Executing: Repeat login attempts 5 times with wrong password".to_string(),
                "Thread.sleep(1000);".to_string(),
                "System.out.println(\"Executed step: Repeat login attempts 5 times\\nwith wrong password\");"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn navigate_picks_target_path() {
        let (_, lines) = render_step("Navigate to the login page", &ExtractedContext::default());
        assert_eq!(lines[0], "page.navigate(BASE_URL + \"/login\");");
        let (_, lines) = render_step("Open the home page", &ExtractedContext::default());
        assert_eq!(lines[0], "page.navigate(BASE_URL + \"/dashboard\");");
    }

    #[test]
    fn selectors_with_quotes_are_escaped() {
        let mut context = ExtractedContext::default();
        context.selectors.username_field = "[name=\"username\"]".to_string();
        let (_, lines) = render_step("Enter the username", &context);
        assert_eq!(lines[1], "page.fill(\"[name=\\\"username\\\"]\", USERNAME);");
    }

    #[test]
    fn quoted_button_label_is_used() {
        let (_, lines) = render_step("Click the \"Save\" button", &ExtractedContext::default());
        assert_eq!(
            lines[0],
            "page.click(\"button:has-text('Save'), [value='Save']\");"
        );
    }

    #[test]
    fn search_term_comes_from_features() {
        let mut context = ExtractedContext::default();
        context.features = vec!["view orders".into(), "search for shoes".into()];
        let (_, lines) = render_step("Perform search", &context);
        assert!(lines[1].ends_with(", \"search for shoes\");"));
    }
}
