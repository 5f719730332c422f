//! Mines a user story for the values a generated test needs: base URL,
//! credentials, application name, feature phrases and UI selectors.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::context::{ExtractedContext, Selectors};
use crate::domain::user_story::text_length;

struct KnownApplication {
    host_fragment: &'static str,
    name: &'static str,
    username: &'static str,
    password: &'static str,
    selectors: [&'static str; 4],
}

const KNOWN_APPLICATIONS: &[KnownApplication] = &[
    KnownApplication {
        host_fragment: "saucedemo",
        name: "SauceDemo",
        username: "standard_user",
        password: "secret_sauce",
        selectors: ["#user-name", "#password", "#login-button", ".inventory_list"],
    },
    KnownApplication {
        host_fragment: "demowebshop",
        name: "DemoWebShop",
        username: "testuser@tricentis.com",
        password: "TestPassword123",
        selectors: ["#Email", "#Password", ".login-button", ".header-links"],
    },
    KnownApplication {
        host_fragment: "orangehrm",
        name: "OrangeHRM",
        username: "Admin",
        password: "admin123",
        selectors: [
            "[name=\"username\"]",
            "[name=\"password\"]",
            "[type=\"submit\"]",
            ".dashboard",
        ],
    },
    KnownApplication {
        host_fragment: "automationexercise",
        name: "AutomationExercise",
        username: "testuser@automation.com",
        password: "TestPass123",
        selectors: [
            "[data-qa=\"login-email\"]",
            "[data-qa=\"login-password\"]",
            "[data-qa=\"login-button\"]",
            ".nav",
        ],
    },
    KnownApplication {
        host_fragment: "parabank",
        name: "ParaBank",
        username: "john",
        password: "demo",
        selectors: [
            "[name=\"username\"]",
            "[name=\"password\"]",
            "[type=\"submit\"]",
            ".account",
        ],
    },
];

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s),]+").expect("valid url regex"));

static APPLICATION_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:on|in|to)\s+([A-Z][a-zA-Z\s]+)(?:\s+application|\s+app|\s+website|\s+platform)",
        r"(?i)(?:login|access|use)\s+([A-Z][a-zA-Z\s]+)",
        r"(?i)([A-Z][a-zA-Z\s]+)\s+(?:system|portal|dashboard)",
        r"(?i)test\s+([a-zA-Z\s]+)\s+functionality",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid application regex"))
    .collect()
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:username|user|email)[\s:=]+([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})")
        .expect("valid email regex")
});

static USERNAME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:username|user)[\s:=]+([a-zA-Z0-9._-]+)",
        r"(?i)with\s+user\s+([a-zA-Z0-9._-]+)",
        r"(?i)as\s+([a-zA-Z0-9._-]+)\s+user",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid username regex"))
    .collect()
});

static PASSWORD_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:password|pass)[\s:=]+([^\s,]+)",
        r"(?i)with\s+password\s+([^\s,]+)",
        r"(?i)pass(?:word)?:\s*([^\s,]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid password regex"))
    .collect()
});

static FEATURE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:want to|need to|able to)\s+([^,.]+)",
        r"(?i)(?:login|search|create|update|delete|view|manage|access|add|select|buy|purchase|checkout)\s+([^,.]+)",
        r"(?i)test\s+([^,.]+)\s+functionality",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid feature regex"))
    .collect()
});

const EMAIL_USERNAME_SELECTOR: &str = "[type=\"email\"], #email, input[name=\"email\"]";

pub fn extract_context(story: &str) -> ExtractedContext {
    let lower = story.to_lowercase();
    let mut context = ExtractedContext::default();

    match URL_RE.find(story) {
        Some(found) => apply_url(&mut context, found.as_str()),
        None => {
            if let Some(name) = first_capture(&APPLICATION_RES, story) {
                context.application_name = name.trim().to_string();
            }
        }
    }

    apply_username(&mut context, story, &lower);
    apply_password(&mut context, story, &lower);
    context.features = extract_features(story);
    apply_selectors(&mut context, &lower);

    context
}

fn apply_url(context: &mut ExtractedContext, raw: &str) {
    context.base_url = raw.to_string();

    let Ok(parsed) = Url::parse(raw) else {
        tracing::debug!(url = raw, "Could not parse URL in user story");
        return;
    };
    let Some(host) = parsed.host_str() else {
        return;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    if let Some(label) = host.split('.').next() {
        context.application_name = label.to_string();
    }

    if let Some(known) = KNOWN_APPLICATIONS
        .iter()
        .find(|known| host.contains(known.host_fragment))
    {
        let [username_field, password_field, login_button, dashboard] = known.selectors;
        context.application_name = known.name.to_string();
        context.username = known.username.to_string();
        context.password = known.password.to_string();
        context.selectors = Selectors::new(username_field, password_field, login_button, dashboard);
    }
}

fn first_capture<'a>(patterns: &[Regex], text: &'a str) -> Option<&'a str> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

fn role_address(role: &str, context: &ExtractedContext) -> String {
    if context.application_name.eq_ignore_ascii_case("application") {
        format!("{}@example.com", role)
    } else {
        format!("{}@{}.com", role, context.application_name.to_lowercase())
    }
}

fn apply_username(context: &mut ExtractedContext, story: &str, lower: &str) {
    if let Some(email) = EMAIL_RE.captures(story).and_then(|c| c.get(1)) {
        context.username = email.as_str().to_string();
    } else if lower.contains("admin") {
        context.username = role_address("admin", context);
    } else if lower.contains("manager") {
        context.username = role_address("manager", context);
    }

    // A capture cut short by `@` is the local part of an address, not a name.
    for pattern in USERNAME_RES.iter() {
        let Some(capture) = pattern.captures(story).and_then(|c| c.get(1)) else {
            continue;
        };
        if story[capture.end()..].starts_with('@') {
            continue;
        }
        context.username = capture.as_str().to_string();
        break;
    }
}

fn apply_password(context: &mut ExtractedContext, story: &str, lower: &str) {
    if let Some(password) = first_capture(&PASSWORD_RES, story) {
        context.password = password.to_string();
        return;
    }

    if lower.contains("admin") {
        context.password = "Admin@123".to_string();
    } else if lower.contains("manager") {
        context.password = "Manager@123".to_string();
    } else if context.application_name == "SauceDemo" {
        context.password = "secret_sauce".to_string();
    } else if context.application_name == "OrangeHRM" {
        context.password = "admin123".to_string();
    }
}

/// Captured phrases of 4 to 49 characters, first occurrence kept.
fn extract_features(story: &str) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();
    for pattern in FEATURE_RES.iter() {
        for captures in pattern.captures_iter(story) {
            let Some(phrase) = captures.get(1) else {
                continue;
            };
            let phrase = phrase.as_str().trim();
            let length = text_length(phrase);
            if length > 3 && length < 50 && !features.iter().any(|f| f == phrase) {
                features.push(phrase.to_string());
            }
        }
    }
    features
}

fn apply_selectors(context: &mut ExtractedContext, lower: &str) {
    if !(lower.contains("login") || lower.contains("authenticate")) {
        return;
    }
    if lower.contains("email") {
        context.selectors.username_field = EMAIL_USERNAME_SELECTOR.to_string();
    }
    if !context.has_default_application() {
        return;
    }
    if lower.contains("amazon") || lower.contains("ecommerce") {
        context.selectors.username_field = "#ap_email, [name=\"email\"]".to_string();
        context.selectors.password_field = "#ap_password, [name=\"password\"]".to_string();
        context.selectors.login_button = "#signInSubmit, [type=\"submit\"]".to_string();
    } else if lower.contains("google") {
        context.selectors.username_field = "[type=\"email\"]".to_string();
        context.selectors.password_field = "[type=\"password\"]".to_string();
        context.selectors.login_button = "#passwordNext, [type=\"submit\"]".to_string();
    }
}
