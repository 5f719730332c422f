use serde::{Deserialize, Serialize};

pub const DEFAULT_APPLICATION: &str = "Application";

/// CSS selectors for the four UI roles the generated tests touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selectors {
    pub username_field: String,
    pub password_field: String,
    pub login_button: String,
    pub dashboard: String,
}

impl Selectors {
    pub fn new(username_field: &str, password_field: &str, login_button: &str, dashboard: &str) -> Self {
        Self {
            username_field: username_field.to_string(),
            password_field: password_field.to_string(),
            login_button: login_button.to_string(),
            dashboard: dashboard.to_string(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new("#username", "#password", "#loginBtn", ".dashboard")
    }
}

/// Values mined from a user story for code generation. Recomputed per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContext {
    pub base_url: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "application")]
    pub application_name: String,
    pub features: Vec<String>,
    pub selectors: Selectors,
}

impl Default for ExtractedContext {
    fn default() -> Self {
        Self {
            base_url: "https://example.com".to_string(),
            username: "testuser@example.com".to_string(),
            password: "Test@123456".to_string(),
            application_name: DEFAULT_APPLICATION.to_string(),
            features: Vec::new(),
            selectors: Selectors::default(),
        }
    }
}

impl ExtractedContext {
    pub fn has_default_application(&self) -> bool {
        self.application_name == DEFAULT_APPLICATION
    }
}
