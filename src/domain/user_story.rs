use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of story categories. The string form is what lands in CSV
/// tables and JSON responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Authentication,
    Search,
    Registration,
    Payment,
    #[serde(rename = "User Management")]
    UserManagement,
    #[serde(rename = "File Management")]
    FileManagement,
    Communication,
    General,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Authentication,
        Category::Search,
        Category::Registration,
        Category::Payment,
        Category::UserManagement,
        Category::FileManagement,
        Category::Communication,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Authentication => "Authentication",
            Category::Search => "Search",
            Category::Registration => "Registration",
            Category::Payment => "Payment",
            Category::UserManagement => "User Management",
            Category::FileManagement => "File Management",
            Category::Communication => "Communication",
            Category::General => "General",
        }
    }

    /// Case-insensitive parse; unknown labels fall back to `General`.
    pub fn parse_lossy(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
            .unwrap_or(Category::General)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low/Medium/High scale shared by priority and complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }

    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Level::Low,
            "high" => Level::High,
            _ => Level::Medium,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Medium
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryAnalysis {
    pub category: Category,
    pub priority: Level,
    pub complexity: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoryRecord {
    pub id: i64,
    pub created_at: String,
    pub text: String,
    pub category: Category,
    pub priority: Level,
    pub complexity: Level,
    #[serde(default)]
    pub source: Option<String>,
}

pub fn normalize_story_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Length in UTF-16 code units. Story length thresholds are counted in
/// these, so a character outside the Basic Multilingual Plane counts twice.
pub fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_label() {
        for category in Category::ALL {
            assert_eq!(Category::parse_lossy(category.as_str()), category);
        }
        assert_eq!(Category::parse_lossy("user management"), Category::UserManagement);
        assert_eq!(Category::parse_lossy("Security"), Category::General);
    }

    #[test]
    fn category_serializes_with_spaces() {
        let json = serde_json::to_string(&Category::FileManagement).unwrap();
        assert_eq!(json, "\"File Management\"");
    }

    #[test]
    fn level_parse_defaults_to_medium() {
        assert_eq!(Level::parse_lossy("HIGH"), Level::High);
        assert_eq!(Level::parse_lossy(""), Level::Medium);
    }

    #[test]
    fn text_length_counts_utf16_units() {
        assert_eq!(text_length("login"), 5);
        assert_eq!(text_length("é"), 1);
        assert_eq!(text_length("\u{1F600}"), 2);
    }
}
