//! Keyword classifier for free-text user stories.
//!
//! Rules are scanned in order and the first rule with a matching keyword
//! decides category and priority. Complexity then goes through two length
//! and keyword overrides.

use crate::domain::user_story::{text_length, Category, Level, StoryAnalysis};

struct CategoryRule {
    category: Category,
    keywords: &'static [&'static str],
    priority: Level,
    complexity: Level,
}

const RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Authentication,
        keywords: &["login", "authenticate", "sign in"],
        priority: Level::High,
        complexity: Level::Medium,
    },
    CategoryRule {
        category: Category::Search,
        keywords: &["search", "find", "filter"],
        priority: Level::Medium,
        complexity: Level::Medium,
    },
    CategoryRule {
        category: Category::Registration,
        keywords: &["register", "signup", "create account"],
        priority: Level::High,
        complexity: Level::Medium,
    },
    CategoryRule {
        category: Category::Payment,
        keywords: &["payment", "checkout", "purchase"],
        priority: Level::High,
        complexity: Level::High,
    },
    CategoryRule {
        category: Category::UserManagement,
        keywords: &["profile", "settings", "preferences"],
        priority: Level::Medium,
        complexity: Level::Medium,
    },
    CategoryRule {
        category: Category::FileManagement,
        keywords: &["upload", "download", "file"],
        priority: Level::Medium,
        complexity: Level::High,
    },
    CategoryRule {
        category: Category::Communication,
        keywords: &["notification", "email", "alert"],
        priority: Level::Low,
        complexity: Level::Medium,
    },
];

const HIGH_COMPLEXITY_KEYWORDS: &[&str] = &["integration", "api", "database"];
const LONG_STORY_CHARS: usize = 200;
const SHORT_STORY_CHARS: usize = 50;

pub fn classify_story(text: &str) -> StoryAnalysis {
    let lower = text.to_lowercase();

    let mut analysis = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|rule| StoryAnalysis {
            category: rule.category,
            priority: rule.priority,
            complexity: rule.complexity,
        })
        .unwrap_or(StoryAnalysis {
            category: Category::General,
            priority: Level::Medium,
            complexity: Level::Medium,
        });

    let length = text_length(text);
    if length > LONG_STORY_CHARS
        || HIGH_COMPLEXITY_KEYWORDS
            .iter()
            .any(|keyword| lower.contains(keyword))
    {
        analysis.complexity = Level::High;
    } else if length < SHORT_STORY_CHARS {
        analysis.complexity = Level::Low;
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_story_is_authentication() {
        let analysis =
            classify_story("As a registered customer I want to login with my email and password");
        assert_eq!(analysis.category, Category::Authentication);
        assert_eq!(analysis.priority, Level::High);
        assert_eq!(analysis.complexity, Level::Medium);
    }

    #[test]
    fn first_matching_rule_wins() {
        // "login" outranks "search" even though both appear.
        let analysis = classify_story("Search the catalogue after I login to the shop");
        assert_eq!(analysis.category, Category::Authentication);
    }

    #[test]
    fn short_story_lowers_complexity() {
        let analysis = classify_story("I want to upload a file");
        assert_eq!(analysis.category, Category::FileManagement);
        assert_eq!(analysis.complexity, Level::Low);
    }

    #[test]
    fn api_keyword_raises_complexity_even_when_short() {
        let analysis = classify_story("Expose the api for orders");
        assert_eq!(analysis.category, Category::General);
        assert_eq!(analysis.complexity, Level::High);
    }

    #[test]
    fn long_story_raises_complexity() {
        let text = format!("As a shopper I want to pay {}", "with many details ".repeat(15));
        assert!(text.chars().count() > 200);
        let analysis = classify_story(&text);
        assert_eq!(analysis.category, Category::General);
        assert_eq!(analysis.complexity, Level::High);
    }

    #[test]
    fn communication_has_low_priority() {
        let analysis = classify_story("As a member I want a notification when my order ships today");
        assert_eq!(analysis.category, Category::Communication);
        assert_eq!(analysis.priority, Level::Low);
        assert_eq!(analysis.complexity, Level::Medium);
    }

    #[test]
    fn unmatched_story_is_general_medium() {
        let analysis = classify_story("As an owner I want the homepage to show opening hours");
        assert_eq!(analysis.category, Category::General);
        assert_eq!(analysis.priority, Level::Medium);
        assert_eq!(analysis.complexity, Level::Medium);
    }

    #[test]
    fn database_keyword_raises_complexity_even_when_short() {
        let analysis = classify_story("Sync orders to the database");
        assert_eq!(analysis.category, Category::General);
        assert_eq!(analysis.complexity, Level::High);
    }

    #[test]
    fn length_is_measured_in_utf16_units() {
        // 47 chars but 50 UTF-16 units, so the short-story rule does not apply.
        let text = format!("{}{}", "x".repeat(44), "\u{1F600}".repeat(3));
        assert_eq!(text.chars().count(), 47);
        assert_eq!(classify_story(&text).complexity, Level::Medium);

        let shorter = format!("{}{}", "x".repeat(44), "\u{1F600}");
        assert_eq!(classify_story(&shorter).complexity, Level::Low);
    }
}
