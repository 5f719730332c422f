//! Step type, automation complexity and duration estimates for one step.

use crate::domain::test_case::StepType;
use crate::domain::user_story::Level;

const STEP_TYPE_RULES: &[(StepType, &[&str])] = &[
    (StepType::Navigation, &["navigate", "open", "go to"]),
    (
        StepType::Verification,
        &["verify", "check", "assert", "confirm", "validate", "ensure"],
    ),
    (
        StepType::DataEntry,
        &["enter", "fill", "input", "type", "provide"],
    ),
    (
        StepType::UserInteraction,
        &["click", "select", "choose", "press", "tap"],
    ),
    (StepType::Wait, &["wait", "load", "delay"]),
    (
        StepType::Authentication,
        &["login", "authenticate", "sign in"],
    ),
    (StepType::Cleanup, &["logout", "sign out", "exit"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProfile {
    pub step_type: StepType,
    pub complexity: Level,
    pub estimated_duration_seconds: u32,
}

pub fn profile_step(description: &str) -> StepProfile {
    let lower = description.to_lowercase();
    let step_type = step_type_of(&lower);
    let complexity = complexity_of(&lower, step_type);
    StepProfile {
        step_type,
        complexity,
        estimated_duration_seconds: estimate_duration(step_type, complexity),
    }
}

fn step_type_of(lower: &str) -> StepType {
    STEP_TYPE_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(step_type, _)| *step_type)
        .unwrap_or(StepType::Action)
}

fn complexity_of(lower: &str, step_type: StepType) -> Level {
    match step_type {
        StepType::Navigation | StepType::UserInteraction => Level::Low,
        StepType::DataEntry | StepType::Authentication => Level::Medium,
        StepType::Verification if lower.contains("complex") || lower.contains("multiple") => {
            Level::High
        }
        _ if ["upload", "download", "api"]
            .iter()
            .any(|keyword| lower.contains(keyword)) =>
        {
            Level::High
        }
        _ => Level::Medium,
    }
}

fn base_seconds(step_type: StepType) -> f64 {
    match step_type {
        StepType::Navigation => 3.0,
        StepType::UserInteraction => 2.0,
        StepType::DataEntry => 5.0,
        StepType::Verification => 4.0,
        StepType::Wait => 8.0,
        StepType::Authentication => 6.0,
        StepType::Cleanup => 3.0,
        StepType::Action => 4.0,
    }
}

fn multiplier(complexity: Level) -> f64 {
    match complexity {
        Level::Low => 1.0,
        Level::Medium => 1.5,
        Level::High => 2.0,
    }
}

fn estimate_duration(step_type: StepType, complexity: Level) -> u32 {
    (base_seconds(step_type) * multiplier(complexity)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_is_low_and_fast() {
        let profile = profile_step("Navigate to the login page");
        assert_eq!(profile.step_type, StepType::Navigation);
        assert_eq!(profile.complexity, Level::Low);
        assert_eq!(profile.estimated_duration_seconds, 3);
    }

    #[test]
    fn keyword_order_decides_type() {
        // "open" is checked before "verify".
        assert_eq!(
            profile_step("Verify the dialog opens").step_type,
            StepType::Navigation
        );
        assert_eq!(
            profile_step("Enter valid password in the password field").step_type,
            StepType::DataEntry
        );
    }

    #[test]
    fn data_entry_duration_rounds_half_up() {
        // 5 * 1.5 = 7.5
        let profile = profile_step("Fill all mandatory fields with valid data");
        assert_eq!(profile.complexity, Level::Medium);
        assert_eq!(profile.estimated_duration_seconds, 8);
    }

    #[test]
    fn complex_verification_is_high() {
        let profile = profile_step("Verify multiple results are displayed");
        assert_eq!(profile.step_type, StepType::Verification);
        assert_eq!(profile.complexity, Level::High);
        assert_eq!(profile.estimated_duration_seconds, 8);
    }

    #[test]
    fn upload_steps_are_high_unless_interaction() {
        let profile = profile_step("Verify successful upload and file processing");
        assert_eq!(profile.complexity, Level::High);
        let click = profile_step("Click upload button to start upload process");
        assert_eq!(click.step_type, StepType::UserInteraction);
        assert_eq!(click.complexity, Level::Low);
    }

    #[test]
    fn unmatched_step_is_action() {
        let profile = profile_step("Repeat attempts 5 times");
        assert_eq!(profile.step_type, StepType::Action);
        assert_eq!(profile.complexity, Level::Medium);
        assert_eq!(profile.estimated_duration_seconds, 6);
    }
}
