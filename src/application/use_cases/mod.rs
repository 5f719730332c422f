pub mod automation;
pub mod code_generator;
pub mod context_extractor;
pub mod step_elaborator;
pub mod step_profile;
pub mod story_classifier;
pub mod test_case_catalog;
pub mod test_steps;
pub mod user_story;
