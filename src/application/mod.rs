pub mod use_cases;

pub use use_cases::automation::AutomationUseCase;
pub use use_cases::test_steps::TestStepsUseCase;
pub use use_cases::user_story::UserStoryUseCase;
