pub mod clock;
pub mod context;
pub mod error;
pub mod record;
pub mod test_case;
pub mod upload;
pub mod user_story;
