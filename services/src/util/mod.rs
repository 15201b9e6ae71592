pub mod parsing;
pub mod user_input;
