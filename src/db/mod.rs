pub mod generations;
pub mod likes;
pub mod password_reset_codes;
pub mod profiles;
pub mod refresh_tokens;
pub mod users;
pub mod views;
