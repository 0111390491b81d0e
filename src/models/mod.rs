pub mod generation;
pub mod password_reset_code;
pub mod profile;
pub mod refresh_token;
pub mod social;
pub mod user;

pub use generation::{FeedVideo, Generation, GenerationStatus, ProviderKind};
pub use password_reset_code::PasswordResetCode;
pub use profile::Profile;
pub use refresh_token::RefreshToken;
pub use social::{Like, View};
pub use user::User;
