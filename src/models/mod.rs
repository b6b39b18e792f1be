pub mod magic_link;
pub mod user;

pub use magic_link::MagicLinkToken;
pub use user::{User, UserProfile};
