pub mod auth_service;
pub mod email_service;
pub mod magic_link_service;
pub mod session_token_service;

pub use auth_service::{AuthService, AuthServiceError};
pub use email_service::{create_email_service, EmailError, EmailService, LogEmailService};
pub use magic_link_service::{IssuedMagicLink, MagicLinkError, MagicLinkService, Redemption};
pub use session_token_service::{SessionClaims, SessionTokenError, SessionTokenService};
