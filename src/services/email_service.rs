use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// Delivery sink for magic links.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_magic_link(&self, to_email: &str, magic_link: &str) -> Result<(), EmailError>;
}

/// Writes the link to the log instead of delivering it.
#[derive(Debug, Default)]
pub struct LogEmailService;

impl LogEmailService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for LogEmailService {
    async fn send_magic_link(&self, to_email: &str, magic_link: &str) -> Result<(), EmailError> {
        tracing::info!("🔐 [MAGIC LINK] Sign-in link for: {}", to_email);
        tracing::info!("   Link: {}", magic_link);
        Ok(())
    }
}

pub fn create_email_service() -> Box<dyn EmailService> {
    tracing::info!("Email delivery disabled. Magic links will be logged to console");
    Box::new(LogEmailService::new())
}
