use async_trait::async_trait;
use eyre::Result;
use mockall::automock;

/// Outbound notification boundary. The chat transport that actually
/// delivers messages lives outside this core; the periodic jobs only
/// know `(chat_id, text)` pairs.
#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Notifier that writes outbound messages to the log. Stands in for the
/// real transport in local runs.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        tracing::info!(chat_id, message = text, "Outgoing notification");
        Ok(())
    }
}
