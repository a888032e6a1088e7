use crate::traits::Notifier;
use crate::types::Notification;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Notifier for headless shells: notifications go to stdout.
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn new() -> Self {
        Self
    }

    fn render(notification: &Notification) -> String {
        format!("ℹ️  {}: {}", notification.title, notification.description)
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, notification: Notification) {
        tracing::info!(
            title = %notification.title,
            timeout_ms = notification.timeout_ms,
            "{}",
            notification.description
        );

        let mut stdout = tokio::io::stdout();
        let _ = stdout
            .write_all(Self::render(&notification).as_bytes())
            .await;
        let _ = stdout.write_all(b"\n").await;
        let _ = stdout.flush().await;
    }
}
