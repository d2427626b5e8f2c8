use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input closed")]
    Closed,
}

/// Line-oriented terminal capability shared by prompts and workflows.
#[async_trait]
pub trait Interface: Send + Sync {
    /// Blocks until one line is available. The trailing newline is stripped,
    /// other whitespace is preserved. `Ok(None)` means end of input.
    async fn receive_input(&self) -> Result<Option<String>, InterfaceError>;

    /// Writes `message` followed by a newline.
    async fn send_output(&self, message: &str);

    /// Writes `message` without a newline and flushes, for inline prompts.
    async fn prompt(&self, message: &str);

    async fn show_status(&self, status: &str) {
        self.send_output(&format!("ℹ️  {}", status)).await;
    }
}
