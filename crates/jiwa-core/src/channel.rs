use std::future::Future;

use crate::streaming::{Frame, PreviewDisplay};

/// Typed error for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel closed")]
    ChannelClosed,

    #[error("{0}")]
    Other(String),
}

/// Bidirectional conversation surface for the agent.
pub trait Channel: Send {
    /// Receive the next user line. Returns `None` on EOF or when the user leaves.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, ChannelError>> + Send;

    /// Send a complete message.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Show a transient progress label. No-op by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn send_status(
        &mut self,
        _text: &str,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send {
        async { Ok(()) }
    }

    /// Draw one frame of a live answer preview. No-op by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying I/O fails.
    fn render_preview(&mut self, _frame: &Frame) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Routes stream preview frames to a borrowed channel.
pub struct ChannelPreview<'a, C> {
    channel: &'a mut C,
}

impl<'a, C: Channel> ChannelPreview<'a, C> {
    pub fn new(channel: &'a mut C) -> Self {
        Self { channel }
    }
}

impl<C: Channel> PreviewDisplay for ChannelPreview<'_, C> {
    fn render(&mut self, frame: &Frame) -> Result<(), ChannelError> {
        self.channel.render_preview(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl Channel for Silent {
        async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
            Ok(None)
        }

        async fn send(&mut self, _text: &str) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn default_methods_are_noops() {
        let mut ch = Silent;
        assert!(ch.send_status("memproses").await.is_ok());
        assert!(ch.render_preview(&Frame::Preparing).is_ok());
        assert!(ch.recv().await.unwrap().is_none());
    }

    #[test]
    fn preview_adapter_forwards_to_channel() {
        let mut ch = Silent;
        let mut preview = ChannelPreview::new(&mut ch);
        assert!(preview.render(&Frame::Cleared).is_ok());
    }

    #[test]
    fn channel_error_display() {
        assert_eq!(ChannelError::ChannelClosed.to_string(), "channel closed");
        assert_eq!(ChannelError::Other("boom".into()).to_string(), "boom");
        let io = std::io::Error::other("pipe");
        assert_eq!(ChannelError::from(io).to_string(), "I/O error: pipe");
    }
}
