/// A turn could not be completed because the channel failed.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Channel(#[from] crate::channel::ChannelError),
}
