use thiserror::Error;

/// Failures talking to the chat backend.
///
/// The chat widget never shows these to the user; every variant collapses to
/// [`crate::app::CONNECT_ERROR`]. They exist so the log says what went wrong.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend returned a null body")]
    EmptyBody,
}

impl ChatError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Transport(_) => "transport",
            ChatError::Decode(_) => "decode",
            ChatError::EmptyBody => "empty_body",
        }
    }
}
