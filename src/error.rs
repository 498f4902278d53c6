//! Error taxonomy shared by the store, the Postman codec and the executor.
//!
//! Every variant is meant to be caught at the boundary where it occurs and
//! shown to the user; none of them are fatal to the process.

/// Errors produced by the core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed JSON in the persisted store or an imported collection.
    #[error("Decode error: {0}")]
    Decode(String),
    /// Reading or writing the persisted store failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The request could not be built (bad URL, method or header).
    #[error("Request error: {0}")]
    RequestBuild(String),
    /// DNS, connection or timeout failure before a response arrived.
    #[error("HTTP error: {0}")]
    Transport(String),
    /// The response head arrived but reading the body failed.
    #[error("Read error: {0}")]
    Read(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let messages = [
            Error::Decode("x".into()).to_string(),
            Error::Io(std::io::Error::other("x")).to_string(),
            Error::RequestBuild("x".into()).to_string(),
            Error::Transport("x".into()).to_string(),
            Error::Read("x".into()).to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_json_error_is_decode() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
