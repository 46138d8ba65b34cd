use thiserror::Error;

use crate::client::FeedResponse;

#[derive(Error, Debug)]
/// Feed error
pub enum FeedError {
    #[error("Unknown attribute type: {0}")]
    UnknownAttributeType(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Unknown item class: {0}")]
    UnknownItemClass(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("XmlWriter from: {0}")]
    XmlWriter(String),

    #[error("XmlReader from: {0}")]
    XmlReader(String),

    #[error("Transport from: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{message}")]
    ItemNotFound {
        message: String,
        response: FeedResponse,
    },

    #[error("{message}")]
    ErrorResponse {
        message: String,
        response: FeedResponse,
    },
}

impl FeedError {
    /// Returns the raw remote response for errors classified from one.
    pub fn response(&self) -> Option<&FeedResponse> {
        match self {
            FeedError::ItemNotFound { response, .. } | FeedError::ErrorResponse { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
