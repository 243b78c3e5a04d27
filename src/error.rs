//! Error types for schema-driven marshaling

use thiserror::Error;

/// Result type for marshaling operations
pub type Result<T> = std::result::Result<T, MarshalError>;

/// Marshaling errors
#[derive(Error, Debug)]
pub enum MarshalError {
    #[error("Malformed descriptor: {0}")]
    MalformedSchema(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Not an object: {field}")]
    NotAnObject { field: String },

    #[error("Not an array: {field}")]
    NotAnArray { field: String },

    #[error("Unknown enum value {value} for {field}")]
    UnknownEnumValue { field: String, value: String },

    #[error("Invalid integer {value} for {field}")]
    InvalidInteger { field: String, value: String },

    #[error("Invalid base64 for {field}")]
    InvalidBase64 { field: String },

    #[error("Encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<prost_reflect::DescriptorError> for MarshalError {
    fn from(err: prost_reflect::DescriptorError) -> Self {
        MarshalError::MalformedSchema(err.to_string())
    }
}

impl From<prost::DecodeError> for MarshalError {
    fn from(err: prost::DecodeError) -> Self {
        MarshalError::MalformedMessage(err.to_string())
    }
}
