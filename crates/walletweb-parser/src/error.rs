//! Error types for walletweb-parser

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error at {location}: {message}")]
    SyntaxError {
        location: String,
        message: String,
    },

    #[error("Invalid record at {location}: {message}")]
    InvalidRecord {
        location: String,
        message: String,
    },

    #[error("Unsupported dataset format: {path}")]
    UnsupportedFormat { path: String },

    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("Internal error")]
    InternalError,
}
