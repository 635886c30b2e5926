//! Client for the remote AKI risk inference endpoint.
//!
//! The model expects a fixed vector of 12 lab values and answers with a
//! predicted class and probability. This crate owns that contract: the lab
//! vocabulary, request building, response parsing and the HTTP transport.

pub mod client;
pub mod config;
pub mod labs;
pub mod request;
pub mod response;

pub use client::*;
pub use config::*;
pub use labs::*;
pub use request::*;
pub use response::*;

use thiserror::Error;

/// Prediction errors.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON from inference endpoint: {0}")]
    InvalidJson(String),

    #[error("Prediction backend error: {0}")]
    Backend(String),
}

pub type PredictResult<T> = Result<T, PredictError>;
