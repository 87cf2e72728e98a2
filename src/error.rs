//! Error taxonomy for a sweep run
//!
//! Precondition failures (`Config`, `Auth`) abort before any destructive call.
//! `Fetch` covers every non-2xx response and every transport fault; whether it
//! is fatal depends on the call site (listing aborts, deletion is recorded).

use thiserror::Error;

/// Errors produced by the sweep core
#[derive(Error, Debug)]
pub enum SweepError {
    /// Whitelist source or configuration file missing or unreadable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Credential missing, empty, or rejected by the identity call
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Non-2xx response (`status` set) or transport failure (`status` absent)
    #[error("{}", fetch_message(.status, .body))]
    Fetch { status: Option<u16>, body: String },
}

fn fetch_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(status) => format!("Request failed with status {}: {}", status, body),
        None => format!("Request failed: {}", body),
    }
}

impl SweepError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn fetch(status: u16, body: impl Into<String>) -> Self {
        Self::Fetch {
            status: Some(status),
            body: body.into(),
        }
    }

    /// Transport-level failure (connection refused, DNS, broken body, ...)
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            status: None,
            body: err.to_string(),
        }
    }

    /// True for errors that must stop the run before anything is listed or deleted
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Auth { .. })
    }

    /// HTTP status carried by a `Fetch` error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SweepError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
