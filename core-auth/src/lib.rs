//! # Authentication Module
//!
//! Credential sources for the remote-content client.
//!
//! ## Overview
//!
//! The client needs two values before it can issue a request: the bearer
//! token and the API origin every path is resolved against. Both come from a
//! [`CredentialProvider`], read once when the client is constructed.
//!
//! ## Providers
//!
//! - [`StaticCredentialProvider`] - values supplied in code or configuration
//! - [`EnvCredentialProvider`] - values read from environment variables

pub mod credentials;
pub mod error;

pub use credentials::{
    CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
    DEFAULT_API_BASE_VAR, DEFAULT_TOKEN_VAR,
};
pub use error::{AuthError, Result};
