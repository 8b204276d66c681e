//! extractos-api: token exchange and statement download against the provider API

pub mod client;
pub mod config;
pub mod error;
pub mod statements;
pub mod token;

pub use client::{BearerToken, ProviderClient};
pub use config::ProviderConfig;
pub use error::ApiError;
pub use statements::extract_records;
