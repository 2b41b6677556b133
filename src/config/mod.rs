//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, UPSTREAM_URL, GCE_METADATA_HOST)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → passed into constructors, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - An invalid config is fatal at startup, never per request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    CredentialSource, CredentialsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ProxyConfig, TimeoutConfig, UpstreamConfig,
};
