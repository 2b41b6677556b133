//! Credential subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request (post-rewrite URI)
//!     → token.rs (Audience = "https://" + host)
//!     → TokenProvider::token(audience)
//!         → metadata.rs (metadata server identity endpoint)
//!         → fixed.rs (configured token, development only)
//!     → Token → "Authorization: Bearer <token>"
//! ```
//!
//! # Design Decisions
//! - Providers are opaque to the transport: one async call per request
//! - No caching here; a token lives for exactly one request
//! - Providers do not log failures; the caller owns the single failure line

pub mod fixed;
pub mod metadata;
pub mod token;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{CredentialSource, CredentialsConfig};

pub use fixed::StaticTokenProvider;
pub use metadata::MetadataTokenProvider;
pub use token::{Audience, CredentialError, Token};

/// Capability to mint a bearer token for an audience.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, audience: &Audience) -> Result<Token, CredentialError>;
}

/// Build the provider selected by configuration.
pub fn provider_from_config(
    config: &CredentialsConfig,
) -> Result<Arc<dyn TokenProvider>, CredentialError> {
    match config.source {
        CredentialSource::Metadata => {
            tracing::info!(endpoint = %config.metadata_url, "Using metadata server for identity tokens");
            Ok(Arc::new(MetadataTokenProvider::new(&config.metadata_url)?))
        }
        CredentialSource::Static => {
            tracing::warn!("Using a static identity token; not intended for production");
            let token = config.static_token.clone().unwrap_or_default();
            Ok(Arc::new(StaticTokenProvider::new(token)?))
        }
    }
}
