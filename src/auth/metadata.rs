//! Identity tokens from the instance metadata server.
//!
//! Issues `GET <metadata_url>?audience=<aud>&format=full` with the
//! `Metadata-Flavor: Google` header; the response body is the raw token.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::auth::token::{Audience, CredentialError, Token};
use crate::auth::TokenProvider;

const METADATA_FLAVOR: &str = "Metadata-Flavor";
const MAX_ERROR_BODY: usize = 256;

/// Token provider backed by the metadata server identity endpoint.
#[derive(Debug, Clone)]
pub struct MetadataTokenProvider {
    client: Client,
    endpoint: Url,
}

impl MetadataTokenProvider {
    /// Create a provider for `endpoint` with its own HTTP client.
    ///
    /// The client never goes through an HTTP proxy: the metadata server is
    /// link-local.
    pub fn new(endpoint: &str) -> Result<Self, CredentialError> {
        let client = Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| CredentialError::Misconfigured(e.to_string()))?;
        Self::with_client(client, endpoint)
    }

    pub fn with_client(client: Client, endpoint: &str) -> Result<Self, CredentialError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| CredentialError::Misconfigured(format!("metadata url: {}", e)))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TokenProvider for MetadataTokenProvider {
    async fn token(&self, audience: &Audience) -> Result<Token, CredentialError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("audience", audience.as_str()), ("format", "full")])
            .header(METADATA_FLAVOR, "Google")
            .send()
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            let mut body = body.trim().to_string();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(audience = %audience, "Identity token issued");
        Token::new(body.trim())
    }
}
