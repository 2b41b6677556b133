//! Static token provider for local development.

use async_trait::async_trait;

use crate::auth::token::{Audience, CredentialError, Token};
use crate::auth::TokenProvider;

/// Returns the same configured token for every audience.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Token,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
        Ok(Self {
            token: Token::new(token)?,
        })
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _audience: &Audience) -> Result<Token, CredentialError> {
        Ok(self.token.clone())
    }
}
