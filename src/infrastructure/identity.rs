use crate::domain::identity::{AuthError, Identity};
use crate::domain::ports::IdentityVerifier;
use async_trait::async_trait;
use jiff::Timestamp;
use std::collections::HashMap;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone)]
struct Credential {
    identity: Identity,
    expires_at: Option<Timestamp>,
}

/// Verifies `Bearer <api key>` credentials against a fixed key table.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityVerifier {
    keys: HashMap<String, Credential>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `api_key` for `identity`. A later registration of the same
    /// key replaces the earlier one.
    pub fn register(&mut self, api_key: &str, identity: Identity, expires_at: Option<Timestamp>) {
        self.keys.insert(
            api_key.to_string(),
            Credential {
                identity,
                expires_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, credential: String) -> Result<Identity, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::Missing);
        }

        let key = credential
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AuthError::Malformed)?;

        let entry = self.keys.get(key).ok_or(AuthError::Invalid)?;
        if entry
            .expires_at
            .is_some_and(|expires_at| expires_at <= Timestamp::now())
        {
            return Err(AuthError::Expired);
        }
        Ok(entry.identity.clone())
    }
}
