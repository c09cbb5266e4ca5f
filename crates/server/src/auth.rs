use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,
    #[error("invalid token")]
    Invalid,
}

/// Caller identity as established by the authenticator. The engine never
/// validates identity itself; it only threads this through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller {
    pub token: String,
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, bearer: Option<&str>) -> Result<Caller, AuthError>;
}

/// Token-list authenticator: the deployment's tokens come from config. An
/// empty list means an open instance (local use).
pub struct StaticTokens {
    tokens: HashSet<String>,
}

impl StaticTokens {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self { tokens: tokens.into_iter().collect() }
    }
}

impl Authenticator for StaticTokens {
    fn authenticate(&self, bearer: Option<&str>) -> Result<Caller, AuthError> {
        if self.tokens.is_empty() {
            return Ok(Caller { token: "anonymous".to_string() });
        }
        let token = bearer.ok_or(AuthError::Missing)?;
        if self.tokens.contains(token) {
            Ok(Caller { token: token.to_string() })
        } else {
            Err(AuthError::Invalid)
        }
    }
}
