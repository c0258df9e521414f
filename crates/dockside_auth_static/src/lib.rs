//! # Dockside Auth Static
//!
//! A fixed-token auth subject provider for development and testing.
//!
//! **WARNING**: every job family without an explicit entry receives the same
//! fallback token.
//!
//! **DO NOT use this in production!!!**
//!
//! ## Usage
//!
//! ```rust
//! # use dockside_auth_static::StaticAuthSubjects;
//! # fn main() {
//! let auth = StaticAuthSubjects::new("dev-token").with_family("adder", "adder-token");
//! # }
//! ```

use dockside_core::prelude::*;

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct StaticAuthSubjects {
    fallback: Option<String>,
    families: Arc<HashMap<String, String>>,
}

impl StaticAuthSubjects {
    /// Hands `token` to every family.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            fallback: Some(token.into()),
            families: Arc::default(),
        }
    }

    /// Only families registered through [`with_family`](Self::with_family) resolve.
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn with_family(mut self, family: impl Into<String>, token: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.families).insert(family.into(), token.into());
        self
    }
}

impl AuthSubjectProvider for StaticAuthSubjects {
    async fn job_family_token(&self, family: &str) -> Result<String, AuthError> {
        self.families
            .get(family)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| AuthError::UnknownFamily(family.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn family_entry_wins_over_fallback() {
        let auth = StaticAuthSubjects::new("dev").with_family("adder", "adder-token");

        assert_eq!(auth.job_family_token("adder").await.unwrap(), "adder-token");
        assert_eq!(auth.job_family_token("other").await.unwrap(), "dev");
    }

    #[tokio::test]
    async fn strict_rejects_unknown_family() {
        let auth = StaticAuthSubjects::strict().with_family("adder", "t");

        let err = auth.job_family_token("other").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownFamily(f) if f == "other"));
    }
}
