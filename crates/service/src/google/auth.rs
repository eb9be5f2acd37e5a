use async_trait::async_trait;

use crate::errors::ServiceError;

/// Source of bearer tokens for the Google APIs.
///
/// Minting and refreshing tokens happens outside this crate; implementations
/// only hand out the current one.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ServiceError>;
}

/// A token fixed for the process lifetime.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Result<Self, ServiceError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ServiceError::Startup("empty access token".into()));
        }
        Ok(Self(token.trim().to_string()))
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ServiceError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_trimmed() {
        let t = StaticToken::new(" ya29.abc \n").expect("token");
        assert_eq!(t.access_token().await.expect("token"), "ya29.abc");
        assert!(StaticToken::new("   ").is_err());
    }
}
