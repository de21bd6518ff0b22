//! Token authenticator
//!
//! Exchanges credentials for a bearer token at the login endpoint.

use super::types::{AuthToken, Credentials};
use crate::error::{Error, Result};
use crate::events::{PipelineEvent, PipelineObserver};
use crate::http::{HttpClient, RequestConfig, RetryPolicy};
use crate::types::SWITCH_USER_HEADER;
use serde_json::{json, Value};

/// Default login path, relative to the base URL
pub const DEFAULT_AUTH_PATH: &str = "/auth/json";

/// Default location of the token in the login response
pub const DEFAULT_TOKEN_PATH: &str = "token";

/// Obtains a bearer token, retrying transport and HTTP failures
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    /// HTTP client for token requests
    client: HttpClient,
    /// Login endpoint path
    auth_path: String,
    /// Dotted path to the token in the response body
    token_path: String,
    /// Retry policy for the login request
    policy: RetryPolicy,
}

impl TokenAuthenticator {
    /// Create an authenticator posting to [`DEFAULT_AUTH_PATH`]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            policy: RetryPolicy::authentication(),
        }
    }

    /// Override the login endpoint path
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    /// Override where the token is read from
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Obtain a token
    ///
    /// Transport failures and any 4xx/5xx response are retried per the
    /// policy. A response without a usable token is not. Every failure
    /// surfaces as [`Error::Authentication`] carrying the last cause.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        observer: &dyn PipelineObserver,
    ) -> Result<AuthToken> {
        credentials.validate()?;

        let mut attempts = 0;
        let counter = &mut attempts;
        let result = self
            .policy
            .execute(
                "authenticate",
                Error::is_transport_or_status,
                observer,
                move || {
                    *counter += 1;
                    self.request_token(credentials)
                },
            )
            .await;

        match result {
            Ok(token) => {
                observer.on_event(&PipelineEvent::AuthenticationSucceeded { attempts });
                Ok(token)
            }
            Err(error) => {
                observer.on_event(&PipelineEvent::AuthenticationFailed {
                    attempts,
                    error: error.to_string(),
                });
                Err(Error::Authentication {
                    attempts,
                    source: Box::new(error),
                })
            }
        }
    }

    /// One login attempt
    async fn request_token(&self, credentials: &Credentials) -> Result<AuthToken> {
        let config = RequestConfig::new()
            .header(SWITCH_USER_HEADER, credentials.switch_user())
            .json(json!({
                "username": credentials.username(),
                "password": credentials.password(),
            }));

        let body = self.client.post_json(&self.auth_path, config).await?;

        extract_jsonpath(&body, &self.token_path)
            .filter(|token| !token.is_empty())
            .map(AuthToken::new)
            .ok_or_else(|| {
                Error::auth_response(format!(
                    "no token found at '{}' in login response",
                    self.token_path
                ))
            })
    }
}

/// Extract a value from JSON using a simple JSONPath expression
/// Supports basic paths like "$.data.token" or "data.token"
pub fn extract_jsonpath(value: &Value, path: &str) -> Option<String> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
