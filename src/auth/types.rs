//! Auth value types
//!
//! Credentials and the bearer token live only for the duration of a run.
//! Neither prints its secret through `Debug`.

use crate::error::{Error, Result};

/// Login credentials plus the identity the service should act as
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    switch_user: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        switch_user: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            switch_user: switch_user.into(),
        }
    }

    /// Reject empty fields before any request is made
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::invalid_value("username", "must not be empty"));
        }
        if self.password.is_empty() {
            return Err(Error::invalid_value("password", "must not be empty"));
        }
        if self.switch_user.trim().is_empty() {
            return Err(Error::invalid_value("switch_user", "must not be empty"));
        }
        Ok(())
    }

    /// Login name
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Identity sent as `X-Switch-User`
    pub fn switch_user(&self) -> &str {
        &self.switch_user
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("switch_user", &self.switch_user)
            .finish()
    }
}

/// Bearer token obtained from the auth endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the Authorization header
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken").field(&"***").finish()
    }
}
