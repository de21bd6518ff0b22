//! HTTP page source
//!
//! Reads JSON-LD (Hydra) collection pages: `GET {path}?page=N`, records
//! under `hydra:member`.

use super::types::PageSource;
use crate::auth::AuthToken;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::{Record, LD_JSON, SWITCH_USER_HEADER};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Default collection path, relative to the base URL
pub const DEFAULT_COLLECTION_PATH: &str = "/histories";

/// Default key holding the member list
pub const DEFAULT_MEMBER_KEY: &str = "hydra:member";

/// Query parameter carrying the page index
pub const PAGE_PARAM: &str = "page";

/// Page source backed by the collection endpoint
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: HttpClient,
    path: String,
    member_key: String,
    token: AuthToken,
    switch_user: String,
}

impl HttpPageSource {
    /// Create a source for the collection at `path`
    pub fn new(
        client: HttpClient,
        path: impl Into<String>,
        token: AuthToken,
        switch_user: impl Into<String>,
    ) -> Self {
        Self {
            client,
            path: path.into(),
            member_key: DEFAULT_MEMBER_KEY.to_string(),
            token,
            switch_user: switch_user.into(),
        }
    }

    /// Override the key holding the member list
    #[must_use]
    pub fn with_member_key(mut self, key: impl Into<String>) -> Self {
        self.member_key = key.into();
        self
    }

    fn request_config(&self, page: u32) -> RequestConfig {
        RequestConfig::new()
            .query(PAGE_PARAM, page.to_string())
            .header(SWITCH_USER_HEADER, self.switch_user.as_str())
            .header("Accept", LD_JSON)
            .bearer(self.token.as_str())
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Record>> {
        let body = self
            .client
            .get_json(&self.path, self.request_config(page))
            .await?;
        extract_members(body, &self.member_key)
    }
}

/// Take the member list out of a collection body
///
/// A missing key is an empty page. A body that is not an object, or a
/// member value that is not an array, is a decode error.
pub fn extract_members(body: Value, member_key: &str) -> Result<Vec<Record>> {
    match body {
        Value::Object(mut map) => match map.remove(member_key) {
            Some(Value::Array(members)) => Ok(members),
            Some(other) => Err(Error::decode(format!(
                "'{member_key}' is {}, expected an array",
                json_kind(&other)
            ))),
            None => {
                debug!(member_key, "Member list missing, treating page as empty");
                Ok(Vec::new())
            }
        },
        other => Err(Error::decode(format!(
            "collection body is {}, expected an object",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
