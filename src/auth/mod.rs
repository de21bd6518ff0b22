//! Authentication module
//!
//! Exchanges username/password for a bearer token via the JSON login
//! endpoint. One token is obtained per run; there is no refresh.

mod authenticator;
mod types;

pub use authenticator::{
    extract_jsonpath, TokenAuthenticator, DEFAULT_AUTH_PATH, DEFAULT_TOKEN_PATH,
};
pub use types::{AuthToken, Credentials};
