//! Common types used throughout history-export
//!
//! Type aliases shared by the fetch, normalize and output stages.

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type (insertion ordered)
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A record as returned by the API: an arbitrary tree of maps, lists and scalars
pub type Record = JsonValue;

/// A record flattened to dotted-path keys, in first-seen key order
pub type FlatRecord = JsonObject;

// ============================================================================
// HTTP header names
// ============================================================================

/// Header carrying the identity the service should act as
pub const SWITCH_USER_HEADER: &str = "X-Switch-User";

/// Media type requested for collection pages
pub const LD_JSON: &str = "application/ld+json";
