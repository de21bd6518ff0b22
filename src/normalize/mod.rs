//! Record normalization
//!
//! Turns schema-less nested records into a flat table:
//!
//! 1. [`flatten`] joins nested map keys with `.`
//! 2. [`collapse_reference`] trims string leaves to their last `/` segment
//! 3. [`sanitize_value`] coerces lists and nulls into cell values
//! 4. [`HeaderSet`] fixes the column order from the first record
//!
//! Nothing here fails; odd shapes are coerced rather than rejected.

mod flatten;
mod table;

pub use flatten::{
    collapse_reference, flatten, normalize_leaf, sanitize_value, ScalarValue, KEY_SEPARATOR,
    LIST_SEPARATOR, SCALAR_RECORD_KEY,
};
pub use table::{HeaderSet, Table};
