//! Response cache keyed by conversation fingerprint.
//!
//! A cached entry stands for one upstream completion: the exact history that
//! was sent, the model, and the temperature. Entries persist to a JSON file
//! so repeated questions cost nothing across runs.

mod fingerprint;
mod store;

pub use fingerprint::{fingerprint, FINGERPRINT_VERSION};
pub use store::{CacheEntry, ResponseCache, CACHE_FILE_VERSION};
