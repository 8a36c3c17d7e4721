//! Stable cache keys.
//!
//! Layout hashed with SHA-256, rendered as lowercase hex:
//!
//! ```text
//! v{FINGERPRINT_VERSION}\n
//! {role}:{content byte length}:{content}\n      (once per message, in order)
//! model:{name byte length}:{name}\n
//! temperature:{f64 Debug repr}\n
//! ```
//!
//! Any change to this layout invalidates every persisted cache file and must
//! bump [`FINGERPRINT_VERSION`].

use sha2::{Digest, Sha256};

use crate::Message;

pub const FINGERPRINT_VERSION: u32 = 1;

/// Fingerprint of a request: full history, model name and temperature.
pub fn fingerprint(messages: &[Message], model: &str, temperature: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("v{FINGERPRINT_VERSION}\n"));
    for message in messages {
        // Length prefix keeps content from forging a turn boundary.
        hasher.update(format!(
            "{}:{}:",
            message.role.as_str(),
            message.content.len()
        ));
        hasher.update(message.content.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(format!("model:{}:{model}\n", model.len()));
    // -0.0 and 0.0 are the same request.
    let temperature = if temperature == 0.0 { 0.0 } else { temperature };
    hasher.update(format!("temperature:{temperature:?}\n"));
    format!("{:x}", hasher.finalize())
}
