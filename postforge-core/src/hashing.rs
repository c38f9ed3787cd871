//! Hashing System - SHA-256 Fingerprints
//!
//! Identical render requests share a job hash; artifacts carry the hash of
//! their encoded bytes.

use sha2::{Sha256, Digest};
use serde::Serialize;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Canonical JSON: object keys sorted, no whitespace.
///
/// `serde_json::Map` is a `BTreeMap` without the `preserve_order` feature,
/// so the round trip through `Value` is what sorts the keys.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_value(value).and_then(|v| serde_json::to_string(&v))
}

/// job_hash = sha256(canonical_request + ":" + engine_version)
pub fn compute_job_hash(
    request: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(request)?;
    let combined = format!("{}:{}", canonical, engine_version);
    Ok(sha256_hex(combined.as_bytes()))
}
