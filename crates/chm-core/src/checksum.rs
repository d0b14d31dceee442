//! MD5 checksum utility for drift detection.
//!
//! Ledgers written by earlier releases store lowercase hex MD5 digests of the
//! raw file text, so the digest must stay MD5.

use md5::{Digest, Md5};

/// Compute the MD5 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
