// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Content digests.
//!
//! Firmware integrity travels as a lowercase hex BLAKE3 digest next to each
//! offer. The agent recomputes the digest over the bytes it actually
//! received and compares the strings byte-for-byte; nothing here is an
//! authentication mechanism.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Hex length of a digest string.
pub const DIGEST_HEX_LEN: usize = 64;

/// Digest the adversarial source hands out instead of hashing anything.
/// Shaped like a real digest so it survives casual inspection; it is not
/// the hash of any payload it serves.
const FORGED: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

pub fn hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Streamed file digest, 8 KiB at a time.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Incremental digest for hashing a download while it streams.
#[derive(Default)]
pub struct StreamingDigest {
    hasher: blake3::Hasher,
}

impl StreamingDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
    }

    pub fn finalize(self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

/// A syntactically-valid-looking digest fabricated without reading content.
pub fn forged() -> String {
    FORGED.to_string()
}
