//! Content hashing for versioned datasets

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A hash value represented as a hex string
pub type HashValue = String;

/// Files are streamed through the digest in chunks of this many bytes
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Supported 256-bit content digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Streaming file hasher
pub struct FileHasher {
    algorithm: HashAlgorithm,
}

impl FileHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash a file on disk, reading it in fixed-size chunks
    pub fn hash_file(&self, path: &Path) -> Result<HashValue> {
        let file = File::open(path)?;
        self.hash_reader(file)
    }

    /// Hash everything a reader yields
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> Result<HashValue> {
        let mut buffer = [0u8; HASH_CHUNK_SIZE];

        match self.algorithm {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                loop {
                    let read = reader.read(&mut buffer)?;
                    if read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..read]);
                }
                Ok(hex::encode(hasher.finalize()))
            }
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                loop {
                    let read = reader.read(&mut buffer)?;
                    if read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..read]);
                }
                Ok(hasher.finalize().to_hex().to_string())
            }
        }
    }

    /// Hash an in-memory value
    pub fn hash_bytes(&self, bytes: &[u8]) -> HashValue {
        match self.algorithm {
            HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            HashAlgorithm::Blake3 => blake3::hash(bytes).to_hex().to_string(),
        }
    }
}
