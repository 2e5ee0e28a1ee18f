//! Digest-based value redaction
//!
//! Replaces a string value with the lowercase hex digest of its bytes. The
//! transform is one-way but deterministic, so the same identifier always
//! maps to the same redacted value and records stay correlatable.

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;

/// Digest algorithm used for `hash` rules
///
/// # Fallback
///
/// [`HashAlgorithm::Sha1`] is the default. Configuration values that are
/// empty or not recognized resolve to SHA-1 through
/// [`HashAlgorithm::from_name_or_default`], which logs a warning when it
/// falls back. Use [`FromStr`] when an unrecognized name must be an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1, 40 hex characters
    #[default]
    Sha1,
    /// SHA-256, 64 hex characters
    Sha256,
    /// SHA-512, 128 hex characters
    Sha512,
}

impl HashAlgorithm {
    /// All supported algorithms
    pub const ALL: [HashAlgorithm; 3] = [Self::Sha1, Self::Sha256, Self::Sha512];

    /// Configuration name of the algorithm
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of the hex digest produced by this algorithm
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }

    /// Resolve a configured name, falling back to SHA-1
    ///
    /// Matching is case-insensitive. An empty name falls back silently since
    /// it means "unset"; any other unrecognized name logs a warning.
    pub fn from_name_or_default(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match trimmed.parse() {
            Ok(algorithm) => algorithm,
            Err(_) => {
                tracing::warn!(
                    hash_algorithm = %trimmed,
                    fallback = Self::default().name(),
                    "Unrecognized hash algorithm, falling back to default"
                );
                Self::default()
            }
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(format!(
                "Invalid hash algorithm '{other}'. Must be one of: sha1, sha256, sha512"
            )),
        }
    }
}

/// Hex digest of `value` under `algorithm`
///
/// Total over all inputs, including the empty string.
///
/// # Examples
///
/// ```
/// use kafka_anonymizer::anonymization::hasher::{redact, HashAlgorithm};
///
/// let digest = redact("abc", HashAlgorithm::Sha1);
/// assert_eq!(digest, "a9993e364706816aba3e25717850c26c9cd0d89d");
/// ```
pub fn redact(value: &str, algorithm: HashAlgorithm) -> String {
    let bytes = value.as_bytes();
    match algorithm {
        HashAlgorithm::Sha1 => format!("{:x}", Sha1::digest(bytes)),
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(bytes)),
        HashAlgorithm::Sha512 => format!("{:x}", Sha512::digest(bytes)),
    }
}

/// Redactor bound to one algorithm for the lifetime of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashRedactor {
    algorithm: HashAlgorithm,
}

impl HashRedactor {
    /// Create a redactor for `algorithm`
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Algorithm in use
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Redact a single value
    pub fn redact(&self, value: &str) -> String {
        redact(value, self.algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(HashAlgorithm::Sha1, "", "da39a3ee5e6b4b0d3255bfef95601890afd80709" ; "sha1 empty")]
    #[test_case(HashAlgorithm::Sha1, "abc", "a9993e364706816aba3e25717850c26c9cd0d89d" ; "sha1 abc")]
    #[test_case(HashAlgorithm::Sha256, "", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855" ; "sha256 empty")]
    #[test_case(HashAlgorithm::Sha256, "abc", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad" ; "sha256 abc")]
    #[test_case(HashAlgorithm::Sha512, "abc", "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f" ; "sha512 abc")]
    fn test_known_digests(algorithm: HashAlgorithm, input: &str, expected: &str) {
        assert_eq!(redact(input, algorithm), expected);
    }

    #[test_case(HashAlgorithm::Sha1, 40)]
    #[test_case(HashAlgorithm::Sha256, 64)]
    #[test_case(HashAlgorithm::Sha512, 128)]
    fn test_digest_length_and_case(algorithm: HashAlgorithm, len: usize) {
        for input in ["", "CN=Alice", "/DC=ch/DC=cern/OU=Users/CN=someone", "üñíçødé"] {
            let digest = redact(input, algorithm);
            assert_eq!(digest.len(), len);
            assert_eq!(digest.len(), algorithm.hex_len());
            assert!(digest
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_deterministic() {
        for algorithm in HashAlgorithm::ALL {
            assert_eq!(redact("CN=Alice", algorithm), redact("CN=Alice", algorithm));
            assert_ne!(redact("CN=Alice", algorithm), redact("CN=Bob", algorithm));
        }
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("sha1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!(" sha512 ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_fallback_to_sha1() {
        assert_eq!(HashAlgorithm::from_name_or_default(""), HashAlgorithm::Sha1);
        assert_eq!(HashAlgorithm::from_name_or_default("md5"), HashAlgorithm::Sha1);
        assert_eq!(HashAlgorithm::from_name_or_default("Sha512"), HashAlgorithm::Sha512);
    }

    #[test]
    fn test_redactor_uses_its_algorithm() {
        let redactor = HashRedactor::new(HashAlgorithm::Sha256);
        assert_eq!(redactor.algorithm(), HashAlgorithm::Sha256);
        assert_eq!(redactor.redact("abc"), redact("abc", HashAlgorithm::Sha256));
        assert_eq!(HashRedactor::default().algorithm(), HashAlgorithm::Sha1);
    }
}
