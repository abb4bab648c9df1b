//! # Evidence Content Store
//!
//! Revealed evidence is kept off-ledger; the ledger only records an opaque
//! locator. Locators minted here have the form `sha256:<64 hex>`, so every
//! fetch can recompute the digest of the returned bytes and refuse content
//! that was swapped or corrupted after the reveal.
//!
//! Two stores ship: [`MemoryContentStore`] for tests and demos, and
//! [`FsContentStore`] writing `{root}/sha256/{hex}` files.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use stl_core::CommitmentHash;

use crate::error::CryptoError;
use crate::sha256::{digest, hashes_match};

const SCHEME: &str = "sha256:";

/// Opaque pointer to stored evidence, as recorded on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentLocator(String);

impl ContentLocator {
    /// Wrap an arbitrary locator string (e.g. one read back from the ledger).
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The content-addressed locator for a digest.
    pub fn for_digest(hash: &CommitmentHash) -> Self {
        Self(format!("{SCHEME}{}", hash.to_hex()))
    }

    /// The digest named by a `sha256:` locator, or `None` for foreign
    /// locators.
    pub fn digest(&self) -> Option<CommitmentHash> {
        let hex = self.0.strip_prefix(SCHEME)?;
        CommitmentHash::parse(&format!("0x{hex}")).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque evidence storage.
pub trait ContentStore: Send + Sync {
    /// Store bytes and return their locator. Idempotent.
    fn store(&self, bytes: &[u8]) -> Result<ContentLocator, CryptoError>;

    /// Fetch bytes by locator, verifying their digest.
    fn fetch(&self, locator: &ContentLocator) -> Result<Vec<u8>, CryptoError>;
}

/// Check that `bytes` hash to the digest the locator names.
fn verify_content(
    locator: &ContentLocator,
    expected: &CommitmentHash,
    bytes: &[u8],
) -> Result<(), CryptoError> {
    let actual = digest(bytes);
    if !hashes_match(&actual, expected) {
        return Err(CryptoError::IntegrityViolation {
            locator: locator.to_string(),
            actual: actual.to_prefixed_hex(),
        });
    }
    Ok(())
}

fn require_digest(locator: &ContentLocator) -> Result<CommitmentHash, CryptoError> {
    locator
        .digest()
        .ok_or_else(|| CryptoError::UnsupportedLocator(locator.to_string()))
}

/// In-memory content store.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: RwLock<HashMap<CommitmentHash, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Replace stored bytes without re-hashing. Test hook for corruption.
    #[cfg(test)]
    fn overwrite(&self, hash: CommitmentHash, bytes: Vec<u8>) {
        self.blobs.write().insert(hash, bytes);
    }
}

impl ContentStore for MemoryContentStore {
    fn store(&self, bytes: &[u8]) -> Result<ContentLocator, CryptoError> {
        let hash = digest(bytes);
        self.blobs
            .write()
            .entry(hash)
            .or_insert_with(|| bytes.to_vec());
        Ok(ContentLocator::for_digest(&hash))
    }

    fn fetch(&self, locator: &ContentLocator) -> Result<Vec<u8>, CryptoError> {
        let expected = require_digest(locator)?;
        let bytes = self
            .blobs
            .read()
            .get(&expected)
            .cloned()
            .ok_or_else(|| CryptoError::ContentNotFound(locator.to_string()))?;
        verify_content(locator, &expected, &bytes)?;
        Ok(bytes)
    }
}

/// Filesystem content store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, hash: &CommitmentHash) -> PathBuf {
        self.root.join("sha256").join(hash.to_hex())
    }
}

impl ContentStore for FsContentStore {
    fn store(&self, bytes: &[u8]) -> Result<ContentLocator, CryptoError> {
        let hash = digest(bytes);
        let path = self.path_for(&hash);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        // create_new makes concurrent stores of the same content race-free.
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut f) => f.write_all(bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(path = %path.display(), "stored evidence");
        Ok(ContentLocator::for_digest(&hash))
    }

    fn fetch(&self, locator: &ContentLocator) -> Result<Vec<u8>, CryptoError> {
        let expected = require_digest(locator)?;
        let path = self.path_for(&expected);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CryptoError::ContentNotFound(locator.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        verify_content(locator, &expected, &bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_names_digest() {
        let loc = ContentLocator::for_digest(&digest(b"photo-bytes"));
        assert_eq!(
            loc.as_str(),
            "sha256:dac6f451810bc38390a3b6e278d686b332a77cf21b2ea95145ad73722b77035d"
        );
        assert_eq!(loc.digest(), Some(digest(b"photo-bytes")));
        assert_eq!(ContentLocator::new("ipfs://bafy").digest(), None);
    }

    #[test]
    fn memory_store_round_trip_and_idempotence() {
        let store = MemoryContentStore::new();
        let a = store.store(b"photo-bytes").unwrap();
        let b = store.store(b"photo-bytes").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.fetch(&a).unwrap(), b"photo-bytes");
    }

    #[test]
    fn memory_store_detects_corruption() {
        let store = MemoryContentStore::new();
        let loc = store.store(b"original").unwrap();
        store.overwrite(digest(b"original"), b"tampered".to_vec());
        assert!(matches!(
            store.fetch(&loc),
            Err(CryptoError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn missing_and_foreign_locators() {
        let store = MemoryContentStore::new();
        let absent = ContentLocator::for_digest(&digest(b"nothing"));
        assert!(matches!(store.fetch(&absent), Err(CryptoError::ContentNotFound(_))));
        assert!(matches!(
            store.fetch(&ContentLocator::new("ipfs://bafy")),
            Err(CryptoError::UnsupportedLocator(_))
        ));
    }

    #[test]
    fn fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContentStore::new(dir.path());
        let loc = store.store(b"photo-bytes").unwrap();
        assert!(dir
            .path()
            .join("sha256")
            .join(digest(b"photo-bytes").to_hex())
            .exists());
        assert_eq!(store.fetch(&loc).unwrap(), b"photo-bytes");
        // Second store is a no-op.
        assert_eq!(store.store(b"photo-bytes").unwrap(), loc);
    }

    #[test]
    fn fs_store_detects_tampering() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContentStore::new(dir.path());
        let loc = store.store(b"evidence").unwrap();
        let path = dir.path().join("sha256").join(digest(b"evidence").to_hex());
        fs::write(&path, b"swapped").unwrap();
        assert!(matches!(
            store.fetch(&loc),
            Err(CryptoError::IntegrityViolation { .. })
        ));
    }

    #[test]
    fn fs_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContentStore::new(dir.path());
        let loc = ContentLocator::for_digest(&digest(b"never stored"));
        assert!(matches!(store.fetch(&loc), Err(CryptoError::ContentNotFound(_))));
    }
}
