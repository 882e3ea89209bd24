// src/cache.rs
//! Per-check per-file content-hash cache.
//!
//! One JSON document at `<repo>/.cache/hex-validate.json` holds a hash map
//! partition per check. Read failures degrade to an empty cache with a
//! single stderr warning; writes go through a sibling temp file and an
//! atomic rename, falling back to copy-then-unlink. The scheduler's
//! contract guarantees no two concurrent checks share a partition, so no
//! file locking is needed; a check that runs after another in the same
//! stage re-reads the document before writing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".cache";
pub const CACHE_FILE: &str = "hex-validate.json";

type Partition = BTreeMap<String, String>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDoc {
    #[serde(default)]
    plugins: BTreeMap<String, Partition>,
}

/// A loaded view of the cache document, bound to one repository root.
pub struct HashCache {
    root: PathBuf,
    doc: CacheDoc,
}

impl HashCache {
    /// Reads the cache for `root`, degrading silently to empty.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            doc: read_doc(&cache_path(root)),
        }
    }

    /// The stored hash partition for a check, if any.
    #[must_use]
    pub fn partition(&self, check: &str) -> Option<&Partition> {
        self.doc.plugins.get(check)
    }

    /// Splits `files` (repo-relative) into the subset whose current
    /// content hash differs from the stored partition, alongside the full
    /// map of freshly computed hashes. Unreadable files count as stale and
    /// carry no hash.
    #[must_use]
    pub fn stale_files(&self, check: &str, files: &[PathBuf]) -> (Vec<PathBuf>, Partition) {
        let stored = self.partition(check);
        let mut stale = Vec::new();
        let mut hashes = Partition::new();

        for file in files {
            let key = file.to_string_lossy().to_string();
            match hash_file(&self.root.join(file)) {
                Ok(hash) => {
                    let hit = stored.and_then(|p| p.get(&key)).is_some_and(|h| *h == hash);
                    if !hit {
                        stale.push(file.clone());
                    }
                    hashes.insert(key, hash);
                }
                Err(_) => stale.push(file.clone()),
            }
        }

        (stale, hashes)
    }

    /// Overwrites one check's partition, re-reading the on-disk document
    /// first so sibling partitions written earlier in the run survive.
    /// Write failures degrade with a warning.
    pub fn store_partition(&mut self, check: &str, hashes: Partition) {
        let path = cache_path(&self.root);
        let mut doc = read_doc(&path);
        doc.plugins.insert(check.to_string(), hashes);

        if let Err(e) = write_doc(&path, &doc) {
            eprintln!("WARN: cache write failed: {e:#}");
        }
        self.doc = doc;
    }
}

fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join(CACHE_FILE)
}

fn read_doc(path: &Path) -> CacheDoc {
    if !path.exists() {
        return CacheDoc::default();
    }
    match fs::read_to_string(path).map_err(anyhow::Error::from).and_then(|text| {
        serde_json::from_str::<CacheDoc>(&text).map_err(anyhow::Error::from)
    }) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("WARN: cache read failed, starting empty: {e}");
            CacheDoc::default()
        }
    }
}

fn write_doc(path: &Path, doc: &CacheDoc) -> Result<()> {
    let dir = path.parent().context("cache path has no parent")?;
    fs::create_dir_all(dir).context("creating cache directory")?;

    let json = serde_json::to_string_pretty(doc).context("serializing cache")?;

    let tmp = tempfile::Builder::new()
        .prefix(".hex-validate-cache")
        .tempfile_in(dir)
        .context("creating cache temp file")?;
    fs::write(tmp.path(), &json).context("writing cache temp file")?;

    match tmp.persist(path) {
        Ok(_) => Ok(()),
        Err(persist) => {
            // Rename across filesystems can fail; copy-then-unlink instead.
            let tmp_path = persist.file.path().to_path_buf();
            fs::copy(&tmp_path, path).context("copying cache into place")?;
            Ok(())
        }
    }
}

/// SHA-256 of the raw file bytes, hex-encoded.
///
/// # Errors
/// Returns error if the file cannot be read.
pub fn hash_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(hash_bytes(&bytes))
}

#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
