//! On-disk, content-addressed L2 `CacheTier` (spec §4.4): one file per
//! key under a sharded directory, written via a temp-file-then-rename
//! so a crash mid-write never leaves a torn entry for a reader to pick
//! up.

use async_trait::async_trait;
use codegraph_ir::features::cache::CacheTier;
use codegraph_ir::shared::models::sha256_hex;
use codegraph_ir::{CodegraphError, Result};
use std::path::{Path, PathBuf};

pub struct FsCacheTier {
    base_dir: PathBuf,
}

impl FsCacheTier {
    pub fn new(base_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = sha256_hex(key.as_bytes());
        let (shard, rest) = digest.split_at(2);
        self.base_dir.join(shard).join(rest)
    }
}

fn join_err(e: tokio::task::JoinError) -> CodegraphError {
    CodegraphError::cache(format!("blocking task panicked: {e}"))
}

#[async_trait]
impl CacheTier for FsCacheTier {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        tokio::task::spawn_blocking(move || match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CodegraphError::from(e)),
        })
        .await
        .map_err(join_err)?
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.path_for(key);
        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(CodegraphError::from)?;
            }
            let tmp = tmp_path(&path);
            std::fs::write(&tmp, &value).map_err(CodegraphError::from)?;
            std::fs::rename(&tmp, &path).map_err(CodegraphError::from)?;
            Ok(())
        })
        .await
        .map_err(join_err)?
    }

    fn name(&self) -> &'static str {
        "l2_disk"
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_on_empty_tier_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FsCacheTier::new(dir.path()).unwrap();
        assert!(tier.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FsCacheTier::new(dir.path()).unwrap();
        tier.set("k1", b"hello".to_vec()).await.unwrap();
        assert_eq!(tier.get("k1").await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FsCacheTier::new(dir.path()).unwrap();
        tier.set("k1", b"first".to_vec()).await.unwrap();
        tier.set("k1", b"second".to_vec()).await.unwrap();
        assert_eq!(tier.get("k1").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn keys_are_sharded_by_hash_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FsCacheTier::new(dir.path()).unwrap();
        tier.set("some:key", b"v".to_vec()).await.unwrap();
        let digest = sha256_hex("some:key".as_bytes());
        let path = dir.path().join(&digest[..2]).join(&digest[2..]);
        assert!(path.exists());
    }
}
