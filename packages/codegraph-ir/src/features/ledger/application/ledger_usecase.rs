//! Change Ledger use-case (C2, spec §4.2).
//!
//! `classify` is read-only: it decides what changed but does not
//! commit anything. The caller (the pipeline orchestrator) commits
//! each path individually, once its own downstream processing for
//! that path has succeeded — this is what makes a crash mid-pass safe
//! (spec §4.2 Failure, §5 Cancellation).

use crate::domain::{ChangeCounts, ChangeRecord, ChangeStatus, File};
use crate::features::ledger::domain::ports::LedgerStore;
use crate::features::scanner::ScannedFile;
use crate::shared::models::{CodegraphError, Result, StreamingHasher};
use std::fs;
use std::io::Read;
use std::path::Path;

pub struct ChangeLedger<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

pub struct ClassifyOutcome {
    pub files: Vec<File>,
    pub records: Vec<ChangeRecord>,
    pub counts: ChangeCounts,
}

impl<'a, S: LedgerStore + ?Sized> ChangeLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Classify every scanned file as added/modified/unchanged, and
    /// append `deleted` records for paths the ledger remembers but the
    /// scanner no longer sees.
    pub fn classify(
        &self,
        project_id: &str,
        root: impl AsRef<Path>,
        scanned: &[ScannedFile],
    ) -> Result<ClassifyOutcome> {
        let root = root.as_ref();
        let prev = self.store.snapshot(project_id)?;

        let mut files = Vec::with_capacity(scanned.len());
        let mut records = Vec::with_capacity(scanned.len());
        let mut counts = ChangeCounts::default();
        let mut seen_paths = std::collections::HashSet::with_capacity(scanned.len());

        for sf in scanned {
            let content_hash = hash_file_streaming(&root.join(&sf.path))
                .map_err(|e| e.with_file(sf.path.clone()))?;
            let prev_hash = prev.get(&sf.path).cloned();
            seen_paths.insert(sf.path.clone());

            let status = match &prev_hash {
                None => {
                    counts.added += 1;
                    ChangeStatus::Added
                }
                Some(h) if h == &content_hash => {
                    counts.unchanged += 1;
                    ChangeStatus::Unchanged
                }
                Some(_) => {
                    counts.modified += 1;
                    ChangeStatus::Modified
                }
            };

            records.push(ChangeRecord {
                path: sf.path.clone(),
                prev_hash,
                new_hash: Some(content_hash.clone()),
                status,
            });

            files.push(File::new(sf.path.clone(), content_hash, sf.size, sf.mtime));
        }

        for path in prev.keys() {
            if !seen_paths.contains(path) {
                counts.deleted += 1;
                records.push(ChangeRecord {
                    path: path.clone(),
                    prev_hash: Some(prev[path].clone()),
                    new_hash: None,
                    status: ChangeStatus::Deleted,
                });
            }
        }

        Ok(ClassifyOutcome {
            files,
            records,
            counts,
        })
    }

    /// Commit a successfully (re)processed path (spec §4.2 Algorithm).
    pub fn commit_path(&self, project_id: &str, path: &str, new_hash: &str) -> Result<()> {
        self.store.commit_upsert(project_id, path, new_hash)
    }

    /// Commit a fully-cascaded deletion.
    pub fn commit_deletion(&self, project_id: &str, path: &str) -> Result<()> {
        self.store.commit_delete(project_id, path)
    }
}

fn hash_file_streaming(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path).map_err(CodegraphError::from)?;
    let mut hasher = StreamingHasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(CodegraphError::from)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ledger::infrastructure::memory_ledger::MemoryLedgerStore;
    use std::fs;

    fn scanned(path: &str, size: u64) -> ScannedFile {
        ScannedFile {
            path: path.to_string(),
            size,
            mtime: 0,
        }
    }

    #[test]
    fn unchanged_file_hash_is_stable_across_passes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1").unwrap();
        let store = MemoryLedgerStore::new();
        let ledger = ChangeLedger::new(&store);

        let first = ledger
            .classify("p1", dir.path(), &[scanned("a.py", 5)])
            .unwrap();
        assert_eq!(first.counts.added, 1);
        ledger
            .commit_path("p1", "a.py", &first.files[0].content_hash)
            .unwrap();

        let second = ledger
            .classify("p1", dir.path(), &[scanned("a.py", 5)])
            .unwrap();
        assert_eq!(second.counts.unchanged, 1);
        assert_eq!(second.counts.added, 0);
        assert_eq!(second.counts.modified, 0);
    }

    #[test]
    fn touch_without_content_change_is_still_unchanged() {
        // mtime is not part of the scan struct's hash input at all —
        // content hash is computed from bytes on disk, so "touch" (same
        // bytes, different mtime) is necessarily a no-op second pass.
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1").unwrap();
        let store = MemoryLedgerStore::new();
        let ledger = ChangeLedger::new(&store);

        let first = ledger
            .classify("p1", dir.path(), &[scanned("a.py", 5)])
            .unwrap();
        ledger
            .commit_path("p1", "a.py", &first.files[0].content_hash)
            .unwrap();

        let second = ledger
            .classify("p1", dir.path(), &[scanned("a.py", 999)])
            .unwrap();
        assert_eq!(second.counts.unchanged, 1);
    }

    #[test]
    fn modified_content_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1").unwrap();
        let store = MemoryLedgerStore::new();
        let ledger = ChangeLedger::new(&store);

        let first = ledger
            .classify("p1", dir.path(), &[scanned("a.py", 5)])
            .unwrap();
        ledger
            .commit_path("p1", "a.py", &first.files[0].content_hash)
            .unwrap();

        fs::write(dir.path().join("a.py"), "x = 2").unwrap();
        let second = ledger
            .classify("p1", dir.path(), &[scanned("a.py", 5)])
            .unwrap();
        assert_eq!(second.counts.modified, 1);
    }

    #[test]
    fn deleted_path_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1").unwrap();
        let store = MemoryLedgerStore::new();
        let ledger = ChangeLedger::new(&store);

        let first = ledger
            .classify("p1", dir.path(), &[scanned("a.py", 5)])
            .unwrap();
        ledger
            .commit_path("p1", "a.py", &first.files[0].content_hash)
            .unwrap();

        let second = ledger.classify("p1", dir.path(), &[]).unwrap();
        assert_eq!(second.counts.deleted, 1);
    }
}
