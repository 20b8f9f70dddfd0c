use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::candidate::CandidateRecord;
use crate::models::session::Session;
use crate::storage::{Document, Storage};

/// Single-JSON-document store. Each operation reads the whole document,
/// mutates it, and rewrites it through a temp file + rename.
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        if tokio::fs::try_exists(&path).await? {
            // Fail fast on a corrupt document rather than clobbering it later.
            Self::load_from(&path).await?;
        } else {
            write_atomic(&path, &Document::default()).await?;
        }
        Ok(Self {
            path,
            guard: Mutex::new(()),
        })
    }

    async fn load_from(path: &Path) -> Result<Document> {
        let raw = tokio::fs::read(path).await?;
        serde_json::from_slice(&raw)
            .map_err(|e| Error::Storage(format!("corrupt data file {}: {}", path.display(), e)))
    }

    async fn load(&self) -> Result<Document> {
        Self::load_from(&self.path).await
    }

    async fn save(&self, doc: &Document) -> Result<()> {
        write_atomic(&self.path, doc).await
    }
}

async fn write_atomic(path: &Path, doc: &Document) -> Result<()> {
    let raw = serde_json::to_vec_pretty(doc)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &raw).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let _g = self.guard.lock().await;
        Ok(self.load().await?.sessions.remove(id))
    }

    async fn put_session(&self, session: &Session) -> Result<()> {
        let _g = self.guard.lock().await;
        let mut doc = self.load().await?;
        doc.sessions.insert(session.id.clone(), session.clone());
        self.save(&doc).await
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        let _g = self.guard.lock().await;
        let mut doc = self.load().await?;
        let existed = doc.sessions.remove(id).is_some();
        if existed {
            self.save(&doc).await?;
        }
        Ok(existed)
    }

    async fn append_candidate(&self, record: &CandidateRecord) -> Result<()> {
        let _g = self.guard.lock().await;
        let mut doc = self.load().await?;
        doc.candidates.push(record.clone());
        self.save(&doc).await
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateRecord>> {
        let _g = self.guard.lock().await;
        Ok(self.load().await?.candidates)
    }

    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateRecord>> {
        let _g = self.guard.lock().await;
        Ok(self
            .load()
            .await?
            .candidates
            .into_iter()
            .find(|c| c.id == id))
    }

    async fn find_candidate_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CandidateRecord>> {
        let _g = self.guard.lock().await;
        Ok(self
            .load()
            .await?
            .candidates
            .into_iter()
            .find(|c| c.session_id == session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Difficulty, Question};
    use crate::models::session::CandidateProfile;

    #[tokio::test]
    async fn sessions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let session = Session::new(
            CandidateProfile {
                name: "Alice".into(),
                email: "alice@example.com".into(),
                phone: None,
            },
            vec![Question::free_text("Q", Difficulty::Easy, &[])],
        );
        let id = session.id.clone();

        {
            let store = FileStorage::open(&path).await.unwrap();
            store.put_session(&session).await.unwrap();
        }

        let store = FileStorage::open(&path).await.unwrap();
        let loaded = store.get_session(&id).await.unwrap().unwrap();
        assert_eq!(loaded.candidate.name, "Alice");
        assert_eq!(loaded.questions.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_document_is_rejected_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        assert!(FileStorage::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn delete_session_reports_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStorage::open(dir.path().join("db.json")).await.unwrap();
        assert!(!store.delete_session("missing").await.unwrap());
    }
}
