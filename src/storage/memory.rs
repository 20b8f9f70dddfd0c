use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::candidate::CandidateRecord;
use crate::models::session::Session;
use crate::storage::{Document, Storage};

/// In-process store, re-initialized on every start. The default when no
/// `DATA_FILE` is configured.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    doc: RwLock<Document>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Document>> {
        self.doc
            .read()
            .map_err(|_| Error::Storage("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Document>> {
        self.doc
            .write()
            .map_err(|_| Error::Storage("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.read()?.sessions.get(id).cloned())
    }

    async fn put_session(&self, session: &Session) -> Result<()> {
        self.write()?
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<bool> {
        Ok(self.write()?.sessions.remove(id).is_some())
    }

    async fn append_candidate(&self, record: &CandidateRecord) -> Result<()> {
        self.write()?.candidates.push(record.clone());
        Ok(())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateRecord>> {
        Ok(self.read()?.candidates.clone())
    }

    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateRecord>> {
        Ok(self.read()?.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn find_candidate_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CandidateRecord>> {
        Ok(self
            .read()?
            .candidates
            .iter()
            .find(|c| c.session_id == session_id)
            .cloned())
    }
}
