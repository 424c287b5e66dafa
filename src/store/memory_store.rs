//! Process-local session store

use super::SessionStore;
use crate::model::SessionRecord;
use crate::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory store; contents are lost when dropped
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<BTreeMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    fn put(&self, record: SessionRecord) -> Result<()> {
        self.sessions
            .write()
            .insert(record.session_id.clone(), record);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.sessions.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashAlgorithm;
    use serde_json::json;

    #[test]
    fn test_memory_store_put_get() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        let record = SessionRecord::build("s1", HashAlgorithm::Sha256, &[json!(1)]).unwrap();
        store.put(record.clone()).unwrap();

        assert_eq!(store.get("s1").unwrap(), Some(record));
        assert_eq!(store.get("s2").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_replace_and_list() {
        let store = MemoryStore::new();
        let a = SessionRecord::build("b", HashAlgorithm::Sha256, &[json!(1)]).unwrap();
        let b = SessionRecord::build("a", HashAlgorithm::Sha256, &[json!(2)]).unwrap();
        store.put(a.clone()).unwrap();
        store.put(b).unwrap();

        let replaced = a.recomputed(HashAlgorithm::Sha256, &[json!(3)]).unwrap();
        store.put(replaced.clone()).unwrap();

        assert_eq!(store.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.get("b").unwrap(), Some(replaced));
    }
}
