//! Session store trait definition

use crate::model::SessionRecord;
use crate::Result;

/// Keyed storage of notarized sessions
///
/// Implementations:
/// - [`crate::store::MemoryStore`] for tests and short-lived processes
/// - [`crate::store::FileStore`] for a single-file store that survives restarts
pub trait SessionStore: Send + Sync {
    /// Fetch a session by id
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Insert or replace a session, keyed by its `session_id`
    fn put(&self, record: SessionRecord) -> Result<()>;

    /// All session ids, sorted
    fn list(&self) -> Result<Vec<String>>;
}
