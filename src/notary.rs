//! High-level Notary API
//!
//! This module provides the main entry point for notarizing session logs:
//! - Submitting a session's log and persisting its root and proofs
//! - Recomputing a session from a changed log
//! - Looking up per-entry proofs
//! - Auditing entries against a stored or client-supplied root

use crate::config::NotaryConfig;
use crate::hasher::{HashAlgorithm, MerkleHasher};
use crate::model::{MerkleProof, RawProofStep, SessionRecord};
use crate::store::{FileStore, MemoryStore, SessionStore};
use crate::verify::{verify_proof, verify_submission, Verification};
use crate::{Error, Result};
use parking_lot::Mutex;
use serde_json::Value;

/// Notarizes session logs into a [`SessionStore`]
pub struct Notary {
    store: Box<dyn SessionStore>,
    hasher: MerkleHasher,
    /// Serializes submit/recompute so only one writer updates a root at a time
    write_lock: Mutex<()>,
}

impl Notary {
    pub fn new(store: impl SessionStore + 'static, algorithm: HashAlgorithm) -> Self {
        Notary {
            store: Box::new(store),
            hasher: MerkleHasher::new(algorithm),
            write_lock: Mutex::new(()),
        }
    }

    /// A notary over a process-local store
    pub fn in_memory(algorithm: HashAlgorithm) -> Self {
        Self::new(MemoryStore::new(), algorithm)
    }

    /// A notary over the file store named by `config`
    pub fn open(config: &NotaryConfig) -> Result<Self> {
        let store = FileStore::open_or_create(&config.store_path)?;
        Ok(Self::new(store, config.algorithm))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.hasher.algorithm()
    }

    // === Session Operations ===

    /// Notarize a new session log
    pub fn submit(&self, session_id: &str, entries: &[Value]) -> Result<SessionRecord> {
        let _guard = self.write_lock.lock();
        if self.store.get(session_id)?.is_some() {
            return Err(Error::SessionExists(session_id.to_string()));
        }

        let record = SessionRecord::build(session_id, self.algorithm(), entries)?;
        self.store.put(record.clone())?;
        tracing::info!(
            session = session_id,
            entries = record.leaf_count(),
            root = %record.root,
            "notarized session"
        );
        Ok(record)
    }

    /// Replace a session's log and rebuild its tree
    ///
    /// The session keeps its id and creation time; its revision increases by
    /// one. The notary's current algorithm is used for the rebuild.
    pub fn recompute(&self, session_id: &str, entries: &[Value]) -> Result<SessionRecord> {
        let _guard = self.write_lock.lock();
        let existing = self
            .store
            .get(session_id)?
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;

        let record = existing.recomputed(self.algorithm(), entries)?;
        self.store.put(record.clone())?;
        tracing::info!(
            session = session_id,
            entries = record.leaf_count(),
            revision = record.revision,
            old_root = %existing.root,
            root = %record.root,
            "recomputed session"
        );
        Ok(record)
    }

    pub fn session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        self.store.get(session_id)
    }

    pub fn sessions(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Proof for entry `index` of a stored session
    pub fn proof(&self, session_id: &str, index: usize) -> Result<MerkleProof> {
        let record = self.require(session_id)?;
        record.proof(index).cloned()
    }

    // === Audit Operations ===

    /// Check a client-submitted entry, proof and root
    ///
    /// Consults no stored state. Malformed input yields `verified: false`.
    pub fn audit(&self, entry: &Value, proof: &[RawProofStep], root: &str) -> Verification {
        let result = verify_submission(&self.hasher, entry, proof, root);
        log_audit(None, &result);
        result
    }

    /// Check an entry against the stored root and proof of a session
    ///
    /// Uses the algorithm the session was notarized with.
    pub fn audit_session(
        &self,
        session_id: &str,
        index: usize,
        entry: &Value,
    ) -> Result<Verification> {
        let record = self.require(session_id)?;
        let proof = record.proof(index)?;
        let result = verify_proof(&record.hasher(), entry, proof, &record.root);
        log_audit(Some(session_id), &result);
        Ok(result)
    }

    fn require(&self, session_id: &str) -> Result<SessionRecord> {
        self.store
            .get(session_id)?
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
    }
}

fn log_audit(session_id: Option<&str>, result: &Verification) {
    if result.verified {
        tracing::debug!(session = session_id, "audit passed");
    } else {
        let computed = result
            .computed_hash
            .map(|h| h.to_hex())
            .unwrap_or_default();
        tracing::warn!(
            session = session_id,
            computed = %computed,
            reason = %result.message,
            "audit failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::{MSG_MISMATCH, MSG_VALID};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn entries() -> Vec<Value> {
        vec![
            json!({"type": "bet", "amount": 10}),
            json!({"type": "win", "amount": 15}),
        ]
    }

    #[test]
    fn test_submit_and_fetch() {
        let notary = Notary::in_memory(HashAlgorithm::Sha256);
        let record = notary.submit("game-1", &entries()).unwrap();

        assert_eq!(notary.session("game-1").unwrap(), Some(record.clone()));
        assert_eq!(notary.sessions().unwrap(), vec!["game-1".to_string()]);
        assert_eq!(notary.proof("game-1", 1).unwrap(), record.proofs[1]);
    }

    #[test]
    fn test_submit_twice_rejected() {
        let notary = Notary::in_memory(HashAlgorithm::Sha256);
        notary.submit("game-1", &entries()).unwrap();
        assert!(matches!(
            notary.submit("game-1", &entries()),
            Err(Error::SessionExists(_))
        ));
    }

    #[test]
    fn test_submit_empty_rejected_and_not_stored() {
        let notary = Notary::in_memory(HashAlgorithm::Sha256);
        assert!(matches!(notary.submit("game-1", &[]), Err(Error::EmptyTree)));
        assert_eq!(notary.session("game-1").unwrap(), None);
    }

    #[test]
    fn test_recompute() {
        let notary = Notary::in_memory(HashAlgorithm::Sha256);
        let first = notary.submit("game-1", &entries()).unwrap();

        let mut changed = entries();
        changed.push(json!({"type": "settle", "payout": 15}));
        let second = notary.recompute("game-1", &changed).unwrap();

        assert_eq!(second.revision, 2);
        assert_eq!(second.leaf_count(), 3);
        assert_ne!(second.root, first.root);
        assert_eq!(notary.session("game-1").unwrap(), Some(second));
    }

    #[test]
    fn test_recompute_missing_session() {
        let notary = Notary::in_memory(HashAlgorithm::Sha256);
        assert!(matches!(
            notary.recompute("nope", &entries()),
            Err(Error::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_proof_errors() {
        let notary = Notary::in_memory(HashAlgorithm::Sha256);
        notary.submit("game-1", &entries()).unwrap();
        assert!(matches!(
            notary.proof("game-1", 2),
            Err(Error::ProofIndexOutOfRange { index: 2, leaves: 2 })
        ));
        assert!(matches!(
            notary.proof("game-2", 0),
            Err(Error::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_audit_session() {
        let notary = Notary::in_memory(HashAlgorithm::Blake2b256);
        notary.submit("game-1", &entries()).unwrap();

        let ok = notary.audit_session("game-1", 1, &entries()[1]).unwrap();
        assert!(ok.verified);
        assert_eq!(ok.message, MSG_VALID);

        let forged = json!({"type": "win", "amount": 16});
        let bad = notary.audit_session("game-1", 1, &forged).unwrap();
        assert!(!bad.verified);
        assert_eq!(bad.message, MSG_MISMATCH);
    }

    #[test]
    fn test_audit_client_submission() {
        let notary = Notary::in_memory(HashAlgorithm::Sha256);
        let record = notary.submit("game-1", &entries()).unwrap();
        let proof: Vec<RawProofStep> = record.proofs[0].iter().map(RawProofStep::from).collect();

        assert!(notary.audit(&entries()[0], &proof, &record.root.to_hex()).verified);
        assert!(!notary.audit(&entries()[1], &proof, &record.root.to_hex()).verified);
        assert!(!notary.audit(&entries()[0], &proof, "zz").verified);
    }

    #[test]
    fn test_file_backed_notary_persists() {
        let dir = tempdir().unwrap();
        let config = NotaryConfig {
            algorithm: HashAlgorithm::Blake3,
            store_path: dir.path().join("sessions.notary"),
        };

        let root = {
            let notary = Notary::open(&config).unwrap();
            notary.submit("game-1", &entries()).unwrap().root
        };

        let notary = Notary::open(&config).unwrap();
        let record = notary.session("game-1").unwrap().unwrap();
        assert_eq!(record.root, root);
        assert_eq!(record.algorithm, HashAlgorithm::Blake3);
        assert!(notary.audit_session("game-1", 0, &entries()[0]).unwrap().verified);
    }

    #[test]
    fn test_concurrent_submits_distinct_sessions() {
        let notary = Arc::new(Notary::in_memory(HashAlgorithm::Sha256));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let notary = Arc::clone(&notary);
                std::thread::spawn(move || {
                    let log = vec![json!({"session": i, "type": "bet"})];
                    notary.submit(&format!("game-{}", i), &log).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(notary.sessions().unwrap().len(), 8);
    }
}
