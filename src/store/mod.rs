//! Session storage
//!
//! Maps a session id to its notarized log, root and proofs. The merkle
//! engine itself is stateless; everything persistent lives here.

mod file_store;
mod memory_store;
mod traits;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use traits::SessionStore;
