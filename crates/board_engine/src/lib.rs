//! Status board engine: remote store client, fallback cache and the async
//! sync runtime that executes core effects.
mod cache;
mod persist;
mod remote;
mod sync;
mod types;

pub use cache::{FallbackCache, FileCache, SNAPSHOT_FILENAME};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use remote::{HttpRemoteStore, RemoteSettings, RemoteStore};
pub use sync::{PollingHandle, SyncEngine};
pub use types::RemoteError;
