//! # Collaborators
//!
//! The framework's boundary with the outside world is a set of injected
//! capability traits: network loading, document access, history, and
//! persistent storage. The core only ever talks to these seams, so a
//! headless test drives the whole transition machine against the
//! in-memory implementations shipped here.

pub mod dom;
pub mod history;
pub mod loader;
pub mod storage;

pub use dom::{Dom, MemoryDom};
pub use history::{History, HistoryChange, MemoryHistory};
pub use loader::{HttpLoader, LoadedPage, Loader, StaticLoader};
pub use storage::{MemoryStorage, Storage};
