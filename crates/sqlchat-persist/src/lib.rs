pub mod error;
pub mod persistence;
pub mod store;

pub use error::PersistError;
pub use persistence::Persistence;
pub use store::{FileStore, KeyValueStore, MemoryStore};
