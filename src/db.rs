pub mod memory_store;
pub mod record_store;
pub mod repository;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use record_store::{Collection, RecordStore, WriteBatch, WriteOp};
pub use repository::{
    ClientRepository, MaterialRepository, ProductRepository, QuoteRepository, Record, Repository,
};
pub use sqlite_store::SqliteStore;
