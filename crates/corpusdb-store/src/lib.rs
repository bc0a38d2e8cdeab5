//! Datastore access for the two corpora: connection pooling, pgvector
//! literal encoding, and the candidate-fetch queries both search paths
//! build on. All tables are read-only from this crate's perspective.

pub mod pool;
pub mod queries;
pub mod vector;

pub use pool::PoolManager;
pub use vector::vector_to_pg;
