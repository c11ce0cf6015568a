pub mod catalog;
pub mod loader;
pub mod matrix;
pub mod redis;

pub use catalog::{Catalog, ReturnAggregate, TextColumn};
pub use loader::{load_catalog, load_catalog_from_reader};
pub use matrix::SimilarityMatrix;
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
