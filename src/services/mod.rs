// Service exports
pub mod cache;
pub mod photos;
pub mod postgres;

pub use cache::{CacheError, CacheKey, MatchCache, MemoryCache, TieredCache};
pub use photos::{PhotoClient, PhotoError};
pub use postgres::{PostgresClient, StoreError};
