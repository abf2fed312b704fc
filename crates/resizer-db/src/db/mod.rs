//! Cache record repositories
//
// Store trait shared by every backend
pub mod store;
//
// PostgreSQL repository for the resized_images table
pub mod resized_image;
//
// Process-local store for development and tests
pub mod memory;

pub use memory::MemoryCacheStore;
pub use resized_image::PostgresCacheRepository;
pub use store::CacheStore;
