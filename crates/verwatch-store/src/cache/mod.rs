//! On-disk cache for catalog and descriptor documents
//!
//! Provides:
//! - Fixed layout under a single cache root
//! - Atomic writes (temp file, then rename)

mod atomic;
mod layout;

pub use atomic::atomic_write;
pub use layout::CacheLayout;
