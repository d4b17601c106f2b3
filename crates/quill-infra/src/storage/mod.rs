//! Upload storage implementations.

mod disk;

pub use disk::DiskUploadStore;
