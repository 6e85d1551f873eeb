//! Download infrastructure module

mod directory;

pub use directory::DirectoryDownloads;
