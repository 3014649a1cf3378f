//! Request handler module
//!
//! Routes requests to the data listing and CSV transcoding handlers.

pub mod data_files;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
