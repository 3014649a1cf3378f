//! HTTP protocol layer module
//!
//! Response builders shared by the data routes, decoupled from the data logic.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_error_response, build_json_response,
    build_options_response, ResponseContext,
};
