//! HTTP protocol layer module
//!
//! Response builders, MIME detection and `ETag` helpers shared by the asset
//! store and the host.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_404_response, build_405_response, build_500_response,
    build_asset_response, build_options_response,
};
