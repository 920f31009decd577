//! HTTP routes for the admin console.

pub mod pages;
pub mod upload;

pub use upload::{proxy_upload, UploadProxy, MAX_UPLOAD_BODY_BYTES};
