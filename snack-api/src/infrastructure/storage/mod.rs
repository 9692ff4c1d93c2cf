pub mod upload;

pub use upload::{UploadStore, UploadedImage};
