//! Download module for saving the harvested image set
//!
//! - `extension`: Content-Type to file extension mapping
//! - `engine`: the semaphore-bounded download pool

mod engine;
mod extension;

pub use engine::{
    download_all, download_one, DownloadError, DownloadOptions, DownloadReport, DownloadedImage,
};
pub use extension::{extension_for, image_file_name};
