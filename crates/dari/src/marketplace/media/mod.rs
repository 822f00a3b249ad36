//! Listing photos and walkthrough videos.

pub mod router;
pub mod service;
pub mod storage;


pub use router::media_router;
pub use service::{MediaService, MediaServiceError};
pub use storage::{
    archive_download_url, ArchiveVideoStore, ImageStore, MediaError, MediaFile, PublicImageStore,
    VideoArchive,
};
