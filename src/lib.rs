//! Resumable downloader for the photo posts of a Tumblr blog.
//!
//! [`ResumableCollector`] pages through the blog's photo posts collecting
//! original-size image links, then downloads them into a per-blog storage
//! directory. Progress is checkpointed to `<storage_dir>/status` after every
//! page and every image, so an interrupted run picks up where it stopped.

pub mod cli;
pub mod client;
pub mod config;
pub mod downloader;
pub mod error;
pub mod models;
pub mod state;

pub use client::{HttpTransport, Transport};
pub use config::CollectorConfig;
pub use downloader::{ResumableCollector, RunOutcome};
pub use error::{CollectorError, FetchError};
pub use models::{CollectStatus, DownloadState};
