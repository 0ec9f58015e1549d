use serde::{Deserialize, Serialize};

/// Envelope of every Tumblr v2 API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub meta: Meta,
    pub response: PostsPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub status: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsPage {
    pub total_posts: u64,
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub original_size: PhotoSize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectStatus {
    #[default]
    Collecting,
    Collected,
}

/// Progress of one blog, persisted as the checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadState {
    /// Links awaiting download; the last one is downloaded first.
    pub pending_image_links: Vec<String>,
    /// Links whose download failed with an HTTP status. Never retried in a run.
    pub broken_image_links: Vec<String>,
    pub current_post_index: u64,
    pub total_post_count: Option<u64>,
    /// Pagination cursor: only posts older than this id are requested next.
    pub last_seen_post_id: Option<u64>,
    /// `meta.status` of the most recent page.
    pub last_status: Option<u16>,
    pub collect_status: CollectStatus,
}

impl DownloadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collected(&self) -> bool {
        self.collect_status == CollectStatus::Collected
    }

    pub fn mark_broken(&mut self, link: String) {
        if !self.broken_image_links.contains(&link) {
            self.broken_image_links.push(link);
        }
    }
}
