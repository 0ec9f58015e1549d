use crate::client::Transport;
use crate::config::{CollectorConfig, PAGE_LIMIT};
use crate::error::{CollectorError, FetchError, Result};
use crate::models::{ApiResponse, CollectStatus, DownloadState};
use crate::state::StateManager;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every discovered image was saved; the checkpoint has been removed.
    Complete,
    /// Some links are broken; the checkpoint is kept for inspection or a rerun.
    Partial { broken: usize },
}

/// Pages through a blog's photo posts and downloads every original-size image,
/// checkpointing after each page and each image so an interrupted run resumes
/// where it stopped.
pub struct ResumableCollector<T> {
    transport: T,
    config: CollectorConfig,
    posts_endpoint: Url,
    storage_dir: PathBuf,
    state_manager: StateManager,
    state: DownloadState,
    progress: ProgressBar,
}

impl<T: Transport> ResumableCollector<T> {
    /// Prepares `<output_dir>/<blog with '.' replaced by '_'>` and loads its
    /// checkpoint if one exists.
    ///
    /// A plain file occupying the storage path is deleted and replaced by a
    /// directory.
    pub fn initialize(blog: &str, config: CollectorConfig, transport: T) -> Result<Self> {
        if blog.is_empty() {
            return Err(CollectorError::EmptyBlog);
        }

        let posts_endpoint = Url::parse(&config.api_base)
            .and_then(|base| base.join(&format!("/v2/blog/{blog}/posts/photo")))
            .map_err(|e| CollectorError::InvalidUrl {
                url: config.api_base.clone(),
                reason: e.to_string(),
            })?;

        let storage_dir = config.output_dir.join(storage_dir_name(blog));
        prepare_storage_dir(&storage_dir)?;

        let state_manager = StateManager::new(&storage_dir);
        let state = match state_manager.load_state()? {
            Some(state) => {
                info!(
                    path = %state_manager.path().display(),
                    current_post_index = state.current_post_index,
                    pending = state.pending_image_links.len(),
                    broken = state.broken_image_links.len(),
                    collected = state.is_collected(),
                    "Resuming from checkpoint"
                );
                state
            }
            None => DownloadState::new(),
        };

        Ok(Self {
            transport,
            config,
            posts_endpoint,
            storage_dir,
            state_manager,
            state,
            progress: ProgressBar::hidden(),
        })
    }

    pub fn state(&self) -> &DownloadState {
        &self.state
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn checkpoint_path(&self) -> &Path {
        self.state_manager.path()
    }

    /// URL of the next page of photo posts, older than the cursor if one is set.
    pub fn page_url(&self) -> String {
        let mut url = self.posts_endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("api_key", &self.config.api_key)
                .append_pair("limit", &PAGE_LIMIT.to_string());
            if let Some(last_id) = self.state.last_seen_post_id {
                query.append_pair("before_id", &last_id.to_string());
            }
        }
        url.into()
    }

    /// Fetches one page of posts, queues their photo links and advances the
    /// cursor. The checkpoint is written before returning.
    pub async fn fetch_next_page(&mut self) -> Result<()> {
        let url = self.page_url();
        debug!(endpoint = %self.posts_endpoint, before_id = ?self.state.last_seen_post_id, "Fetching page");

        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|e| e.with_url(self.posts_endpoint.to_string()))?;
        let page: ApiResponse =
            serde_json::from_slice(&body).map_err(|source| CollectorError::Parse {
                url: self.posts_endpoint.to_string(),
                source,
            })?;

        self.state.last_status = Some(page.meta.status);
        let total = *self
            .state
            .total_post_count
            .get_or_insert(page.response.total_posts);

        if self.progress.length() != Some(total) {
            self.start_progress(total, "{msg:24} {bar:40} {pos}/{len} posts");
        }

        let posts = page.response.posts;
        let fetched = posts.len();

        for (seen, post) in posts.into_iter().enumerate() {
            if self.state.current_post_index >= total {
                warn!(
                    total,
                    ignored = fetched - seen,
                    "Page holds more posts than the blog reported; ignoring the rest"
                );
                break;
            }

            self.state.current_post_index += 1;
            self.state.last_seen_post_id = Some(post.id);
            self.progress.suspend(|| {
                info!(
                    index = self.state.current_post_index,
                    total,
                    post_id = post.id,
                    photos = post.photos.len(),
                    "Collected post"
                )
            });

            self.state
                .pending_image_links
                .extend(post.photos.into_iter().map(|photo| photo.original_size.url));

            self.progress.set_position(self.state.current_post_index);
            self.progress.set_message(format!("post {}", post.id));
        }

        if fetched == 0 || self.state.current_post_index == total {
            self.state.collect_status = CollectStatus::Collected;
            info!(
                posts = self.state.current_post_index,
                links = self.state.pending_image_links.len(),
                "Collecting links is done"
            );
        }

        self.state_manager.save_state(&self.state)
    }

    /// Downloads queued links most recent first. Links failing with an HTTP
    /// status are recorded as broken; any other fetch failure aborts.
    pub async fn drain_download_queue(&mut self) -> Result<()> {
        self.progress.finish_and_clear();
        self.start_progress(
            self.state.pending_image_links.len() as u64,
            "{msg:24} {bar:40} {pos}/{len} images",
        );

        // The link leaves the queue only once it is saved or recorded as
        // broken, so an aborted drain keeps it for the next attempt.
        while let Some(link) = self.state.pending_image_links.last().cloned() {
            let remaining = self.state.pending_image_links.len() - 1;

            match image_file_name(&link) {
                None => {
                    self.progress
                        .suspend(|| warn!(%link, "No file name in image link"));
                    self.state.mark_broken(link);
                }
                Some(file_name) => match self.transport.get(&link).await {
                    Ok(bytes) => {
                        let path = self.storage_dir.join(&file_name);
                        fs::write(&path, &bytes).map_err(CollectorError::storage(&path))?;
                        self.progress.suspend(
                            || info!(remaining, %link, bytes = bytes.len(), "Saved image"),
                        );
                        self.progress.set_message(file_name);
                    }
                    Err(FetchError::Status { status, .. }) => {
                        self.progress
                            .suspend(|| warn!(remaining, %link, status, "Image download failed"));
                        self.state.mark_broken(link);
                    }
                    Err(err) => return Err(err.into()),
                },
            }

            self.state.pending_image_links.pop();
            self.state_manager.save_state(&self.state)?;
            self.progress.inc(1);
        }

        Ok(())
    }

    /// Collects until the blog is exhausted, then drains the queue. The
    /// checkpoint is removed only when nothing is broken.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        while !self.state.is_collected() {
            self.fetch_next_page().await?;
        }

        self.drain_download_queue().await?;
        self.progress.finish_and_clear();

        let broken = self.state.broken_image_links.len();
        if broken > 0 {
            warn!(
                broken,
                checkpoint = %self.state_manager.path().display(),
                "Some files did not load"
            );
            Ok(RunOutcome::Partial { broken })
        } else {
            self.state_manager.clear_state()?;
            info!(dir = %self.storage_dir.display(), "All files loaded");
            Ok(RunOutcome::Complete)
        }
    }

    /// Replaces the bar once its length is known. Stays hidden unless
    /// progress display is enabled.
    fn start_progress(&mut self, len: u64, template: &str) {
        if !self.config.show_progress {
            return;
        }

        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(template)
                .unwrap()
                .progress_chars("=>-"),
        );
        self.progress = pb;
    }
}

/// `some.blog.com` is stored under `some_blog_com`.
pub fn storage_dir_name(blog: &str) -> String {
    blog.replace('.', "_")
}

/// Last path segment of the link, without query or fragment.
pub fn image_file_name(link: &str) -> Option<String> {
    let name = match Url::parse(link) {
        Ok(url) => url.path_segments()?.last()?.to_string(),
        Err(_) => link.rsplit('/').next()?.to_string(),
    };

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

fn prepare_storage_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => {
            warn!(path = %dir.display(), "Replacing file with storage directory");
            fs::remove_file(dir).map_err(CollectorError::storage(dir))?;
            fs::create_dir(dir).map_err(CollectorError::storage(dir))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %dir.display(), "Creating storage directory");
            fs::create_dir_all(dir).map_err(CollectorError::storage(dir))
        }
        Err(source) => Err(CollectorError::Storage {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_dir_replaces_dots() {
        assert_eq!(storage_dir_name("someblog.tumblr.com"), "someblog_tumblr_com");
        assert_eq!(storage_dir_name("plain"), "plain");
    }

    #[test]
    fn file_name_is_last_path_segment() {
        assert_eq!(
            image_file_name("http://64.media.tumblr.com/abc/tumblr_xyz_1280.jpg").as_deref(),
            Some("tumblr_xyz_1280.jpg")
        );
        assert_eq!(image_file_name("http://x/a.jpg?size=2#top").as_deref(), Some("a.jpg"));
        assert_eq!(image_file_name("not a url/b.png").as_deref(), Some("b.png"));
    }

    #[test]
    fn file_name_missing_for_directory_links() {
        assert_eq!(image_file_name("http://x/photos/"), None);
        assert_eq!(image_file_name("http://x"), None);
    }
}
