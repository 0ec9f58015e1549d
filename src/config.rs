use crate::cli::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://api.tumblr.com";

/// Posts requested per page.
pub const PAGE_LIMIT: u32 = 5;

/// Everything the collector needs that does not live in the checkpoint.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub api_key: String,
    pub api_base: String,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub show_progress: bool,
}

impl CollectorConfig {
    pub fn new(api_key: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            output_dir: output_dir.into(),
            timeout: Duration::from_secs(300),
            proxy: None,
            show_progress: false,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl From<&Args> for CollectorConfig {
    fn from(args: &Args) -> Self {
        Self {
            api_key: args.api_key.clone(),
            api_base: args.api_base.clone(),
            output_dir: PathBuf::from(&args.output_dir),
            timeout: Duration::from_secs(args.timeout),
            proxy: args.proxy.clone(),
            show_progress: !args.no_progress,
        }
    }
}
