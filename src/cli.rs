use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tumblr-photo-dl")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Blog to download, e.g. someblog.tumblr.com
    pub blog: String,

    /// Tumblr API key
    #[arg(long, env = "TUMBLR_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Directory the blog's storage directory is created in
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// API base URL
    #[arg(long, default_value = crate::config::DEFAULT_API_BASE)]
    pub api_base: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "300")]
    pub timeout: u64,

    /// HTTP proxy (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}
