//! Default values for configuration

/// Default Redis host
pub fn default_store_host() -> String {
    std::env::var("HARVESTER_REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

/// Default Redis port
pub fn default_store_port() -> u16 {
    6379
}

/// Default maximum idle pooled connections
pub fn default_store_max_idle() -> usize {
    80
}

/// Default maximum active pooled connections
pub fn default_store_max_active() -> usize {
    12000
}

/// Default download root directory
pub fn default_download_root() -> std::path::PathBuf {
    std::path::PathBuf::from("downloads")
}

/// Default cap on simultaneous archive downloads
pub fn default_max_concurrent_downloads() -> usize {
    5
}

/// Default listing page URL when none is supplied interactively
pub fn default_page_url() -> String {
    "http://feed.omgili.com/5Rh5AMTrc4Pv/mainstream/posts/".to_string()
}

/// Default user agent string
pub fn default_user_agent() -> String {
    format!("harvester/{}", env!("CARGO_PKG_VERSION"))
}

/// Default request timeout in seconds
pub fn default_timeout_secs() -> u64 {
    30
}
