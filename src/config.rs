use crate::token::Credentials;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone)]
pub struct Config {
    // Credentials. Missing values are not rejected here; calls using them fail.
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub playlist_id: String,

    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_auth_base")]
    pub auth_base: String,
    /// includes the version path
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Directory holding the browser UI.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// When set, logs are also written to a daily-rotated file here.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3001 }
fn default_auth_base() -> String { "https://accounts.spotify.com".into() }
fn default_api_base() -> String { "https://api.spotify.com/v1".into() }
fn default_cache_ttl() -> u64 { 600 }
fn default_search_limit() -> u32 { 10 }
fn default_page_size() -> usize { 100 }
fn default_static_dir() -> PathBuf { "public".into() }

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            playlist_id: String::new(),
            host: default_host(),
            port: default_port(),
            auth_base: default_auth_base(),
            api_base: default_api_base(),
            cache_ttl_secs: default_cache_ttl(),
            search_limit: default_search_limit(),
            page_size: default_page_size(),
            static_dir: default_static_dir(),
            log_dir: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("credentials", &self.credentials())
            .field("playlist_id", &self.playlist_id)
            .field("bind", &self.bind_addr())
            .field("auth_base", &self.auth_base)
            .field("api_base", &self.api_base)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("search_limit", &self.search_limit)
            .field("page_size", &self.page_size)
            .field("static_dir", &self.static_dir)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg.normalized())
    }

    /// Build a config from process environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `get`.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        use anyhow::Context;

        let mut cfg = Config::default();
        if let Some(v) = get("CLIENT_ID") { cfg.client_id = v; }
        if let Some(v) = get("CLIENT_SECRET") { cfg.client_secret = v; }
        if let Some(v) = get("REFRESH_TOKEN") { cfg.refresh_token = v; }
        if let Some(v) = get("PLAYLIST_ID") { cfg.playlist_id = v; }
        if let Some(v) = get("HOST") { cfg.host = v; }
        if let Some(v) = get("PORT") {
            cfg.port = v.trim().parse().with_context(|| format!("invalid PORT {:?}", v))?;
        }
        if let Some(v) = get("SPOTIFY_AUTH_BASE") { cfg.auth_base = v; }
        if let Some(v) = get("SPOTIFY_API_BASE") { cfg.api_base = v; }
        if let Some(v) = get("PLAYLIST_CACHE_TTL_SECS") {
            cfg.cache_ttl_secs = v
                .trim()
                .parse()
                .with_context(|| format!("invalid PLAYLIST_CACHE_TTL_SECS {:?}", v))?;
        }
        if let Some(v) = get("PLAYLIST_PAGE_SIZE") {
            cfg.page_size = v
                .trim()
                .parse()
                .with_context(|| format!("invalid PLAYLIST_PAGE_SIZE {:?}", v))?;
        }
        if let Some(v) = get("STATIC_DIR") { cfg.static_dir = v.into(); }
        if let Some(v) = get("LOG_DIR") { cfg.log_dir = Some(v.into()); }
        Ok(cfg.normalized())
    }

    /// The remote caps playlist pages at 100 items.
    fn normalized(mut self) -> Self {
        self.page_size = self.page_size.clamp(1, crate::sync::PAGE_SIZE);
        self
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    /// Names of required settings that are empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.is_empty() { missing.push("client_id"); }
        if self.client_secret.is_empty() { missing.push("client_secret"); }
        if self.refresh_token.is_empty() { missing.push("refresh_token"); }
        if self.playlist_id.is_empty() { missing.push("playlist_id"); }
        missing
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
