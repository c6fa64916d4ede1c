//! Configuration management for Chat Markdown
//!
//! Handles loading, saving, and managing the render and editor settings.
//! Configuration is persisted as JSON under the user's config directory.

use crate::editor::MarkdownMode;
use crate::error::{ConfigError, ConfigResult};
use crate::search::{search_patterns, SearchPattern};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application identifier used for the config directory
pub const APP_ID: &str = "chat-markdown";

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default prefix for proxied image URLs
pub const DEFAULT_IMAGE_PROXY_URL: &str = "/api/v4/image?url=";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Message rendering options
    pub render: RenderOptions,

    /// Editor toggle shortcuts
    pub editor: EditorConfig,
}

impl Config {
    /// Load configuration from the default location, or return defaults when
    /// no file has been written yet
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from JSON text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let mut config: Config = serde_json::from_str(content)?;
        config.render.validate()?;
        config.render.refresh_search_patterns();
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).map_err(|source| ConfigError::SaveError {
            path: dir.clone(),
            source,
        })?;
        self.save_to(&dir.join(CONFIG_FILE_NAME))
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::SaveError {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the configuration file path
    pub fn config_path() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }
}

/// Options controlling how a message is rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Raw search box query whose terms get highlighted
    pub search_term: String,

    /// Compiled from `search_term`
    #[serde(skip)]
    search_patterns: Vec<SearchPattern>,

    /// Render for a single-line preview: no block wrapping, no newlines
    pub singleline: bool,

    /// Route external images through the image proxy
    pub proxy_images: bool,

    /// Prefix for proxied image URLs
    pub image_proxy_url: String,

    /// Schemes that bare URLs may be autolinked with (`None` allows any)
    pub autolinked_url_schemes: Option<Vec<String>>,

    /// Base URL of the server, used to recognise internal links
    #[serde(rename = "siteURL")]
    pub site_url: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search_patterns: Vec::new(),
            singleline: false,
            proxy_images: false,
            image_proxy_url: DEFAULT_IMAGE_PROXY_URL.to_string(),
            autolinked_url_schemes: None,
            site_url: String::new(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search query and compile its patterns
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self.refresh_search_patterns();
        self
    }

    pub fn with_singleline(mut self, singleline: bool) -> Self {
        self.singleline = singleline;
        self
    }

    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    pub fn with_proxy_images(mut self, proxy_images: bool) -> Self {
        self.proxy_images = proxy_images;
        self
    }

    pub fn with_autolinked_url_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.autolinked_url_schemes = Some(schemes.into_iter().map(Into::into).collect());
        self
    }

    /// Compiled search patterns, longest term first
    pub fn search_patterns(&self) -> &[SearchPattern] {
        &self.search_patterns
    }

    /// Recompile `search_patterns` from `search_term`
    pub fn refresh_search_patterns(&mut self) {
        self.search_patterns = search_patterns(&self.search_term);
    }

    /// Whether a bare URL with this scheme may become a link
    pub fn is_scheme_autolinked(&self, scheme: &str) -> bool {
        match &self.autolinked_url_schemes {
            None => true,
            Some(schemes) => schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme)),
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if self.proxy_images && self.image_proxy_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "imageProxyUrl".to_string(),
                reason: "must not be empty when proxyImages is enabled".to_string(),
            });
        }
        if let Some(scheme) = self
            .autolinked_url_schemes
            .iter()
            .flatten()
            .find(|s| s.is_empty() || s.contains(':'))
        {
            return Err(ConfigError::InvalidValue {
                key: "autolinkedUrlSchemes".to_string(),
                reason: format!("{:?} is not a URL scheme", scheme),
            });
        }
        Ok(())
    }
}

/// Keyboard shortcuts for the markdown toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub bold: String,
    pub italic: String,
    pub link: String,
    pub strike: String,
    pub code: String,
    pub heading: String,
    pub quote: String,
    pub ul: String,
    pub ol: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            bold: "Ctrl+B".to_string(),
            italic: "Ctrl+I".to_string(),
            link: "Ctrl+Alt+K".to_string(),
            strike: "Ctrl+Shift+X".to_string(),
            code: "Ctrl+Alt+C".to_string(),
            heading: "Ctrl+Alt+H".to_string(),
            quote: "Ctrl+Shift+9".to_string(),
            ul: "Ctrl+Shift+8".to_string(),
            ol: "Ctrl+Shift+7".to_string(),
        }
    }
}

impl EditorConfig {
    /// Shortcut bound to a mode
    pub fn shortcut(&self, mode: MarkdownMode) -> &str {
        match mode {
            MarkdownMode::Bold => &self.bold,
            MarkdownMode::Italic => &self.italic,
            MarkdownMode::Link => &self.link,
            MarkdownMode::Strike => &self.strike,
            MarkdownMode::Code => &self.code,
            MarkdownMode::Heading => &self.heading,
            MarkdownMode::Quote => &self.quote,
            MarkdownMode::Ul => &self.ul,
            MarkdownMode::Ol => &self.ol,
        }
    }

    /// Mode bound to a shortcut, compared case-insensitively
    pub fn mode_for_shortcut(&self, shortcut: &str) -> Option<MarkdownMode> {
        MarkdownMode::ALL
            .into_iter()
            .find(|mode| self.shortcut(*mode).eq_ignore_ascii_case(shortcut))
    }
}
