use log::Level;
use serde::Deserialize;
use web_sys::Document;

use crate::error::EnhanceError;

/// Id of the optional inline JSON block that overrides the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "page-enhance-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug  // Verbose when running a dev build under trunk serve
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub header: HeaderConfig,
    pub nav: NavConfig,
    pub overlay: OverlayConfig,
    pub reveal: RevealConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderConfig {
    pub element_id: String,
    pub compact_class: String,
    /// Scrolling down past this offset compacts the header.
    pub compact_above: f64,
    /// Any offset under this expands the header again.
    pub expand_below: f64,
    /// Upward movement larger than this expands the header.
    pub hysteresis: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            element_id: "header".to_string(),
            compact_class: "small".to_string(),
            compact_above: 80.0,
            expand_below: 40.0,
            hysteresis: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Rewrite the current entry; the back button is unaffected.
    Replace,
    Push,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavConfig {
    pub link_selector: String,
    pub history: HistoryMode,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            link_selector: "nav.menu a".to_string(),
            history: HistoryMode::Replace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub overlay_id: String,
    pub trigger_id: String,
    pub media_id: String,
    pub hidden_class: String,
    pub conceal_delay_ms: u32,
    pub play_delay_ms: u32,
    pub focus_delay_ms: u32,
    pub autoplay_directive: String,
    pub extra_directives: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            overlay_id: "overlay".to_string(),
            trigger_id: "verVideo".to_string(),
            media_id: "youtubeVideo".to_string(),
            hidden_class: "hidden".to_string(),
            conceal_delay_ms: 350,
            play_delay_ms: 300,
            focus_delay_ms: 600,
            autoplay_directive: "autoplay=1".to_string(),
            extra_directives: vec!["rel=0".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevealConfig {
    pub section_selector: String,
    pub visible_class: String,
    pub threshold: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            section_selector: ".seccion".to_string(),
            visible_class: "visible".to_string(),
            threshold: 0.12,
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, EnhanceError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads the inline config block if the page carries one.
    pub fn from_document(document: &Document) -> Result<Self, EnhanceError> {
        match document.get_element_by_id(CONFIG_ELEMENT_ID) {
            Some(block) => Self::from_json(&block.text_content().unwrap_or_default()),
            None => Ok(Self::default()),
        }
    }
}
