//! Viewer configuration.
//!
//! Configuration can be created programmatically, loaded from a TOML file, or
//! overridden through environment variables. Every decoder and the scheduler
//! receive their settings from here at construction time.

use docview_decode::{DecoderOptions, FlowLayout};
use docview_scheduler::SchedulerConfig;
use docview_viewer_core::PaginationSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_SLICE_HEIGHT: &str = "DOCVIEW_SLICE_HEIGHT";
pub const ENV_PAGE_GAP: &str = "DOCVIEW_PAGE_GAP";
pub const ENV_STAGGER_MS: &str = "DOCVIEW_STAGGER_MS";
pub const ENV_MAX_IN_FLIGHT: &str = "DOCVIEW_MAX_IN_FLIGHT";
pub const ENV_MAX_SURFACE_PIXELS: &str = "DOCVIEW_MAX_SURFACE_PIXELS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Settings for a document session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Height of one synthetic page of a flow document, in pixels.
    pub slice_height: f32,
    /// Space between exact pages at scale 1.0, in pixels.
    pub page_gap: f32,
    /// Delay between page submissions of a full render pass, in milliseconds.
    pub stagger_ms: u64,
    /// Maximum number of concurrent page renders.
    pub max_in_flight: usize,
    /// Largest surface a single page render may allocate, in pixels.
    pub max_surface_pixels: u64,
    /// Refuse encrypted PDFs instead of failing on their content.
    pub reject_encrypted: bool,
    pub flow_layout: FlowLayout,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let decoder = DecoderOptions::default();
        let scheduler = SchedulerConfig::default();
        let pagination = PaginationSettings::default();

        Self {
            slice_height: pagination.slice_height,
            page_gap: pagination.page_gap,
            stagger_ms: scheduler.stagger.as_millis() as u64,
            max_in_flight: scheduler.max_in_flight,
            max_surface_pixels: decoder.max_surface_pixels,
            reject_encrypted: decoder.reject_encrypted,
            flow_layout: FlowLayout::default(),
        }
    }
}

impl ViewerConfig {
    pub fn with_slice_height(mut self, slice_height: f32) -> Self {
        self.slice_height = slice_height;
        self
    }

    pub fn with_page_gap(mut self, page_gap: f32) -> Self {
        self.page_gap = page_gap;
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger_ms = stagger.as_millis() as u64;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_max_surface_pixels(mut self, pixels: u64) -> Self {
        self.max_surface_pixels = pixels;
        self
    }

    pub fn with_reject_encrypted(mut self, reject: bool) -> Self {
        self.reject_encrypted = reject;
        self
    }

    pub fn with_flow_layout(mut self, layout: FlowLayout) -> Self {
        self.flow_layout = layout;
        self
    }

    /// Defaults overridden by environment variables.
    ///
    /// - `DOCVIEW_SLICE_HEIGHT`: flow page height in pixels (default: 1200)
    /// - `DOCVIEW_PAGE_GAP`: gap between exact pages in pixels (default: 0)
    /// - `DOCVIEW_STAGGER_MS`: render stagger in milliseconds (default: 100)
    /// - `DOCVIEW_MAX_IN_FLIGHT`: concurrent page renders (default: 4)
    /// - `DOCVIEW_MAX_SURFACE_PIXELS`: per-page surface budget
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Apply environment overrides on top of `self`.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name, then validate.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SLICE_HEIGHT) {
            self.slice_height = parse(ENV_SLICE_HEIGHT, &value)?;
        }
        if let Some(value) = lookup(ENV_PAGE_GAP) {
            self.page_gap = parse(ENV_PAGE_GAP, &value)?;
        }
        if let Some(value) = lookup(ENV_STAGGER_MS) {
            self.stagger_ms = parse(ENV_STAGGER_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_IN_FLIGHT) {
            self.max_in_flight = parse(ENV_MAX_IN_FLIGHT, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_SURFACE_PIXELS) {
            self.max_surface_pixels = parse(ENV_MAX_SURFACE_PIXELS, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Load a TOML configuration file. Missing keys keep their defaults.
    ///
    /// ```toml
    /// slice_height = 1200.0
    /// page_gap = 16.0
    /// stagger_ms = 100
    /// max_in_flight = 4
    ///
    /// [flow_layout]
    /// content_width = 624.0
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.slice_height.is_finite() && self.slice_height > 0.0) {
            return Err(invalid("slice_height", self.slice_height));
        }
        if !(self.page_gap.is_finite() && self.page_gap >= 0.0) {
            return Err(invalid("page_gap", self.page_gap));
        }
        if self.max_in_flight == 0 {
            return Err(invalid("max_in_flight", self.max_in_flight));
        }
        if self.max_surface_pixels == 0 {
            return Err(invalid("max_surface_pixels", self.max_surface_pixels));
        }
        if !(self.flow_layout.content_width.is_finite() && self.flow_layout.content_width > 0.0) {
            return Err(invalid("flow_layout.content_width", self.flow_layout.content_width));
        }
        Ok(())
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions::default()
            .with_reject_encrypted(self.reject_encrypted)
            .with_max_surface_pixels(self.max_surface_pixels)
    }

    pub fn pagination_settings(&self) -> PaginationSettings {
        PaginationSettings { slice_height: self.slice_height, page_gap: self.page_gap }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_stagger(self.stagger())
            .with_max_in_flight(self.max_in_flight)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }
}
