//! Run-wide layout configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::computed::DEFAULT_FONT_FAMILY;
use crate::style::values::DEFAULT_FONT_SIZE_PX;

/// Errors from loading a [`LayoutConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON for this structure.
    #[error("invalid layout configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A dimension is zero, negative or not finite.
    #[error("'{field}' must be a positive number of pixels, got {value}")]
    NonPositive {
        /// Field name.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The default font family is blank.
    #[error("'default_font_family' must not be empty")]
    EmptyFontFamily,
}

/// Inputs that stay fixed for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Width of the page body in px: the root containing block. 6.5in of a
    /// letter page at 96 dpi by default.
    pub page_content_width: f32,
    /// Root font size in px. Also the `rem` basis and the `medium` keyword.
    pub default_font_size: f32,
    /// Font family of the root element.
    pub default_font_family: String,
    /// Floor applied to every resolved table column.
    pub min_column_width: f32,
    /// Image width used when neither CSS nor attributes give one.
    pub default_image_width: f32,
    /// Image height used when neither CSS nor attributes give one.
    pub default_image_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_content_width: 624.0,
            default_font_size: DEFAULT_FONT_SIZE_PX,
            default_font_family: DEFAULT_FONT_FAMILY.to_string(),
            min_column_width: 24.0,
            default_image_width: 300.0,
            default_image_height: 150.0,
        }
    }
}

impl LayoutConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed JSON, unknown fields, or invalid
    /// values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style page width override.
    #[must_use]
    pub const fn with_page_width(mut self, width: f32) -> Self {
        self.page_content_width = width;
        self
    }

    /// Check every dimension is a positive finite number.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("page_content_width", self.page_content_width),
            ("default_font_size", self.default_font_size),
            ("min_column_width", self.min_column_width),
            ("default_image_width", self.default_image_width),
            ("default_image_height", self.default_image_height),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.default_font_family.trim().is_empty() {
            return Err(ConfigError::EmptyFontFamily);
        }
        Ok(())
    }
}
