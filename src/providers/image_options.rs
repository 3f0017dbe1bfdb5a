//! Presets for the DALL-E family of image deployments.
//!
//! These only render into an ordinary [`CustomFields`] map. Other image
//! backends (e.g. `imagegeneration@005`) accept different keys or none at
//! all, so nothing here is validated against the target deployment.
use clap::ValueEnum;
use serde_json::{json, Value};
use std::fmt;

use super::base::CustomFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageSize {
    /// 1024x1024
    Square,
    /// 1024x1792
    Portrait,
    /// 1792x1024
    Landscape,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Portrait => "1024x1792",
            ImageSize::Landscape => "1792x1024",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageQuality {
    Standard,
    /// Finer details and greater consistency across the image
    Hd,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageStyle {
    /// Less hyper-real looking images
    Natural,
    /// Hyper-real and dramatic images
    Vivid,
}

impl ImageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStyle::Natural => "natural",
            ImageStyle::Vivid => "vivid",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(ImageSize, ImageQuality, ImageStyle);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    pub size: Option<ImageSize>,
    pub quality: Option<ImageQuality>,
    pub style: Option<ImageStyle>,
    extra: CustomFields,
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Add an arbitrary field; wins over a preset with the same key
    pub fn with_field<K: Into<String>>(mut self, key: K, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.quality.is_none() && self.style.is_none() && self.extra.is_empty()
    }

    pub fn into_custom_fields(self) -> CustomFields {
        let mut fields = CustomFields::new();
        if let Some(size) = self.size {
            fields.insert("size".to_string(), json!(size.as_str()));
        }
        if let Some(quality) = self.quality {
            fields.insert("quality".to_string(), json!(quality.as_str()));
        }
        if let Some(style) = self.style {
            fields.insert("style".to_string(), json!(style.as_str()));
        }
        fields.extend(self.extra);
        fields
    }
}

/// Parse a `key=value` pair; the value is read as JSON when it parses, else kept as a string
pub fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
