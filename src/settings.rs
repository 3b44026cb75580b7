use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{FontWeight, Rgb, TextRole};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
}

/// Geometry for the layout and paint passes. Every key is required when loaded from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    pub start_y: i32,
    pub layer_spacing: i32,
    pub title_content_spacing: i32,
    pub layer_top_margin: i32,
    pub layer_bottom_margin: i32,

    pub number_x: f32,
    pub number_width_first: f32,
    pub number_width_others: f32,
    pub number_height: f32,
    pub title_x: f32,
    pub content_x: f32,
    pub title_width: f32,
    pub content_width: f32,

    pub index_style: TextStyle,
    pub title_style: TextStyle,
    pub body_style: TextStyle,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            start_y: 430,
            layer_spacing: 20,
            title_content_spacing: 25,
            layer_top_margin: 32,
            layer_bottom_margin: 32,
            number_x: 67.25,
            number_width_first: 44.98,
            number_width_others: 53.3,
            number_height: 46.87,
            title_x: 145.25,
            content_x: 146.77,
            title_width: 800.0,
            content_width: 800.0,
            index_style: TextStyle {
                size: 36.0,
                weight: FontWeight::Bold,
            },
            title_style: TextStyle {
                size: 36.0,
                weight: FontWeight::Bold,
            },
            body_style: TextStyle {
                size: 28.0,
                weight: FontWeight::Regular,
            },
        }
    }
}

impl LayoutSettings {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let settings: LayoutSettings = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("invalid layout settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io_at(e, path))?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::io_at(e, dir))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::io_at(e, path))
    }

    pub fn style(&self, role: TextRole) -> TextStyle {
        match role {
            TextRole::Index => self.index_style,
            TextRole::Title => self.title_style,
            TextRole::Body => self.body_style,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let spacings = [
            ("start_y", self.start_y),
            ("layer_spacing", self.layer_spacing),
            ("title_content_spacing", self.title_content_spacing),
            ("layer_top_margin", self.layer_top_margin),
            ("layer_bottom_margin", self.layer_bottom_margin),
        ];
        for (name, value) in spacings {
            if value < 0 {
                return Err(Error::Configuration(format!("{name} must not be negative (got {value})")));
            }
        }
        let widths = [
            ("number_width_first", self.number_width_first),
            ("number_width_others", self.number_width_others),
            ("title_width", self.title_width),
            ("content_width", self.content_width),
            ("index_style.size", self.index_style.size),
            ("title_style.size", self.title_style.size),
            ("body_style.size", self.body_style.size),
        ];
        for (name, value) in widths {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Configuration(format!("{name} must be positive (got {value})")));
            }
        }
        let offsets = [
            ("number_x", self.number_x),
            ("title_x", self.title_x),
            ("content_x", self.content_x),
            ("number_height", self.number_height),
        ];
        for (name, value) in offsets {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Configuration(format!("{name} must be a non-negative number (got {value})")));
            }
        }
        Ok(())
    }
}

/// Per-role foreground colors plus the separator color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub index: Rgb,
    pub title: Rgb,
    pub body: Rgb,
    pub separator: Rgb,
}

impl Palette {
    pub const DEFAULT_ACCENT: Rgb = Rgb::new(238, 117, 0);

    /// Index and title take the brand accent; body and separator keep their neutral tones.
    pub fn with_accent(accent: Rgb) -> Self {
        Self {
            index: accent,
            title: accent,
            body: Rgb::new(10, 10, 10),
            separator: Rgb::new(200, 200, 200),
        }
    }

    pub fn color(&self, role: TextRole) -> Rgb {
        match role {
            TextRole::Index => self.index,
            TextRole::Title => self.title,
            TextRole::Body => self.body,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::with_accent(Self::DEFAULT_ACCENT)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub chunk_height: u32,
    pub split_pages: bool,
    pub palette: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            chunk_height: 2000,
            split_pages: true,
            palette: Palette::default(),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_height == 0 {
            return Err(Error::Configuration("chunk_height must be positive".into()));
        }
        Ok(())
    }
}
