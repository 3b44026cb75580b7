use serde::{Deserialize, Serialize};

/// Vertical pitch of one wrapped line, shared by every text role.
pub const LINE_HEIGHT: i32 = 44;

/// One numbered item to be rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub index: u32,
    pub title: String,
    pub body: String,
}

impl Record {
    pub fn new(index: u32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Text painted in the index column: the logical index zero-padded to two digits.
    pub fn index_label(&self) -> String {
        format!("{:02}", self.index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextRole {
    Index,
    Title,
    Body,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

impl FontWeight {
    pub fn is_bold(self) -> bool {
        self == FontWeight::Bold
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    pub(crate) fn rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

/// Wrapped lines of one text value plus the pitch used to turn them into height.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineSpec {
    pub lines: Vec<String>,
    pub line_height: i32,
}

impl LineSpec {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            line_height: LINE_HEIGHT,
        }
    }

    pub fn count(&self) -> usize {
        self.lines.len()
    }

    pub fn height(&self) -> i32 {
        self.lines.len() as i32 * self.line_height
    }
}

/// Absolute placement of one text element inside a box.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub x: f32,
    pub y: i32,
    pub width: f32,
    pub height: f32,
    pub predicted_line_count: usize,
    pub text: String,
}

/// Pixel geometry of one record's block. `index` is the record's logical index.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerBox {
    pub record_index: u32,
    pub start_y: i32,
    pub end_y: i32,
    pub height: i32,
    pub index: Slot,
    pub title: Slot,
    pub body: Slot,
}

impl LayerBox {
    /// True when the box honours the configured margins and title/body gap exactly.
    pub fn margins_hold(&self, settings: &crate::settings::LayoutSettings) -> bool {
        let title_h = self.title.predicted_line_count as i32 * LINE_HEIGHT;
        let body_h = self.body.predicted_line_count as i32 * LINE_HEIGHT;
        let top = self.title.y - self.start_y;
        let gap = self.body.y - (self.title.y + title_h);
        let bottom = self.end_y - (self.body.y + body_h);
        top == settings.layer_top_margin
            && gap == settings.title_content_spacing
            && bottom == settings.layer_bottom_margin
            && self.end_y - self.start_y == self.height
    }
}
