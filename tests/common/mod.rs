#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use notice_canvas::{FontHandle, GlyphMetrics, LayoutSettings, Record};

pub const SEPARATOR: Rgba<u8> = Rgba([200, 200, 200, 255]);

/// Font handle backed by the fixed-pitch width model: 18px per Latin char, 30px per CJK char.
pub fn heuristic_font() -> FontHandle {
    FontHandle::Unavailable
}

pub fn heuristic_metrics() -> GlyphMetrics {
    GlyphMetrics::heuristic()
}

pub fn settings() -> LayoutSettings {
    LayoutSettings::default()
}

pub fn two_records() -> Vec<Record> {
    vec![
        Record::new(1, "A", "short body"),
        Record::new(2, "B", "another short body"),
    ]
}

/// A template whose every row has a distinct color, so copied bands can be traced back.
pub fn striped_template(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| row_color(y))
}

pub fn row_color(y: u32) -> Rgba<u8> {
    Rgba([(y % 251) as u8, (y / 251) as u8, 77, 255])
}

pub fn row(image: &RgbaImage, y: u32) -> Vec<Rgba<u8>> {
    (0..image.width()).map(|x| *image.get_pixel(x, y)).collect()
}

pub fn rows_equal(a: &RgbaImage, a_y: u32, b: &RgbaImage, b_y: u32) -> bool {
    row(a, a_y) == row(b, b_y)
}

/// Rows painted entirely in the separator color.
pub fn separator_rows(image: &RgbaImage) -> Vec<u32> {
    (0..image.height())
        .filter(|&y| row(image, y).iter().all(|p| *p == SEPARATOR))
        .collect()
}

pub fn write_template(dir: &Path, height: u32) -> PathBuf {
    let path = dir.join("template.png");
    striped_template(40, height)
        .save(&path)
        .expect("write template");
    path
}

pub fn write_records(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("records.json");
    std::fs::write(&path, json).expect("write records");
    path
}
