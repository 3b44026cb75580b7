use std::collections::HashMap;

use image::{Rgba, RgbaImage, imageops};

use crate::error::Error;
use crate::fonts::{FontHandle, GlyphMetrics};
use crate::layout::{FOOTER_HEIGHT, HEADER_HEIGHT, check_unique_indices, required_canvas_height};
use crate::model::{LINE_HEIGHT, LayerBox, Record, Slot, TextRole};
use crate::reconcile::reconcile;
use crate::settings::{LayoutSettings, RenderOptions};

const BLANK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Offsets stamped when bold has to be simulated on a regular face.
const BOLD_STAMP: [(i32, i32); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];

/// One horizontal slice of the composed canvas.
#[derive(Debug)]
pub struct Page {
    /// 1-based position in the page sequence.
    pub number: usize,
    /// First canvas row covered by this page.
    pub top: u32,
    pub image: RgbaImage,
}

#[derive(Debug)]
pub struct Composition {
    pub canvas: RgbaImage,
    pub pages: Vec<Page>,
    /// Canvas rows where separators were drawn, top to bottom.
    pub separator_rows: Vec<i32>,
}

/// Paint `records` into a copy of `template` using boxes from the layout pass.
pub fn render(
    template: &RgbaImage,
    records: &[Record],
    boxes: &[LayerBox],
    settings: &LayoutSettings,
    metrics: &GlyphMetrics,
    options: &RenderOptions,
) -> Result<Composition, Error> {
    let t0 = std::time::Instant::now();
    settings.validate()?;
    options.validate()?;
    check_unique_indices(records)?;
    let boxes_by_index = match_boxes(records, boxes)?;

    let required = required_canvas_height(boxes);
    let mut canvas = resize_canvas(template, required as u32)?;
    let t_resize = t0.elapsed();

    let index_font = metrics.font_for(TextRole::Index, settings.style(TextRole::Index));
    let title_font = metrics.font_for(TextRole::Title, settings.style(TextRole::Title));
    let body_font = metrics.font_for(TextRole::Body, settings.style(TextRole::Body));
    if ![&index_font, &title_font, &body_font].iter().all(|f| f.is_available()) {
        log::warn!("Some text roles have no font resource; their text is not painted");
    }

    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by_key(|r| r.index);

    let palette = &options.palette;
    for record in &ordered {
        let layer = boxes_by_index[&record.index];

        let index_emphasis = !index_font.is_true_bold();
        paint_lines(
            &mut canvas,
            &index_font,
            &layer.index,
            &[layer.index.text.clone()],
            palette.color(TextRole::Index).rgba(),
            index_emphasis,
        );

        let title_lines = reconcile(
            &record.title,
            &title_font,
            layer.title.width,
            Some(layer.title.predicted_line_count),
        );
        paint_lines(
            &mut canvas,
            &title_font,
            &layer.title,
            &title_lines,
            palette.color(TextRole::Title).rgba(),
            false,
        );

        let body_lines = reconcile(
            &record.body,
            &body_font,
            layer.body.width,
            Some(layer.body.predicted_line_count),
        );
        let body_emphasis = settings.body_style.weight.is_bold() && !body_font.is_true_bold();
        paint_lines(
            &mut canvas,
            &body_font,
            &layer.body,
            &body_lines,
            palette.color(TextRole::Body).rgba(),
            body_emphasis,
        );

        if title_lines.len() != layer.title.predicted_line_count
            || body_lines.len() != layer.body.predicted_line_count
        {
            log::debug!(
                "record #{}: painted {}+{} lines against {}+{} predicted",
                record.index,
                title_lines.len(),
                body_lines.len(),
                layer.title.predicted_line_count,
                layer.body.predicted_line_count,
            );
        }
    }

    // Separators follow the vertical stacking, which is the caller's order, not index order.
    let mut stacked: Vec<&LayerBox> = boxes.iter().collect();
    stacked.sort_by_key(|b| b.start_y);
    let mut separator_rows = Vec::with_capacity(stacked.len().saturating_sub(1));
    for pair in stacked.windows(2) {
        let y = separator_y(pair[0], pair[1]);
        draw_separator(&mut canvas, y, palette.separator.rgba());
        separator_rows.push(y);
    }
    let t_paint = t0.elapsed();

    let pages = if options.split_pages {
        split_pages(&canvas, options.chunk_height)
    } else {
        Vec::new()
    };

    log::info!(
        "Compose: resize={:.1}ms, paint={:.1}ms, split={:.1}ms ({}x{} canvas, {} pages)",
        t_resize.as_secs_f64() * 1000.0,
        (t_paint - t_resize).as_secs_f64() * 1000.0,
        (t0.elapsed() - t_paint).as_secs_f64() * 1000.0,
        canvas.width(),
        canvas.height(),
        pages.len(),
    );

    Ok(Composition {
        canvas,
        pages,
        separator_rows,
    })
}

/// Pair every record with the box computed for it, rejecting lists that changed between passes.
fn match_boxes<'a>(
    records: &[Record],
    boxes: &'a [LayerBox],
) -> Result<HashMap<u32, &'a LayerBox>, Error> {
    if records.len() != boxes.len() {
        return Err(Error::LayoutInconsistency(format!(
            "{} records but {} boxes",
            records.len(),
            boxes.len()
        )));
    }
    let by_index: HashMap<u32, &LayerBox> = boxes.iter().map(|b| (b.record_index, b)).collect();
    for record in records {
        let Some(layer) = by_index.get(&record.index) else {
            return Err(Error::LayoutInconsistency(format!(
                "record #{} has no computed box",
                record.index
            )));
        };
        if layer.title.text != record.title || layer.body.text != record.body {
            return Err(Error::LayoutInconsistency(format!(
                "record #{} text changed after layout",
                record.index
            )));
        }
    }
    Ok(by_index)
}

/// Resize the template to `required` rows, keeping the header and footer bands intact.
///
/// Shrinking keeps the rows directly under the header; growing leaves the new
/// middle region blank. A template of exactly `required` rows is returned as is.
pub fn resize_canvas(template: &RgbaImage, required: u32) -> Result<RgbaImage, Error> {
    let (width, native) = template.dimensions();
    let header = HEADER_HEIGHT as u32;
    let footer = FOOTER_HEIGHT as u32;
    if native < header + footer {
        return Err(Error::Configuration(format!(
            "template is {native}px tall; at least {}px are needed for the header and footer bands",
            header + footer
        )));
    }
    if required < header + footer {
        return Err(Error::Configuration(format!(
            "canvas height {required}px cannot hold the header and footer bands"
        )));
    }
    if required == native {
        return Ok(template.clone());
    }

    let footer_band = imageops::crop_imm(template, 0, native - footer, width, footer).to_image();
    let footer_top = required - footer;

    let canvas = if required < native {
        log::debug!("Cropping template {native}px → {required}px");
        let mut canvas = RgbaImage::new(width, required);
        let kept = imageops::crop_imm(template, 0, 0, width, footer_top).to_image();
        imageops::replace(&mut canvas, &kept, 0, 0);
        imageops::replace(&mut canvas, &footer_band, 0, footer_top as i64);
        canvas
    } else {
        log::debug!("Extending template {native}px → {required}px");
        let mut canvas = RgbaImage::from_pixel(width, required, BLANK);
        let header_band = imageops::crop_imm(template, 0, 0, width, header).to_image();
        imageops::replace(&mut canvas, &header_band, 0, 0);
        imageops::replace(&mut canvas, &footer_band, 0, footer_top as i64);
        canvas
    };
    Ok(canvas)
}

/// Row centred between two boxes, floored so it never lands on a half pixel.
pub fn separator_y(current: &LayerBox, next: &LayerBox) -> i32 {
    current.end_y + (next.start_y - current.end_y).div_euclid(2)
}

fn draw_separator(canvas: &mut RgbaImage, y: i32, color: Rgba<u8>) {
    if y < 0 || y as u32 >= canvas.height() {
        log::warn!("Separator at row {y} falls outside the canvas");
        return;
    }
    for x in 0..canvas.width() {
        canvas.put_pixel(x, y as u32, color);
    }
}

/// Cut the canvas into slices of at most `chunk_height` rows, top to bottom.
pub fn split_pages(canvas: &RgbaImage, chunk_height: u32) -> Vec<Page> {
    let (width, height) = canvas.dimensions();
    let chunk_height = chunk_height.max(1);
    let mut pages = Vec::new();
    let mut top = 0u32;
    while top < height {
        let rows = chunk_height.min(height - top);
        pages.push(Page {
            number: pages.len() + 1,
            top,
            image: imageops::crop_imm(canvas, 0, top, width, rows).to_image(),
        });
        top += rows;
    }
    pages
}

fn paint_lines(
    canvas: &mut RgbaImage,
    font: &FontHandle,
    slot: &Slot,
    lines: &[String],
    color: Rgba<u8>,
    simulate_bold: bool,
) {
    let x = slot.x as i32;
    let mut y = slot.y;
    for line in lines {
        if !line.trim().is_empty() {
            draw_text(canvas, font, x, y, line, color, simulate_bold);
        }
        y += LINE_HEIGHT;
    }
}

/// Draw one line with its top-left corner at (x, y). `simulate_bold` stamps every glyph
/// at the four offsets of a 2x2 pixel square. Nothing is drawn for an `Unavailable` font.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &FontHandle,
    x: i32,
    y: i32,
    text: &str,
    color: Rgba<u8>,
    simulate_bold: bool,
) {
    let Some((face, size)) = font.loaded() else {
        return;
    };
    let Some((glyphs, _)) = face.glyph_run(text, size) else {
        log::debug!("Cannot lay out glyphs for {:?}", text);
        return;
    };
    let baseline = (y as f32 + face.ascent_px(size)).round() as i32;
    let stamp: &[(i32, i32)] = if simulate_bold { &BOLD_STAMP[..] } else { &BOLD_STAMP[..1] };

    for (gid, pen) in glyphs {
        let (m, coverage) = face.rasterize(gid, size);
        if m.width == 0 || m.height == 0 {
            continue;
        }
        let gx = (x as f32 + pen).round() as i32 + m.xmin;
        let gy = baseline - (m.ymin + m.height as i32);
        for &(dx, dy) in stamp {
            blend_coverage(canvas, gx + dx, gy + dy, m.width, &coverage, color);
        }
    }
}

fn blend_coverage(
    canvas: &mut RgbaImage,
    left: i32,
    top: i32,
    width: usize,
    coverage: &[u8],
    color: Rgba<u8>,
) {
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    for (i, &a) in coverage.iter().enumerate() {
        if a == 0 {
            continue;
        }
        let px = left + (i % width) as i32;
        let py = top + (i / width) as i32;
        if px < 0 || py < 0 || px >= cw || py >= ch {
            continue;
        }
        let dst = canvas.get_pixel_mut(px as u32, py as u32);
        let sa = a as f32 / 255.0;
        let inv = 1.0 - sa;
        for c in 0..3 {
            dst.0[c] = (color.0[c] as f32 * sa + dst.0[c] as f32 * inv).round() as u8;
        }
        dst.0[3] = dst.0[3].max(a);
    }
}
