use std::collections::HashSet;

use crate::error::Error;
use crate::fonts::GlyphMetrics;
use crate::model::{LayerBox, LineSpec, Record, Slot, TextRole};
use crate::reconcile::reconcile;
use crate::settings::LayoutSettings;

/// Rows at the top of the template that are copied verbatim and never resized.
pub const HEADER_HEIGHT: i32 = 422;
/// Rows at the bottom of the template that are copied verbatim and never resized.
pub const FOOTER_HEIGHT: i32 = 114;
/// Gap between the last box and the footer band.
pub const BOTTOM_MARGIN: i32 = 10;
/// Canvas height reported when there is nothing to lay out.
pub const EMPTY_CANVAS_HEIGHT: i32 = 1500;

/// Lay out records top to bottom in the order given, one box per record.
pub fn compute_boxes(
    records: &[Record],
    settings: &LayoutSettings,
    metrics: &GlyphMetrics,
) -> Result<Vec<LayerBox>, Error> {
    settings.validate()?;
    check_unique_indices(records)?;

    let title_font = metrics.font_for(TextRole::Title, settings.style(TextRole::Title));
    let body_font = metrics.font_for(TextRole::Body, settings.style(TextRole::Body));

    let mut boxes = Vec::with_capacity(records.len());
    let mut y = settings.start_y;

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            y += settings.layer_spacing;
        }

        let title = LineSpec::new(reconcile(&record.title, &title_font, settings.title_width, None));
        let body = LineSpec::new(reconcile(&record.body, &body_font, settings.content_width, None));
        let (title_lines, body_lines) = (title.count(), body.count());

        let title_height = title.height();
        let body_height = body.height();
        let content_height = title_height + settings.title_content_spacing + body_height;
        let box_height = settings.layer_top_margin + content_height + settings.layer_bottom_margin;

        let start_y = y;
        let end_y = y + box_height;
        let title_y = start_y + settings.layer_top_margin;
        let body_y = title_y + title_height + settings.title_content_spacing;

        let index_width = if i == 0 {
            settings.number_width_first
        } else {
            settings.number_width_others
        };

        let layer = LayerBox {
            record_index: record.index,
            start_y,
            end_y,
            height: box_height,
            index: Slot {
                x: settings.number_x,
                y: title_y,
                width: index_width,
                height: settings.number_height,
                predicted_line_count: 1,
                text: record.index_label(),
            },
            title: Slot {
                x: settings.title_x,
                y: title_y,
                width: settings.title_width,
                height: title_height as f32,
                predicted_line_count: title_lines,
                text: record.title.clone(),
            },
            body: Slot {
                x: settings.content_x,
                y: body_y,
                width: settings.content_width,
                height: body_height as f32,
                predicted_line_count: body_lines,
                text: record.body.clone(),
            },
        };

        log::debug!(
            "box #{}: y={}..{} (title {} lines, body {} lines)",
            record.index,
            layer.start_y,
            layer.end_y,
            title_lines,
            body_lines,
        );

        y = layer.end_y;
        boxes.push(layer);
    }

    Ok(boxes)
}

/// Canvas height that fits every box plus the bottom margin and footer band.
pub fn required_canvas_height(boxes: &[LayerBox]) -> i32 {
    if boxes.is_empty() {
        return EMPTY_CANVAS_HEIGHT;
    }
    let lowest = boxes
        .iter()
        .map(|b| b.end_y)
        .fold(HEADER_HEIGHT, i32::max);
    lowest + BOTTOM_MARGIN + FOOTER_HEIGHT
}

/// Indices are a caller contract: unique, but not necessarily sorted or contiguous.
pub fn check_unique_indices(records: &[Record]) -> Result<(), Error> {
    let mut seen: HashSet<u32> = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.index) {
            return Err(Error::LayoutInconsistency(format!(
                "duplicate record index {}",
                record.index
            )));
        }
    }
    Ok(())
}
