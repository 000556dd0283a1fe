//! Right-hand legend panel used by the bar chart.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, wrap_text_to_width};

const FONT_PX: u32 = 13;
const TITLE_FONT_PX: u32 = 14;
const PAD: i32 = 6;
const PATCH: i32 = 10;
const PATCH_TO_TEXT: i32 = 8;
const ROW_GAP: i32 = 4;
const MAX_PANEL_PX: u32 = 220;

/// Panel width wide enough for the title and the longest label, capped so
/// very long labels wrap instead of squeezing the plot.
pub fn legend_panel_width_px(title: &str, labels: &[String]) -> u32 {
    let label_w = labels
        .iter()
        .map(|l| estimate_text_width_px(l, FONT_PX))
        .max()
        .unwrap_or(0);
    let needed = (label_w + (PATCH + PATCH_TO_TEXT + 3 * PAD) as u32)
        .max(estimate_text_width_px(title, TITLE_FONT_PX) + 2 * PAD as u32);
    needed.min(MAX_PANEL_PX)
}

/// Draw `title` and one filled patch plus label per item, top to bottom.
pub fn draw_legend_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    items: &[(String, RGBColor)],
) -> Result<()> {
    let (w, _) = area.dim_in_pixel();
    let line_h = FONT_PX as i32 + 2;
    let title_style = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Top));
    let label_style = TextStyle::from((FontFamily::SansSerif, FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Center));

    let mut y = PAD * 4;
    if !title.trim().is_empty() {
        area.draw(&Text::new(title, (PAD, y), title_style))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        y += TITLE_FONT_PX as i32 + 8;
    }

    let text_x = PAD + PATCH + PATCH_TO_TEXT;
    let max_text_w = (w as i32 - text_x - PAD).max(40) as u32;
    for (label, color) in items {
        let lines = wrap_text_to_width(label, FONT_PX, max_text_w);
        let block_h = lines.len().max(1) as i32 * line_h;
        let cy = y + line_h / 2;
        area.draw(&Rectangle::new(
            [(PAD, cy - PATCH / 2), (PAD + PATCH, cy + PATCH / 2)],
            color.filled(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        for (i, line) in lines.iter().enumerate() {
            area.draw(&Text::new(
                line.as_str(),
                (text_x, y + i as i32 * line_h + line_h / 2),
                label_style.clone(),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
        y += block_h + ROW_GAP;
    }
    Ok(())
}
