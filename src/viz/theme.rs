//! The fleur look: faint grid, no axis lines, small tick labels, and the
//! annotation band drawn above each figure.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::chart::{ChartContext, MeshStyle};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::wrap_to_width;

pub const GRID_COLOR: RGBColor = RGBColor(0x52, 0x52, 0x52);
pub const GRID_ALPHA: f64 = 0.2;
/// Outline color of box plots.
pub const BOX_COLOR: RGBColor = RGBColor(0x3b, 0x3b, 0x3b);
pub const TICK_FONT_PX: u32 = 12;
pub const AXIS_DESC_FONT_PX: u32 = 14;
pub const ANNOTATION_FONT_PX: u32 = 14;
pub const MARGIN: i32 = 16;

pub type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Mesh preconfigured with the theme; callers add labels and formatters, then `draw()`.
pub fn themed_mesh<'a, 'b, DB: DrawingBackend>(
    chart: &'b mut Chart2d<'a, DB>,
) -> MeshStyle<'a, 'b, RangedCoordf64, RangedCoordf64, DB> {
    let mut mesh = chart.configure_mesh();
    mesh.bold_line_style(GRID_COLOR.mix(GRID_ALPHA).stroke_width(1))
        .light_line_style(TRANSPARENT.stroke_width(0))
        .axis_style(TRANSPARENT.stroke_width(0))
        .label_style((FontFamily::SansSerif, TICK_FONT_PX))
        .axis_desc_style((FontFamily::SansSerif, AXIS_DESC_FONT_PX));
    mesh
}

/// Height in pixels needed to show `text` across `width` pixels.
pub fn annotation_height_px(text: &str, width: u32) -> u32 {
    let lines = wrap_to_width(text, ", ", ANNOTATION_FONT_PX, width.saturating_sub(2 * MARGIN as u32));
    lines.len().max(1) as u32 * (ANNOTATION_FONT_PX + 4) + MARGIN as u32
}

/// Draw `text` left-aligned at the top of `area`, wrapping after commas.
pub fn draw_annotation<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, text: &str) -> Result<()> {
    let (w, _) = area.dim_in_pixel();
    let style = TextStyle::from((FontFamily::SansSerif, ANNOTATION_FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Top));
    let line_h = (ANNOTATION_FONT_PX + 4) as i32;
    for (i, line) in wrap_to_width(text, ", ", ANNOTATION_FONT_PX, w.saturating_sub(2 * MARGIN as u32))
        .iter()
        .enumerate()
    {
        area.draw(&Text::new(
            line.as_str(),
            (MARGIN, MARGIN / 2 + i as i32 * line_h),
            style.clone(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Range with 5% padding on both sides; a zero-width range is widened by 1.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Formatter for a categorical axis drawn at integer positions `1..=labels.len()`.
pub fn category_label(labels: &[String], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 1.0 || i as usize > labels.len() {
        return String::new();
    }
    labels[i as usize - 1].clone()
}
