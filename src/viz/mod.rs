//! Rendering: write annotated figures to **SVG** or **PNG**.
//!
//! - Between-group plots: violins, box plots and a beeswarm per category
//! - Bar plots of a contingency table, stacked or grouped
//! - Scatter plots with a regression line, confidence band and marginal histograms
//!
//! Each figure is drawn by a function generic over the plotters
//! [`DrawingBackend`], so it can also be placed into an area the caller owns.

pub mod bar;
pub mod between;
pub mod legend;
pub mod scatter;
pub mod text;
pub mod theme;
pub mod types;
pub mod util;

pub use bar::BarPlotOptions;
pub use between::BetweenPlotOptions;
pub use scatter::ScatterPlotOptions;
pub use types::{BarLayout, Bins, Orientation};

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;
use std::sync::Once;

/// One-time registration for the "sans-serif" family used by the `ab_glyph`
/// text path, which cannot discover OS fonts.
static INIT_FONTS: Once = Once::new();

pub(crate) fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        if plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        )
        .is_err()
        {
            log::warn!("bundled font could not be registered; text may not render");
        }
    });
}

/// Something that can be drawn onto a plotters area.
pub trait Figure {
    /// Output size in pixels.
    fn size(&self) -> (u32, u32);

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>;
}

/// Render `figure` to `out_path`: SVG for a `.svg` extension, bitmap otherwise
/// (format chosen from the extension by the `image` crate).
pub fn render<F: Figure, P: AsRef<Path>>(figure: &F, out_path: P) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let size = figure.size();
    let is_svg = out_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    log::debug!("rendering {}x{} figure to {}", size.0, size.1, out_path.display());

    if is_svg {
        let root = SVGBackend::new(out_path, size).into_drawing_area();
        draw_and_present(figure, &root)
    } else {
        let root = BitMapBackend::new(out_path, size).into_drawing_area();
        draw_and_present(figure, &root)
    }
}

fn draw_and_present<F: Figure, DB: DrawingBackend>(
    figure: &F,
    root: &DrawingArea<DB, Shift>,
) -> Result<()> {
    root.fill(&WHITE)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    figure.draw(root)?;
    root.present()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}
