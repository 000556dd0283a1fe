//! Bar chart of a contingency table: the share of each level of `y` within
//! every category of `x`.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::legend::{draw_legend_panel, legend_panel_width_px};
use super::text::estimate_text_width_px;
use super::theme::{
    MARGIN, TICK_FONT_PX, annotation_height_px, category_label, draw_annotation, themed_mesh,
};
use super::types::{BarLayout, Orientation};
use super::util::first_n_colors;
use super::{Figure, render};
use crate::bar::BarStats;
use crate::format::{count_label, display_text};

const BAR_SPAN: f64 = 0.8;
const COUNT_FONT_PX: u32 = 11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarPlotOptions {
    pub orientation: Orientation,
    pub layout: BarLayout,
    /// One color per level of `y`; the tab10 cycle when absent.
    pub colors: Option<Vec<String>>,
    pub show_stats: bool,
    /// Print the raw count inside each bar.
    pub show_counts: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for BarPlotOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            layout: BarLayout::Stacked,
            colors: None,
            show_stats: true,
            show_counts: false,
            width: 800,
            height: 600,
        }
    }
}

/// One bar: category position span `[lo, hi]`, value span `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bar {
    lo: f64,
    hi: f64,
    from: f64,
    to: f64,
    level: usize,
    count: u64,
}

/// Bars for every (category, level) cell, categories at positions `1..=n_cat`.
fn layout_bars(stats: &BarStats, layout: BarLayout) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(stats.n_cat * stats.n_levels);
    for (i, (shares, counts)) in stats
        .proportions
        .iter()
        .zip(&stats.contingency_table)
        .enumerate()
    {
        let pos = (i + 1) as f64;
        match layout {
            BarLayout::Stacked => {
                let mut base = 0.0;
                for (level, (&p, &count)) in shares.iter().zip(counts).enumerate() {
                    bars.push(Bar {
                        lo: pos - BAR_SPAN / 2.0,
                        hi: pos + BAR_SPAN / 2.0,
                        from: base,
                        to: base + p,
                        level,
                        count,
                    });
                    base += p;
                }
            }
            BarLayout::Grouped => {
                let w = BAR_SPAN / stats.n_levels.max(1) as f64;
                let start = pos - BAR_SPAN / 2.0;
                for (level, (&p, &count)) in shares.iter().zip(counts).enumerate() {
                    let lo = start + w * level as f64;
                    bars.push(Bar {
                        lo,
                        hi: lo + w,
                        from: 0.0,
                        to: p,
                        level,
                        count,
                    });
                }
            }
        }
    }
    bars
}

struct BarFigure<'a> {
    stats: &'a BarStats,
    options: &'a BarPlotOptions,
    colors: Vec<RGBColor>,
}

impl<'a> BarFigure<'a> {
    fn new(stats: &'a BarStats, options: &'a BarPlotOptions) -> Result<Self> {
        let colors = first_n_colors(options.colors.as_deref(), stats.n_levels)?;
        Ok(Self {
            stats,
            options,
            colors,
        })
    }

    fn at(&self, pos: f64, value: f64) -> (f64, f64) {
        match self.options.orientation {
            Orientation::Vertical => (pos, value),
            Orientation::Horizontal => (value, pos),
        }
    }
}

impl Figure for BarFigure<'_> {
    fn size(&self) -> (u32, u32) {
        (self.options.width, self.options.height)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let stats = self.stats;
        let opts = self.options;
        let vertical = opts.orientation == Orientation::Vertical;
        let (w, _) = root.dim_in_pixel();

        let annotation = display_text(&stats.expression);
        let body = if opts.show_stats {
            let (top, body) = root.split_vertically(annotation_height_px(&annotation, w) as i32);
            draw_annotation(&top, &annotation)?;
            body
        } else {
            root.clone()
        };

        let legend_w = legend_panel_width_px(&stats.y_name, &stats.levels).min(w / 3);
        let (plot_area, legend_area) = body.split_horizontally((w - legend_w) as i32);
        let items: Vec<(String, RGBColor)> = stats
            .levels
            .iter()
            .cloned()
            .zip(self.colors.iter().copied())
            .collect();
        draw_legend_panel(&legend_area, &stats.y_name, &items)?;

        let n = stats.n_cat;
        let cat_range = 0.5..n as f64 + 0.5;
        let top = match opts.layout {
            BarLayout::Stacked => 1.0,
            BarLayout::Grouped => 1.05,
        };
        let widest = stats
            .categories
            .iter()
            .map(|l| estimate_text_width_px(l, TICK_FONT_PX))
            .max()
            .unwrap_or(0);

        let mut builder = ChartBuilder::on(&plot_area);
        builder.margin(MARGIN).x_label_area_size(44);
        let mut chart = if vertical {
            builder
                .y_label_area_size(64)
                .build_cartesian_2d(cat_range, 0.0..top)
        } else {
            builder
                .y_label_area_size((widest + 36).min(w / 3).max(64) as i32)
                .build_cartesian_2d(0.0..top, cat_range)
        }
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        let cat_fmt = |v: &f64| category_label(&stats.categories, *v);
        let pct_fmt = |v: &f64| format!("{:.0}%", v * 100.0);
        {
            let mut mesh = themed_mesh(&mut chart);
            if vertical {
                mesh.disable_x_mesh()
                    .x_labels(n)
                    .x_label_formatter(&cat_fmt)
                    .y_label_formatter(&pct_fmt)
                    .x_desc(stats.x_name.as_str())
                    .y_desc("proportion");
            } else {
                mesh.disable_y_mesh()
                    .y_labels(n)
                    .y_label_formatter(&cat_fmt)
                    .x_label_formatter(&pct_fmt)
                    .y_desc(stats.x_name.as_str())
                    .x_desc("proportion");
            }
            mesh.draw().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }

        let bars = layout_bars(stats, opts.layout);
        chart
            .draw_series(bars.iter().map(|b| {
                Rectangle::new(
                    [self.at(b.lo, b.from), self.at(b.hi, b.to)],
                    self.colors[b.level].filled(),
                )
            }))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        if opts.show_counts {
            let style = TextStyle::from((FontFamily::SansSerif, COUNT_FONT_PX))
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart
                .draw_series(bars.iter().filter(|b| b.count > 0).map(|b| {
                    Text::new(
                        count_label(b.count as usize),
                        self.at((b.lo + b.hi) / 2.0, (b.from + b.to) / 2.0),
                        style.clone(),
                    )
                }))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
        Ok(())
    }
}

impl BarStats {
    /// Render the table to `out_path` (SVG or bitmap by extension).
    ///
    /// Fails when `options.colors` holds fewer colors than there are levels.
    pub fn plot<P: AsRef<Path>>(&self, out_path: P, options: &BarPlotOptions) -> Result<()> {
        render(&BarFigure::new(self, options)?, out_path)
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        options: &BarPlotOptions,
    ) -> Result<()> {
        super::ensure_fonts_registered();
        BarFigure::new(self, options)?.draw(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::BarOptions;
    use crate::data::{Column, InputData};

    fn stats() -> BarStats {
        let x = Column::from(vec!["a", "a", "a", "b", "b", "b", "b", "c", "c", "c"]);
        let y = Column::from(vec!["u", "v", "v", "u", "u", "v", "v", "u", "u", "u"]);
        BarStats::new(&InputData::from_arrays(x, y).unwrap(), &BarOptions::default()).unwrap()
    }

    #[test]
    fn stacked_bars_fill_each_category() {
        let s = stats();
        let bars = layout_bars(&s, BarLayout::Stacked);
        assert_eq!(bars.len(), 6);
        for cat in bars.chunks(2) {
            assert_eq!(cat[0].from, 0.0);
            assert_eq!(cat[1].from, cat[0].to);
            assert!((cat[1].to - 1.0).abs() < 1e-12);
        }
        assert_eq!(bars[0].count, 1);
    }

    #[test]
    fn grouped_bars_sit_side_by_side() {
        let s = stats();
        let bars = layout_bars(&s, BarLayout::Grouped);
        assert!(bars.iter().all(|b| b.from == 0.0));
        assert!((bars[0].hi - bars[1].lo).abs() < 1e-12);
        assert!((bars[1].hi - bars[0].lo - BAR_SPAN).abs() < 1e-12);
        // category "c" has no "v"
        assert_eq!(bars[5].to, 0.0);
    }

    #[test]
    fn options_from_json() {
        let opts: BarPlotOptions =
            serde_json::from_str(r#"{"layout": "grouped", "show_counts": true}"#).unwrap();
        assert_eq!(opts.layout, BarLayout::Grouped);
        assert!(opts.show_counts && opts.show_stats);
    }
}
