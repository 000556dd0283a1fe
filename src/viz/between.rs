//! Violin, box and swarm plot of a numerical variable across categories.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::text::estimate_text_width_px;
use super::theme::{
    BOX_COLOR, MARGIN, TICK_FONT_PX, annotation_height_px, category_label, draw_annotation,
    padded_range, themed_mesh,
};
use super::types::Orientation;
use super::util::first_n_colors;
use super::{Figure, render};
use crate::beeswarm::{DEFAULT_WIDTH, beeswarm};
use crate::between::BetweenStats;
use crate::format::display_text;
use crate::stats::{BoxSummary, gaussian_kde};

const VIOLIN_HALF_WIDTH: f64 = 0.25;
const BOX_HALF_WIDTH: f64 = 0.15;
const KDE_POINTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetweenPlotOptions {
    pub orientation: Orientation,
    /// One color per category; the tab10 cycle when absent.
    pub colors: Option<Vec<String>>,
    pub show_stats: bool,
    pub violin: bool,
    #[serde(rename = "box")]
    pub box_plot: bool,
    pub scatter: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for BetweenPlotOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            colors: None,
            show_stats: true,
            violin: true,
            box_plot: true,
            scatter: true,
            width: 800,
            height: 600,
        }
    }
}

struct BetweenFigure<'a> {
    stats: &'a BetweenStats,
    options: &'a BetweenPlotOptions,
    colors: Vec<RGBColor>,
}

impl<'a> BetweenFigure<'a> {
    fn new(stats: &'a BetweenStats, options: &'a BetweenPlotOptions) -> Result<Self> {
        let colors = first_n_colors(options.colors.as_deref(), stats.n_cat)?;
        Ok(Self {
            stats,
            options,
            colors,
        })
    }

    /// Chart coordinates of `value` at category position `pos`.
    fn at(&self, pos: f64, value: f64) -> (f64, f64) {
        match self.options.orientation {
            Orientation::Vertical => (pos, value),
            Orientation::Horizontal => (value, pos),
        }
    }
}

impl Figure for BetweenFigure<'_> {
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

        let n = stats.n_cat;
        let cat_range = (0.5, n as f64 + 0.5);
        let val_range = padded_range(stats.groups.iter().flatten().copied());
        let labels: Vec<String> = stats
            .tick_labels()
            .iter()
            .map(|l| l.replace('\n', ", "))
            .collect();
        let widest = labels
            .iter()
            .map(|l| estimate_text_width_px(l, TICK_FONT_PX))
            .max()
            .unwrap_or(0);

        let mut builder = ChartBuilder::on(&body);
        builder.margin(MARGIN);
        let mut chart = if vertical {
            builder
                .x_label_area_size(44)
                .y_label_area_size(64)
                .build_cartesian_2d(cat_range.0..cat_range.1, val_range.0..val_range.1)
        } else {
            builder
                .x_label_area_size(44)
                .y_label_area_size((widest + 36).min(w / 3).max(64) as i32)
                .build_cartesian_2d(val_range.0..val_range.1, cat_range.0..cat_range.1)
        }
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        let cat_fmt = |v: &f64| category_label(&labels, *v);
        {
            let mut mesh = themed_mesh(&mut chart);
            if vertical {
                mesh.disable_x_mesh()
                    .x_labels(n)
                    .x_label_formatter(&cat_fmt)
                    .x_desc(stats.cat_name.as_str())
                    .y_desc(stats.num_name.as_str());
            } else {
                mesh.disable_y_mesh()
                    .y_labels(n)
                    .y_label_formatter(&cat_fmt)
                    .y_desc(stats.cat_name.as_str())
                    .x_desc(stats.num_name.as_str());
            }
            mesh.draw().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }

        for (i, (group, color)) in stats.groups.iter().zip(&self.colors).enumerate() {
            let pos = (i + 1) as f64;

            if opts.violin {
                if let Some(outline) = violin_outline(group) {
                    let points: Vec<(f64, f64)> = outline
                        .iter()
                        .map(|&(offset, v)| self.at(pos + offset, v))
                        .collect();
                    chart
                        .draw_series(std::iter::once(Polygon::new(points, color.mix(0.3).filled())))
                        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                }
            }

            if opts.box_plot {
                if let Some(b) = BoxSummary::new(group) {
                    let (l, r) = (pos - BOX_HALF_WIDTH, pos + BOX_HALF_WIDTH);
                    let cap = BOX_HALF_WIDTH / 2.0;
                    chart
                        .draw_series(std::iter::once(Rectangle::new(
                            [self.at(l, b.q1), self.at(r, b.q3)],
                            BOX_COLOR.stroke_width(1),
                        )))
                        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                    let segments = [
                        [self.at(l, b.median), self.at(r, b.median)],
                        [self.at(pos, b.q3), self.at(pos, b.whisker_high)],
                        [self.at(pos, b.q1), self.at(pos, b.whisker_low)],
                        [self.at(pos - cap, b.whisker_high), self.at(pos + cap, b.whisker_high)],
                        [self.at(pos - cap, b.whisker_low), self.at(pos + cap, b.whisker_low)],
                    ];
                    chart
                        .draw_series(segments.iter().enumerate().map(|(k, seg)| {
                            let width = if k == 0 { 2 } else { 1 };
                            PathElement::new(seg.to_vec(), BOX_COLOR.stroke_width(width))
                        }))
                        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                }
            }

            if opts.scatter {
                let offsets = beeswarm(group, DEFAULT_WIDTH);
                chart
                    .draw_series(
                        group
                            .iter()
                            .zip(offsets)
                            .map(|(&v, dx)| Circle::new(self.at(pos + dx, v), 3, color.mix(0.5).filled())),
                    )
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }
        Ok(())
    }
}

/// Closed violin outline as `(offset, value)` pairs: the right half going up,
/// then the left half coming down. `None` when the group has no spread.
fn violin_outline(group: &[f64]) -> Option<Vec<(f64, f64)>> {
    let lo = group.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = group.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(hi > lo) {
        return None;
    }
    let grid: Vec<f64> = (0..KDE_POINTS)
        .map(|i| lo + (hi - lo) * i as f64 / (KDE_POINTS - 1) as f64)
        .collect();
    let density = gaussian_kde(group, &grid)?;
    let peak = density.iter().copied().fold(0.0, f64::max);
    if !(peak > 0.0) {
        return None;
    }
    let half: Vec<f64> = density.iter().map(|d| d / peak * VIOLIN_HALF_WIDTH).collect();
    let right = grid.iter().zip(&half).map(|(&v, &d)| (d, v));
    let left = grid.iter().zip(&half).rev().map(|(&v, &d)| (-d, v));
    Some(right.chain(left).collect())
}

impl BetweenStats {
    /// Render the comparison to `out_path` (SVG or bitmap by extension).
    ///
    /// Fails when `options.colors` holds fewer colors than there are categories.
    pub fn plot<P: AsRef<Path>>(&self, out_path: P, options: &BetweenPlotOptions) -> Result<()> {
        render(&BetweenFigure::new(self, options)?, out_path)
    }

    /// Draw the comparison into an existing drawing area.
    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        options: &BetweenPlotOptions,
    ) -> Result<()> {
        super::ensure_fonts_registered();
        BetweenFigure::new(self, options)?.draw(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violin_is_symmetric_and_bounded() {
        let outline = violin_outline(&[1.0, 2.0, 2.5, 3.0, 5.0]).unwrap();
        assert_eq!(outline.len(), 2 * KDE_POINTS);
        let widest = outline.iter().map(|(d, _)| d.abs()).fold(0.0, f64::max);
        assert!((widest - VIOLIN_HALF_WIDTH).abs() < 1e-12);
        assert_eq!(outline[0].1, 1.0);
        assert_eq!(outline[KDE_POINTS - 1].1, 5.0);
        assert!((outline[0].0 + outline[2 * KDE_POINTS - 1].0).abs() < 1e-12);
    }

    #[test]
    fn constant_group_has_no_violin() {
        assert!(violin_outline(&[2.0, 2.0, 2.0]).is_none());
        assert!(violin_outline(&[]).is_none());
    }

    #[test]
    fn options_read_box_key() {
        let opts: BetweenPlotOptions =
            serde_json::from_str(r#"{"box": false, "orientation": "horizontal"}"#).unwrap();
        assert!(!opts.box_plot);
        assert!(opts.violin);
        assert_eq!(opts.orientation, Orientation::Horizontal);
        assert_eq!((opts.width, opts.height), (800, 600));
    }
}
