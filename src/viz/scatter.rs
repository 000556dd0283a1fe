//! Scatter plot with the fitted line, its confidence band, and optional
//! marginal histograms on the top and right edges.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::theme::{
    ANNOTATION_FONT_PX, MARGIN, annotation_height_px, draw_annotation, padded_range, themed_mesh,
};
use super::types::Bins;
use super::util::{parse_color, tab10_color};
use super::{Figure, render};
use crate::format::display_text;
use crate::scatter::ScatterStats;
use crate::stats::Histogram;

const IGNORED_HIST_OPTIONS: &str = "bins/hist_kws arguments are ignored when marginal=False.";
const MARGINAL_PX: u32 = 90;
const LINE_POINTS: usize = 100;
const X_LABEL_AREA: i32 = 44;
const Y_LABEL_AREA: i32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterPlotOptions {
    /// Draw histograms of `x` above and of `y` beside the scatter.
    pub marginal: bool,
    /// Histogram bins; 12 for both when absent.
    pub bins: Option<Bins>,
    pub hist_color: Option<String>,
    pub show_stats: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for ScatterPlotOptions {
    fn default() -> Self {
        Self {
            marginal: true,
            bins: None,
            hist_color: None,
            show_stats: true,
            width: 800,
            height: 800,
        }
    }
}

impl ScatterPlotOptions {
    /// Options that have no effect with this combination of settings.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.marginal && (self.bins.is_some() || self.hist_color.is_some()) {
            out.push(IGNORED_HIST_OPTIONS.to_string());
        }
        out
    }
}

struct ScatterFigure<'a> {
    stats: &'a ScatterStats,
    options: &'a ScatterPlotOptions,
    hist_color: RGBColor,
}

impl<'a> ScatterFigure<'a> {
    fn new(stats: &'a ScatterStats, options: &'a ScatterPlotOptions) -> Result<Self> {
        for w in options.warnings() {
            log::warn!("{w}");
        }
        let hist_color = match &options.hist_color {
            Some(c) => parse_color(c)?,
            None => tab10_color(0),
        };
        Ok(Self {
            stats,
            options,
            hist_color,
        })
    }

    /// Evenly spaced x values across the data with the fit and band bounds.
    fn fitted_line(&self) -> Vec<(f64, f64, f64, f64)> {
        let s = self.stats;
        let lo = s.x.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = s.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (0..LINE_POINTS)
            .map(|i| {
                let x = lo + (hi - lo) * i as f64 / (LINE_POINTS - 1) as f64;
                let (fit, half) = (s.predict(x), s.band_half_width(x));
                (x, fit, fit - half, fit + half)
            })
            .collect()
    }

    fn draw_histogram<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        values: &[f64],
        bins: usize,
        range: (f64, f64),
        vertical: bool,
    ) -> Result<()> {
        let hist = Histogram::new(values, bins);
        let peak = hist.max_count().max(1) as f64 * 1.05;
        let mut builder = ChartBuilder::on(area);
        builder.margin(MARGIN);
        let mut chart = if vertical {
            builder
                .y_label_area_size(Y_LABEL_AREA)
                .build_cartesian_2d(range.0..range.1, 0.0..peak)
        } else {
            builder
                .x_label_area_size(X_LABEL_AREA)
                .build_cartesian_2d(0.0..peak, range.0..range.1)
        }
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        let style = self.hist_color.mix(0.7).filled();
        chart
            .draw_series(hist.counts.iter().enumerate().map(|(i, &c)| {
                let (a, b) = (hist.edges[i], hist.edges[i + 1]);
                let corners = if vertical {
                    [(a, 0.0), (b, c as f64)]
                } else {
                    [(0.0, a), (c as f64, b)]
                };
                Rectangle::new(corners, style)
            }))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(())
    }
}

impl Figure for ScatterFigure<'_> {
    fn size(&self) -> (u32, u32) {
        (self.options.width, self.options.height)
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let s = self.stats;
        let opts = self.options;
        let (w, _) = root.dim_in_pixel();

        let annotation = display_text(&s.expression);
        let body = if opts.show_stats {
            let (top, body) = root.split_vertically(annotation_height_px(&annotation, w) as i32);
            draw_annotation(&top, &annotation)?;
            body
        } else {
            root.clone()
        };

        let line = self.fitted_line();
        let x_range = padded_range(s.x.iter().copied());
        let y_range = padded_range(
            s.y.iter()
                .copied()
                .chain(line.iter().flat_map(|&(_, _, lo, hi)| [lo, hi])),
        );

        let main = if opts.marginal {
            let (bw, _) = body.dim_in_pixel();
            let side = (bw.saturating_sub(MARGINAL_PX)) as i32;
            let (upper, lower) = body.split_vertically(MARGINAL_PX as i32);
            let (top_hist, _) = upper.split_horizontally(side);
            let (main, right_hist) = lower.split_horizontally(side);
            let (top_bins, right_bins) = opts.bins.unwrap_or_default().split();
            self.draw_histogram(&top_hist, &s.x, top_bins, x_range, true)?;
            self.draw_histogram(&right_hist, &s.y, right_bins, y_range, false)?;
            main
        } else {
            body
        };

        let mut chart = ChartBuilder::on(&main)
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        {
            let mut mesh = themed_mesh(&mut chart);
            mesh.x_desc(s.x_name.as_str()).y_desc(s.y_name.as_str());
            mesh.draw().map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }

        let color = tab10_color(0);
        let band: Vec<(f64, f64)> = line
            .iter()
            .map(|&(x, _, _, hi)| (x, hi))
            .chain(line.iter().rev().map(|&(x, _, lo, _)| (x, lo)))
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        chart
            .draw_series(
                s.x.iter()
                    .zip(&s.y)
                    .map(|(&x, &y)| Circle::new((x, y), 3, color.mix(0.6).filled())),
            )
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        chart
            .draw_series(LineSeries::new(
                line.iter().map(|&(x, fit, _, _)| (x, fit)),
                color.stroke_width(2),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        if opts.show_stats {
            let style = TextStyle::from((FontFamily::SansSerif, ANNOTATION_FONT_PX))
                .pos(Pos::new(HPos::Right, VPos::Bottom));
            let at = (
                x_range.1 - (x_range.1 - x_range.0) * 0.02,
                y_range.0 + (y_range.1 - y_range.0) * 0.02,
            );
            chart
                .draw_series(std::iter::once(Text::new(s.expression_model.clone(), at, style)))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }
        Ok(())
    }
}

impl ScatterStats {
    /// Render the regression to `out_path` (SVG or bitmap by extension).
    ///
    /// Settings that have no effect are logged as warnings; see
    /// [`ScatterPlotOptions::warnings`].
    pub fn plot<P: AsRef<Path>>(&self, out_path: P, options: &ScatterPlotOptions) -> Result<()> {
        render(&ScatterFigure::new(self, options)?, out_path)
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        options: &ScatterPlotOptions,
    ) -> Result<()> {
        super::ensure_fonts_registered();
        ScatterFigure::new(self, options)?.draw(area)
    }
}
