//! Linear relationship between two numerical variables.

use crate::data::InputData;
use crate::error::{FleurError, Result};
use crate::format::{count_n_decimals, plain_text};
use crate::stats::special::t_ppf;
use crate::stats::{Alternative, Correlation, linregress};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterOptions {
    pub alternative: Alternative,
    pub effect_size: Correlation,
    /// Confidence level in percent, strictly between 0 and 100.
    pub ci: f64,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            alternative: Alternative::TwoSided,
            effect_size: Correlation::Pearson,
            ci: 95.0,
        }
    }
}

/// Regression of `y` on `x` with a correlation coefficient and slope CI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterStats {
    pub x_name: String,
    pub y_name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub n_obs: usize,
    pub ci: f64,
    /// `1 - ci / 100`.
    pub alpha: f64,
    pub dof: usize,
    pub pvalue: f64,
    pub intercept: f64,
    pub slope: f64,
    pub stderr_slope: f64,
    pub t_statistic: f64,
    pub t_critical: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub effect_size: Correlation,
    pub correlation: f64,
    pub correlation_pvalue: f64,
    pub expression: String,
    pub expression_model: String,
}

fn numeric(data: &InputData, use_x: bool) -> Result<Vec<f64>> {
    let (col, name) = if use_x {
        (data.x(), data.x_name())
    } else {
        (data.y(), data.y_name())
    };
    col.to_f64()
        .ok_or_else(|| FleurError::NotNumeric(name.to_string()))
}

impl ScatterStats {
    /// Rows where either value is NaN are dropped.
    pub fn new(data: &InputData, options: &ScatterOptions) -> Result<Self> {
        let ci = options.ci;
        if !(ci > 0.0 && ci < 100.0) {
            return Err(FleurError::InvalidConfidence(ci));
        }
        let (xs, ys) = (numeric(data, true)?, numeric(data, false)?);
        let (x, y): (Vec<f64>, Vec<f64>) = xs
            .into_iter()
            .zip(ys)
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .unzip();
        let n_obs = x.len();
        if n_obs < 3 {
            return Err(FleurError::Degenerate {
                test: "linear regression",
                reason: "needs at least 3 complete observations",
            });
        }

        let fit = linregress(&x, &y, options.alternative)?;
        let corr = options.effect_size.compute(&x, &y, options.alternative)?;
        let alpha = 1.0 - ci / 100.0;
        let dof = n_obs - 2;
        let t_critical = t_ppf(1.0 - alpha / 2.0, dof as f64);
        let ci_lower = fit.slope - t_critical * fit.stderr;
        let ci_upper = fit.slope + t_critical * fit.stderr;
        // Infinite for a perfect fit, NaN for a flat one.
        let t_statistic = fit.slope / fit.stderr;

        let ci_decimals = count_n_decimals(ci);
        let expression = format!(
            "$t_{{Student}}({dof}) = {t_statistic:.2}, CI_{{{ci:.ci_decimals$}%}} = [{ci_lower:.2}, {ci_upper:.2}], p = {:.4}, {}_{{{}}} = {:.2}, n_{{obs}} = {n_obs}$",
            fit.pvalue,
            options.effect_size.symbol(),
            options.effect_size.title(),
            corr.statistic,
        );
        let sign = if fit.slope >= 0.0 { '+' } else { '-' };
        let expression_model = format!(
            "ŷ = {:.2} {sign} {:.2}x",
            fit.intercept,
            fit.slope.abs()
        );
        log::debug!(
            "regressed `{}` on `{}` over {n_obs} rows",
            data.y_name(),
            data.x_name()
        );

        Ok(Self {
            x_name: data.x_name().to_string(),
            y_name: data.y_name().to_string(),
            x,
            y,
            n_obs,
            ci,
            alpha,
            dof,
            pvalue: fit.pvalue,
            intercept: fit.intercept,
            slope: fit.slope,
            stderr_slope: fit.stderr,
            t_statistic,
            t_critical,
            ci_lower,
            ci_upper,
            effect_size: options.effect_size,
            correlation: corr.statistic,
            correlation_pvalue: corr.pvalue,
            expression,
            expression_model,
        })
    }

    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Half-width of the confidence band of the mean response at `x`.
    pub fn band_half_width(&self, x: f64) -> f64 {
        let n = self.n_obs as f64;
        let x_mean = self.x.iter().sum::<f64>() / n;
        let sxx: f64 = self.x.iter().map(|v| (v - x_mean).powi(2)).sum();
        let rss: f64 = self
            .x
            .iter()
            .zip(&self.y)
            .map(|(a, b)| (b - self.predict(*a)).powi(2))
            .sum();
        let rse = (rss / self.dof as f64).sqrt();
        self.t_critical * rse * (1.0 / n + (x - x_mean).powi(2) / sxx).sqrt()
    }

    pub fn summary(&self) -> String {
        format!(
            "Correlation stats\n\nTest: Student t test of the coefficient on x\n{}\n",
            plain_text(&self.expression)
        )
    }
}
