//! Least-squares regression and rank/linear correlation coefficients.

use super::descriptive::{mean, rank_average};
use super::special::{normal_cdf, normal_sf, t_cdf, t_sf};
use crate::error::{FleurError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Alternative hypothesis for one-parameter tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    #[default]
    TwoSided,
    Less,
    Greater,
}

impl Alternative {
    /// p-value of a statistic whose null distribution has the given CDF and
    /// survival function.
    fn pvalue(self, cdf: f64, sf: f64) -> f64 {
        match self {
            Alternative::TwoSided => (2.0 * cdf.min(sf)).min(1.0),
            Alternative::Less => cdf,
            Alternative::Greater => sf,
        }
    }

    fn t_pvalue(self, t: f64, df: f64) -> f64 {
        self.pvalue(t_cdf(t, df), t_sf(t, df))
    }

    fn z_pvalue(self, z: f64) -> f64 {
        self.pvalue(normal_cdf(z), normal_sf(z))
    }
}

impl FromStr for Alternative {
    type Err = FleurError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "two-sided" => Ok(Alternative::TwoSided),
            "less" => Ok(Alternative::Less),
            "greater" => Ok(Alternative::Greater),
            _ => Err(FleurError::InvalidOption {
                name: "alternative",
                allowed: "'two-sided', 'less', 'greater'",
            }),
        }
    }
}

/// Correlation measure reported next to the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correlation {
    #[default]
    Pearson,
    Kendall,
    Spearman,
}

impl Correlation {
    /// Greek symbol used in annotations.
    pub fn symbol(self) -> &'static str {
        match self {
            Correlation::Pearson | Correlation::Spearman => "\\rho",
            Correlation::Kendall => "\\tau",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Correlation::Pearson => "Pearson",
            Correlation::Kendall => "Kendall",
            Correlation::Spearman => "Spearman",
        }
    }

    pub fn compute(self, x: &[f64], y: &[f64], alternative: Alternative) -> Result<CorrelationResult> {
        match self {
            Correlation::Pearson => pearsonr(x, y, alternative),
            Correlation::Kendall => kendalltau(x, y, alternative),
            Correlation::Spearman => spearmanr(x, y, alternative),
        }
    }
}

impl FromStr for Correlation {
    type Err = FleurError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pearson" => Ok(Correlation::Pearson),
            "kendall" => Ok(Correlation::Kendall),
            "spearman" => Ok(Correlation::Spearman),
            _ => Err(FleurError::InvalidOption {
                name: "effect_size",
                allowed: "'pearson', 'kendall', 'spearman'",
            }),
        }
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub statistic: f64,
    pub pvalue: f64,
}

/// Ordinary least squares fit of `y` on `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub rvalue: f64,
    /// p-value of the slope under the requested alternative.
    pub pvalue: f64,
    pub stderr: f64,
    pub intercept_stderr: f64,
}

const TINY: f64 = 1.0e-20;

fn check_pairs(x: &[f64], y: &[f64], test: &'static str, min: usize) -> Result<()> {
    if x.len() != y.len() {
        return Err(FleurError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if x.len() < min {
        return Err(FleurError::Degenerate {
            test,
            reason: "not enough observations",
        });
    }
    Ok(())
}

// Population (1/n) second moments: (ssxm, ssym, ssxym).
fn co_moments(x: &[f64], y: &[f64]) -> (f64, f64, f64) {
    let (xm, ym) = (mean(x), mean(y));
    let n = x.len() as f64;
    let mut acc = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - xm, b - ym);
        acc.0 += dx * dx;
        acc.1 += dy * dy;
        acc.2 += dx * dy;
    }
    (acc.0 / n, acc.1 / n, acc.2 / n)
}

pub fn linregress(x: &[f64], y: &[f64], alternative: Alternative) -> Result<LinearFit> {
    check_pairs(x, y, "linear regression", 2)?;
    let (ssxm, ssym, ssxym) = co_moments(x, y);
    if ssxm == 0.0 {
        return Err(FleurError::Degenerate {
            test: "linear regression",
            reason: "all x values are identical",
        });
    }
    let (xm, ym) = (mean(x), mean(y));
    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };
    let slope = ssxym / ssxm;
    let intercept = ym - slope * xm;
    let n = x.len();
    if n == 2 {
        return Ok(LinearFit {
            slope,
            intercept,
            rvalue: r,
            pvalue: 0.0,
            stderr: 0.0,
            intercept_stderr: 0.0,
        });
    }
    let df = (n - 2) as f64;
    let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
    let stderr = ((1.0 - r * r) * ssym / ssxm / df).sqrt();
    Ok(LinearFit {
        slope,
        intercept,
        rvalue: r,
        pvalue: alternative.t_pvalue(t, df),
        stderr,
        intercept_stderr: stderr * (ssxm + xm * xm).sqrt(),
    })
}

fn r_to_pvalue(r: f64, n: usize, alternative: Alternative) -> f64 {
    let df = (n - 2) as f64;
    if r >= 1.0 {
        return alternative.pvalue(1.0, 0.0);
    }
    if r <= -1.0 {
        return alternative.pvalue(0.0, 1.0);
    }
    let t = r * (df / ((1.0 - r) * (1.0 + r))).sqrt();
    alternative.t_pvalue(t, df)
}

// A constant input has no defined coefficient: NaN with a warning, so a
// regression over a flat series still completes.
fn undefined(name: &str) -> CorrelationResult {
    log::warn!("an input array is constant; the {name} correlation coefficient is not defined");
    CorrelationResult {
        statistic: f64::NAN,
        pvalue: f64::NAN,
    }
}

/// Pearson product-moment correlation. NaN when either input is constant.
pub fn pearsonr(x: &[f64], y: &[f64], alternative: Alternative) -> Result<CorrelationResult> {
    check_pairs(x, y, "Pearson correlation", 3)?;
    let (ssxm, ssym, ssxym) = co_moments(x, y);
    if ssxm == 0.0 || ssym == 0.0 {
        return Ok(undefined("Pearson"));
    }
    let r = (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0);
    Ok(CorrelationResult {
        statistic: r,
        pvalue: r_to_pvalue(r, x.len(), alternative),
    })
}

/// Spearman rank correlation (Pearson on average ranks).
pub fn spearmanr(x: &[f64], y: &[f64], alternative: Alternative) -> Result<CorrelationResult> {
    check_pairs(x, y, "Spearman correlation", 3)?;
    let (rx, ry) = (rank_average(x), rank_average(y));
    let (ssxm, ssym, _) = co_moments(&rx, &ry);
    if ssxm == 0.0 || ssym == 0.0 {
        return Ok(undefined("Spearman"));
    }
    pearsonr(&rx, &ry, alternative)
}

// (pairs tied, Σ t(t-1)(t-2), Σ t(t-1)(2t+5)) over runs of ties.
fn tie_counts(v: &[f64]) -> (f64, f64, f64) {
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut out = (0.0, 0.0, 0.0);
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        if t > 1.0 {
            out.0 += t * (t - 1.0) / 2.0;
            out.1 += t * (t - 1.0) * (t - 2.0);
            out.2 += t * (t - 1.0) * (2.0 * t + 5.0);
        }
        i = j;
    }
    out
}

/// Kendall's tau-b with the tie-adjusted normal approximation for the p-value.
pub fn kendalltau(x: &[f64], y: &[f64], alternative: Alternative) -> Result<CorrelationResult> {
    check_pairs(x, y, "Kendall correlation", 3)?;
    let n = x.len();
    let (mut concordant, mut discordant) = (0.0, 0.0);
    for i in 0..n {
        for j in (i + 1)..n {
            if x[i] == x[j] || y[i] == y[j] {
                continue;
            }
            if (x[i] - x[j]).signum() == (y[i] - y[j]).signum() {
                concordant += 1.0;
            } else {
                discordant += 1.0;
            }
        }
    }
    let tot = (n * (n - 1)) as f64 / 2.0;
    let (xtie, x0, x1) = tie_counts(x);
    let (ytie, y0, y1) = tie_counts(y);
    if xtie == tot || ytie == tot {
        return Ok(undefined("Kendall"));
    }
    let con_minus_dis = concordant - discordant;
    let tau = (con_minus_dis / ((tot - xtie) * (tot - ytie)).sqrt()).clamp(-1.0, 1.0);
    let nf = n as f64;
    let m = nf * (nf - 1.0);
    let var = (m * (2.0 * nf + 5.0) - x1 - y1) / 18.0
        + 2.0 * xtie * ytie / m
        + x0 * y0 / (9.0 * m * (nf - 2.0));
    let z = con_minus_dis / var.sqrt();
    Ok(CorrelationResult {
        statistic: tau,
        pvalue: alternative.z_pvalue(z),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const Y: [f64; 5] = [2.0, 4.0, 5.0, 4.0, 5.0];

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn regression_coefficients() {
        let fit = linregress(&X, &Y, Alternative::TwoSided).unwrap();
        assert!(close(fit.slope, 0.6, 1e-12));
        assert!(close(fit.intercept, 2.2, 1e-12));
        assert!(close(fit.rvalue, 0.774_596_669_241_483_4, 1e-12));
        assert!(close(fit.stderr, 0.08f64.sqrt(), 1e-12));
        assert!(close(fit.pvalue, 0.124_027_062_657_554_6, 1e-8));
        let greater = linregress(&X, &Y, Alternative::Greater).unwrap();
        assert!(close(greater.pvalue, 0.062_013_531_328_777_3, 1e-8));
        let less = linregress(&X, &Y, Alternative::Less).unwrap();
        assert!(close(less.pvalue, 1.0 - greater.pvalue, 1e-8));
    }

    #[test]
    fn constant_x_cannot_be_regressed() {
        assert!(linregress(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], Alternative::TwoSided).is_err());
    }

    #[test]
    fn constant_input_gives_nan_coefficients() {
        let flat = [5.0; 5];
        for r in [
            pearsonr(&X, &flat, Alternative::TwoSided).unwrap(),
            spearmanr(&flat, &Y, Alternative::Less).unwrap(),
            kendalltau(&X, &flat, Alternative::TwoSided).unwrap(),
        ] {
            assert!(r.statistic.is_nan());
            assert!(r.pvalue.is_nan());
        }
        let fit = linregress(&X, &flat, Alternative::TwoSided).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 5.0);
        assert_eq!(fit.rvalue, 0.0);
    }

    #[test]
    fn pearson_matches_regression_r() {
        let r = pearsonr(&X, &Y, Alternative::TwoSided).unwrap();
        assert!(close(r.statistic, 0.774_596_669_241_483_4, 1e-12));
        assert!(close(r.pvalue, 0.124_027_062_657_554_6, 1e-8));
    }

    #[test]
    fn perfect_correlation_has_zero_pvalue() {
        let r = pearsonr(&X, &[2.0, 4.0, 6.0, 8.0, 10.0], Alternative::TwoSided).unwrap();
        assert!(close(r.statistic, 1.0, 1e-12));
        assert!(r.pvalue < 1e-10);
    }

    #[test]
    fn spearman_uses_average_ranks() {
        let r = spearmanr(&X, &Y, Alternative::TwoSided).unwrap();
        assert!(close(r.statistic, 0.737_864_787_372_621_8, 1e-12));
        assert!(close(r.pvalue, 0.154_618_523_128_449_2, 1e-8));
    }

    #[test]
    fn kendall_tau_b_with_ties() {
        let r = kendalltau(&X, &Y, Alternative::TwoSided).unwrap();
        assert!(close(r.statistic, 0.670_820_393_249_936_9, 1e-12));
        assert!(close(r.pvalue, 0.117_185_087_198_138_0, 1e-8));
    }

    #[test]
    fn option_strings_parse() {
        assert_eq!("less".parse::<Alternative>().unwrap(), Alternative::Less);
        assert_eq!("kendall".parse::<Correlation>().unwrap(), Correlation::Kendall);
        let err = "pearsons".parse::<Correlation>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "`effect_size` must be one of: 'pearson', 'kendall', 'spearman'"
        );
        assert_eq!(Correlation::Kendall.symbol(), "\\tau");
    }
}
