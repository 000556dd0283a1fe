//! Descriptive helpers: moments, quantiles, ranks, histograms, and the
//! Gaussian KDE used to shape violins.

use serde::{Deserialize, Serialize};

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample variance (n - 1 denominator).
pub fn variance(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

pub fn std_dev(xs: &[f64]) -> f64 {
    variance(xs).sqrt()
}

/// Population skewness and kurtosis (not excess), or `None` without spread.
pub fn moments(xs: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len() as f64;
    let m = mean(xs);
    let m2 = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
    if !(m2 > 0.0) {
        return None;
    }
    let m3 = xs.iter().map(|x| (x - m).powi(3)).sum::<f64>() / n;
    let m4 = xs.iter().map(|x| (x - m).powi(4)).sum::<f64>() / n;
    Some((m3 / m2.powf(1.5), m4 / (m2 * m2)))
}

fn sorted(xs: &[f64]) -> Vec<f64> {
    let mut v = xs.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

/// Linearly interpolated quantile (the default "type 7" definition).
pub fn quantile(xs: &[f64], p: f64) -> f64 {
    if xs.is_empty() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    quantile_sorted(&sorted(xs), p)
}

pub fn quantile_sorted(v: &[f64], p: f64) -> f64 {
    let h = (v.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(v.len() - 1);
    v[lo] + (h - lo as f64) * (v[hi] - v[lo])
}

pub fn median(xs: &[f64]) -> f64 {
    quantile(xs, 0.5)
}

/// Ranks 1..=n in input order; ties share the average of their positions.
pub fn rank_average(xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && xs[order[j]] == xs[order[i]] {
            j += 1;
        }
        let avg = (i + 1 + j) as f64 / 2.0;
        for &k in &order[i..j] {
            ranks[k] = avg;
        }
        i = j;
    }
    ranks
}

/// Sizes of each run of tied values.
pub fn tie_sizes(xs: &[f64]) -> Vec<usize> {
    let v = sorted(xs);
    let mut out = Vec::new();
    let mut i = 0;
    while i < v.len() {
        let mut j = i + 1;
        while j < v.len() && v[j] == v[i] {
            j += 1;
        }
        out.push(j - i);
        i = j;
    }
    out
}

/// Σ (t³ - t) over tie groups.
pub fn tie_term(xs: &[f64]) -> f64 {
    tie_sizes(xs)
        .into_iter()
        .map(|t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum()
}

/// Equal-width histogram over `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub counts: Vec<usize>,
    /// `counts.len() + 1` edges.
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Bins are half-open `[lo, hi)` except the last, which is closed. A
    /// zero-width range is widened to `[v - 0.5, v + 0.5]`. NaNs are skipped.
    pub fn new(xs: &[f64], nbins: usize) -> Self {
        let nbins = nbins.max(1);
        let finite: Vec<f64> = xs.iter().copied().filter(|x| x.is_finite()).collect();
        let (mut lo, mut hi) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        if finite.is_empty() {
            lo = 0.0;
            hi = 1.0;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / nbins as f64;
        let mut edges: Vec<f64> = (0..=nbins).map(|i| lo + width * i as f64).collect();
        edges[nbins] = hi;
        let mut counts = vec![0usize; nbins];
        for x in finite {
            counts[Self::bin_of(x, &edges)] += 1;
        }
        Self { counts, edges }
    }

    // The scaled index can land one bin off when `x` sits on a rounded
    // inner edge; the edges themselves decide.
    fn bin_of(x: f64, edges: &[f64]) -> usize {
        let nbins = edges.len() - 1;
        let (lo, hi) = (edges[0], edges[nbins]);
        let mut idx = (((x - lo) * (nbins as f64 / (hi - lo))) as usize).min(nbins - 1);
        if x < edges[idx] {
            idx = idx.saturating_sub(1);
        }
        if idx + 1 < nbins && x >= edges[idx + 1] {
            idx += 1;
        }
        idx
    }

    /// Bin index of `x` under the same rules as construction.
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        let lo = *self.edges.first()?;
        let hi = *self.edges.last()?;
        if !x.is_finite() || x < lo || x > hi {
            return None;
        }
        Some(Self::bin_of(x, &self.edges))
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated at `grid`.
///
/// Returns `None` when the sample has no spread.
pub fn gaussian_kde(xs: &[f64], grid: &[f64]) -> Option<Vec<f64>> {
    let n = xs.len();
    let sd = std_dev(xs);
    if n < 2 || !(sd > 0.0) {
        return None;
    }
    let bw = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());
    Some(
        grid.iter()
            .map(|g| {
                xs.iter()
                    .map(|x| (-0.5 * ((g - x) / bw).powi(2)).exp())
                    .sum::<f64>()
                    * norm
            })
            .collect(),
    )
}

/// Five numbers drawn by a box plot; whiskers reach the furthest points
/// within 1.5 IQR of the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
}

impl BoxSummary {
    pub fn new(xs: &[f64]) -> Option<Self> {
        if xs.is_empty() {
            return None;
        }
        let v = sorted(xs);
        let q1 = quantile_sorted(&v, 0.25);
        let median = quantile_sorted(&v, 0.5);
        let q3 = quantile_sorted(&v, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
        let whisker_low = v.iter().copied().find(|&x| x >= lo_fence).unwrap_or(q1);
        let whisker_high = v.iter().rev().copied().find(|&x| x <= hi_fence).unwrap_or(q3);
        Some(Self {
            whisker_low,
            q1,
            median,
            q3,
            whisker_high,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(median(&xs), 2.5);
        assert_eq!(quantile(&xs, 0.25), 1.75);
        assert_eq!(quantile(&[7.0], 0.9), 7.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn ranks_average_ties() {
        assert_eq!(rank_average(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
        assert_eq!(tie_term(&[1.0, 1.0, 2.0, 3.0, 3.0, 3.0]), 6.0 + 24.0);
    }

    #[test]
    fn histogram_closes_last_bin() {
        let h = Histogram::new(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(h.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(h.counts, vec![2, 3]);
        assert_eq!(h.bin_index(4.0), Some(1));
        assert_eq!(h.bin_index(5.0), None);
    }

    #[test]
    fn values_on_inner_edges_follow_the_edges() {
        // 1.4 is exactly edge 3, but its scaled offset truncates to 2.
        let h = Histogram::new(&[1.1, 1.4, 2.3], 12);
        assert_eq!(h.edges[3], 1.4);
        assert_eq!(h.bin_index(1.4), Some(3));
        assert_eq!(h.counts[2], 0);
        assert_eq!(h.counts[3], 1);
        assert_eq!(h.counts[11], 1);

        // 0.3 sits just below the rounded edge 3 * 0.1.
        let h = Histogram::new(&[0.0, 0.3, 1.0], 10);
        assert!(h.edges[3] > 0.3);
        assert_eq!(h.bin_index(0.3), Some(2));
    }

    #[test]
    fn histogram_widens_constant_input() {
        let h = Histogram::new(&[3.0, 3.0, 3.0], 1);
        assert_eq!(h.edges, vec![2.5, 3.5]);
        assert_eq!(h.counts, vec![3]);
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let xs = [1.0, 2.0, 2.5, 3.0, 4.5];
        let grid: Vec<f64> = (0..=400).map(|i| -5.0 + i as f64 * 0.05).collect();
        let dens = gaussian_kde(&xs, &grid).unwrap();
        let area: f64 = dens.iter().sum::<f64>() * 0.05;
        assert!((area - 1.0).abs() < 1e-3);
        assert!(gaussian_kde(&[1.0, 1.0], &grid).is_none());
    }

    #[test]
    fn box_whiskers_exclude_outliers() {
        let b = BoxSummary::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(b.median, 3.5);
        assert_eq!(b.whisker_high, 5.0);
        assert_eq!(b.whisker_low, 1.0);
    }

    #[test]
    fn moments_of_symmetric_sample() {
        let (skew, kurt) = moments(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(skew.abs() < 1e-12);
        assert!((kurt - 1.7).abs() < 1e-12);
        assert!(moments(&[2.0, 2.0]).is_none());
    }
}
