//! Hypothesis tests for group comparisons and contingency tables.

use super::descriptive::{mean, moments, rank_average, tie_term, variance};
use super::special::{chi2_sf, f_sf, ln_factorial, normal_sf, t_sf};
use crate::error::{FleurError, Result};
use serde::{Deserialize, Serialize};

/// Outcome of a test with a single statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub pvalue: f64,
    /// Degrees of freedom, when the reference distribution has one.
    pub df: Option<f64>,
}

fn degenerate(test: &'static str, reason: &'static str) -> FleurError {
    FleurError::Degenerate { test, reason }
}

fn two_sided_t(t: f64, df: f64) -> f64 {
    (2.0 * t_sf(t.abs(), df)).min(1.0)
}

/// Student's two-sample t-test assuming equal variances.
pub fn ttest_ind(a: &[f64], b: &[f64]) -> Result<TestResult> {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    if a.len() < 2 || b.len() < 2 {
        return Err(degenerate("t-test", "each group needs at least 2 observations"));
    }
    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * variance(a) + (n2 - 1.0) * variance(b)) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if !(se > 0.0) {
        return Err(degenerate("t-test", "both groups have zero variance"));
    }
    let t = (mean(a) - mean(b)) / se;
    Ok(TestResult {
        statistic: t,
        pvalue: two_sided_t(t, df),
        df: Some(df),
    })
}

/// Paired t-test on `a[i] - b[i]`.
pub fn ttest_rel(a: &[f64], b: &[f64]) -> Result<TestResult> {
    if a.len() != b.len() {
        return Err(FleurError::UnequalPairs(vec![a.len(), b.len()]));
    }
    if a.len() < 2 {
        return Err(degenerate("paired t-test", "needs at least 2 pairs"));
    }
    let d: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    let n = d.len() as f64;
    let se = (variance(&d) / n).sqrt();
    if !(se > 0.0) {
        return Err(degenerate("paired t-test", "differences have zero variance"));
    }
    let t = mean(&d) / se;
    let df = n - 1.0;
    Ok(TestResult {
        statistic: t,
        pvalue: two_sided_t(t, df),
        df: Some(df),
    })
}

/// One-way ANOVA. `df` holds the within-group degrees of freedom; the
/// between-group value is `groups.len() - 1`.
pub fn f_oneway(groups: &[Vec<f64>]) -> Result<TestResult> {
    let k = groups.len();
    if k < 2 {
        return Err(FleurError::TooFewCategories);
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(degenerate("one-way ANOVA", "a group is empty"));
    }
    let total: usize = groups.iter().map(Vec::len).sum();
    if total <= k {
        return Err(degenerate("one-way ANOVA", "needs more observations than groups"));
    }
    let grand = groups.iter().flatten().sum::<f64>() / total as f64;
    let (mut ss_between, mut ss_within) = (0.0, 0.0);
    for g in groups {
        let m = mean(g);
        ss_between += g.len() as f64 * (m - grand).powi(2);
        ss_within += g.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    }
    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let ms_within = ss_within / df_within;
    if !(ms_within > 0.0) {
        return Err(degenerate("one-way ANOVA", "groups have zero variance"));
    }
    let f = (ss_between / df_between) / ms_within;
    Ok(TestResult {
        statistic: f,
        pvalue: f_sf(f, df_between, df_within),
        df: Some(df_within),
    })
}

/// Mann-Whitney U (two-sided, normal approximation with tie and continuity
/// corrections). The statistic is U of the first sample.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<TestResult> {
    if a.is_empty() || b.is_empty() {
        return Err(degenerate("Mann-Whitney U", "a group is empty"));
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let n = n1 + n2;
    let combined: Vec<f64> = a.iter().chain(b).copied().collect();
    let ranks = rank_average(&combined);
    let r1: f64 = ranks[..a.len()].iter().sum();
    let u1 = r1 - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;
    let mu = n1 * n2 / 2.0;
    let var = n1 * n2 / 12.0 * ((n + 1.0) - tie_term(&combined) / (n * (n - 1.0)));
    if !(var > 0.0) {
        return Err(degenerate("Mann-Whitney U", "all observations are tied"));
    }
    let z = (u1.max(u2) - mu - 0.5) / var.sqrt();
    Ok(TestResult {
        statistic: u1,
        pvalue: (2.0 * normal_sf(z)).clamp(0.0, 1.0),
        df: None,
    })
}

/// Wilcoxon signed-rank test on paired samples. Zero differences are
/// dropped; the statistic is min(T+, T-).
pub fn wilcoxon(a: &[f64], b: &[f64]) -> Result<TestResult> {
    if a.len() != b.len() {
        return Err(FleurError::UnequalPairs(vec![a.len(), b.len()]));
    }
    let d: Vec<f64> = a
        .iter()
        .zip(b)
        .map(|(x, y)| x - y)
        .filter(|d| *d != 0.0)
        .collect();
    if d.is_empty() {
        return Err(degenerate("Wilcoxon signed-rank", "all differences are zero"));
    }
    let abs: Vec<f64> = d.iter().map(|x| x.abs()).collect();
    let ranks = rank_average(&abs);
    let r_plus: f64 = d.iter().zip(&ranks).filter(|(x, _)| **x > 0.0).map(|(_, r)| r).sum();
    let r_minus: f64 = d.iter().zip(&ranks).filter(|(x, _)| **x < 0.0).map(|(_, r)| r).sum();
    let t = r_plus.min(r_minus);
    let n = d.len() as f64;
    let mn = n * (n + 1.0) / 4.0;
    let var = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term(&abs) / 48.0;
    if !(var > 0.0) {
        return Err(degenerate("Wilcoxon signed-rank", "no variance in ranks"));
    }
    let z = (t - mn) / var.sqrt();
    Ok(TestResult {
        statistic: t,
        pvalue: (2.0 * normal_sf(z.abs())).min(1.0),
        df: None,
    })
}

/// Kruskal-Wallis H test with tie correction.
pub fn kruskal(groups: &[Vec<f64>]) -> Result<TestResult> {
    let k = groups.len();
    if k < 2 {
        return Err(FleurError::TooFewCategories);
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(degenerate("Kruskal-Wallis", "a group is empty"));
    }
    let combined: Vec<f64> = groups.iter().flatten().copied().collect();
    let n = combined.len() as f64;
    let ranks = rank_average(&combined);
    let mut h = 0.0;
    let mut offset = 0;
    for g in groups {
        let sum: f64 = ranks[offset..offset + g.len()].iter().sum();
        h += sum * sum / g.len() as f64;
        offset += g.len();
    }
    h = 12.0 / (n * (n + 1.0)) * h - 3.0 * (n + 1.0);
    let correction = 1.0 - tie_term(&combined) / (n * n * n - n);
    if !(correction > 0.0) {
        return Err(degenerate("Kruskal-Wallis", "all observations are tied"));
    }
    h /= correction;
    let df = (k - 1) as f64;
    Ok(TestResult {
        statistic: h,
        pvalue: chi2_sf(h, df),
        df: Some(df),
    })
}

/// Jarque-Bera normality test.
pub fn jarque_bera(xs: &[f64]) -> Result<TestResult> {
    if xs.len() < 3 {
        return Err(degenerate("Jarque-Bera", "needs at least 3 observations"));
    }
    let (skew, kurt) = moments(xs).ok_or(degenerate("Jarque-Bera", "zero variance"))?;
    let n = xs.len() as f64;
    let jb = n / 6.0 * (skew * skew + (kurt - 3.0).powi(2) / 4.0);
    Ok(TestResult {
        statistic: jb,
        pvalue: chi2_sf(jb, 2.0),
        df: Some(2.0),
    })
}

/// Chi-square test of independence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub pvalue: f64,
    pub dof: usize,
    pub expected: Vec<Vec<f64>>,
}

fn expected_frequencies(table: &[Vec<f64>]) -> Result<(Vec<Vec<f64>>, f64)> {
    let rows = table.len();
    let cols = table.first().map(Vec::len).unwrap_or(0);
    if rows == 0 || cols == 0 || table.iter().any(|r| r.len() != cols) {
        return Err(degenerate("chi-square", "table must be a non-empty rectangle"));
    }
    let row_sums: Vec<f64> = table.iter().map(|r| r.iter().sum()).collect();
    let col_sums: Vec<f64> = (0..cols).map(|j| table.iter().map(|r| r[j]).sum()).collect();
    let total: f64 = row_sums.iter().sum();
    if row_sums.iter().chain(&col_sums).any(|s| *s <= 0.0) {
        return Err(degenerate("chi-square", "a row or column sums to zero"));
    }
    let expected = row_sums
        .iter()
        .map(|r| col_sums.iter().map(|c| r * c / total).collect())
        .collect();
    Ok((expected, total))
}

fn pearson_statistic(table: &[Vec<f64>], expected: &[Vec<f64>], yates: bool) -> f64 {
    table
        .iter()
        .zip(expected)
        .flat_map(|(o_row, e_row)| o_row.iter().zip(e_row))
        .map(|(&o, &e)| {
            let diff = e - o;
            let o = if yates {
                o + diff.signum() * diff.abs().min(0.5)
            } else {
                o
            };
            (o - e).powi(2) / e
        })
        .sum()
}

/// Pearson's chi-square on an r x c table; Yates' correction is applied when
/// the table has one degree of freedom.
pub fn chi2_contingency(table: &[Vec<f64>]) -> Result<ChiSquareResult> {
    let (expected, _) = expected_frequencies(table)?;
    let dof = (table.len() - 1) * (expected[0].len() - 1);
    if dof == 0 {
        return Ok(ChiSquareResult {
            statistic: 0.0,
            pvalue: 1.0,
            dof,
            expected,
        });
    }
    let statistic = pearson_statistic(table, &expected, dof == 1);
    Ok(ChiSquareResult {
        statistic,
        pvalue: chi2_sf(statistic, dof as f64),
        dof,
        expected,
    })
}

/// Cramér's V from the uncorrected chi-square statistic.
pub fn cramers_v(table: &[Vec<f64>]) -> Result<f64> {
    let (expected, total) = expected_frequencies(table)?;
    let k = table.len().min(expected[0].len());
    if k < 2 {
        return Ok(0.0);
    }
    let chi2 = pearson_statistic(table, &expected, false);
    Ok((chi2 / (total * (k - 1) as f64)).sqrt().min(1.0))
}

/// Fisher's exact test on `[[a, b], [c, d]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FisherResult {
    pub odds_ratio: f64,
    pub pvalue: f64,
}

/// Two-sided Fisher's exact test: sums the hypergeometric probabilities of
/// every table with the observed margins that is no more likely than the
/// observed one.
pub fn fisher_exact(table: [[u64; 2]; 2]) -> FisherResult {
    let [[a, b], [c, d]] = table;
    let odds_ratio = if b * c == 0 {
        if a * d == 0 { f64::NAN } else { f64::INFINITY }
    } else {
        (a as f64 * d as f64) / (b as f64 * c as f64)
    };
    let (row1, row2, col1) = (a + b, c + d, a + c);
    let n = row1 + row2;
    if row1 == 0 || row2 == 0 || col1 == 0 || col1 == n {
        return FisherResult {
            odds_ratio: f64::NAN,
            pvalue: 1.0,
        };
    }
    let fixed = ln_factorial(row1) + ln_factorial(row2) + ln_factorial(col1)
        + ln_factorial(n - col1)
        - ln_factorial(n);
    let ln_p = |x: u64| {
        fixed
            - ln_factorial(x)
            - ln_factorial(row1 - x)
            - ln_factorial(col1 - x)
            - ln_factorial(row2 + x - col1)
    };
    let observed = ln_p(a);
    let lo = col1.saturating_sub(row2);
    let hi = row1.min(col1);
    let pvalue: f64 = (lo..=hi)
        .map(ln_p)
        .filter(|lp| *lp <= observed + 1e-7)
        .map(f64::exp)
        .sum();
    FisherResult {
        odds_ratio,
        pvalue: pvalue.min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn student_t_on_shifted_samples() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0];
        let r = ttest_ind(&a, &b).unwrap();
        assert!(close(r.statistic, -1.0, 1e-12));
        assert_eq!(r.df, Some(8.0));
        assert!(close(r.pvalue, 0.346_593_507_087_334_5, 1e-9));
    }

    #[test]
    fn paired_t_uses_differences() {
        let a = [5.0, 6.0, 7.0, 8.0, 9.0];
        let b = [6.0, 7.5, 8.0, 9.5, 11.0];
        let r = ttest_rel(&a, &b).unwrap();
        assert!(r.statistic < 0.0);
        assert_eq!(r.df, Some(4.0));
        assert!(r.pvalue < 0.01);
        assert!(matches!(
            ttest_rel(&a, &b[..3]),
            Err(FleurError::UnequalPairs(_))
        ));
    }

    #[test]
    fn anova_separates_distinct_means() {
        let groups = vec![
            vec![5.0, 6.0, 7.0, 5.5, 6.5],
            vec![8.0, 9.0, 8.5, 9.5, 8.0],
            vec![4.0, 3.0, 3.5, 4.5, 4.0],
        ];
        let r = f_oneway(&groups).unwrap();
        assert_eq!(r.df, Some(12.0));
        assert!(r.statistic > 50.0);
        assert!(r.pvalue < 1e-5);
    }

    #[test]
    fn anova_of_two_groups_is_t_squared() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![2.0, 3.0, 4.0, 5.0, 6.0];
        let f = f_oneway(&[a.clone(), b.clone()]).unwrap();
        let t = ttest_ind(&a, &b).unwrap();
        assert!(close(f.statistic, t.statistic.powi(2), 1e-12));
        assert!(close(f.pvalue, t.pvalue, 1e-9));
    }

    #[test]
    fn mann_whitney_fully_separated() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [6.0, 7.0, 8.0, 9.0, 10.0];
        let r = mann_whitney_u(&a, &b).unwrap();
        assert_eq!(r.statistic, 0.0);
        // z = (25 - 12.5 - 0.5) / sqrt(22.9166..)
        assert!(close(r.pvalue, 0.012_185_780_355_344_8, 1e-6));
    }

    #[test]
    fn wilcoxon_all_positive_differences() {
        let a = [6.0, 7.5, 8.0, 9.5, 11.0, 12.0];
        let b = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let r = wilcoxon(&a, &b).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!(r.pvalue < 0.05);
        assert!(wilcoxon(&a, &a).is_err());
    }

    #[test]
    fn kruskal_matches_hand_computation() {
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![6.0, 7.0, 8.0, 9.0, 10.0],
            vec![11.0, 12.0, 13.0, 14.0, 15.0],
        ];
        let r = kruskal(&groups).unwrap();
        // rank sums 15, 40, 65 -> H = 12/(15*16) * (225+1600+4225)/5 - 48 = 12.5
        assert!(close(r.statistic, 12.5, 1e-12));
        assert_eq!(r.df, Some(2.0));
        assert!(close(r.pvalue, (-12.5f64 / 2.0).exp(), 1e-12));
    }

    #[test]
    fn chi_square_on_independent_table_is_zero() {
        let table = vec![vec![10.0, 20.0], vec![20.0, 40.0], vec![5.0, 10.0]];
        let r = chi2_contingency(&table).unwrap();
        assert_eq!(r.dof, 2);
        assert!(close(r.statistic, 0.0, 1e-12));
        assert!(close(r.pvalue, 1.0, 1e-12));
        assert!(close(cramers_v(&table).unwrap(), 0.0, 1e-9));
    }

    #[test]
    fn yates_correction_on_2x2() {
        let table = vec![vec![12.0, 5.0], vec![3.0, 10.0]];
        let corrected = chi2_contingency(&table).unwrap();
        // expected: [[8.5, 8.5], [6.5, 6.5]]; |o - e| = 3.5 -> 3.0 after correction
        let hand = 9.0 / 8.5 * 2.0 + 9.0 / 6.5 * 2.0;
        assert_eq!(corrected.dof, 1);
        assert!(close(corrected.statistic, hand, 1e-12));
        assert!(close(corrected.expected[0][0], 8.5, 1e-12));
    }

    #[test]
    fn zero_margin_is_degenerate() {
        let table = vec![vec![0.0, 0.0], vec![3.0, 10.0]];
        assert!(chi2_contingency(&table).is_err());
    }

    #[test]
    fn fisher_tea_tasting() {
        let r = fisher_exact([[3, 1], [1, 3]]);
        assert!(close(r.odds_ratio, 9.0, 1e-12));
        assert!(close(r.pvalue, 34.0 / 70.0, 1e-9));
        let r = fisher_exact([[1, 9], [11, 3]]);
        assert!(close(r.pvalue, 0.002_759_456_185_220_1, 1e-9));
    }

    #[test]
    fn jarque_bera_accepts_symmetric_sample() {
        let xs = [2.0, 3.0, 3.5, 4.0, 4.0, 4.5, 5.0, 6.0];
        let r = jarque_bera(&xs).unwrap();
        assert!(r.pvalue > 0.05);
        assert!(jarque_bera(&[1.0, 1.0, 1.0]).is_err());
    }
}
