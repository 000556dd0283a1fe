//! Compare a numerical variable across the levels of a categorical one.

use crate::data::InputData;
use crate::error::{FleurError, Result};
use crate::format::plain_text;
use crate::infer::infer_types;
use crate::stats::{f_oneway, jarque_bera, kruskal, mann_whitney_u, ttest_ind, ttest_rel, wilcoxon};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Family of tests to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    /// Parametric when every group looks normal (Jarque-Bera), otherwise rank based.
    Auto,
    #[default]
    Parametric,
    Nonparametric,
}

impl FromStr for Approach {
    type Err = FleurError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Approach::Auto),
            "parametric" => Ok(Approach::Parametric),
            "nonparametric" => Ok(Approach::Nonparametric),
            _ => Err(FleurError::InvalidOption {
                name: "approach",
                allowed: "'auto', 'parametric', 'nonparametric'",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetweenOptions {
    /// Observations are matched across the two groups (same order).
    pub paired: bool,
    pub approach: Approach,
    /// Significance level of the normality screen used by [`Approach::Auto`].
    pub normality_alpha: f64,
}

impl Default for BetweenOptions {
    fn default() -> Self {
        Self {
            paired: false,
            approach: Approach::Parametric,
            normality_alpha: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetweenTest {
    StudentT,
    PairedT,
    MannWhitney,
    Wilcoxon,
    OneWayAnova,
    KruskalWallis,
}

impl BetweenTest {
    pub fn name(self) -> &'static str {
        match self {
            BetweenTest::StudentT => "T-test",
            BetweenTest::PairedT => "Paired t-test",
            BetweenTest::MannWhitney => "Mann-Whitney U test",
            BetweenTest::Wilcoxon => "Wilcoxon signed-rank test",
            BetweenTest::OneWayAnova => "One-way ANOVA",
            BetweenTest::KruskalWallis => "Kruskal-Wallis test",
        }
    }

    /// Whether the test compares more than two groups at once.
    pub fn is_omnibus(self) -> bool {
        matches!(self, BetweenTest::OneWayAnova | BetweenTest::KruskalWallis)
    }

    fn select(n_cat: usize, paired: bool, parametric: bool) -> Result<Self> {
        match (n_cat, paired, parametric) {
            (0 | 1, _, _) => Err(FleurError::TooFewCategories),
            (2, true, true) => Ok(BetweenTest::PairedT),
            (2, false, true) => Ok(BetweenTest::StudentT),
            (2, true, false) => Ok(BetweenTest::Wilcoxon),
            (2, false, false) => Ok(BetweenTest::MannWhitney),
            (_, true, _) => Err(FleurError::RepeatedMeasuresAnova),
            (_, false, true) => Ok(BetweenTest::OneWayAnova),
            (_, false, false) => Ok(BetweenTest::KruskalWallis),
        }
    }
}

/// Result of a between-group comparison, plus the grouped data used to draw it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetweenStats {
    pub test: BetweenTest,
    pub name: String,
    pub statistic: f64,
    pub pvalue: f64,
    /// Degrees of freedom of two-group t-tests and Kruskal-Wallis.
    pub dof: Option<usize>,
    pub dof_between: Option<usize>,
    pub dof_within: Option<usize>,
    pub main_stat: String,
    pub expression: String,
    pub is_paired: bool,
    pub n_cat: usize,
    pub n_obs: usize,
    pub cat_name: String,
    pub num_name: String,
    pub labels: Vec<String>,
    pub sample_sizes: Vec<usize>,
    pub groups: Vec<Vec<f64>>,
}

fn looks_normal(group: &[f64], alpha: f64) -> bool {
    group.len() >= 3 && jarque_bera(group).is_ok_and(|r| r.pvalue >= alpha)
}

impl BetweenStats {
    /// Infer which column holds the groups, pick a test, and run it.
    ///
    /// Missing values (NaN) in the numerical column are dropped per group.
    pub fn new(data: &InputData, options: &BetweenOptions) -> Result<Self> {
        let frame = data.frame();
        let (cat_name, num_name) = infer_types(data.x_name(), data.y_name(), &frame)?;
        let cat = frame.column(cat_name).ok_or(FleurError::ColumnNotFound)?;
        let values = frame
            .column(num_name)
            .and_then(|c| c.to_f64())
            .ok_or_else(|| FleurError::NotNumeric(num_name.to_string()))?;

        let (labels, groups): (Vec<String>, Vec<Vec<f64>>) = cat
            .group_indices()
            .into_iter()
            .map(|(label, rows)| {
                let vals = rows.iter().map(|&i| values[i]).filter(|v| !v.is_nan()).collect();
                (label, vals)
            })
            .unzip();
        let n_cat = labels.len();
        let sample_sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        let n_obs: usize = sample_sizes.iter().sum();

        let parametric = match options.approach {
            Approach::Parametric => true,
            Approach::Nonparametric => false,
            Approach::Auto => groups
                .iter()
                .all(|g| looks_normal(g, options.normality_alpha)),
        };
        let test = BetweenTest::select(n_cat, options.paired, parametric)?;
        log::debug!(
            "{} groups of `{num_name}` by `{cat_name}`: running {}",
            n_cat,
            test.name()
        );
        if options.paired && sample_sizes.windows(2).any(|w| w[0] != w[1]) {
            return Err(FleurError::UnequalPairs(sample_sizes));
        }

        let (mut dof, mut dof_between, mut dof_within) = (None, None, None);
        let (statistic, pvalue, main_stat) = match test {
            BetweenTest::StudentT | BetweenTest::PairedT => {
                let r = if options.paired {
                    ttest_rel(&groups[0], &groups[1])?
                } else {
                    ttest_ind(&groups[0], &groups[1])?
                };
                let df = r.df.unwrap_or_default() as usize;
                dof = Some(df);
                let stat = format!("t_{{Student}}({df}) = {:.2}", r.statistic);
                (r.statistic, r.pvalue, stat)
            }
            BetweenTest::MannWhitney => {
                let r = mann_whitney_u(&groups[0], &groups[1])?;
                let stat = format!("U_{{Mann-Whitney}} = {:.2}", r.statistic);
                (r.statistic, r.pvalue, stat)
            }
            BetweenTest::Wilcoxon => {
                let r = wilcoxon(&groups[0], &groups[1])?;
                let stat = format!("W_{{Wilcoxon}} = {:.2}", r.statistic);
                (r.statistic, r.pvalue, stat)
            }
            BetweenTest::OneWayAnova => {
                let r = f_oneway(&groups)?;
                let (db, dw) = (n_cat - 1, n_obs - n_cat);
                dof_between = Some(db);
                dof_within = Some(dw);
                let stat = format!("F({db}, {dw}) = {:.2}", r.statistic);
                (r.statistic, r.pvalue, stat)
            }
            BetweenTest::KruskalWallis => {
                let r = kruskal(&groups)?;
                let df = n_cat - 1;
                dof = Some(df);
                let stat = format!("\\chi^2_{{Kruskal-Wallis}}({df}) = {:.2}", r.statistic);
                (r.statistic, r.pvalue, stat)
            }
        };
        let expression = format!("${main_stat}, p = {pvalue:.4}, n_{{obs}} = {n_obs}$");

        Ok(Self {
            test,
            name: test.name().to_string(),
            statistic,
            pvalue,
            dof,
            dof_between,
            dof_within,
            main_stat,
            expression,
            is_paired: options.paired,
            n_cat,
            n_obs,
            cat_name: cat_name.to_string(),
            num_name: num_name.to_string(),
            labels,
            sample_sizes,
            groups,
        })
    }

    /// Tick label per group: `"<label>\nn = <size>"`.
    pub fn tick_labels(&self) -> Vec<String> {
        self.labels
            .iter()
            .zip(&self.sample_sizes)
            .map(|(label, n)| format!("{label}\nn = {n}"))
            .collect()
    }

    pub fn summary(&self) -> String {
        let groups = if self.test.is_omnibus() {
            format!(" with {} groups", self.n_cat)
        } else {
            String::new()
        };
        format!(
            "Between stats comparison\n\nTest: {}{}\n{}\n",
            self.name,
            groups,
            plain_text(&self.expression)
        )
    }
}
