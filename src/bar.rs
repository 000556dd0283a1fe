//! Association between two categorical variables.

use crate::data::{Column, InputData};
use crate::error::{FleurError, Result};
use crate::format::plain_text;
use crate::stats::{chi2_contingency, cramers_v, fisher_exact};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

const SMALL_EXPECTED: &str = "Some expected frequencies are less than 5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BarApproach {
    /// Fisher's exact test for sparse 2x2 tables, chi-square otherwise.
    #[default]
    Auto,
    ChiSquare,
    Fisher,
}

impl FromStr for BarApproach {
    type Err = FleurError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(BarApproach::Auto),
            "chi-square" => Ok(BarApproach::ChiSquare),
            "fisher" => Ok(BarApproach::Fisher),
            _ => Err(FleurError::InvalidOption {
                name: "approach",
                allowed: "'auto', 'chi-square', 'fisher'",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BarOptions {
    pub approach: BarApproach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarTest {
    ChiSquare,
    Fisher,
}

impl BarTest {
    pub fn name(self) -> &'static str {
        match self {
            BarTest::ChiSquare => "Chi-square",
            BarTest::Fisher => "Fisher's exact",
        }
    }
}

/// Contingency analysis of `x` (categories) against `y` (levels).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarStats {
    pub test: BarTest,
    pub test_name: String,
    /// Chi-square statistic; NaN for Fisher's exact test.
    pub statistic: f64,
    pub pvalue: f64,
    pub dof: Option<usize>,
    pub odds_ratio: Option<f64>,
    pub cramers_v: f64,
    pub x_name: String,
    pub y_name: String,
    /// Categories of `x` (table rows).
    pub categories: Vec<String>,
    /// Levels of `y` (table columns).
    pub levels: Vec<String>,
    pub contingency_table: Vec<Vec<u64>>,
    /// Row-normalized table: share of each level within a category.
    pub proportions: Vec<Vec<f64>>,
    pub n_obs: usize,
    pub n_cat: usize,
    pub n_levels: usize,
    pub expression: String,
    pub warnings: Vec<String>,
}

fn cross_tabulate(x: &Column, y: &Column) -> (Vec<String>, Vec<String>, Vec<Vec<u64>>) {
    let rows = x.unique_labels();
    let cols = y.unique_labels();
    let row_pos: HashMap<&str, usize> = rows.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let col_pos: HashMap<&str, usize> = cols.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let mut table = vec![vec![0u64; cols.len()]; rows.len()];
    for (a, b) in x.labels().iter().zip(y.labels()) {
        if let (Some(&i), Some(&j)) = (row_pos.get(a.as_str()), col_pos.get(b.as_str())) {
            table[i][j] += 1;
        }
    }
    (rows, cols, table)
}

impl BarStats {
    /// Cross-tabulate both variables as labels and test their independence.
    pub fn new(data: &InputData, options: &BarOptions) -> Result<Self> {
        let (categories, levels, table) = cross_tabulate(data.x(), data.y());
        let (n_cat, n_levels) = (categories.len(), levels.len());
        if n_cat < 2 {
            return Err(FleurError::TooFewCategories);
        }
        let n_obs = table.iter().flatten().sum::<u64>() as usize;
        let table_f: Vec<Vec<f64>> = table
            .iter()
            .map(|r| r.iter().map(|&c| c as f64).collect())
            .collect();

        let is_2x2 = n_cat == 2 && n_levels == 2;
        let test = match options.approach {
            BarApproach::ChiSquare => BarTest::ChiSquare,
            BarApproach::Fisher if is_2x2 => BarTest::Fisher,
            BarApproach::Fisher => {
                return Err(FleurError::FisherNot2x2 {
                    rows: n_cat,
                    cols: n_levels,
                });
            }
            BarApproach::Auto => {
                let sparse = chi2_contingency(&table_f)?
                    .expected
                    .iter()
                    .flatten()
                    .any(|&e| e < 5.0);
                if is_2x2 && sparse {
                    BarTest::Fisher
                } else {
                    BarTest::ChiSquare
                }
            }
        };
        log::debug!(
            "{n_cat}x{n_levels} table of `{}` by `{}`: running {}",
            data.x_name(),
            data.y_name(),
            test.name()
        );

        let v = cramers_v(&table_f)?;
        let mut warnings = Vec::new();
        let (statistic, pvalue, dof, odds_ratio, expression) = match test {
            BarTest::ChiSquare => {
                let r = chi2_contingency(&table_f)?;
                if r.expected.iter().flatten().any(|&e| e < 5.0) {
                    log::warn!("{SMALL_EXPECTED}");
                    warnings.push(SMALL_EXPECTED.to_string());
                }
                let expression = format!(
                    "$\\chi^2({}) = {:.2}, p = {:.4}, V_{{Cramer}} = {v:.2}, n_{{obs}} = {n_obs}$",
                    r.dof, r.statistic, r.pvalue
                );
                (r.statistic, r.pvalue, Some(r.dof), None, expression)
            }
            BarTest::Fisher => {
                let r = fisher_exact([
                    [table[0][0], table[0][1]],
                    [table[1][0], table[1][1]],
                ]);
                let expression = format!(
                    "$OR_{{Fisher}} = {:.2}, p = {:.4}, n_{{obs}} = {n_obs}$",
                    r.odds_ratio, r.pvalue
                );
                (f64::NAN, r.pvalue, None, Some(r.odds_ratio), expression)
            }
        };

        let proportions = table
            .iter()
            .map(|row| {
                let total = row.iter().sum::<u64>() as f64;
                row.iter()
                    .map(|&c| if total > 0.0 { c as f64 / total } else { 0.0 })
                    .collect()
            })
            .collect();

        Ok(Self {
            test,
            test_name: test.name().to_string(),
            statistic,
            pvalue,
            dof,
            odds_ratio,
            cramers_v: v,
            x_name: data.x_name().to_string(),
            y_name: data.y_name().to_string(),
            categories,
            levels,
            contingency_table: table,
            proportions,
            n_obs,
            n_cat,
            n_levels,
            expression,
            warnings,
        })
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Categorical association\n\nTest: {} ({}x{} table)\n{}\n",
            self.test_name,
            self.n_cat,
            self.n_levels,
            plain_text(&self.expression)
        );
        for w in &self.warnings {
            out.push_str(&format!("Warning: {w}\n"));
        }
        out
    }
}
