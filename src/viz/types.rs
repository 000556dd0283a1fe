//! Public option enums shared by the plot drawers.

use crate::error::FleurError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction the categorical axis runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Categories on the x axis, values vertical.
    #[default]
    Vertical,
    /// Categories on the y axis, values horizontal.
    Horizontal,
}

impl FromStr for Orientation {
    type Err = FleurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vertical" => Ok(Orientation::Vertical),
            "horizontal" => Ok(Orientation::Horizontal),
            _ => Err(FleurError::InvalidOption {
                name: "orientation",
                allowed: "'vertical', 'horizontal'",
            }),
        }
    }
}

/// How bars for the levels of one category are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarLayout {
    /// Proportions stacked to 1 per category.
    #[default]
    Stacked,
    /// One bar per level, side by side.
    Grouped,
}

impl FromStr for BarLayout {
    type Err = FleurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stacked" => Ok(BarLayout::Stacked),
            "grouped" => Ok(BarLayout::Grouped),
            _ => Err(FleurError::InvalidOption {
                name: "plot_type",
                allowed: "'stacked', 'grouped'",
            }),
        }
    }
}

/// Bin count for marginal histograms: one value for both, or `[top, right]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bins {
    Both(usize),
    Pair([usize; 2]),
}

impl Bins {
    /// `(top, right)` bin counts.
    pub fn split(self) -> (usize, usize) {
        match self {
            Bins::Both(n) => (n, n),
            Bins::Pair([top, right]) => (top, right),
        }
    }
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Both(12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_error_message() {
        let err = "diagonal".parse::<Orientation>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "`orientation` must be one of: 'vertical', 'horizontal'"
        );
    }

    #[test]
    fn bins_deserialize_from_number_or_pair() {
        let one: Bins = serde_json::from_str("8").unwrap();
        let two: Bins = serde_json::from_str("[10, 20]").unwrap();
        assert_eq!(one.split(), (8, 8));
        assert_eq!(two.split(), (10, 20));
        assert_eq!(Bins::default().split(), (12, 12));
    }
}
