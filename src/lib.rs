//! fleur
//!
//! Quick statistical comparisons with annotated plots. Hand it two variables
//! and it works out which one holds the groups, runs the fitting test, and
//! draws the data with the result written above it. Pairs with the `fleur` CLI.
//!
//! ### Features
//! - Between-group comparisons: t-tests, Mann-Whitney, Wilcoxon, one-way ANOVA, Kruskal-Wallis
//! - Associations between categorical variables: chi-square and Fisher's exact test
//! - Linear regression with a Pearson, Spearman or Kendall coefficient
//! - Violin/box/swarm, bar, and scatter plots as SVG or PNG
//! - Bundled `iris` and `mtcars` datasets
//!
//! ### Example
//! ```no_run
//! use fleur::{BetweenOptions, BetweenPlotOptions, BetweenStats, InputData, load_iris};
//!
//! let iris = load_iris()?;
//! let data = InputData::new("species", "sepal_length", Some(&iris))?;
//! let stats = BetweenStats::new(&data, &BetweenOptions::default())?;
//! println!("{}", stats.summary());
//! stats.plot("iris.svg", &BetweenPlotOptions::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bar;
pub mod beeswarm;
pub mod between;
pub mod data;
pub mod datasets;
pub mod error;
pub mod format;
pub mod infer;
pub mod scatter;
pub mod stats;
pub mod viz;

pub use bar::{BarApproach, BarOptions, BarStats, BarTest};
pub use between::{Approach, BetweenOptions, BetweenStats, BetweenTest};
pub use data::{Column, DType, DataFrame, DataInfo, Input, InputData, Series, Source};
pub use datasets::{AVAILABLE_DATASETS, load_data, load_iris, load_mtcars};
pub use error::{FleurError, Result};
pub use scatter::{ScatterOptions, ScatterStats};
pub use stats::{Alternative, Correlation};
pub use viz::{BarLayout, BarPlotOptions, BetweenPlotOptions, Bins, Orientation, ScatterPlotOptions};
