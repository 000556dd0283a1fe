//! Statistical routines: special functions, descriptive helpers, and the
//! hypothesis tests the comparison types choose between.

pub mod correlation;
pub mod descriptive;
pub mod hypothesis;
pub mod special;

pub use correlation::{
    Alternative, Correlation, CorrelationResult, LinearFit, kendalltau, linregress, pearsonr,
    spearmanr,
};
pub use descriptive::{BoxSummary, Histogram, gaussian_kde, mean, median, quantile, std_dev};
pub use hypothesis::{
    ChiSquareResult, FisherResult, TestResult, chi2_contingency, cramers_v, f_oneway,
    fisher_exact, jarque_bera, kruskal, mann_whitney_u, ttest_ind, ttest_rel, wilcoxon,
};
