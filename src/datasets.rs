//! Bundled example datasets.

use crate::data::DataFrame;
use crate::error::{FleurError, Result};

/// Names accepted by [`load_data`].
pub const AVAILABLE_DATASETS: [&str; 2] = ["iris", "mtcars"];

const IRIS_CSV: &str = include_str!("../data/iris.csv");
const MTCARS_CSV: &str = include_str!("../data/mtcars.csv");

/// Load a bundled dataset by (case-insensitive) name.
pub fn load_data(dataset_name: &str) -> Result<DataFrame> {
    let text = match dataset_name.to_ascii_lowercase().as_str() {
        "iris" => IRIS_CSV,
        "mtcars" => MTCARS_CSV,
        _ => return Err(FleurError::UnknownDataset(AVAILABLE_DATASETS.join(", "))),
    };
    log::debug!("loading bundled dataset `{dataset_name}`");
    DataFrame::from_csv_reader(text.as_bytes())
}

/// Fisher's iris measurements: 150 rows, four numeric columns and `species`.
pub fn load_iris() -> Result<DataFrame> {
    load_data("iris")
}

/// Motor Trend road tests: 32 cars, `model` followed by ten measurements.
pub fn load_mtcars() -> Result<DataFrame> {
    load_data("mtcars")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DType;

    #[test]
    fn unknown_name_lists_choices() {
        let err = load_data("invalid_dataset").unwrap_err();
        assert!(err.to_string().starts_with("dataset_name must be one of:"));
        assert_eq!(err.to_string(), "dataset_name must be one of: iris, mtcars");
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(load_data("IRIS").unwrap().height(), 150);
    }

    #[test]
    fn mtcars_dtypes() {
        let df = load_mtcars().unwrap();
        assert_eq!(df.dtype("model"), Some(DType::String));
        assert_eq!(df.dtype("mpg"), Some(DType::Float64));
        assert_eq!(df.dtype("cyl"), Some(DType::Int64));
    }
}
