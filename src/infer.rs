//! Decide which of two columns is the grouping variable and which is measured.

use crate::data::{DType, DataFrame};
use crate::error::{FleurError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Categorical,
    Numerical,
}

pub fn kind_of(dtype: DType) -> VariableKind {
    match dtype {
        DType::String | DType::Categorical => VariableKind::Categorical,
        DType::Int64 | DType::Float64 => VariableKind::Numerical,
    }
}

/// Order a pair of dtypes as (categorical, numerical).
///
/// Returns `true` when `x` is the categorical one.
pub fn categorical_first(x: DType, y: DType) -> Result<bool> {
    match (kind_of(x), kind_of(y)) {
        (VariableKind::Categorical, VariableKind::Numerical) => Ok(true),
        (VariableKind::Numerical, VariableKind::Categorical) => Ok(false),
        _ => Err(FleurError::AmbiguousTypes),
    }
}

/// Identify which of the columns `x` and `y` in `frame` is categorical and
/// which is numerical. Returns `(categorical, numerical)` column names.
pub fn infer_types<'a>(x: &'a str, y: &'a str, frame: &DataFrame) -> Result<(&'a str, &'a str)> {
    let xt = frame.dtype(x).ok_or(FleurError::ColumnNotFound)?;
    let yt = frame.dtype(y).ok_or(FleurError::ColumnNotFound)?;
    if categorical_first(xt, yt)? {
        Ok((x, y))
    } else {
        Ok((y, x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn frame(x: Column, y: Column) -> DataFrame {
        DataFrame::from_columns(vec![("x", x), ("y", y)]).unwrap()
    }

    #[test]
    fn picks_the_categorical_column_first() {
        let data1 = frame(Column::Int(vec![1, 2]), vec!["a", "b"].into());
        let data2 = frame(vec!["a", "b"].into(), Column::Int(vec![1, 2]));
        assert_eq!(infer_types("x", "y", &data1).unwrap(), ("y", "x"));
        assert_eq!(infer_types("x", "y", &data2).unwrap(), ("x", "y"));
    }

    #[test]
    fn same_kind_pairs_are_rejected() {
        let data3 = frame(vec!["c", "d"].into(), vec!["a", "b"].into());
        let data4 = frame(Column::Int(vec![1, 2]), Column::Int(vec![3, 4]));
        assert!(matches!(
            infer_types("x", "y", &data3),
            Err(FleurError::AmbiguousTypes)
        ));
        assert!(matches!(
            infer_types("x", "y", &data4),
            Err(FleurError::AmbiguousTypes)
        ));
    }

    #[test]
    fn cast_numeric_codes_count_as_categorical() {
        let cyl = Column::Int(vec![4, 6, 8]).cast_categorical();
        let data = frame(Column::Float(vec![21.0, 22.8, 18.7]), cyl);
        assert_eq!(infer_types("x", "y", &data).unwrap(), ("y", "x"));
    }

    #[test]
    fn missing_column_is_reported() {
        let data = frame(vec!["a"].into(), Column::Int(vec![1]));
        assert!(matches!(
            infer_types("x", "nope", &data),
            Err(FleurError::ColumnNotFound)
        ));
    }
}
