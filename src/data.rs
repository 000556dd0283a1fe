//! Tabular input: typed columns, a small data frame, and the normalization of
//! the three accepted input shapes (column names, named series, plain arrays).

use crate::error::{FleurError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::io::{Read, Write};
use std::path::Path;

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    Int64,
    Float64,
    String,
    /// Explicitly categorical, e.g. a numeric code cast to labels.
    Categorical,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

/// One column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
    Cat(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Str(v) | Column::Cat(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            Column::Int(_) => DType::Int64,
            Column::Float(_) => DType::Float64,
            Column::Str(_) => DType::String,
            Column::Cat(_) => DType::Categorical,
        }
    }

    /// Numeric values as `f64`, or `None` for label columns.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Int(v) => Some(v.iter().map(|&i| i as f64).collect()),
            Column::Float(v) => Some(v.clone()),
            Column::Str(_) | Column::Cat(_) => None,
        }
    }

    /// One display label per row.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Column::Int(v) => v.iter().map(|i| i.to_string()).collect(),
            Column::Float(v) => v.iter().map(|f| f.to_string()).collect(),
            Column::Str(v) | Column::Cat(v) => v.clone(),
        }
    }

    pub fn cast_categorical(&self) -> Column {
        Column::Cat(self.labels())
    }

    /// Distinct labels in sorted order. Numeric columns sort by value, so `10`
    /// comes after `8`.
    pub fn unique_labels(&self) -> Vec<String> {
        match self {
            Column::Int(v) => {
                let set: BTreeSet<i64> = v.iter().copied().collect();
                set.into_iter().map(|i| i.to_string()).collect()
            }
            Column::Float(v) => {
                let mut vals: Vec<f64> = v.iter().copied().filter(|f| !f.is_nan()).collect();
                vals.sort_by(|a, b| a.total_cmp(b));
                vals.dedup();
                vals.into_iter().map(|f| f.to_string()).collect()
            }
            Column::Str(v) | Column::Cat(v) => {
                let set: BTreeSet<&str> = v.iter().map(String::as_str).collect();
                let mut labels: Vec<String> = set.into_iter().map(str::to_string).collect();
                // Labels cast from numbers keep numeric order.
                let parsed: Option<Vec<f64>> = labels.iter().map(|l| l.parse().ok()).collect();
                if let Some(keys) = parsed {
                    let mut keyed: Vec<(f64, String)> = keys.into_iter().zip(labels).collect();
                    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
                    labels = keyed.into_iter().map(|(_, l)| l).collect();
                }
                labels
            }
        }
    }

    /// Row indices per distinct label, in `unique_labels` order.
    pub fn group_indices(&self) -> Vec<(String, Vec<usize>)> {
        let order = self.unique_labels();
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); order.len()];
        for (row, label) in self.labels().iter().enumerate() {
            if let Some(&g) = position.get(label.as_str()) {
                groups[g].push(row);
            }
        }
        order.into_iter().zip(groups).collect()
    }

    /// Keep the rows at `idx`, in that order.
    pub fn take(&self, idx: &[usize]) -> Column {
        match self {
            Column::Int(v) => Column::Int(idx.iter().map(|&i| v[i]).collect()),
            Column::Float(v) => Column::Float(idx.iter().map(|&i| v[i]).collect()),
            Column::Str(v) => Column::Str(idx.iter().map(|&i| v[i].clone()).collect()),
            Column::Cat(v) => Column::Cat(idx.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<&[f64]> for Column {
    fn from(v: &[f64]) -> Self {
        Column::Float(v.to_vec())
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<i32>> for Column {
    fn from(v: Vec<i32>) -> Self {
        Column::Int(v.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Str(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Str(v.into_iter().map(str::to_string).collect())
    }
}

/// A column that carries its own (optional) name.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: Option<String>,
    pub values: Column,
}

impl Series {
    pub fn new(name: impl Into<String>, values: impl Into<Column>) -> Self {
        Self {
            name: Some(name.into()),
            values: values.into(),
        }
    }

    pub fn unnamed(values: impl Into<Column>) -> Self {
        Self {
            name: None,
            values: values.into(),
        }
    }
}

/// Ordered, named, equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<(String, Column)>,
}

impl DataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self> {
        columns
            .into_iter()
            .try_fold(Self::new(), |df, (name, col)| df.with_column(name, col))
    }

    /// Add a column, replacing any existing column of the same name.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        let name = name.into();
        let others = self.columns.iter().filter(|(n, _)| *n != name).count();
        if others > 0 && column.len() != self.height() {
            return Err(FleurError::RaggedColumn(name));
        }
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = column;
        } else {
            self.columns.push((name, column));
        }
        Ok(self)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn schema(&self) -> Vec<(&str, DType)> {
        self.columns
            .iter()
            .map(|(n, c)| (n.as_str(), c.dtype()))
            .collect()
    }

    pub fn dtype(&self, name: &str) -> Option<DType> {
        self.column(name).map(Column::dtype)
    }

    pub fn height(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Rows at `idx`, in that order.
    pub fn take(&self, idx: &[usize]) -> DataFrame {
        DataFrame {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(idx)))
                .collect(),
        }
    }

    /// Keep rows whose label in `column` is one of `keep`.
    pub fn filter_labels(&self, column: &str, keep: &[&str]) -> Result<DataFrame> {
        let col = self.column(column).ok_or(FleurError::ColumnNotFound)?;
        let idx: Vec<usize> = col
            .labels()
            .iter()
            .enumerate()
            .filter(|(_, l)| keep.contains(&l.as_str()))
            .map(|(i, _)| i)
            .collect();
        Ok(self.take(&idx))
    }

    /// Parse CSV with a header row, inferring one dtype per column.
    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(rdr);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (i, cell) in record.iter().enumerate().take(headers.len()) {
                raw[i].push(cell.trim().to_string());
            }
        }
        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| (name, infer_column(cells)))
            .collect();
        Self::from_columns(columns)
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn to_csv_writer<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(w);
        wtr.write_record(self.column_names())?;
        let labels: Vec<Vec<String>> = self.columns.iter().map(|(_, c)| c.labels()).collect();
        for row in 0..self.height() {
            wtr.write_record(labels.iter().map(|col| col[row].as_str()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file)
    }
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("na")
}

fn infer_column(cells: Vec<String>) -> Column {
    if !cells.is_empty() && cells.iter().all(|c| c.parse::<i64>().is_ok()) {
        return Column::Int(cells.iter().filter_map(|c| c.parse().ok()).collect());
    }
    let any_value = cells.iter().any(|c| !is_missing(c));
    let all_float = cells
        .iter()
        .all(|c| is_missing(c) || c.parse::<f64>().is_ok());
    if any_value && all_float {
        return Column::Float(
            cells
                .iter()
                .map(|c| c.parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        );
    }
    Column::Str(cells)
}

/// Where the two variables came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    DataFrame,
    Series,
    Array,
}

/// One of the accepted shapes for `x` or `y`.
#[derive(Debug, Clone)]
pub enum Input<'a> {
    Name(&'a str),
    Series(Series),
    Array(Column),
}

impl Input<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Input::Name(_) => "column name",
            Input::Series(_) => "series",
            Input::Array(_) => "array",
        }
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(name: &'a str) -> Self {
        Input::Name(name)
    }
}

impl From<Series> for Input<'_> {
    fn from(s: Series) -> Self {
        Input::Series(s)
    }
}

impl From<Column> for Input<'_> {
    fn from(c: Column) -> Self {
        Input::Array(c)
    }
}

impl From<Vec<f64>> for Input<'_> {
    fn from(v: Vec<f64>) -> Self {
        Input::Array(v.into())
    }
}

impl From<Vec<&str>> for Input<'_> {
    fn from(v: Vec<&str>) -> Self {
        Input::Array(v.into())
    }
}

/// Summary of a normalized input pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataInfo {
    pub x_name: String,
    pub y_name: String,
    pub source: Source,
    pub x_dtype: DType,
    pub y_dtype: DType,
    pub length: usize,
}

/// Two equal-length variables with names, normalized from any input shape.
#[derive(Debug, Clone)]
pub struct InputData {
    x: Column,
    y: Column,
    x_name: String,
    y_name: String,
    source: Source,
}

impl InputData {
    /// Dispatch on the shapes of `x` and `y`; mixed shapes are rejected.
    pub fn new<'a>(
        x: impl Into<Input<'a>>,
        y: impl Into<Input<'a>>,
        data: Option<&DataFrame>,
    ) -> Result<Self> {
        match (x.into(), y.into()) {
            (Input::Name(x), Input::Name(y)) => {
                let frame = data.ok_or(FleurError::MissingData)?;
                Self::from_frame(x, y, frame)
            }
            (Input::Series(x), Input::Series(y)) => Self::from_series(x, y),
            (Input::Array(x), Input::Array(y)) => Self::from_arrays(x, y),
            (x, y) => Err(FleurError::UnsupportedInput {
                x_kind: x.kind(),
                y_kind: y.kind(),
            }),
        }
    }

    pub fn from_frame(x: &str, y: &str, frame: &DataFrame) -> Result<Self> {
        let (Some(xc), Some(yc)) = (frame.column(x), frame.column(y)) else {
            return Err(FleurError::ColumnNotFound);
        };
        Self::build(xc.clone(), yc.clone(), x.to_string(), y.to_string(), Source::DataFrame)
    }

    pub fn from_series(x: Series, y: Series) -> Result<Self> {
        let x_name = x.name.unwrap_or_else(|| "x".to_string());
        let y_name = y.name.unwrap_or_else(|| "y".to_string());
        Self::build(x.values, y.values, x_name, y_name, Source::Series)
    }

    pub fn from_arrays(x: impl Into<Column>, y: impl Into<Column>) -> Result<Self> {
        Self::build(x.into(), y.into(), "x".into(), "y".into(), Source::Array)
    }

    fn build(x: Column, y: Column, x_name: String, y_name: String, source: Source) -> Result<Self> {
        if x.len() != y.len() {
            return Err(FleurError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        Ok(Self {
            x,
            y,
            x_name,
            y_name,
            source,
        })
    }

    pub fn x(&self) -> &Column {
        &self.x
    }

    pub fn y(&self) -> &Column {
        &self.y
    }

    pub fn x_name(&self) -> &str {
        &self.x_name
    }

    pub fn y_name(&self) -> &str {
        &self.y_name
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Canonical two-column frame. A self-pairing (`x == y`) yields one column.
    pub fn frame(&self) -> DataFrame {
        let mut columns = vec![(self.x_name.clone(), self.x.clone())];
        if self.y_name != self.x_name {
            columns.push((self.y_name.clone(), self.y.clone()));
        }
        DataFrame { columns }
    }

    pub fn info(&self) -> DataInfo {
        DataInfo {
            x_name: self.x_name.clone(),
            y_name: self.y_name.clone(),
            source: self.source,
            x_dtype: self.x.dtype(),
            y_dtype: self.y.dtype(),
            length: self.len(),
        }
    }
}
