//! Dataframes
//!
//! A minimal column-oriented dataframe for the table conversions: named
//! columns of equal length, each with a dtype inferred from its values.
//! Column names need not be unique.

use std::fmt;

use num_traits::ToPrimitive;
use smol_str::SmolStr;

use crate::error::{BridgeError, BridgeResult};
use crate::host::value::HostValue;

/// Column dtype, inferred from the column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnDtype {
    /// All floats (integers mixed in are widened)
    Float64,
    /// All integers fitting 64 bits
    Int64,
    /// All booleans
    Bool,
    /// Anything else, including empty columns
    Object,
}

impl ColumnDtype {
    /// Dtype name, e.g. `float64`
    pub fn name(&self) -> &'static str {
        match self {
            ColumnDtype::Float64 => "float64",
            ColumnDtype::Int64 => "int64",
            ColumnDtype::Bool => "bool",
            ColumnDtype::Object => "object",
        }
    }

    /// Infer the dtype of a column
    pub fn infer(values: &[HostValue]) -> Self {
        if values.is_empty() {
            return ColumnDtype::Object;
        }
        if values.iter().all(|v| matches!(v, HostValue::Bool(_))) {
            return ColumnDtype::Bool;
        }
        let is_int = |v: &HostValue| matches!(v, HostValue::Int(n) if n.to_i64().is_some());
        if values.iter().all(is_int) {
            return ColumnDtype::Int64;
        }
        if values
            .iter()
            .all(|v| matches!(v, HostValue::Float(_)) || is_int(v))
        {
            return ColumnDtype::Float64;
        }
        ColumnDtype::Object
    }
}

impl fmt::Display for ColumnDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: SmolStr,
    dtype: ColumnDtype,
    values: Vec<HostValue>,
}

impl Series {
    /// Build a column, inferring its dtype.
    ///
    /// Integers in a float column are widened to floats.
    pub fn new(name: impl Into<SmolStr>, values: Vec<HostValue>) -> Self {
        let dtype = ColumnDtype::infer(&values);
        let values = match dtype {
            ColumnDtype::Float64 => values
                .into_iter()
                .map(|v| match v.as_float() {
                    Some(f) => HostValue::Float(f),
                    None => v,
                })
                .collect(),
            _ => values,
        };
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Column label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column dtype
    pub fn dtype(&self) -> ColumnDtype {
        self.dtype
    }

    /// Column values, top to bottom
    pub fn values(&self) -> &[HostValue] {
        &self.values
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A dataframe: equal-length named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    series: Vec<Series>,
    rows: usize,
}

impl DataFrame {
    /// A frame with no columns and no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, values)` columns of equal length
    pub fn from_columns<N: Into<SmolStr>>(
        columns: impl IntoIterator<Item = (N, Vec<HostValue>)>,
    ) -> BridgeResult<Self> {
        let series: Vec<Series> = columns
            .into_iter()
            .map(|(name, values)| Series::new(name, values))
            .collect();
        let rows = series.first().map_or(0, Series::len);
        if let Some(bad) = series.iter().find(|s| s.len() != rows) {
            return Err(BridgeError::array_layout_incompatible(format!(
                "column {:?} has {} values, expected {}",
                bad.name(),
                bad.len(),
                rows
            )));
        }
        Ok(Self { series, rows })
    }

    /// Build from a header and rows of equal width
    pub fn from_rows<N: Into<SmolStr>>(
        headers: impl IntoIterator<Item = N>,
        rows: Vec<Vec<HostValue>>,
    ) -> BridgeResult<Self> {
        let headers: Vec<SmolStr> = headers.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<HostValue>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(BridgeError::array_layout_incompatible(format!(
                    "row {} has {} values, expected {}",
                    r,
                    row.len(),
                    headers.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Self::from_columns(headers.into_iter().zip(columns))
    }

    /// Column labels, left to right
    pub fn columns(&self) -> Vec<&str> {
        self.series.iter().map(Series::name).collect()
    }

    /// The columns
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// First column with the given label
    pub fn column(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name() == name)
    }

    /// Per-column dtypes
    pub fn dtypes(&self) -> Vec<ColumnDtype> {
        self.series.iter().map(Series::dtype).collect()
    }

    /// Distinct dtypes, in order of first appearance
    pub fn unique_dtypes(&self) -> Vec<ColumnDtype> {
        let mut unique = Vec::new();
        for dtype in self.dtypes() {
            if !unique.contains(&dtype) {
                unique.push(dtype);
            }
        }
        unique
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.series.len())
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.series.len()
    }

    /// Cell at `(row, column)`
    pub fn get(&self, row: usize, column: usize) -> Option<&HostValue> {
        self.series.get(column)?.values.get(row)
    }

    /// Rows, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = Vec<HostValue>> + '_ {
        (0..self.rows).map(move |r| {
            self.series
                .iter()
                .map(|s| s.values[r].clone())
                .collect()
        })
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .iter_rows()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        let index_width = self.rows.saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .series
            .iter()
            .enumerate()
            .map(|(c, s)| {
                cells
                    .iter()
                    .map(|row| row[c].len())
                    .chain(std::iter::once(s.name().len()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (s, width) in self.series.iter().zip(&widths) {
            write!(f, "  {:>width$}", s.name(), width = *width)?;
        }
        for (r, row) in cells.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:<index_width$}", r)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *width)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dtype_inference() {
        let int = HostValue::from;
        assert_eq!(ColumnDtype::infer(&[int(1), int(2)]), ColumnDtype::Int64);
        assert_eq!(ColumnDtype::infer(&[int(1), HostValue::Float(2.5)]), ColumnDtype::Float64);
        assert_eq!(
            ColumnDtype::infer(&[HostValue::Bool(true), HostValue::Bool(false)]),
            ColumnDtype::Bool
        );
        assert_eq!(ColumnDtype::infer(&[HostValue::Bool(true), int(1)]), ColumnDtype::Object);
        assert_eq!(ColumnDtype::infer(&[HostValue::str("a")]), ColumnDtype::Object);
        assert_eq!(ColumnDtype::infer(&Vec::<HostValue>::new()), ColumnDtype::Object);
    }

    #[test]
    fn test_float_column_widens_ints() {
        let series = Series::new("x", vec![HostValue::from(1), HostValue::Float(0.5)]);
        assert!(matches!(series.values()[0], HostValue::Float(f) if f == 1.0));
    }

    #[test]
    fn test_from_rows() {
        let frame = DataFrame::from_rows(
            ["a", "b"],
            vec![vec![1.into(), "x".into()], vec![2.into(), "y".into()]],
        )
        .unwrap();
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.columns(), vec!["a", "b"]);
        assert_eq!(frame.unique_dtypes(), vec![ColumnDtype::Int64, ColumnDtype::Object]);
        assert_eq!(frame.get(1, 1), Some(&HostValue::str("y")));
        assert_eq!(frame.iter_rows().next().unwrap(), vec![HostValue::from(1), "x".into()]);
    }

    #[test]
    fn test_ragged_columns() {
        let columns = vec![("a", vec![HostValue::from(1)]), ("b", Vec::new())];
        let err = DataFrame::from_columns(columns).unwrap_err();
        assert!(matches!(err, BridgeError::ArrayLayoutIncompatible { .. }));
        assert!(DataFrame::from_rows(["a"], vec![vec![]]).is_err());
    }
}
