//! Tables
//!
//! Column-oriented tables in the style of `org.scijava.table`. A generic
//! table stores arbitrary references; the typed tables (`Float`, `Int`,
//! `Bool`) coerce on store and start zero-filled.

use smol_str::SmolStr;

use crate::class::{builtin, names};
use crate::error::{JvmError, JvmResult};
use crate::object::{JObject, ObjectData};
use crate::primitive::{Primitive, PrimitiveKind};

/// The concrete table classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// `DefaultGenericTable`: any reference per cell
    Generic,
    /// `DefaultFloatTable`
    Float,
    /// `DefaultIntTable`
    Int,
    /// `DefaultBoolTable`
    Bool,
}

impl TableKind {
    /// Fully qualified class name
    pub fn class_name(&self) -> &'static str {
        match self {
            TableKind::Generic => names::GENERIC_TABLE,
            TableKind::Float => names::FLOAT_TABLE,
            TableKind::Int => names::INT_TABLE,
            TableKind::Bool => names::BOOL_TABLE,
        }
    }

    fn cell_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TableKind::Generic => None,
            TableKind::Float => Some(PrimitiveKind::Float),
            TableKind::Int => Some(PrimitiveKind::Int),
            TableKind::Bool => Some(PrimitiveKind::Boolean),
        }
    }

    fn empty_cell(&self) -> JObject {
        match self.cell_kind() {
            Some(kind) => JObject::boxed(kind.zero()),
            None => JObject::null(),
        }
    }
}

/// Column store backing a table object.
#[derive(Debug, Clone)]
pub(crate) struct TableData {
    kind: TableKind,
    headers: Vec<Option<SmolStr>>,
    /// `columns[c][r]`
    columns: Vec<Vec<JObject>>,
    rows: usize,
}

impl JObject {
    /// `new Default*Table(columns, rows)`
    pub fn new_table(kind: TableKind, columns: usize, rows: usize) -> Self {
        let data = TableData {
            kind,
            headers: vec![None; columns],
            columns: (0..columns)
                .map(|_| (0..rows).map(|_| kind.empty_cell()).collect())
                .collect(),
            rows,
        };
        Self::from_parts(builtin(kind.class_name()), ObjectData::Table(data))
    }

    fn with_table<T>(&self, op: &str, f: impl FnOnce(&TableData) -> JvmResult<T>) -> JvmResult<T> {
        match &*self.data(op)? {
            ObjectData::Table(table) => f(table),
            _ => Err(self.unsupported(op)),
        }
    }

    fn with_table_mut<T>(
        &self,
        op: &str,
        f: impl FnOnce(&mut TableData) -> JvmResult<T>,
    ) -> JvmResult<T> {
        match &mut *self.data_mut(op)? {
            ObjectData::Table(table) => f(table),
            _ => Err(self.unsupported(op)),
        }
    }

    /// Which table class this is
    pub fn table_kind(&self) -> JvmResult<TableKind> {
        self.with_table("getClass", |t| Ok(t.kind))
    }

    /// `getColumnCount()`
    pub fn column_count(&self) -> JvmResult<usize> {
        self.with_table("getColumnCount", |t| Ok(t.columns.len()))
    }

    /// `getRowCount()`
    pub fn row_count(&self) -> JvmResult<usize> {
        self.with_table("getRowCount", |t| Ok(t.rows))
    }

    /// `getColumnHeader(col)`: `None` when unset
    pub fn column_header(&self, column: usize) -> JvmResult<Option<String>> {
        self.with_table("getColumnHeader", |t| {
            t.headers
                .get(column)
                .map(|h| h.as_ref().map(|s| s.to_string()))
                .ok_or_else(|| JvmError::index_out_of_bounds(column, t.headers.len()))
        })
    }

    /// `setColumnHeader(col, header)`
    pub fn set_column_header(&self, column: usize, header: &str) -> JvmResult<()> {
        self.with_table_mut("setColumnHeader", |t| {
            let len = t.headers.len();
            let slot = t
                .headers
                .get_mut(column)
                .ok_or_else(|| JvmError::index_out_of_bounds(column, len))?;
            *slot = Some(SmolStr::new(header));
            Ok(())
        })
    }

    /// `get(col, row)`
    pub fn table_get(&self, column: usize, row: usize) -> JvmResult<JObject> {
        self.with_table("get", |t| {
            let cells = t
                .columns
                .get(column)
                .ok_or_else(|| JvmError::index_out_of_bounds(column, t.columns.len()))?;
            cells
                .get(row)
                .cloned()
                .ok_or_else(|| JvmError::index_out_of_bounds(row, t.rows))
        })
    }

    /// `set(col, row, value)`.
    ///
    /// Typed tables coerce numeric values to their cell type and reject
    /// anything else.
    pub fn table_set(&self, column: usize, row: usize, value: JObject) -> JvmResult<()> {
        let kind = self.table_kind()?;
        let value = match kind.cell_kind() {
            None => value,
            Some(cell) => value
                .primitive_value()
                .ok()
                .filter(|p| matches!(p, Primitive::Boolean(_)) == (cell == PrimitiveKind::Boolean))
                .and_then(|p| p.cast(cell))
                .map(JObject::boxed)
                .ok_or_else(|| JvmError::array_store(cell.boxed_class_name(), value.class_name()))?,
        };
        self.with_table_mut("set", |t| {
            let columns = t.columns.len();
            let cells = t
                .columns
                .get_mut(column)
                .ok_or_else(|| JvmError::index_out_of_bounds(column, columns))?;
            let slot = cells
                .get_mut(row)
                .ok_or_else(|| JvmError::index_out_of_bounds(row, t.rows))?;
            *slot = value;
            Ok(())
        })
    }

    /// The columns, each as an `Object[]` of its cells
    pub fn columns_to_arrays(&self) -> JvmResult<Vec<JObject>> {
        let columns = self.with_table("toArray", |t| Ok(t.columns.clone()))?;
        let object = builtin(names::OBJECT);
        columns
            .into_iter()
            .map(|cells| JObject::object_array(&object, cells))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generic_table() {
        let table = JObject::new_table(TableKind::Generic, 2, 3);
        assert_eq!(table.class_name(), names::GENERIC_TABLE);
        assert!(table.is_instance_of(names::TABLE));
        assert!(!table.is_instance_of(names::LIST));
        assert_eq!(table.column_count().unwrap(), 2);
        assert_eq!(table.row_count().unwrap(), 3);
        assert!(table.table_get(0, 0).unwrap().is_null());

        table.set_column_header(1, "name").unwrap();
        assert_eq!(table.column_header(0).unwrap(), None);
        assert_eq!(table.column_header(1).unwrap(), Some("name".to_string()));

        table.table_set(1, 2, JObject::string("z")).unwrap();
        assert_eq!(table.table_get(1, 2).unwrap().to_java_string(), "z");
        assert!(table.table_get(2, 0).is_err());
    }

    #[test]
    fn test_typed_table_coerces() {
        let table = JObject::new_table(TableKind::Float, 1, 2);
        assert_eq!(table.table_get(0, 1).unwrap().class_name(), names::FLOAT);

        table.table_set(0, 0, JObject::double(1.5)).unwrap();
        let cell = table.table_get(0, 0).unwrap();
        assert_eq!(cell.class_name(), names::FLOAT);
        assert_eq!(cell.double_value().unwrap(), 1.5);

        assert!(table.table_set(0, 0, JObject::string("x")).is_err());
        assert!(table.table_set(0, 0, JObject::boolean(true)).is_err());

        let bools = JObject::new_table(TableKind::Bool, 1, 1);
        bools.table_set(0, 0, JObject::boolean(true)).unwrap();
        assert!(bools.table_set(0, 0, JObject::integer(1)).is_err());
    }

    #[test]
    fn test_columns_as_arrays() {
        let table = JObject::new_table(TableKind::Int, 2, 2);
        table.table_set(1, 0, JObject::integer(7)).unwrap();
        let columns = table.columns_to_arrays().unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].class_name(), "[Ljava.lang.Object;");
        assert_eq!(columns[1].array_length().unwrap(), 2);
        assert_eq!(columns[1].array_get(0).unwrap().long_value().unwrap(), 7);
    }
}
