//! The column-oriented `Datatable` shape understood by the document renderer.

use serde::Serialize;
use serde_json::Value;

/// A table of named columns, serialised as `{"type": "Datatable", "columns": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Datatable")]
pub struct Datatable {
    pub columns: Vec<DatatableColumn>,
}

/// One column, serialised as `{"type": "DatatableColumn", "name": ..., "values": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "DatatableColumn")]
pub struct DatatableColumn {
    pub name: String,
    pub values: Vec<Value>,
}

impl DatatableColumn {
    pub fn new<V: Into<Value>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Datatable {
    pub fn new(columns: Vec<DatatableColumn>) -> Self {
        Self { columns }
    }

    /// A two-column `Field`/`Value` table.
    pub fn field_value(rows: Vec<(String, String)>) -> Self {
        let (fields, values): (Vec<String>, Vec<String>) = rows.into_iter().unzip();
        Self::new(vec![
            DatatableColumn::new("Field", fields),
            DatatableColumn::new("Value", values),
        ])
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&DatatableColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Number of rows (length of the first column).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |column| column.values.len())
    }
}
