//! Attribute tables: the per-row data attached to a layer

use std::io::Read;
use std::sync::Arc;
use arrow::array::{Array, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use csv::ReaderBuilder;
use indexmap::IndexMap;

use crate::config::MissingValues;
use crate::schema::infer_kind;
use crate::DataError;

/// Name of the synthetic row-index column every table starts with
pub const INDEX_COLUMN: &str = "index";

/// Element-type class of a column, resolved once when the table is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Numeric values; `NaN` marks an undefined entry
    Continuous,
    /// Opaque labels; `None` marks an undefined entry
    Categorical,
}

/// Homogeneous column storage
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Continuous(Vec<f64>),
    Categorical(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Continuous(values) => values.len(),
            ColumnValues::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column of an attribute table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// Numeric column
    pub fn continuous(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Continuous(values),
        }
    }

    /// Label column
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Categorical(
                values.into_iter().map(|v| v.map(Into::into)).collect(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Continuous(_) => ColumnKind::Continuous,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric values, if this is a continuous column
    pub fn as_continuous(&self) -> Option<&[f64]> {
        match &self.values {
            ColumnValues::Continuous(values) => Some(values),
            ColumnValues::Categorical(_) => None,
        }
    }

    /// Labels, if this is a categorical column
    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Categorical(values) => Some(values),
            ColumnValues::Continuous(_) => None,
        }
    }

    /// Whether any entry is undefined
    pub fn has_undefined(&self) -> bool {
        match &self.values {
            ColumnValues::Continuous(values) => values.iter().any(|v| v.is_nan()),
            ColumnValues::Categorical(values) => values.iter().any(Option::is_none),
        }
    }
}

/// Immutable, ordered set of equally long columns.
///
/// The first column is always the synthetic [`INDEX_COLUMN`] holding
/// `0..num_rows`. Tables are never edited in place; a layer whose data
/// changes gets a new table.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTable {
    columns: IndexMap<String, Arc<Column>>,
    num_rows: usize,
}

impl AttributeTable {
    /// Build a table from user columns, prepending the index column
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let num_rows = columns.first().map(Column::len).unwrap_or(0);
        let index = Column::continuous(
            INDEX_COLUMN,
            (0..num_rows).map(|i| i as f64).collect(),
        );

        let mut map = IndexMap::with_capacity(columns.len() + 1);
        map.insert(INDEX_COLUMN.to_string(), Arc::new(index));

        for column in columns {
            if column.name == INDEX_COLUMN {
                return Err(DataError::ReservedColumn(column.name));
            }
            let len = column.len();
            if len != num_rows {
                return Err(DataError::RaggedColumns {
                    name: column.name,
                    len,
                    expected: num_rows,
                });
            }
            if map.contains_key(&column.name) {
                return Err(DataError::DuplicateColumn(column.name));
            }
            map.insert(column.name.clone(), Arc::new(column));
        }

        Ok(Self { columns: map, num_rows })
    }

    /// Start building a table column by column
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Convert an arrow batch. Numeric fields become continuous columns
    /// (nulls read as `NaN`); every other field is cast to labels.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self, DataError> {
        let schema = batch.schema();
        let mut columns = Vec::with_capacity(batch.num_columns());

        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            let column = if field.data_type().is_numeric() {
                let floats = cast(array, &DataType::Float64)?;
                let floats = floats
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| DataError::Other(format!("Column '{}' did not cast to f64", field.name())))?;
                let values = (0..floats.len())
                    .map(|i| if floats.is_null(i) { f64::NAN } else { floats.value(i) })
                    .collect();
                Column::continuous(field.name().clone(), values)
            } else {
                let labels = cast(array, &DataType::Utf8)?;
                let labels = labels
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| DataError::Other(format!("Column '{}' did not cast to text", field.name())))?;
                let values: Vec<Option<String>> = (0..labels.len())
                    .map(|i| if labels.is_null(i) { None } else { Some(labels.value(i).to_string()) })
                    .collect();
                Column::categorical(field.name().clone(), values)
            };
            columns.push(column);
        }

        Self::new(columns)
    }

    /// Read a headed CSV document. Column kinds are inferred from the
    /// values; entries matching `missing` are undefined.
    pub fn from_csv_reader<R: Read>(reader: R, missing: &MissingValues) -> Result<Self, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (col_idx, value) in record.iter().enumerate() {
                let value = if missing.is_missing(value) {
                    None
                } else {
                    Some(value.trim().to_string())
                };
                raw[col_idx].push(value);
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, values)| match infer_kind(&values) {
                ColumnKind::Continuous => {
                    let numbers = values
                        .iter()
                        .map(|v| v.as_deref().and_then(|s| s.parse::<f64>().ok()).unwrap_or(f64::NAN))
                        .collect();
                    Column::continuous(name, numbers)
                }
                ColumnKind::Categorical => Column::categorical(name, values),
            })
            .collect();

        Self::new(columns)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns including the index column
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Arc<Column>> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Position of a column in table order (the index column is 0)
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns.get(name).map(|c| c.kind())
    }

    /// Column names in table order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Arc<Column>> {
        self.columns.values()
    }
}

/// Incremental constructor for [`AttributeTable`]
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
}

impl TableBuilder {
    pub fn continuous(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push(Column::continuous(name, values));
        self
    }

    /// Add a label column with every entry defined
    pub fn categorical<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.columns.push(Column::categorical(name, values.into_iter().map(Some)));
        self
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn build(self) -> Result<AttributeTable, DataError> {
        AttributeTable::new(self.columns)
    }
}
