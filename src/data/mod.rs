//! Node values exchanged with the pipeline executor
//!
//! A node consumes and produces named values. Data values are either
//! tabular (Arrow [`RecordBatch`]) or JSON; trained models travel as
//! [`Predictable`] trait objects.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray, UInt32Array, UInt64Array,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use serde_json::{Map, Number, Value};

use crate::model::Predictable;
use crate::Result;

/// Named node inputs or outputs, iterated in name order.
pub type NodeData = BTreeMap<String, NodeValue>;

/// Materialized data value.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    /// Tabular value (one record per row)
    Table(RecordBatch),
    /// JSON value. A top-level array is a batch whose elements are records,
    /// so `[[1.0, 2.0], [3.0, 4.0]]` holds two records of two values each.
    /// Any other value is a single record.
    Json(Value),
}

impl Dataset {
    /// Number of records: rows of a table, elements of a JSON array, and 1
    /// for any other JSON value.
    #[must_use]
    pub fn num_records(&self) -> usize {
        match self {
            Self::Table(batch) => batch.num_rows(),
            Self::Json(Value::Array(items)) => items.len(),
            Self::Json(_) => 1,
        }
    }

    /// Check whether the value holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_records() == 0
    }

    /// Collapse a batch to its first record.
    ///
    /// Tables yield a one-row table with the same schema, JSON batches a
    /// one-record batch holding their first element. Other JSON values are
    /// already a single record and are returned as-is. Empty values yield
    /// `None`.
    #[must_use]
    pub fn first_element(&self) -> Option<Self> {
        match self {
            Self::Table(batch) if batch.num_rows() == 0 => None,
            Self::Table(batch) => Some(Self::Table(batch.slice(0, 1))),
            Self::Json(Value::Array(items)) => items
                .first()
                .map(|first| Self::Json(Value::Array(vec![first.clone()]))),
            Self::Json(value) => Some(Self::Json(value.clone())),
        }
    }

    /// Render as JSON. Tables become a list of row objects keyed by column.
    ///
    /// # Errors
    ///
    /// Returns error if a table cell cannot be formatted.
    pub fn to_json(&self) -> Result<Value> {
        match self {
            Self::Json(value) => Ok(value.clone()),
            Self::Table(batch) => {
                let schema = batch.schema();
                let mut rows = Vec::with_capacity(batch.num_rows());
                for row in 0..batch.num_rows() {
                    let mut record = Map::new();
                    for (field, column) in schema.fields().iter().zip(batch.columns()) {
                        record.insert(field.name().clone(), cell_to_json(column, row)?);
                    }
                    rows.push(Value::Object(record));
                }
                Ok(Value::Array(rows))
            }
        }
    }
}

fn cell_to_json(column: &ArrayRef, row: usize) -> Result<Value> {
    if column.is_null(row) {
        return Ok(Value::Null);
    }

    let any = column.as_any();
    let value = if let Some(array) = any.downcast_ref::<BooleanArray>() {
        Value::Bool(array.value(row))
    } else if let Some(array) = any.downcast_ref::<Int32Array>() {
        Value::from(array.value(row))
    } else if let Some(array) = any.downcast_ref::<Int64Array>() {
        Value::from(array.value(row))
    } else if let Some(array) = any.downcast_ref::<UInt32Array>() {
        Value::from(array.value(row))
    } else if let Some(array) = any.downcast_ref::<UInt64Array>() {
        Value::from(array.value(row))
    } else if let Some(array) = any.downcast_ref::<Float32Array>() {
        float_to_json(f64::from(array.value(row)))
    } else if let Some(array) = any.downcast_ref::<Float64Array>() {
        float_to_json(array.value(row))
    } else if let Some(array) = any.downcast_ref::<StringArray>() {
        Value::String(array.value(row).to_string())
    } else if let Some(array) = any.downcast_ref::<LargeStringArray>() {
        Value::String(array.value(row).to_string())
    } else {
        Value::String(array_value_to_string(column.as_ref(), row)?)
    };
    Ok(value)
}

// NaN and infinities have no JSON number form
fn float_to_json(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// A node input or output.
#[derive(Clone)]
pub enum NodeValue {
    /// Data value
    Data(Dataset),
    /// Trained model
    Model(Arc<dyn Predictable>),
}

impl NodeValue {
    /// Wrap a table.
    #[must_use]
    pub fn table(batch: RecordBatch) -> Self {
        Self::Data(Dataset::Table(batch))
    }

    /// Wrap a JSON value.
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self::Data(Dataset::Json(value))
    }

    /// Wrap a model.
    #[must_use]
    pub fn model(model: impl Predictable + 'static) -> Self {
        Self::Model(Arc::new(model))
    }

    /// Get the data value, if this is not a model.
    #[must_use]
    pub const fn as_data(&self) -> Option<&Dataset> {
        match self {
            Self::Data(data) => Some(data),
            Self::Model(_) => None,
        }
    }

    /// Get the model, if this is one.
    #[must_use]
    pub fn as_model(&self) -> Option<&dyn Predictable> {
        match self {
            Self::Model(model) => Some(model.as_ref()),
            Self::Data(_) => None,
        }
    }
}

impl fmt::Debug for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => f.debug_tuple("Data").field(data).finish(),
            Self::Model(model) => f.debug_tuple("Model").field(&model.flavor()).finish(),
        }
    }
}
