//! Model signature inference from an input example and its prediction

use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::Dataset;
use crate::{Error, Result};

/// Column data type recorded in a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// Boolean
    Boolean,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// UTF-8 string
    String,
    /// Raw bytes
    Binary,
    /// Date or timestamp
    Datetime,
}

impl TryFrom<&DataType> for DType {
    type Error = Error;

    fn try_from(data_type: &DataType) -> Result<Self> {
        match data_type {
            DataType::Boolean => Ok(Self::Boolean),
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::UInt8
            | DataType::UInt16 => Ok(Self::Integer),
            DataType::Int64 | DataType::UInt32 | DataType::UInt64 => Ok(Self::Long),
            DataType::Float16 | DataType::Float32 => Ok(Self::Float),
            DataType::Float64 => Ok(Self::Double),
            DataType::Utf8 | DataType::LargeUtf8 => Ok(Self::String),
            DataType::Binary | DataType::LargeBinary => Ok(Self::Binary),
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => Ok(Self::Datetime),
            other => Err(Error::Signature(format!("unsupported column type {other}"))),
        }
    }
}

/// One column of a signature schema. Unnamed for positional values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name, if the value is keyed
    pub name: Option<String>,
    /// Column type
    pub dtype: DType,
}

/// Expected input and produced output schema of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSignature {
    /// Input schema
    pub inputs: Vec<ColumnSpec>,
    /// Output schema
    pub outputs: Vec<ColumnSpec>,
}

/// Infer a signature from an input example and the model's prediction on it.
///
/// Tables contribute one named column per field. A JSON batch (top-level
/// array) is described by its first record: an object contributes one named
/// column per key, an array one unnamed column per element, and a scalar a
/// single unnamed column.
///
/// # Errors
///
/// Returns [`Error::Signature`] if either value is an empty batch, holds
/// nulls or nested values, or has column types with no signature equivalent.
pub fn infer_signature(example: &Dataset, prediction: &Dataset) -> Result<ModelSignature> {
    Ok(ModelSignature {
        inputs: columns(example)?,
        outputs: columns(prediction)?,
    })
}

fn columns(data: &Dataset) -> Result<Vec<ColumnSpec>> {
    match data {
        Dataset::Table(batch) => batch
            .schema()
            .fields()
            .iter()
            .map(|field| column(Some(field.name()), DType::try_from(field.data_type())))
            .collect(),
        Dataset::Json(Value::Array(records)) => records
            .first()
            .ok_or_else(|| Error::Signature("empty batch has no columns".to_string()))
            .and_then(record_columns),
        Dataset::Json(record) => record_columns(record),
    }
}

fn record_columns(record: &Value) -> Result<Vec<ColumnSpec>> {
    match record {
        Value::Object(fields) => fields
            .iter()
            .map(|(name, value)| column(Some(name), json_dtype(value)))
            .collect(),
        Value::Array(values) => values
            .iter()
            .map(|value| column(None, json_dtype(value)))
            .collect(),
        value => Ok(vec![column(None, json_dtype(value))?]),
    }
}

fn column(name: Option<&String>, dtype: Result<DType>) -> Result<ColumnSpec> {
    Ok(ColumnSpec {
        name: name.cloned(),
        dtype: dtype?,
    })
}

fn json_dtype(value: &Value) -> Result<DType> {
    match value {
        Value::Bool(_) => Ok(DType::Boolean),
        Value::Number(n) if n.is_f64() => Ok(DType::Double),
        Value::Number(_) => Ok(DType::Long),
        Value::String(_) => Ok(DType::String),
        Value::Null => Err(Error::Signature("cannot infer a type from null".to_string())),
        Value::Array(_) | Value::Object(_) => Err(Error::Signature(
            "nested values have no column type".to_string(),
        )),
    }
}
