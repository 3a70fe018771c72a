//! Typed view over a decoded CycleStreets journey payload.
//!
//! The payload carries one record per marker. Record 0 summarises the whole
//! journey, records 1..=N are the route segments. Each record is a flat map of
//! attribute name to value; an absent key or JSON `null` is treated as NA.

use std::{collections::HashMap, fs::File, io::Read, path::Path};

use serde_json::{Map, Value};

use crate::error::{PipelineError, RouteError, SchemaError};

pub const POINTS: &str = "points";
pub const ELEVATIONS: &str = "elevations";
pub const DISTANCES: &str = "distances";

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Converts a JSON value, returning `None` for `null`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(AttributeValue::Text(b.to_string())),
            Value::Number(n) => n.as_f64().map(AttributeValue::Number),
            Value::String(s) => Some(AttributeValue::Text(s.clone())),
            Value::Array(items) => Some(AttributeValue::List(
                items.iter().filter_map(AttributeValue::from_json).collect(),
            )),
            Value::Object(_) => Some(AttributeValue::Text(value.to_string())),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AttributeValue::Text(s) => Value::String(s.clone()),
            AttributeValue::List(items) => {
                Value::Array(items.iter().map(AttributeValue::to_json).collect())
            }
        }
    }

    /// Numeric coercion: text that parses as a number becomes a number,
    /// anything else is returned unchanged.
    pub fn coerce_numeric(self) -> Self {
        match self {
            AttributeValue::Text(ref s) => match s.trim().parse::<f64>() {
                Ok(n) => AttributeValue::Number(n),
                Err(_) => self,
            },
            other => other,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::List(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// All values of one attribute, indexed by marker (0 = journey summary).
#[derive(Debug, Clone)]
pub struct AttributeSeries {
    pub name: String,
    pub values: Vec<Option<AttributeValue>>,
}

impl AttributeSeries {
    pub fn summary(&self) -> Option<&AttributeValue> {
        self.values.first().and_then(Option::as_ref)
    }

    /// Values for segments 1..=N.
    pub fn segment_values(&self) -> &[Option<AttributeValue>] {
        self.values.get(1..).unwrap_or(&[])
    }

    pub fn missing_segments(&self) -> usize {
        self.segment_values().iter().filter(|v| v.is_none()).count()
    }
}

#[derive(Debug, Clone)]
pub struct RouteResponse {
    attributes: Vec<AttributeSeries>,
    index: HashMap<String, usize>,
    segment_count: usize,
}

impl RouteResponse {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, RouteError> {
        let json: Value = serde_json::from_reader(reader)?;
        Ok(Self::from_json(&json).map_err(PipelineError::from)?)
    }

    pub fn from_json(json: &Value) -> Result<Self, SchemaError> {
        let records = marker_records(json)?;
        if records.len() < 2 {
            return Err(SchemaError::NoSegments);
        }

        let mut attributes: Vec<AttributeSeries> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (marker, record) in records.iter().enumerate() {
            for (name, value) in record.iter() {
                let Some(value) = AttributeValue::from_json(value) else {
                    continue;
                };
                let slot = *index.entry(name.clone()).or_insert_with(|| {
                    attributes.push(AttributeSeries {
                        name: name.clone(),
                        values: vec![None; records.len()],
                    });
                    attributes.len() - 1
                });
                attributes[slot].values[marker] = Some(value);
            }
        }

        Ok(Self {
            attributes,
            index,
            segment_count: records.len() - 1,
        })
    }

    /// Number of route segments, excluding the journey summary.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn attributes(&self) -> &[AttributeSeries] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSeries> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    /// Value of `name` for segment `segment` (1-based marker index).
    pub fn value(&self, name: &str, segment: usize) -> Option<&AttributeValue> {
        self.attribute(name)?.values.get(segment)?.as_ref()
    }

    pub fn require(&self, name: &str) -> Result<&AttributeSeries, SchemaError> {
        self.attribute(name)
            .ok_or_else(|| SchemaError::MissingAttribute(name.to_string()))
    }
}

fn marker_records(json: &Value) -> Result<Vec<&Map<String, Value>>, SchemaError> {
    let collection = json
        .get("marker")
        .or_else(|| json.get("segments"))
        .ok_or(SchemaError::MissingSegments)?;

    let items: Vec<&Value> = match collection {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![collection],
        _ => return Err(SchemaError::MissingSegments),
    };

    items
        .into_iter()
        .map(|item| {
            let record = item.get("@attributes").unwrap_or(item);
            record.as_object().ok_or(SchemaError::MissingSegments)
        })
        .collect()
}
