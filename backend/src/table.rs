//! The segment table: one row per route segment, ordered named columns, one
//! linestring per row in WGS84.

use std::fmt;

use geo_types::LineString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    columns::ColumnSets,
    error::SchemaError,
    metrics::DERIVED_COLUMNS,
    response::AttributeValue,
    segment::Segment,
};

pub const EPSG_WGS84: u32 = 4326;

/// Columns requested by the CycleStreets journey helper.
pub const JOURNEY_COLUMNS: [&str; 5] = ["name", "distances", "time", "busynance", "elevations"];

pub const JOURNEY_EXTRA_COLUMNS: [&str; 22] = [
    "crow_fly_distance",
    "event",
    "whence",
    "speed",
    "itinerary",
    "clientRouteId",
    "plan",
    "note",
    "length",
    "quietness",
    "west",
    "south",
    "east",
    "north",
    "leaving",
    "arriving",
    "grammesCO2saved",
    "calories",
    "edition",
    "gradient_segment",
    "elevation_change",
    "provisionName",
];

/// Column selection. With `cols: None` every column is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableOptions {
    /// Required columns, in output order.
    #[serde(default)]
    pub cols: Option<Vec<String>>,
    /// Optional columns appended after `cols` when present.
    #[serde(default)]
    pub cols_extra: Vec<String>,
}

impl TableOptions {
    pub fn journey_defaults() -> Self {
        Self {
            cols: Some(JOURNEY_COLUMNS.iter().map(|c| c.to_string()).collect()),
            cols_extra: JOURNEY_EXTRA_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// One value shared by every row.
    Broadcast(AttributeValue),
    PerSegment(Vec<AttributeValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn get(&self, row: usize) -> Option<&AttributeValue> {
        match &self.data {
            ColumnData::Broadcast(value) => Some(value),
            ColumnData::PerSegment(values) => values.get(row),
        }
    }
}

/// Recoverable conditions noticed while building the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    DegenerateSegment { row: usize },
    AnomalyCorrected { rows: Vec<usize>, fallback: f64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateSegment { row } => {
                write!(f, "segment row {row} has zero distance; gradient_segment is NaN")
            }
            Diagnostic::AnomalyCorrected { rows, fallback } => write!(
                f,
                "smoothed gradient undefined for rows {rows:?}; replaced with mean {fallback}"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    columns: Vec<Column>,
    geometry: Vec<LineString<f64>>,
    elevation_profiles: Vec<Vec<f64>>,
    epsg: u32,
    diagnostics: Vec<Diagnostic>,
}

impl RouteTable {
    /// Merges constant, variable and derived columns, applies the column
    /// selection and attaches one geometry per segment.
    pub fn assemble(
        sets: ColumnSets,
        segments: &[Segment],
        options: &TableOptions,
    ) -> Result<Self, SchemaError> {
        let mut merged: Vec<Column> = sets
            .constant
            .into_iter()
            .map(|(name, value)| Column {
                name,
                data: ColumnData::Broadcast(value),
            })
            .chain(sets.variable.into_iter().map(|(name, values)| Column {
                name,
                data: ColumnData::PerSegment(values),
            }))
            .collect();

        for (i, name) in DERIVED_COLUMNS.iter().enumerate() {
            let values = segments
                .iter()
                .map(|s| AttributeValue::Number(s.metrics.values()[i]))
                .collect();
            let column = Column {
                name: name.to_string(),
                data: ColumnData::PerSegment(values),
            };
            match merged.iter_mut().find(|c| c.name == *name) {
                Some(existing) => *existing = column,
                None => merged.push(column),
            }
        }

        let columns = match &options.cols {
            None => merged,
            Some(primary) => select_columns(merged, primary, &options.cols_extra)?,
        };

        let diagnostics = segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.metrics.is_degenerate())
            .map(|(row, _)| Diagnostic::DegenerateSegment { row })
            .collect();

        Ok(Self {
            columns,
            geometry: segments.iter().map(Segment::line_string).collect(),
            elevation_profiles: segments.iter().map(|s| s.decoded.elevations.clone()).collect(),
            epsg: EPSG_WGS84,
            diagnostics,
        })
    }

    pub fn row_count(&self) -> usize {
        self.geometry.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn value(&self, name: &str, row: usize) -> Option<&AttributeValue> {
        self.column(name)?.get(row)
    }

    /// Column values as numbers; text that does not parse becomes NaN.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let column = self.column(name)?;
        Some(
            (0..self.row_count())
                .map(|row| column.get(row).and_then(AttributeValue::as_f64).unwrap_or(f64::NAN))
                .collect(),
        )
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        self.columns.retain(|c| c.name != name);
        self.columns.push(Column {
            name,
            data: ColumnData::PerSegment(values.into_iter().map(AttributeValue::Number).collect()),
        });
    }

    pub fn geometry(&self) -> &[LineString<f64>] {
        &self.geometry
    }

    pub fn elevation_profiles(&self) -> &[Vec<f64>] {
        &self.elevation_profiles
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// GeoJSON FeatureCollection, one LineString feature per row.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .geometry
            .iter()
            .enumerate()
            .map(|(row, line)| {
                let properties: Map<String, Value> = self
                    .columns
                    .iter()
                    .map(|c| {
                        let value = c.get(row).map(AttributeValue::to_json).unwrap_or(Value::Null);
                        (c.name.clone(), value)
                    })
                    .collect();
                let coordinates: Vec<Value> = line.coords().map(|c| json!([c.x, c.y])).collect();
                json!({
                    "type": "Feature",
                    "properties": properties,
                    "geometry": {"type": "LineString", "coordinates": coordinates},
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "crs": {
                "type": "name",
                "properties": {"name": format!("urn:ogc:def:crs:EPSG::{}", self.epsg)},
            },
            "features": features,
        })
    }
}

fn select_columns(
    merged: Vec<Column>,
    primary: &[String],
    extra: &[String],
) -> Result<Vec<Column>, SchemaError> {
    if let Some(missing) = primary.iter().find(|name| !merged.iter().any(|c| &c.name == *name)) {
        return Err(SchemaError::MissingColumn(missing.clone()));
    }

    let mut selected: Vec<Column> = Vec::with_capacity(primary.len() + extra.len());
    for name in primary.iter().chain(extra) {
        if selected.iter().any(|c| &c.name == name) {
            continue;
        }
        if let Some(column) = merged.iter().find(|c| &c.name == name) {
            selected.push(column.clone());
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::RouteResponse;
    use crate::segment::decode_segments;
    use serde_json::json;

    fn build(options: &TableOptions) -> Result<RouteTable, SchemaError> {
        let response = RouteResponse::from_json(&json!({
            "marker": [
                {"@attributes": {"plan": "balanced", "length": "300"}},
                {"@attributes": {
                    "name": "Briggate", "time": "20", "busynance": "40",
                    "points": "-1.5430,53.7960 -1.5430,53.7970", "elevations": "40,42",
                    "distances": "111"
                }},
                {"@attributes": {
                    "name": "Vicar Lane", "time": "30", "busynance": "90",
                    "points": "-1.5430,53.7970 -1.5420,53.7980", "elevations": "42,47",
                    "distances": "60,70"
                }}
            ]
        }))
        .unwrap();
        let segments = decode_segments(&response).unwrap();
        RouteTable::assemble(ColumnSets::classify(&response), &segments, options)
    }

    #[test]
    fn test_keeps_all_columns_without_selection() {
        let table = build(&TableOptions::default()).unwrap();
        assert_eq!(table.row_count(), 2);
        let names = table.column_names();
        assert_eq!(&names[..2], &["plan", "length"]);
        for derived in DERIVED_COLUMNS {
            assert!(names.contains(&derived), "missing {derived}");
        }
    }

    #[test]
    fn test_derived_distances_replace_raw_in_place() {
        let table = build(&TableOptions::default()).unwrap();
        let names = table.column_names();
        let pos = names.iter().position(|n| *n == "distances").unwrap();
        assert!(pos < names.iter().position(|n| *n == "elevation_start").unwrap());
        assert_eq!(table.numeric_column("distances").unwrap(), vec![111.0, 130.0]);
    }

    #[test]
    fn test_selection_orders_primary_then_extra() {
        let options = TableOptions {
            cols: Some(vec!["busynance".into(), "name".into()]),
            cols_extra: vec!["nonexistent".into(), "plan".into(), "name".into()],
        };
        let table = build(&options).unwrap();
        assert_eq!(table.column_names(), vec!["busynance", "name", "plan"]);
    }

    #[test]
    fn test_unknown_primary_column_is_schema_error() {
        let options = TableOptions {
            cols: Some(vec!["nmae".into()]),
            cols_extra: vec![],
        };
        let err = build(&options).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("nmae".into()));
    }

    #[test]
    fn test_broadcast_column_reads_every_row() {
        let table = build(&TableOptions::default()).unwrap();
        assert_eq!(table.value("length", 1), Some(&AttributeValue::Number(300.0)));
        assert_eq!(table.value("length", 0), table.value("length", 1));
    }

    #[test]
    fn test_geojson_has_crs_and_features() {
        let table = build(&TableOptions::default()).unwrap();
        let geojson = table.to_geojson();
        assert_eq!(geojson["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::4326");
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(features[1]["properties"]["name"], "Vicar Lane");
        assert_eq!(features[0]["geometry"]["coordinates"][0][0], -1.543);
    }

    #[test]
    fn test_push_column_replaces_existing() {
        let mut table = build(&TableOptions::default()).unwrap();
        let before = table.columns().len();
        table.push_column("gradient_smooth", vec![0.1, 0.2]);
        table.push_column("gradient_smooth", vec![0.3, 0.4]);
        assert_eq!(table.columns().len(), before + 1);
        assert_eq!(table.numeric_column("gradient_smooth").unwrap(), vec![0.3, 0.4]);
    }

    #[test]
    fn test_journey_defaults() {
        let options = TableOptions::journey_defaults();
        assert_eq!(options.cols.as_ref().unwrap()[0], "name");
        assert!(options.cols_extra.contains(&"gradient_segment".to_string()));
    }
}
