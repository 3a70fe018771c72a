use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::{Coord, Point};
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::RouteError;
use crate::table::RouteTable;

/// One GPX track, one track segment per table row.
pub fn table_to_gpx(table: &RouteTable) -> Gpx {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("cycle_segments".into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some("cycle_segments".into()),
        ..Default::default()
    };

    for (line, elevations) in table.geometry().iter().zip(table.elevation_profiles()) {
        let mut segment = TrackSegment::new();
        for (coord, elevation) in line.coords().zip(elevations) {
            segment.points.push(to_waypoint(*coord, *elevation));
        }
        track.segments.push(segment);
    }
    gpx.tracks.push(track);
    gpx
}

pub fn write_table_as_gpx(table: &RouteTable) -> Result<Vec<u8>, RouteError> {
    let mut buffer = Vec::new();
    gpx::write(&table_to_gpx(table), &mut buffer)?;
    Ok(buffer)
}

pub fn encode_table_as_gpx(table: &RouteTable) -> Result<String, RouteError> {
    Ok(BASE64.encode(write_table_as_gpx(table)?))
}

fn to_waypoint(coord: Coord<f64>, elevation: f64) -> Waypoint {
    let mut waypoint = Waypoint::new(Point::from(coord));
    waypoint.elevation = Some(elevation);
    waypoint
}
