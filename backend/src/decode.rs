use geo_types::Coord;

use crate::error::DecodeError;

fn is_vertex_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

fn is_comma(c: char) -> bool {
    c == ','
}

/// Parses the numbers of one encoded series, splitting on `is_separator`.
/// Enclosing brackets and whitespace around tokens are ignored.
fn parse_numbers(
    encoded: &str,
    segment: usize,
    attribute: &'static str,
    is_separator: fn(char) -> bool,
) -> Result<Vec<f64>, DecodeError> {
    let trimmed = encoded.trim().trim_start_matches('[').trim_end_matches(']');
    let values = trimmed
        .split(is_separator)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f64>().map_err(|_| DecodeError::InvalidNumber {
                segment,
                attribute,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err(DecodeError::Empty { segment, attribute });
    }
    Ok(values)
}

/// Decodes `"lon,lat lon,lat ..."` into vertices, longitude first.
pub fn decode_coordinates(encoded: &str, segment: usize) -> Result<Vec<Coord<f64>>, DecodeError> {
    let numbers = parse_numbers(encoded, segment, "points", is_vertex_separator)?;
    if numbers.len() % 2 != 0 {
        return Err(DecodeError::OddCoordinateCount {
            segment,
            count: numbers.len(),
        });
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Coord {
            x: pair[0],
            y: pair[1],
        })
        .collect())
}

/// Decodes `"e1,e2,..."`. Samples are separated by commas only.
pub fn decode_elevations(encoded: &str, segment: usize) -> Result<Vec<f64>, DecodeError> {
    parse_numbers(encoded, segment, "elevations", is_comma)
}

/// Sum of the comma-separated per-sub-segment distances reported by the API.
/// Every part must be finite and non-negative.
pub fn decode_distance_total(encoded: &str, segment: usize) -> Result<f64, DecodeError> {
    let parts = parse_numbers(encoded, segment, "distances", is_comma)?;
    if let Some(&value) = parts.iter().find(|d| !d.is_finite() || **d < 0.0) {
        return Err(DecodeError::InvalidDistance { segment, value });
    }
    Ok(parts.iter().sum())
}

/// Decoded geometry of one segment. Coordinates and elevations always have
/// the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSegment {
    pub coordinates: Vec<Coord<f64>>,
    pub elevations: Vec<f64>,
}

impl DecodedSegment {
    pub fn decode(points: &str, elevations: &str, segment: usize) -> Result<Self, DecodeError> {
        let coordinates = decode_coordinates(points, segment)?;
        let elevations = decode_elevations(elevations, segment)?;
        if coordinates.len() != elevations.len() {
            return Err(DecodeError::LengthMismatch {
                segment,
                coordinates: coordinates.len(),
                elevations: elevations.len(),
            });
        }
        Ok(Self {
            coordinates,
            elevations,
        })
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_space_separated_vertices() {
        let coords = decode_coordinates("-1.55,53.80 -1.551,53.801", 1).unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0], Coord { x: -1.55, y: 53.80 });
        assert_eq!(coords[1], Coord { x: -1.551, y: 53.801 });
    }

    #[test]
    fn test_strips_brackets() {
        let coords = decode_coordinates("[-1.55,53.80 -1.551,53.801]", 1).unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[1].x, -1.551);
    }

    #[test]
    fn test_accepts_comma_only_separators() {
        let coords = decode_coordinates("0.1,51.0,0.2,51.1", 1).unwrap();
        assert_eq!(coords, vec![Coord { x: 0.1, y: 51.0 }, Coord { x: 0.2, y: 51.1 }]);
    }

    #[test]
    fn test_odd_count_is_rejected() {
        let err = decode_coordinates("-1.55,53.80 -1.551", 3).unwrap_err();
        assert_eq!(err, DecodeError::OddCoordinateCount { segment: 3, count: 3 });
    }

    #[test]
    fn test_bad_token_is_reported() {
        let err = decode_elevations("100,abc", 2).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidNumber { segment: 2, attribute: "elevations", ref token } if token == "abc"
        ));
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let err = decode_elevations("  ", 1).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Empty {
                segment: 1,
                attribute: "elevations"
            }
        );
    }

    #[test]
    fn test_distance_total_sums_parts() {
        assert_eq!(decode_distance_total("10,20,12", 1).unwrap(), 42.0);
    }

    #[test]
    fn test_space_separated_elevations_are_rejected() {
        let err = decode_elevations("100 102", 1).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidNumber { attribute: "elevations", ref token, .. } if token == "100 102"
        ));
    }

    #[test]
    fn test_elevation_tokens_tolerate_padding() {
        assert_eq!(decode_elevations(" 100, 102 ", 1).unwrap(), vec![100.0, 102.0]);
    }

    #[test]
    fn test_negative_distance_part_is_rejected() {
        let err = decode_distance_total("40,-60", 5).unwrap_err();
        assert_eq!(err, DecodeError::InvalidDistance { segment: 5, value: -60.0 });
    }

    #[test]
    fn test_zero_distance_total_is_allowed() {
        assert_eq!(decode_distance_total("0", 1).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = DecodedSegment::decode("0,0 0,1 0,2", "1,2", 4).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch {
                segment: 4,
                coordinates: 3,
                elevations: 2
            }
        );
    }

    #[test]
    fn test_decoded_lengths_match() {
        let seg = DecodedSegment::decode("[0,0 0,1 0,2]", "1,2,3", 1).unwrap();
        assert_eq!(seg.coordinates.len(), seg.elevations.len());
        assert_eq!(seg.len(), 3);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_encoded_vertices_decode_to_same_count(
                vertices in prop::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 1..20)
            ) {
                let points = vertices
                    .iter()
                    .map(|(lon, lat)| format!("{lon},{lat}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                let elevations = vertices
                    .iter()
                    .enumerate()
                    .map(|(i, _)| i.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                let seg = DecodedSegment::decode(&points, &elevations, 1).unwrap();
                prop_assert_eq!(seg.coordinates.len(), vertices.len());
                prop_assert_eq!(seg.elevations.len(), vertices.len());
            }
        }
    }
}
