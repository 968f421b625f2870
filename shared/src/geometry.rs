//! Polygon geometry for drawn fields
//!
//! Rings are ordered (longitude, latitude) pairs. Area and centroid use the
//! planar shoelace formulas directly on degrees, which is adequate at field
//! scale. Bounding boxes and point containment go through `geo`.

use geo::{BoundingRect, Contains, LineString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BoundingBox, Coordinate};

/// Degenerate or unusable polygon input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("polygon has no vertices")]
    Empty,

    #[error("polygon needs at least 3 distinct vertices, found {0}")]
    TooFewVertices(usize),

    #[error("invalid coordinate ({longitude}, {latitude})")]
    InvalidCoordinate { longitude: f64, latitude: f64 },

    #[error("polygon has zero area")]
    ZeroArea,

    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}

/// A closed, immutable ring with at least three distinct vertices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct Polygon {
    ring: Vec<Coordinate>,
    shape: geo::Polygon<f64>,
}

impl Polygon {
    /// Build a polygon from a ring, closing it if the last vertex does not
    /// repeat the first one
    pub fn new(mut ring: Vec<Coordinate>) -> Result<Self, GeometryError> {
        if ring.is_empty() {
            return Err(GeometryError::Empty);
        }

        if let Some(bad) = ring.iter().find(|c| !c.is_valid()) {
            return Err(GeometryError::InvalidCoordinate {
                longitude: bad.longitude,
                latitude: bad.latitude,
            });
        }

        let distinct = distinct_vertex_count(&ring);
        if distinct < 3 {
            return Err(GeometryError::TooFewVertices(distinct));
        }

        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }

        Ok(Self::from_closed_ring(ring))
    }

    fn from_closed_ring(ring: Vec<Coordinate>) -> Self {
        let exterior: LineString<f64> = ring
            .iter()
            .map(|c| (c.longitude, c.latitude))
            .collect::<Vec<_>>()
            .into();
        Self {
            shape: geo::Polygon::new(exterior, vec![]),
            ring,
        }
    }

    /// Build from raw `[lon, lat]` pairs, as found in GeoJSON rings
    pub fn from_lon_lat(points: &[[f64; 2]]) -> Result<Self, GeometryError> {
        Self::new(points.iter().map(|p| Coordinate::new(p[0], p[1])).collect())
    }

    /// The closed ring, first vertex repeated at the end
    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    /// Vertices without the closing duplicate
    pub fn vertices(&self) -> &[Coordinate] {
        &self.ring[..self.ring.len() - 1]
    }

    pub fn signed_area(&self) -> f64 {
        signed_area(&self.ring)
    }

    pub fn area(&self) -> f64 {
        area(&self.ring)
    }

    pub fn centroid(&self) -> Result<Coordinate, GeometryError> {
        centroid(&self.ring)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let first = self.ring[0];
        self.shape.bounding_rect().map(BoundingBox::from).unwrap_or_else(|| {
            BoundingBox::new(first.longitude, first.latitude, first.longitude, first.latitude)
        })
    }

    /// Arithmetic mean of the vertices. Only used to place map markers; it is
    /// not the area-weighted centroid.
    pub fn vertex_mean(&self) -> Coordinate {
        let vertices = self.vertices();
        let n = vertices.len() as f64;
        let (sum_lon, sum_lat) = vertices
            .iter()
            .fold((0.0, 0.0), |(lon, lat), c| (lon + c.longitude, lat + c.latitude));
        Coordinate::new(sum_lon / n, sum_lat / n)
    }

    /// Strictly inside the ring; points on an edge or vertex are outside
    pub fn contains(&self, point: Coordinate) -> bool {
        self.shape
            .contains(&geo::Point::new(point.longitude, point.latitude))
    }

    /// The same ring traversed in the opposite direction
    pub fn reversed(&self) -> Self {
        let mut ring = self.ring.clone();
        ring.reverse();
        Self::from_closed_ring(ring)
    }
}

impl TryFrom<Vec<Coordinate>> for Polygon {
    type Error = GeometryError;

    fn try_from(ring: Vec<Coordinate>) -> Result<Self, Self::Error> {
        Polygon::new(ring)
    }
}

impl From<Polygon> for Vec<Coordinate> {
    fn from(polygon: Polygon) -> Self {
        polygon.ring
    }
}

impl TryFrom<&geojson::Geometry> for Polygon {
    type Error = GeometryError;

    /// Uses the outer ring; holes are ignored
    fn try_from(geometry: &geojson::Geometry) -> Result<Self, Self::Error> {
        match &geometry.value {
            geojson::Value::Polygon(rings) => {
                let outer = rings.first().ok_or(GeometryError::Empty)?;
                let ring = outer
                    .iter()
                    .map(|position| match position.as_slice() {
                        [lon, lat, ..] => Ok(Coordinate::new(*lon, *lat)),
                        _ => Err(GeometryError::UnsupportedGeometry(
                            "position with fewer than two components".to_string(),
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Polygon::new(ring)
            }
            other => Err(GeometryError::UnsupportedGeometry(
                geometry_type_name(other).to_string(),
            )),
        }
    }
}

fn geometry_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

impl TryFrom<&geojson::Feature> for Polygon {
    type Error = GeometryError;

    fn try_from(feature: &geojson::Feature) -> Result<Self, Self::Error> {
        let geometry = feature.geometry.as_ref().ok_or_else(|| {
            GeometryError::UnsupportedGeometry("feature without geometry".to_string())
        })?;
        Polygon::try_from(geometry)
    }
}

impl From<&Polygon> for geojson::Geometry {
    fn from(polygon: &Polygon) -> Self {
        let ring = polygon
            .ring
            .iter()
            .map(|c| vec![c.longitude, c.latitude])
            .collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))
    }
}

fn distinct_vertex_count(ring: &[Coordinate]) -> usize {
    let mut seen: Vec<Coordinate> = Vec::with_capacity(ring.len());
    for c in ring {
        if !seen.contains(c) {
            seen.push(*c);
        }
    }
    seen.len()
}

/// Sum of `x_i*y_{i+1} - x_{i+1}*y_i` over every edge, wrapping around
fn cross_sum<F>(ring: &[Coordinate], mut weight: F) -> f64
where
    F: FnMut(Coordinate, Coordinate, f64),
{
    let n = ring.len();
    let mut total = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let cross = a.longitude * b.latitude - b.longitude * a.latitude;
        weight(a, b, cross);
        total += cross;
    }
    total
}

/// Signed shoelace area; positive for counter-clockwise rings
pub fn signed_area(ring: &[Coordinate]) -> f64 {
    0.5 * cross_sum(ring, |_, _, _| {})
}

/// Unsigned shoelace area. Zero for empty or degenerate rings.
pub fn area(ring: &[Coordinate]) -> f64 {
    signed_area(ring).abs()
}

/// Area-weighted centroid of a ring
pub fn centroid(ring: &[Coordinate]) -> Result<Coordinate, GeometryError> {
    if ring.is_empty() {
        return Err(GeometryError::Empty);
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let total = cross_sum(ring, |a, b, cross| {
        sum_x += (a.longitude + b.longitude) * cross;
        sum_y += (a.latitude + b.latitude) * cross;
    });

    let signed = 0.5 * total;
    if signed == 0.0 {
        return Err(GeometryError::ZeroArea);
    }

    Ok(Coordinate::new(sum_x / (6.0 * signed), sum_y / (6.0 * signed)))
}
