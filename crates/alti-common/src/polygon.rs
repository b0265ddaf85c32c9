//! Polygon-like selection areas.
//!
//! A [`PolygonLike`] is the spatial filter of a query. Containment is inclusive
//! of the boundary and is evaluated with the `geo` algorithms. A point matches
//! when any of its longitudes modulo 360 falls in the polygon, so 0..360
//! products can be filtered with -180..180 polygons, and polygons may extend
//! past the antimeridian on either side.

use geo::{Coord, Intersects, LineString, MultiPolygon, Polygon, Rect};

use crate::error::{AltiError, AltiResult};

/// A spatial selection: a polygon, a multi-polygon or a lon/lat box.
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonLike {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    BoundingBox {
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
    },
}

impl PolygonLike {
    /// Create a lon/lat box selection.
    pub fn bbox(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> AltiResult<Self> {
        if !(lon_min <= lon_max && lat_min <= lat_max) {
            return Err(AltiError::InvalidPolygon(format!(
                "invalid box lon=[{}, {}] lat=[{}, {}]",
                lon_min, lon_max, lat_min, lat_max
            )));
        }
        Ok(PolygonLike::BoundingBox {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }

    /// Parse a WKT `POLYGON` or `MULTIPOLYGON` string.
    ///
    /// Accepts formats:
    /// - `POLYGON((lon1 lat1, lon2 lat2, lon3 lat3, lon1 lat1))`
    /// - `MULTIPOLYGON(((ring1)),((ring2)))`
    ///
    /// Only exterior rings are read.
    pub fn from_wkt(wkt: &str) -> AltiResult<Self> {
        let wkt = wkt.trim();
        let upper = wkt.to_uppercase();

        if upper.starts_with("MULTIPOLYGON") {
            let polygons = parse_multipolygon_body(wkt)?
                .into_iter()
                .map(|ring| Polygon::new(ring, vec![]))
                .collect::<Vec<_>>();
            return Ok(PolygonLike::MultiPolygon(MultiPolygon::new(polygons)));
        }

        if upper.starts_with("POLYGON") {
            let start = wkt
                .find("((")
                .ok_or_else(|| AltiError::InvalidPolygon("Missing opening parentheses".to_string()))?;
            let end = wkt
                .rfind("))")
                .ok_or_else(|| AltiError::InvalidPolygon("Missing closing parentheses".to_string()))?;
            if end <= start {
                return Err(AltiError::InvalidPolygon("Invalid parenthesis order".to_string()));
            }
            // Holes are separated by "),(": keep the exterior ring only
            let body = &wkt[start + 2..end];
            let exterior = body.split("),").next().unwrap_or(body);
            let ring = parse_ring(exterior)?;
            return Ok(PolygonLike::Polygon(Polygon::new(ring, vec![])));
        }

        Err(AltiError::InvalidPolygon(
            "Expected POLYGON or MULTIPOLYGON format".to_string(),
        ))
    }

    /// The selection as a multi-polygon.
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            PolygonLike::Polygon(polygon) => MultiPolygon::new(vec![polygon.clone()]),
            PolygonLike::MultiPolygon(multi) => multi.clone(),
            PolygonLike::BoundingBox {
                lon_min,
                lon_max,
                lat_min,
                lat_max,
            } => {
                let rect = Rect::new(
                    Coord { x: *lon_min, y: *lat_min },
                    Coord { x: *lon_max, y: *lat_max },
                );
                MultiPolygon::new(vec![rect.to_polygon()])
            }
        }
    }

    /// Check if a single point lies in the selection (boundary included).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        point_in(&self.to_multi_polygon(), lon, lat)
    }

    /// Containment mask for parallel longitude/latitude sequences.
    ///
    /// Points with a non-finite coordinate are never selected.
    pub fn mask<'a>(
        &self,
        lons: impl IntoIterator<Item = &'a f64>,
        lats: impl IntoIterator<Item = &'a f64>,
    ) -> Vec<bool> {
        let multi = self.to_multi_polygon();
        lons.into_iter()
            .zip(lats)
            .map(|(lon, lat)| point_in(&multi, *lon, *lat))
            .collect()
    }
}

impl From<Polygon<f64>> for PolygonLike {
    fn from(polygon: Polygon<f64>) -> Self {
        PolygonLike::Polygon(polygon)
    }
}

impl From<MultiPolygon<f64>> for PolygonLike {
    fn from(multi: MultiPolygon<f64>) -> Self {
        PolygonLike::MultiPolygon(multi)
    }
}

impl From<Rect<f64>> for PolygonLike {
    fn from(rect: Rect<f64>) -> Self {
        PolygonLike::BoundingBox {
            lon_min: rect.min().x,
            lon_max: rect.max().x,
            lat_min: rect.min().y,
            lat_max: rect.max().y,
        }
    }
}

/// Wrap a longitude into `[frame, frame + 360)`.
pub fn wrap_longitude(lon: f64, frame: f64) -> f64 {
    frame + (lon - frame).rem_euclid(360.0)
}

fn point_in(multi: &MultiPolygon<f64>, lon: f64, lat: f64) -> bool {
    if !lon.is_finite() || !lat.is_finite() {
        return false;
    }
    // Vertices may lie anywhere in [-540, 540]
    let base = wrap_longitude(lon, -180.0);
    [base - 360.0, base, base + 360.0].iter().any(|&x| {
        let point = Coord { x, y: lat };
        multi.0.iter().any(|polygon| polygon.intersects(&point))
    })
}

fn parse_ring(coords: &str) -> AltiResult<LineString<f64>> {
    let points = coords
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|pair| {
            let pair = pair.trim();
            let parts: Vec<&str> = pair.split_whitespace().collect();
            if parts.len() != 2 {
                return Err(AltiError::InvalidPolygon(format!(
                    "Expected 'lon lat' format, got '{}'",
                    pair
                )));
            }
            let x: f64 = parts[0]
                .parse()
                .map_err(|_| AltiError::InvalidPolygon(format!("invalid longitude '{}'", parts[0])))?;
            let y: f64 = parts[1]
                .parse()
                .map_err(|_| AltiError::InvalidPolygon(format!("invalid latitude '{}'", parts[1])))?;
            if !x.is_finite() || !y.is_finite() {
                return Err(AltiError::InvalidPolygon(format!("non-finite vertex '{}'", pair)));
            }
            Ok(Coord { x, y })
        })
        .collect::<AltiResult<Vec<_>>>()?;

    if points.len() < 3 {
        return Err(AltiError::InvalidPolygon(
            "Polygon ring must have at least 3 vertices".to_string(),
        ));
    }

    // Polygon::new closes open rings
    Ok(LineString::new(points))
}

fn parse_multipolygon_body(wkt: &str) -> AltiResult<Vec<LineString<f64>>> {
    let start = wkt
        .find('(')
        .ok_or_else(|| AltiError::InvalidPolygon("Missing opening parenthesis".to_string()))?;
    let end = wkt
        .rfind(')')
        .ok_or_else(|| AltiError::InvalidPolygon("Missing closing parenthesis".to_string()))?;
    if end <= start {
        return Err(AltiError::InvalidPolygon("Invalid parenthesis order".to_string()));
    }

    let inner = &wkt[start + 1..end];
    let mut rings = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut first_ring_of_polygon = true;

    for ch in inner.chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth == 1 {
                    first_ring_of_polygon = true;
                }
            }
            ')' => {
                if depth == 2 {
                    if first_ring_of_polygon && !current.trim().is_empty() {
                        rings.push(parse_ring(&current)?);
                    }
                    first_ring_of_polygon = false;
                    current.clear();
                }
                depth = depth.saturating_sub(1);
            }
            _ if depth == 2 => current.push(ch),
            _ => {}
        }
    }

    if rings.is_empty() {
        return Err(AltiError::InvalidPolygon(
            "MULTIPOLYGON must contain at least one polygon".to_string(),
        ));
    }

    Ok(rings)
}
