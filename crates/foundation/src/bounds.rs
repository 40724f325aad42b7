use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    /// `(0, 0)`, used as the degraded result for an empty centroid.
    pub const ORIGIN: LatLng = LatLng {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        LatLng {
            latitude,
            longitude,
        }
    }
}

/// Rectangular geographic viewport, inclusive on every edge.
///
/// When `west_lng > east_lng` the box crosses the antimeridian and covers
/// `[west_lng, 180] ∪ [-180, east_lng]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_lat: f64,
    pub north_lat: f64,
    pub west_lng: f64,
    pub east_lng: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundsParseError(pub String);

impl std::fmt::Display for BoundsParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid bounds: {}", self.0)
    }
}

impl std::error::Error for BoundsParseError {}

impl GeoBounds {
    pub fn new(south_lat: f64, north_lat: f64, west_lng: f64, east_lng: f64) -> Self {
        GeoBounds {
            south_lat,
            north_lat,
            west_lng,
            east_lng,
        }
    }

    /// Smallest box covering every point, or `None` for an empty input.
    pub fn enclosing(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut b = GeoBounds::new(
            first.latitude,
            first.latitude,
            first.longitude,
            first.longitude,
        );
        for p in points {
            b.south_lat = b.south_lat.min(p.latitude);
            b.north_lat = b.north_lat.max(p.latitude);
            b.west_lng = b.west_lng.min(p.longitude);
            b.east_lng = b.east_lng.max(p.longitude);
        }
        Some(b)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west_lng > self.east_lng
    }

    pub fn contains(&self, p: LatLng) -> bool {
        if p.latitude < self.south_lat || p.latitude > self.north_lat {
            return false;
        }
        if self.crosses_antimeridian() {
            p.longitude >= self.west_lng || p.longitude <= self.east_lng
        } else {
            p.longitude >= self.west_lng && p.longitude <= self.east_lng
        }
    }

    /// Parses `south,north,west,east`.
    pub fn parse(raw: &str) -> Result<Self, BoundsParseError> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BoundsParseError(format!(
                "expected south,north,west,east but got {raw:?}"
            )));
        }
        let mut v = [0.0f64; 4];
        for (slot, part) in v.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|e| BoundsParseError(format!("{part:?}: {e}")))?;
        }
        let [south, north, west, east] = v;
        if south > north {
            return Err(BoundsParseError(format!(
                "south {south} is north of {north}"
            )));
        }
        Ok(GeoBounds::new(south, north, west, east))
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoBounds, LatLng};

    #[test]
    fn contains_is_inclusive() {
        let b = GeoBounds::new(10.0, 20.0, 30.0, 40.0);
        assert!(b.contains(LatLng::new(10.0, 30.0)));
        assert!(b.contains(LatLng::new(20.0, 40.0)));
        assert!(b.contains(LatLng::new(15.0, 35.0)));
        assert!(!b.contains(LatLng::new(9.999, 35.0)));
        assert!(!b.contains(LatLng::new(15.0, 40.001)));
    }

    #[test]
    fn antimeridian_box_wraps() {
        let b = GeoBounds::new(-10.0, 10.0, 170.0, -170.0);
        assert!(b.crosses_antimeridian());
        assert!(b.contains(LatLng::new(0.0, 175.0)));
        assert!(b.contains(LatLng::new(0.0, -175.0)));
        assert!(!b.contains(LatLng::new(0.0, 0.0)));
    }

    #[test]
    fn parse_roundtrips_order() {
        let b = GeoBounds::parse("1.5, 2.5,-3,4").unwrap();
        assert_eq!(b, GeoBounds::new(1.5, 2.5, -3.0, 4.0));
        assert!(GeoBounds::parse("1,2,3").is_err());
        assert!(GeoBounds::parse("5,2,3,4").is_err());
        assert!(GeoBounds::parse("a,2,3,4").is_err());
    }

    #[test]
    fn enclosing_covers_points() {
        assert!(GeoBounds::enclosing(Vec::new()).is_none());
        let b = GeoBounds::enclosing(vec![LatLng::new(1.0, 5.0), LatLng::new(-2.0, 7.0)]).unwrap();
        assert_eq!(b, GeoBounds::new(-2.0, 1.0, 5.0, 7.0));
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_string(&LatLng::new(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"latitude":1.0,"longitude":2.0}"#);
    }
}
