//! Geographic bounding box

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Axis-aligned box given by its south-west and north-east corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// South-west corner (min longitude, min latitude)
    pub south_west: Coordinate,
    /// North-east corner (max longitude, max latitude)
    pub north_east: Coordinate,
}

impl BoundingBox {
    /// Smallest box containing every coordinate, or `None` for an empty input
    #[must_use]
    pub fn enclosing<'a>(coordinates: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = coordinates.into_iter();
        let first = iter.next()?;
        let (mut min_lon, mut min_lat) = (first.longitude(), first.latitude());
        let (mut max_lon, mut max_lat) = (min_lon, min_lat);

        for c in iter {
            min_lon = min_lon.min(c.longitude());
            min_lat = min_lat.min(c.latitude());
            max_lon = max_lon.max(c.longitude());
            max_lat = max_lat.max(c.latitude());
        }

        Some(Self {
            south_west: Coordinate::new_unchecked(min_lon, min_lat),
            north_east: Coordinate::new_unchecked(max_lon, max_lat),
        })
    }

    /// Check whether a coordinate lies inside (borders included)
    #[must_use]
    pub fn contains(&self, c: &Coordinate) -> bool {
        (self.south_west.longitude()..=self.north_east.longitude()).contains(&c.longitude())
            && (self.south_west.latitude()..=self.north_east.latitude()).contains(&c.latitude())
    }

    /// Center of the box
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new_unchecked(
            f64::midpoint(self.south_west.longitude(), self.north_east.longitude()),
            f64::midpoint(self.south_west.latitude(), self.north_east.latitude()),
        )
    }

    /// Format as `min_lon,min_lat,max_lon,max_lat`, the provider query format
    #[must_use]
    pub fn to_query_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.south_west.longitude(),
            self.south_west.latitude(),
            self.north_east.longitude(),
            self.north_east.latitude()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat).unwrap()
    }

    #[test]
    fn empty_input_has_no_box() {
        assert!(BoundingBox::enclosing(&Vec::<Coordinate>::new()).is_none());
    }

    #[test]
    fn encloses_all_points() {
        let points = [c(11.50, 3.85), c(11.52, 3.87), c(11.49, 3.90)];
        let bbox = BoundingBox::enclosing(&points).unwrap();
        assert!(points.iter().all(|p| bbox.contains(p)));
        assert_eq!(bbox.to_query_string(), "11.49,3.85,11.52,3.9");
    }

    #[test]
    fn center_is_midpoint() {
        let bbox = BoundingBox::enclosing(&[c(10.0, 2.0), c(12.0, 4.0)]).unwrap();
        let center = bbox.center();
        assert!((center.longitude() - 11.0).abs() < f64::EPSILON);
        assert!((center.latitude() - 3.0).abs() < f64::EPSILON);
    }
}
