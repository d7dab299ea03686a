//! Geographic extents.

use serde::{Deserialize, Serialize};

/// An axis-aligned geographic extent `[min_x, max_x] x [min_y, max_y]`.
///
/// Coordinates are in the units of the data's CRS (degrees or meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse `"minx,miny,maxx,maxy"`. Whitespace around each number is allowed.
    pub fn from_extent_string(s: &str) -> Result<Self, BboxParseError> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        let [min_x, min_y, max_x, max_y] = fields.as_slice() else {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        };

        let number = |field: &str| -> Result<f64, BboxParseError> {
            match field.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(BboxParseError::InvalidNumber(field.to_string())),
            }
        };

        Ok(BoundingBox::new(
            number(min_x)?,
            number(min_y)?,
            number(max_x)?,
            number(max_y)?,
        ))
    }

    /// Smallest box containing every point. Non-finite points are ignored.
    ///
    /// Returns `None` when no finite point is supplied.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(None, |acc: Option<BoundingBox>, (x, y)| match acc {
                None => Some(BoundingBox::new(x, y, x, y)),
                Some(b) => Some(BoundingBox::new(
                    b.min_x.min(x),
                    b.min_y.min(y),
                    b.max_x.max(x),
                    b.max_y.max(y),
                )),
            })
    }

    /// Extent along x.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along y.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Snap the box outward onto multiples of `step`.
    ///
    /// Minimum edges are floored and maximum edges ceiled, so the result
    /// always contains `self`.
    pub fn snap_outward(&self, step: f64) -> BoundingBox {
        let down = |v: f64| (v / step).floor() * step;
        let up = |v: f64| (v / step).ceil() * step;
        BoundingBox::new(down(self.min_x), down(self.min_y), up(self.max_x), up(self.max_y))
    }

    /// Edges are inclusive.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.contains_point(other.min_x, other.min_y) && self.contains_point(other.max_x, other.max_y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid extent format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in extent: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_spaces() {
        let bbox = BoundingBox::from_extent_string(" -10.5, 35.0 ,40,71.25").unwrap();
        assert_eq!(bbox, BoundingBox::new(-10.5, 35.0, 40.0, 71.25));
    }

    #[test]
    fn test_parse_rejects_nan() {
        assert!(BoundingBox::from_extent_string("NaN,0,1,1").is_err());
        assert!(BoundingBox::from_extent_string("0,0,1").is_err());
        assert!(BoundingBox::from_extent_string("0,0,1,1,1").is_err());
    }

    #[test]
    fn test_from_points() {
        let bbox = BoundingBox::from_points(vec![(0.0, 10.0), (10.0, 0.0), (f64::NAN, 99.0)])
            .unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 10.0, 10.0));

        assert!(BoundingBox::from_points(Vec::<(f64, f64)>::new()).is_none());
    }

    #[test]
    fn test_snap_outward() {
        let bbox = BoundingBox::new(3.0, -7.5, 27.0, 12.0).snap_outward(10.0);
        assert_eq!(bbox, BoundingBox::new(0.0, -10.0, 30.0, 20.0));
    }

    #[test]
    fn test_containment_is_edge_inclusive() {
        let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains_point(10.0, 0.0));
        assert!(!outer.contains_point(10.0001, 5.0));
        assert!(outer.contains(&outer));
        assert!(outer.contains(&BoundingBox::new(2.0, 2.0, 8.0, 8.0)));
        assert!(!outer.contains(&BoundingBox::new(5.0, 5.0, 15.0, 15.0)));
    }
}
