//! Input and smoothed cell records.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Property name under which smoothed values are exposed by default.
pub const DEFAULT_SMOOTHED_PROPERTY: &str = "ksmval";

/// A square cell of the source grid, addressed by its lower-left corner.
pub trait GridCell {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

/// Source grid cell with arbitrary named scalar properties.
///
/// Deserializes from a flat JSON object: `{"x": 0, "y": 10, "population": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl Cell {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Look up a named property.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

impl GridCell for Cell {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl<T: GridCell + ?Sized> GridCell for &T {
    fn x(&self) -> f64 {
        (**self).x()
    }

    fn y(&self) -> f64 {
        (**self).y()
    }
}

impl GridCell for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }

    fn y(&self) -> f64 {
        self.1
    }
}

/// One cell of the smoothed grid: lower-left corner plus estimated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedCell {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// The materialized smoothed grid handed to delegate styles.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedLayer {
    /// Name the smoothed value is exposed under
    pub property: String,
    /// Side length of every smoothed cell, in geographic units
    pub cell_size: f64,
    pub cells: Vec<SmoothedCell>,
}

impl SmoothedLayer {
    pub fn new(property: impl Into<String>, cell_size: f64, cells: Vec<SmoothedCell>) -> Self {
        Self {
            property: property.into(),
            cell_size,
            cells,
        }
    }

    /// Gather a (possibly lazy) cell sequence into a layer.
    pub fn collect_from<I>(property: impl Into<String>, cell_size: f64, cells: I) -> Self
    where
        I: IntoIterator<Item = SmoothedCell>,
    {
        Self::new(property, cell_size, cells.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SmoothedCell> {
        self.cells.iter()
    }

    /// Value of `cell` under the property `name`, if it is this layer's property.
    pub fn property_value(&self, cell: &SmoothedCell, name: &str) -> Option<f64> {
        (name == self.property).then_some(cell.value)
    }

    /// Minimum and maximum finite value, `None` for a layer without finite values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .map(|c| c.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl<'a> IntoIterator for &'a SmoothedLayer {
    type Item = &'a SmoothedCell;
    type IntoIter = std::slice::Iter<'a, SmoothedCell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Serializes as `[{"x": .., "y": .., "<property>": ..}, ...]`.
impl Serialize for SmoothedLayer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.cells.len()))?;
        for cell in &self.cells {
            seq.serialize_element(&CellRecord {
                cell,
                property: &self.property,
            })?;
        }
        seq.end()
    }
}

struct CellRecord<'a> {
    cell: &'a SmoothedCell,
    property: &'a str,
}

impl Serialize for CellRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("x", &self.cell.x)?;
        map.serialize_entry("y", &self.cell.y)?;
        map.serialize_entry(self.property, &self.cell.value)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_flat_json() {
        let cell: Cell = serde_json::from_str(r#"{"x": 10, "y": 20, "pop": 3.5}"#).unwrap();
        assert_eq!(cell.x, 10.0);
        assert_eq!(cell.y, 20.0);
        assert_eq!(cell.value("pop"), Some(3.5));
        assert_eq!(cell.value("missing"), None);
    }

    #[test]
    fn test_layer_serializes_property_name() {
        let layer = SmoothedLayer::new(
            DEFAULT_SMOOTHED_PROPERTY,
            5.0,
            vec![SmoothedCell { x: 0.0, y: 5.0, value: 1.5 }],
        );
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json, serde_json::json!([{"x": 0.0, "y": 5.0, "ksmval": 1.5}]));
    }

    #[test]
    fn test_value_range_ignores_nan() {
        let layer = SmoothedLayer::new(
            "v",
            1.0,
            vec![
                SmoothedCell { x: 0.0, y: 0.0, value: 3.0 },
                SmoothedCell { x: 1.0, y: 0.0, value: f64::NAN },
                SmoothedCell { x: 2.0, y: 0.0, value: -1.0 },
            ],
        );
        assert_eq!(layer.value_range(), Some((-1.0, 3.0)));
        assert_eq!(layer.property_value(&layer.cells[0], "v"), Some(3.0));
        assert_eq!(layer.property_value(&layer.cells[0], "ksmval"), None);
    }
}
