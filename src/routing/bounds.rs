use crate::model::Coordinates;
use serde::Serialize;

/// Axis-aligned box that keeps every marker on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl MapBounds {
    /// Smallest box around `points`, grown by `padding_deg` on every side.
    ///
    /// Returns `None` for an empty set.
    pub fn fit(points: impl IntoIterator<Item = Coordinates>, padding_deg: f64) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut south, mut west, mut north, mut east) = (first.lat, first.lng, first.lat, first.lng);
        for p in points {
            south = south.min(p.lat);
            north = north.max(p.lat);
            west = west.min(p.lng);
            east = east.max(p.lng);
        }
        Some(Self {
            south_west: Coordinates::new(south - padding_deg, west - padding_deg),
            north_east: Coordinates::new(north + padding_deg, east + padding_deg),
        })
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}
