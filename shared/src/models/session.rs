//! Field sessions: the fields drawn by one user and the current selection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::FieldRecord;
use crate::geometry::{GeometryError, Polygon};
use crate::types::Coordinate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSession {
    pub id: Uuid,
    /// Drawing order
    fields: Vec<FieldRecord>,
    pub selected: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl FieldSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            fields: Vec::new(),
            selected: None,
            created_at: Utc::now(),
        }
    }

    pub fn add_field(&mut self, polygon: Polygon) -> Result<&FieldRecord, GeometryError> {
        let record = FieldRecord::new(polygon)?;
        self.fields.push(record);
        Ok(&self.fields[self.fields.len() - 1])
    }

    pub fn get(&self, id: Uuid) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut FieldRecord> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    pub fn fields(&self) -> &[FieldRecord] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Select the first field containing `point`. The selection is left
    /// unchanged when no field contains it.
    pub fn select_at(&mut self, point: Coordinate) -> Option<Uuid> {
        let hit = self
            .fields
            .iter()
            .find(|f| f.polygon.contains(point))
            .map(|f| f.id)?;
        self.selected = Some(hit);
        Some(hit)
    }

    /// Mean of each field's first vertex
    pub fn map_center(&self) -> Option<Coordinate> {
        if self.fields.is_empty() {
            return None;
        }
        let n = self.fields.len() as f64;
        let (lon, lat) = self
            .fields
            .iter()
            .map(|f| f.polygon.ring()[0])
            .fold((0.0, 0.0), |(lon, lat), c| (lon + c.longitude, lat + c.latitude));
        Some(Coordinate::new(lon / n, lat / n))
    }
}

impl Default for FieldSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::from_lon_lat(&[
            [x, y],
            [x, y + size],
            [x + size, y + size],
            [x + size, y],
            [x, y],
        ])
        .unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut session = FieldSession::new();
        let id = session.add_field(square(0.0, 0.0, 2.0)).unwrap().id;
        assert_eq!(session.len(), 1);
        assert_eq!(session.get(id).unwrap().area, 4.0);
        assert!(session.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_add_degenerate_field_leaves_session_untouched() {
        let mut session = FieldSession::new();
        let line = Polygon::from_lon_lat(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).unwrap();
        assert!(session.add_field(line).is_err());
        assert!(session.is_empty());
    }

    #[test]
    fn test_select_first_containing_field() {
        let mut session = FieldSession::new();
        let first = session.add_field(square(0.0, 0.0, 2.0)).unwrap().id;
        let _overlapping = session.add_field(square(1.0, 1.0, 2.0)).unwrap().id;
        let far = session.add_field(square(10.0, 10.0, 1.0)).unwrap().id;

        assert_eq!(session.select_at(Coordinate::new(1.5, 1.5)), Some(first));
        assert_eq!(session.select_at(Coordinate::new(10.5, 10.5)), Some(far));
        assert_eq!(session.selected, Some(far));

        assert_eq!(session.select_at(Coordinate::new(50.0, 50.0)), None);
        assert_eq!(session.selected, Some(far));
    }

    #[test]
    fn test_map_center() {
        let mut session = FieldSession::new();
        assert!(session.map_center().is_none());
        session.add_field(square(0.0, 0.0, 1.0)).unwrap();
        session.add_field(square(4.0, 2.0, 1.0)).unwrap();
        assert_eq!(session.map_center(), Some(Coordinate::new(2.0, 1.0)));
    }
}
