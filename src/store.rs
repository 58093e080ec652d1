//! Polygon data model and storage.
//!
//! [`PolygonStore`] owns every finalized polygon. All structural mutation
//! funnels through it so the invariants (minimum vertex count, explicit
//! closure) are enforced in exactly one place.

use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, Result};
use crate::geometry::{point_in_polygon, BoundingBox, Point};

/// Minimum number of authored vertices for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Identifier of a polygon: its position in the store. Stable, since no
/// delete operation exists.
pub type PolygonId = usize;

/// A finalized, labeled polygon in image coordinates.
///
/// The vertex list carries explicit closure: the last vertex is a copy of
/// the first. Renderers can draw the list as-is without special-casing the
/// final segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Class label, e.g. "Car"
    pub label: String,
    /// Vertices in winding order, first vertex repeated at the end
    pub vertices: Vec<Point>,
}

impl Polygon {
    /// Whether the vertex list ends with a copy of its first vertex.
    pub fn is_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) if self.vertices.len() >= 2 => first == last,
            _ => false,
        }
    }

    /// Number of vertices the user authored (closure vertex excluded).
    pub fn authored_len(&self) -> usize {
        if self.is_closed() {
            self.vertices.len() - 1
        } else {
            self.vertices.len()
        }
    }

    /// Smallest axis-aligned box enclosing the polygon.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    /// Ray-cast containment test in image space.
    pub fn contains(&self, p: Point) -> bool {
        point_in_polygon(p, &self.vertices)
    }
}

/// Authoritative collection of finalized polygons.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonStore {
    polygons: Vec<Polygon>,
}

impl PolygonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize a polygon and return its id.
    ///
    /// Requires at least [`MIN_POLYGON_VERTICES`] authored vertices. The
    /// closure vertex is appended here if the caller did not already close
    /// the list, so stored polygons are always explicitly closed.
    pub fn add_polygon(&mut self, label: impl Into<String>, vertices: Vec<Point>) -> Result<PolygonId> {
        let mut polygon = Polygon {
            label: label.into(),
            vertices,
        };

        let authored = polygon.authored_len();
        if authored < MIN_POLYGON_VERTICES {
            log::warn!("rejecting polygon with {} vertices", authored);
            return Err(AnnotationError::InvalidPolygon { count: authored });
        }

        if !polygon.is_closed() {
            let first = polygon.vertices[0];
            polygon.vertices.push(first);
        }

        let id = self.polygons.len();
        log::debug!(
            "polygon {} ({:?}) finalized with {} vertices",
            id,
            polygon.label,
            polygon.authored_len()
        );
        self.polygons.push(polygon);
        Ok(id)
    }

    /// Replace one vertex with a new image-space position.
    ///
    /// The position must already be clamped to the image rectangle by the
    /// caller. Moving either endpoint of the closure pair moves both, so the
    /// closure invariant cannot be broken through this API.
    pub fn move_vertex(&mut self, id: PolygonId, index: usize, new_point: Point) -> Result<()> {
        let polygon = self
            .polygons
            .get_mut(id)
            .ok_or(AnnotationError::IndexOutOfRange { polygon: id, index })?;

        let len = polygon.vertices.len();
        if index >= len {
            return Err(AnnotationError::IndexOutOfRange { polygon: id, index });
        }

        let closed = polygon.is_closed();
        polygon.vertices[index] = new_point;
        if closed {
            if index == 0 {
                polygon.vertices[len - 1] = new_point;
            } else if index == len - 1 {
                polygon.vertices[0] = new_point;
            }
        }
        Ok(())
    }

    /// Add a delta to every vertex of a polygon.
    ///
    /// Applies the delta as given; keeping the polygon inside the image is
    /// the caller's boundary responsibility.
    pub fn translate_polygon(&mut self, id: PolygonId, delta: Point) -> Result<()> {
        let polygon = self
            .polygons
            .get_mut(id)
            .ok_or(AnnotationError::IndexOutOfRange { polygon: id, index: 0 })?;

        for v in &mut polygon.vertices {
            *v = *v + delta;
        }
        Ok(())
    }

    pub fn get(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.get(id)
    }

    /// All finalized polygons in creation order.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Topmost polygon containing the given image-space point.
    pub fn hit_test(&self, p: Point) -> Option<PolygonId> {
        self.polygons
            .iter()
            .enumerate()
            .rev()
            .find(|(_, polygon)| polygon.contains(p))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(10.0, 10.0),
            Point::new(60.0, 10.0),
            Point::new(35.0, 50.0),
        ]
    }

    #[test]
    fn test_add_polygon_closes_explicitly() {
        let mut store = PolygonStore::new();
        let id = store.add_polygon("Car", triangle()).unwrap();

        let polygon = store.get(id).unwrap();
        assert_eq!(polygon.vertices.len(), 4);
        assert_eq!(polygon.vertices[0], polygon.vertices[3]);
        assert!(polygon.is_closed());
        assert_eq!(polygon.authored_len(), 3);
    }

    #[test]
    fn test_add_polygon_accepts_preclosed() {
        let mut store = PolygonStore::new();
        let mut vertices = triangle();
        vertices.push(vertices[0]);
        let id = store.add_polygon("Car", vertices).unwrap();
        // No double closure
        assert_eq!(store.get(id).unwrap().vertices.len(), 4);
    }

    #[test]
    fn test_add_polygon_rejects_too_few() {
        let mut store = PolygonStore::new();
        let err = store
            .add_polygon("Car", vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])
            .unwrap_err();
        assert_eq!(err, AnnotationError::InvalidPolygon { count: 2 });
        assert!(store.is_empty());

        // A "closed" pair is still only 2 authored vertices... and a closed
        // triangle outline of 3 entries authored only 2.
        let err = store
            .add_polygon(
                "Car",
                vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 0.0)],
            )
            .unwrap_err();
        assert_eq!(err, AnnotationError::InvalidPolygon { count: 2 });
    }

    #[test]
    fn test_move_vertex_keeps_closure_pair_in_sync() {
        let mut store = PolygonStore::new();
        let id = store.add_polygon("Car", triangle()).unwrap();

        store.move_vertex(id, 0, Point::new(5.0, 5.0)).unwrap();
        let polygon = store.get(id).unwrap();
        assert_eq!(polygon.vertices[0], Point::new(5.0, 5.0));
        assert_eq!(polygon.vertices[3], Point::new(5.0, 5.0));

        store.move_vertex(id, 3, Point::new(7.0, 7.0)).unwrap();
        let polygon = store.get(id).unwrap();
        assert_eq!(polygon.vertices[0], Point::new(7.0, 7.0));
        assert!(polygon.is_closed());
    }

    #[test]
    fn test_move_vertex_out_of_range() {
        let mut store = PolygonStore::new();
        let id = store.add_polygon("Car", triangle()).unwrap();

        assert_eq!(
            store.move_vertex(id, 4, Point::new(0.0, 0.0)),
            Err(AnnotationError::IndexOutOfRange { polygon: id, index: 4 })
        );
        assert_eq!(
            store.move_vertex(99, 0, Point::new(0.0, 0.0)),
            Err(AnnotationError::IndexOutOfRange { polygon: 99, index: 0 })
        );
        // State untouched
        assert_eq!(store.get(id).unwrap().vertices, {
            let mut v = triangle();
            v.push(v[0]);
            v
        });
    }

    #[test]
    fn test_translate_polygon() {
        let mut store = PolygonStore::new();
        let id = store.add_polygon("Car", triangle()).unwrap();

        store.translate_polygon(id, Point::new(10.0, -5.0)).unwrap();
        let polygon = store.get(id).unwrap();
        assert_eq!(polygon.vertices[0], Point::new(20.0, 5.0));
        assert_eq!(polygon.vertices[2], Point::new(45.0, 45.0));
        assert!(polygon.is_closed());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut store = PolygonStore::new();
        let bottom = store.add_polygon("Car", triangle()).unwrap();
        let top = store
            .add_polygon(
                "Car",
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                    Point::new(100.0, 100.0),
                    Point::new(0.0, 100.0),
                ],
            )
            .unwrap();

        assert_eq!(store.hit_test(Point::new(35.0, 20.0)), Some(top));
        assert_eq!(store.hit_test(Point::new(500.0, 500.0)), None);
        assert_ne!(bottom, top);
    }
}
