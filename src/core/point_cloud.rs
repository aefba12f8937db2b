//! 3D point and point cloud types.

use serde::{Deserialize, Serialize};

use super::transforms::XyzTransform;

/// A 3D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate in meters
    pub x: f64,
    /// Y coordinate in meters
    pub y: f64,
    /// Z coordinate in meters
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point3) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// An ordered 3D point cloud, e.g. one segmented object out of a lidar frame.
///
/// The tracker treats clouds as read-only: it never reorders, filters, or
/// mutates them. Intensities are carried for callers that have them but are
/// not interpreted by the alignment core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud3 {
    /// The points, in caller-defined order.
    points: Vec<Point3>,
    /// Optional per-point intensity values (0-255).
    intensities: Option<Vec<u8>>,
}

impl PointCloud3 {
    /// Create an empty cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cloud with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            intensities: None,
        }
    }

    /// Build a cloud from a list of points.
    pub fn from_points(points: Vec<Point3>) -> Self {
        Self {
            points,
            intensities: None,
        }
    }

    /// Attach per-point intensities. The length must match the point count.
    pub fn with_intensities(mut self, intensities: Vec<u8>) -> Self {
        debug_assert_eq!(intensities.len(), self.points.len());
        self.intensities = Some(intensities);
        self
    }

    /// Append a point.
    #[inline]
    pub fn push(&mut self, point: Point3) {
        self.points.push(point);
    }

    /// Append a point by coordinates.
    #[inline]
    pub fn push_xyz(&mut self, x: f64, y: f64, z: f64) {
        self.points.push(Point3::new(x, y, z));
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Access a point by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point3> {
        self.points.get(index)
    }

    /// Iterate over the points in order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Point3> {
        self.points.iter()
    }

    /// The points as a slice.
    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Per-point intensities, if the caller attached any.
    #[inline]
    pub fn intensities(&self) -> Option<&[u8]> {
        self.intensities.as_deref()
    }

    /// Axis-aligned bounding box, or `None` for an empty cloud.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    /// Centroid of the cloud, or `None` for an empty cloud.
    pub fn centroid(&self) -> Option<Point3> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let mut sum = Point3::default();
        for p in &self.points {
            sum.x += p.x;
            sum.y += p.y;
            sum.z += p.z;
        }
        Some(Point3::new(sum.x / n, sum.y / n, sum.z / n))
    }

    /// Return a copy of the cloud translated by `transform`.
    pub fn translate(&self, transform: &XyzTransform) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point3::new(p.x + transform.x, p.y + transform.y, p.z + transform.z))
                .collect(),
            intensities: self.intensities.clone(),
        }
    }
}

impl<'a> IntoIterator for &'a PointCloud3 {
    type Item = &'a Point3;
    type IntoIter = std::slice::Iter<'a, Point3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
