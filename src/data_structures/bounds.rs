//! Axis-aligned bounding boxes used for pointer hit-testing.

use cgmath::{Matrix4, Point3, Transform};

use crate::camera::Ray;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all `points`, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.including(p)))
    }

    pub fn including(self, p: Point3<f32>) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn contains(&self, p: Point3<f32>) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// The box enclosing this box after `matrix` is applied.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = self.corners().map(|c| matrix.transform_point(c));
        // Eight corners, never empty
        Self::from_points(corners).unwrap_or(*self)
    }

    /// Distance along `ray` to the first intersection, using the slab method.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        let origin: [f32; 3] = ray.origin.into();
        let direction: [f32; 3] = ray.direction.into();
        let min: [f32; 3] = self.min.into();
        let max: [f32; 3] = self.max.into();
        for axis in 0..3 {
            if direction[axis].abs() < f32::EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }
        Some(t_min)
    }

    /// Distance along `ray` to where it enters the box. A ray starting inside enters nothing.
    pub fn entry_distance(&self, ray: &Ray) -> Option<f32> {
        if self.contains(ray.origin) {
            return None;
        }
        self.intersect(ray)
    }

    /// The closest entry distance of `ray` over all `boxes`.
    pub fn nearest_entry<'a, I>(boxes: I, ray: &Ray) -> Option<f32>
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        boxes
            .into_iter()
            .filter_map(|aabb| aabb.entry_distance(ray))
            .min_by(f32::total_cmp)
    }
}
