//! Dragging a group with the pointer.
//!
//! A press that enters the box of one of the group's mesh instances starts a
//! drag, and the nearest box wins. The group then follows the pointer across a
//! plane that faces the camera and passes through the point that was grabbed,
//! keeping the grab offset.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use crate::{camera::Ray, data_structures::bounds::Aabb};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub point: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Plane {
    pub fn new(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Where `ray` crosses the plane, if it does so in front of its origin.
    pub fn intersect(&self, ray: &Ray) -> Option<Point3<f32>> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = self.normal.dot(self.point - ray.origin) / denom;
        (t >= 0.0).then(|| ray.at(t))
    }
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    plane: Plane,
    offset: Vector3<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct DragControls {
    active: Option<Drag>,
}

impl DragControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag if `ray` enters one of `targets`. Returns whether a drag started.
    ///
    /// Boxes that contain the ray origin are skipped, so a camera sitting inside a
    /// spread-out group only grabs what is actually in front of it.
    pub fn pointer_down(
        &mut self,
        ray: &Ray,
        camera_forward: Vector3<f32>,
        target_position: Vector3<f32>,
        targets: &[Aabb],
    ) -> bool {
        let Some(t) = Aabb::nearest_entry(targets, ray) else {
            return false;
        };
        let hit = ray.at(t);
        self.active = Some(Drag {
            plane: Plane::new(hit, -camera_forward),
            offset: target_position - hit.to_vec(),
        });
        log::debug!("drag started at {:?}", hit);
        true
    }

    /// The new target position for the pointer ray, while dragging.
    pub fn pointer_move(&self, ray: &Ray) -> Option<Vector3<f32>> {
        let drag = self.active?;
        let point = drag.plane.intersect(ray)?;
        Some(point.to_vec() + drag.offset)
    }

    /// Ends the drag. Returns whether one was in progress.
    pub fn pointer_up(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}
