use cgmath::{Deg, Point3, Vector3};
use petal_ngin::{
    camera::{Camera, Projection, Ray},
    data_structures::bounds::Aabb,
    interaction::{DragControls, Plane},
};

use winit::dpi::PhysicalPosition;

use crate::common::test_utils::assert_close;

mod common;

fn unit_box_at(center: Vector3<f32>) -> Aabb {
    Aabb::new(
        Point3::new(center.x - 0.5, center.y - 0.5, center.z - 0.5),
        Point3::new(center.x + 0.5, center.y + 0.5, center.z + 0.5),
    )
}

#[test]
fn plane_intersection_in_front() {
    let plane = Plane::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
    let ray = Ray::new(Point3::new(1.0, 2.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    let hit = plane.intersect(&ray).expect("ray points at the plane");
    assert_eq!(hit, Point3::new(1.0, 2.0, 0.0));
}

#[test]
fn plane_ignores_rays_pointing_away_or_parallel() {
    let plane = Plane::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
    let away = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
    let parallel = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(plane.intersect(&away), None);
    assert_eq!(plane.intersect(&parallel), None);
}

#[test]
fn miss_does_not_start_a_drag() {
    let mut drag = DragControls::new();
    let ray = Ray::new(Point3::new(5.0, 5.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    let started = drag.pointer_down(
        &ray,
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 0.0, 0.0),
        &[unit_box_at(Vector3::new(0.0, 0.0, 0.0))],
    );
    assert!(!started);
    assert!(!drag.is_dragging());
    assert_eq!(drag.pointer_move(&ray), None);
}

#[test]
fn empty_group_cannot_be_dragged() {
    let mut drag = DragControls::new();
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    let forward = Vector3::new(0.0, 0.0, -1.0);
    assert!(!drag.pointer_down(&ray, forward, Vector3::new(0.0, 0.0, 0.0), &[]));
}

#[test]
fn drag_keeps_the_grab_offset() {
    let mut drag = DragControls::new();
    let forward = Vector3::new(0.0, 0.0, -1.0);
    let target = Vector3::new(0.0, 0.0, 0.0);
    // Grab the box 0.25 right of its centre
    let down = Ray::new(Point3::new(0.25, 0.0, 5.0), forward);
    assert!(drag.pointer_down(&down, forward, target, &[unit_box_at(target)]));
    assert!(drag.is_dragging());

    let moved = Ray::new(Point3::new(2.25, 1.0, 5.0), forward);
    let position = drag.pointer_move(&moved).expect("dragging");
    assert_close(position.x, 2.0);
    assert_close(position.y, 1.0);
    assert_close(position.z, 0.0);
}

#[test]
fn release_ends_the_drag() {
    let mut drag = DragControls::new();
    let forward = Vector3::new(0.0, 0.0, -1.0);
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), forward);
    let target = Vector3::new(0.0, 0.0, 0.0);
    drag.pointer_down(&ray, forward, target, &[unit_box_at(target)]);

    assert!(drag.pointer_up());
    assert!(!drag.is_dragging());
    assert!(!drag.pointer_up());
    assert_eq!(drag.pointer_move(&ray), None);
}

#[test]
fn nearest_box_sets_the_drag_depth() {
    let mut drag = DragControls::new();
    let forward = Vector3::new(0.0, 0.0, -1.0);
    let target = Vector3::new(0.0, 0.0, 0.0);
    let far = unit_box_at(Vector3::new(0.0, 0.0, -3.0));
    let near = unit_box_at(Vector3::new(0.0, 0.0, 1.0));
    let down = Ray::new(Point3::new(0.0, 0.0, 5.0), forward);
    assert!(drag.pointer_down(&down, forward, target, &[far, near]));

    // Grabbed at the front face of the near box, z = 1.5
    let moved = Ray::new(Point3::new(1.0, 0.0, 5.0), forward);
    let position = drag.pointer_move(&moved).expect("dragging");
    assert_close(position.x, 1.0);
    assert_close(position.z, 0.0);
}

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn sunglass_view() -> (Camera, Projection) {
    (
        Camera::new(Point3::new(0.0, 0.0, 5.0), Deg(-90.0), Deg(0.0)),
        Projection::new(WIDTH as u32, HEIGHT as u32, Deg(75.0), 0.1, 1000.0),
    )
}

fn ray_at(x: f64, y: f64) -> Ray {
    let (camera, projection) = sunglass_view();
    camera.cast_ray_from_mouse(PhysicalPosition::new(x, y), WIDTH, HEIGHT, &projection)
}

/// The model sits at the origin while the petal cloud spreads around the camera.
fn model_and_cloud() -> [Aabb; 2] {
    [
        Aabb::new(Point3::new(-12.7, -12.7, -12.7), Point3::new(12.7, 12.7, 12.7)),
        Aabb::new(Point3::new(-1.0, -1.0, -0.5), Point3::new(1.0, 1.0, 0.5)),
    ]
}

#[test]
fn box_around_the_camera_is_not_grabbed() {
    let mut drag = DragControls::new();
    let (camera, _) = sunglass_view();
    let target = Vector3::new(0.0, 0.0, 0.0);
    let corner = ray_at(10.0, 10.0);
    assert!(!drag.pointer_down(&corner, camera.forward(), target, &model_and_cloud()));
    assert!(!drag.is_dragging());
}

#[test]
fn dragging_follows_the_pointer_at_model_depth() {
    let mut drag = DragControls::new();
    let (camera, projection) = sunglass_view();
    let target = Vector3::new(0.0, 0.0, 0.0);
    let centre = ray_at(400.0, 300.0);
    assert!(drag.pointer_down(&centre, camera.forward(), target, &model_and_cloud()));

    let position = drag.pointer_move(&ray_at(600.0, 300.0)).expect("dragging");
    // The grab plane is the model's front face, 4.5 units in front of the camera
    let half_width = 4.5 * (projection.fovy.0 / 2.0).tan() * WIDTH / HEIGHT;
    let expected = 0.5 * half_width;
    assert!(
        (position.x - expected).abs() < 0.01,
        "moved {} instead of {expected}",
        position.x
    );
    assert!(position.y.abs() < 0.01);
    assert!(position.z.abs() < 0.01);
}
