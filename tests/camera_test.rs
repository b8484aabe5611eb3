use cgmath::{Deg, InnerSpace, Point3, Vector3};
use petal_ngin::{
    camera::{Camera, Projection, Ray},
    data_structures::bounds::Aabb,
};
use winit::dpi::PhysicalPosition;

use crate::common::test_utils::assert_close;

mod common;

fn camera() -> Camera {
    Camera::new(Point3::new(0.0, 0.0, 5.0), Deg(-90.0), Deg(0.0))
}

#[test]
fn default_yaw_looks_down_negative_z() {
    let forward = camera().forward();
    assert_close(forward.x, 0.0);
    assert_close(forward.y, 0.0);
    assert_close(forward.z, -1.0);
}

#[test]
fn centre_pixel_ray_follows_the_view_direction() {
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let centre = PhysicalPosition::new(400.0, 300.0);
    let ray = camera().cast_ray_from_mouse(centre, 800.0, 600.0, &projection);
    assert_close(ray.direction.magnitude(), 1.0);
    assert_close(ray.direction.x, 0.0);
    assert_close(ray.direction.y, 0.0);
    assert_close(ray.direction.z, -1.0);
}

#[test]
fn corner_pixels_point_off_axis() {
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 1000.0);
    let corner = PhysicalPosition::new(0.0, 0.0);
    let top_left = camera().cast_ray_from_mouse(corner, 800.0, 600.0, &projection);
    assert!(top_left.direction.x < 0.0);
    assert!(top_left.direction.y > 0.0);
    assert!(top_left.direction.z < 0.0);
}

#[test]
fn ray_hits_a_box_in_front() {
    let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert_close(aabb.intersect(&ray).expect("hit"), 4.0);

    let behind = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(aabb.intersect(&behind), None);
}

#[test]
fn ray_from_inside_hits_at_zero() {
    let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(aabb.intersect(&ray), Some(0.0));
}

#[test]
fn transformed_bounds_enclose_every_corner() {
    let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
    let shift = cgmath::Matrix4::from_translation(Vector3::new(1.0, 1.0, 1.0));
    let moved = aabb.transformed(&shift);
    assert_eq!(moved.min, Point3::new(1.0, 1.0, 1.0));
    assert_eq!(moved.max, Point3::new(2.0, 3.0, 4.0));
}

#[test]
fn entry_skips_boxes_around_the_origin() {
    let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    let inside = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    assert!(aabb.contains(inside.origin));
    assert_eq!(aabb.entry_distance(&inside), None);

    let outside = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert_close(aabb.entry_distance(&outside).expect("enters"), 4.0);
}

#[test]
fn nearest_entry_picks_the_closest_box() {
    let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    let around = Aabb::new(Point3::new(-9.0, -9.0, -9.0), Point3::new(9.0, 9.0, 9.0));
    let far = Aabb::new(Point3::new(-1.0, -1.0, -4.0), Point3::new(1.0, 1.0, -2.0));
    let near = Aabb::new(Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, 1.0, 2.0));
    let aside = Aabb::new(Point3::new(3.0, 3.0, 0.0), Point3::new(4.0, 4.0, 1.0));
    let t = Aabb::nearest_entry(&[around, far, near, aside], &ray).expect("hit");
    assert_close(t, 3.0);
    assert_eq!(Aabb::nearest_entry(&[around, aside], &ray), None);
}
