use cgmath::{Deg, Euler, Quaternion, Rad, Rotation3, Vector3};
use petal_ngin::{
    assets::{place, replicate},
    data_structures::{
        group::Group,
        instance::Instance,
        scene_graph::{ContainerNode, SceneNode},
    },
};

use crate::common::test_utils::{assert_close, failed_load, template};

mod common;

#[test]
fn world_transforms_propagate_to_children() {
    let mut root = ContainerNode::new(1);
    root.set_local_transform(0, Instance::from(Vector3::new(1.0, 0.0, 0.0)));
    let mut child = ContainerNode::new(1);
    child.set_local_transform(0, Instance::from(Vector3::new(0.0, 2.0, 0.0)));
    root.add_child(Box::new(child));

    root.update_world_transform_all();

    let child_world = root.get_children()[0].get_world_transforms();
    assert_eq!(child_world[0].position, Vector3::new(1.0, 2.0, 0.0));
}

#[test]
fn parent_scale_and_rotation_apply_to_child_positions() {
    let parent = Instance {
        position: Vector3::new(0.0, 0.0, 0.0),
        rotation: Quaternion::from_angle_y(Deg(90.0)),
        scale: Vector3::new(2.0, 2.0, 2.0),
    };
    let child = Instance::from(Vector3::new(1.0, 0.0, 0.0));
    let world = &parent * &child;
    assert_close(world.position.x, 0.0);
    assert_close(world.position.z, -2.0);
    assert_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0));
}

#[test]
fn clone_instance_recurses_into_children() {
    let mut node = template();
    assert_eq!(node.clone_instance(0), 2);
    assert_eq!(node.clone_instance(1), 3);
    assert_eq!(node.get_children()[0].instance_count(), 3);
}

#[test]
fn clone_instance_out_of_range_is_ignored() {
    let mut node = template();
    assert_eq!(node.clone_instance(5), 1);
    assert_eq!(node.get_children()[0].instance_count(), 1);
}

#[test]
fn add_instances_grows_children_with_their_first_instance() {
    let mut node = ContainerNode::new(1);
    let mut child = ContainerNode::new(1);
    child.set_local_transform(0, Instance::from(Vector3::new(0.0, 1.0, 0.0)));
    node.add_child(Box::new(child));

    let count = node.add_instances(vec![Instance::from(Vector3::new(5.0, 0.0, 0.0)); 3]);
    assert_eq!(count, 4);
    let child = &node.get_children()[0];
    assert_eq!(child.instance_count(), 4);
    assert_eq!(
        child.get_local_transform(3).map(|i| i.position),
        Some(Vector3::new(0.0, 1.0, 0.0))
    );
}

#[test]
fn replicate_reaches_the_requested_count() {
    let mut node = template();
    assert_eq!(replicate(node.as_mut(), 10_000), 10_000);
    assert_eq!(node.get_children()[0].instance_count(), 10_000);
}

#[test]
fn replicate_never_shrinks() {
    let mut node = template();
    replicate(node.as_mut(), 5);
    assert_eq!(replicate(node.as_mut(), 2), 5);
}

#[test]
fn place_wraps_the_node_with_its_placement() {
    let placement =
        Instance::from(Vector3::new(0.0, 1.0, 0.0)).with_scale(Vector3::new(0.1, 0.1, 0.1));
    let mut placed = place(template(), placement.clone());
    assert_eq!(placed.instance_count(), 1);
    assert_eq!(placed.get_local_transform(0), Some(placement));

    placed.update_world_transform_all();
    let inner = &placed.get_children()[0];
    assert_eq!(inner.get_world_transforms()[0].scale, Vector3::new(0.1, 0.1, 0.1));
}

#[test]
fn group_transform_spins_about_y() {
    let mut group = Group::new("petals");
    group.position = Vector3::new(0.0, 1.0, 0.0);
    group.rotation_y = Rad(std::f32::consts::FRAC_PI_2);

    let mut node = ContainerNode::new(1);
    node.set_local_transform(0, Instance::from(Vector3::new(1.0, 0.0, 0.0)));
    group.add(Box::new(node));
    group.update_world_transforms();

    let world = group.members()[0].get_world_transforms()[0].clone();
    assert_close(world.position.x, 0.0);
    assert_close(world.position.y, 1.0);
    assert_close(world.position.z, -1.0);
}

#[test]
fn failed_load_leaves_the_group_empty() {
    let mut group = Group::new("model");
    assert!(!group.attach_loaded(failed_load()));
    assert!(group.is_empty());
    assert!(group.instance_bounds().is_empty());
    assert!(group.get_render().is_empty());
}

#[test]
fn successful_load_is_attached() {
    let mut group = Group::new("model");
    assert!(group.attach_loaded(Ok(template())));
    assert_eq!(group.len(), 1);
}

#[test]
fn euler_instances_rotate_x_then_y_then_z() {
    let euler = Euler::new(Rad(0.3), Rad(0.2), Rad(0.1));
    let unit = Vector3::new(1.0, 1.0, 1.0);
    let instance = Instance::from_euler(Vector3::new(0.0, 0.0, 0.0), euler, unit);
    let expected = Quaternion::from_angle_x(Rad(0.3))
        * Quaternion::from_angle_y(Rad(0.2))
        * Quaternion::from_angle_z(Rad(0.1));
    assert_close(instance.rotation.s, expected.s);
    assert_close(instance.rotation.v.x, expected.v.x);
    assert_close(instance.rotation.v.y, expected.v.y);
    assert_close(instance.rotation.v.z, expected.v.z);
}
