use cgmath::InnerSpace;
use petal_ngin::particles::{ParticleCloud, SphereSampling, random_in_sphere};

use crate::common::test_utils::rng;

mod common;

fn assert_within(cloud: &ParticleCloud, radius: f32) {
    for p in cloud.points() {
        assert!(
            p.magnitude() <= radius * (1.0 + 1e-5),
            "{p:?} lies outside radius {radius}"
        );
    }
}

#[test]
fn points_stay_inside_the_sphere() {
    for sampling in [SphereSampling::CenterBiased, SphereSampling::Uniform] {
        for radius in [0.5, 1.0, 13.0, 250.0] {
            let cloud = ParticleCloud::generate(&mut rng(7), 5_000, radius, sampling);
            assert_eq!(cloud.len(), 5_000);
            assert_within(&cloud, radius);
        }
    }
}

#[test]
fn uniform_sampling_reaches_the_outer_shell() {
    let radius = 13.0;
    let cloud = ParticleCloud::generate(&mut rng(3), 10_000, radius, SphereSampling::Uniform);
    let outer = cloud
        .points()
        .iter()
        .filter(|p| p.magnitude() > radius * 0.9)
        .count();
    // About 27% of a uniform ball lies in its outer tenth
    assert!(outer > 2_000, "only {outer} points in the outer shell");
}

#[test]
fn center_biased_sampling_is_denser_near_the_middle() {
    let radius = 13.0;
    let mean = |sampling| {
        let cloud = ParticleCloud::generate(&mut rng(11), 10_000, radius, sampling);
        cloud.points().iter().map(|p| p.magnitude()).sum::<f32>() / cloud.len() as f32
    };
    assert!(mean(SphereSampling::CenterBiased) < mean(SphereSampling::Uniform));
}

#[test]
fn same_seed_gives_the_same_cloud() {
    let a = ParticleCloud::generate(&mut rng(42), 100, 13.0, SphereSampling::default());
    let b = ParticleCloud::generate(&mut rng(42), 100, 13.0, SphereSampling::default());
    let c = ParticleCloud::generate(&mut rng(43), 100, 13.0, SphereSampling::default());
    assert_eq!(a.points(), b.points());
    assert_ne!(a.points(), c.points());
}

#[test]
fn positions_are_flattened_xyz() {
    let cloud = ParticleCloud::generate(&mut rng(1), 4, 2.0, SphereSampling::Uniform);
    let positions = cloud.positions();
    assert_eq!(positions.len(), 12);
    for (i, p) in cloud.points().iter().enumerate() {
        assert_eq!(&positions[i * 3..i * 3 + 3], &[p.x, p.y, p.z]);
    }
}

#[test]
fn zero_count_is_empty() {
    let cloud = ParticleCloud::generate(&mut rng(1), 0, 13.0, SphereSampling::default());
    assert!(cloud.is_empty());
    assert!(cloud.positions().is_empty());
}

#[test]
fn zero_radius_collapses_to_the_origin() {
    let p = random_in_sphere(&mut rng(5), 0.0, SphereSampling::Uniform);
    assert_eq!(p.magnitude(), 0.0);
}
