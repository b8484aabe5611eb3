//! Particle Distributor: pseudo-random placement inside a sphere.
//!
//! Points are drawn in spherical coordinates: a uniform azimuth `θ`, a polar
//! angle `φ = acos(2v - 1)` and a radius scaled by the cube root of a uniform
//! draw. In [`SphereSampling::CenterBiased`] mode every Cartesian component is
//! additionally multiplied by its own uniform factor, which pulls the cloud
//! toward the centre and away from a spherical shape. Both modes stay inside
//! the sphere because each component factor is at most one.

use std::f32::consts::PI;

use cgmath::Vector3;
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SphereSampling {
    /// Extra uniform factor per axis; denser toward the centre.
    #[default]
    CenterBiased,
    /// Uniform by volume.
    Uniform,
}

/// Draws one point inside a sphere of `radius` around the origin.
pub fn random_in_sphere<R: Rng + ?Sized>(
    rng: &mut R,
    radius: f32,
    sampling: SphereSampling,
) -> Vector3<f32> {
    let u: f32 = rng.r#gen();
    let v: f32 = rng.r#gen();
    let theta = 2.0 * PI * u;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    let r = radius * rng.r#gen::<f32>().cbrt();

    let direction = Vector3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
    let factors = match sampling {
        SphereSampling::CenterBiased => Vector3::new(rng.r#gen(), rng.r#gen(), rng.r#gen()),
        SphereSampling::Uniform => Vector3::new(1.0, 1.0, 1.0),
    };

    Vector3::new(
        r * (factors.x * direction.x),
        r * (factors.y * direction.y),
        r * (factors.z * direction.z),
    )
}

/// A fixed set of points sampled once at start-up.
///
/// The points double as a flat positions buffer and as petal placements.
#[derive(Clone, Debug, Default)]
pub struct ParticleCloud {
    points: Vec<Vector3<f32>>,
    radius: f32,
}

impl ParticleCloud {
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        count: usize,
        radius: f32,
        sampling: SphereSampling,
    ) -> Self {
        let points = (0..count)
            .map(|_| random_in_sphere(rng, radius, sampling))
            .collect();
        Self { points, radius }
    }

    pub fn from_points(points: Vec<Vector3<f32>>, radius: f32) -> Self {
        Self { points, radius }
    }

    pub fn points(&self) -> &[Vector3<f32>] {
        &self.points
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Interleaved `x, y, z` floats.
    pub fn positions(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }
}
