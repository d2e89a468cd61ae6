//! Sample points on primitive surfaces for debug drawing

use std::f32::consts::{PI, TAU};

use colliderkit_math::{Quat, Vec3};

const BOX_MIN_SAMPLES: f32 = 2.0;
const BOX_MAX_SAMPLES: f32 = 8.0;
const BOX_SAMPLE_DELTA: f32 = 2.0;

/// Grid of points filling a box, at most 8 per axis and never fewer than 2
pub fn generate_box_points(min: Vec3, max: Vec3) -> Vec<Vec3> {
    let size = max - min;
    let samples = |extent: f32| (extent / BOX_SAMPLE_DELTA).clamp(BOX_MIN_SAMPLES, BOX_MAX_SAMPLES) as usize;
    let counts = [samples(size.x), samples(size.y), samples(size.z)];
    let delta = Vec3::new(
        size.x / (counts[0] - 1) as f32,
        size.y / (counts[1] - 1) as f32,
        size.z / (counts[2] - 1) as f32,
    );

    let mut points = Vec::with_capacity(counts.iter().product());
    for i in 0..counts[0] {
        for j in 0..counts[1] {
            for k in 0..counts[2] {
                points.push(min + Vec3::new(i as f32, j as f32, k as f32) * delta);
            }
        }
    }
    points
}

/// Points spread evenly over a sphere (Fibonacci lattice)
///
/// Uses five samples per unit of radius, clamped to 5..=512.
pub fn generate_sphere_points(radius: f32) -> Vec<Vec3> {
    let count = ((radius * 5.0) as i32).clamp(5, 512) as usize;

    let offset = 2.0 / count as f32;
    let increment = PI * (3.0 - 5.0_f32.sqrt());
    (0..count)
        .map(|i| {
            let phi = ((i + 1) % count) as f32 * increment;
            let y = (i as f32 * offset - 1.0) + offset * 0.5;
            let r = (1.0 - y * y).max(0.0).sqrt();
            Vec3::new(phi.cos() * r, y, phi.sin() * r) * radius
        })
        .collect()
}

/// Rings of points around a Z-aligned cylinder centred on the origin
pub fn generate_cylinder_points(height: f32, radius: f32) -> Vec<Vec3> {
    let sides = radius.clamp(3.0, 8.0);
    let segments = (height * 0.5).clamp(2.0, 8.0);
    let angle_delta = Quat::from_rotation_z(TAU / sides);
    let segment_delta = height / (segments - 1.0);

    let ring_count = segments.ceil() as usize;
    let side_count = sides.ceil() as usize;
    let mut points = Vec::with_capacity(ring_count * side_count);
    let mut base = Vec3::new(0.0, 0.0, -height * 0.5);
    let mut radius_vector = Vec3::new(radius, 0.0, 0.0);
    for _ in 0..ring_count {
        for _ in 0..side_count {
            points.push(base + radius_vector);
            radius_vector = angle_delta * radius_vector;
        }
        base.z += segment_delta;
    }
    points
}
