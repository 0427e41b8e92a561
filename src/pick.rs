// src/pick.rs
use crate::camera::CameraPose;
use crate::morph::ParticleTransform;
use nalgebra::{Point3, Vector3};

/// Arena-indexed record for one photo proxy. Grounded in the flat
/// `Vec`-of-records style `data.rs` used for per-tracked-object state
/// (its `TrackingRecord` rows), adapted here to an index-stable arena
/// instead of global references.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoSlot {
    pub index: usize,
    pub aspect_ratio: f32,
    pub transform: ParticleTransform,
}

impl PhotoSlot {
    /// Proxy pick radius in world units: `max(width, height) * 0.7`, where
    /// `width = aspect_ratio` and `height = 1`.
    fn pick_radius(&self) -> f64 {
        let width = self.aspect_ratio as f64;
        let height = 1.0;
        width.max(height) * 0.7
    }

    fn center(&self) -> Point3<f64> {
        let p = self.transform.position;
        Point3::new(p.x as f64, p.y as f64, p.z as f64)
    }
}

/// Resolves a pick by casting a ray from the camera through the pointer's
/// normalized device coordinates and testing it against every photo proxy's
/// bounding sphere. Nearest hit wins; ties (equal `t`) favor the lower slot
/// index so the answer is deterministic.
pub struct PickResolver;

impl PickResolver {
    pub fn new() -> Self {
        Self
    }

    /// Build a world-space ray from the camera pose through the NDC point
    /// `(ndc_x, ndc_y)` on the near plane (`z = -1` in view space).
    fn ray_from_ndc(camera: CameraPose, ndc_x: f64, ndc_y: f64) -> (Point3<f64>, Vector3<f64>) {
        let forward = (camera.look_at - camera.position)
            .try_normalize(1e-9)
            .unwrap_or(Vector3::new(0.0, 0.0, -1.0));
        let world_up = Vector3::new(0.0, 1.0, 0.0);
        let right = forward
            .cross(&world_up)
            .try_normalize(1e-9)
            .unwrap_or(Vector3::new(1.0, 0.0, 0.0));
        let up = right.cross(&forward);

        let near_point = camera.position + forward * 1.0 + right * ndc_x + up * ndc_y;
        let direction = (near_point - camera.position)
            .try_normalize(1e-9)
            .unwrap_or(forward);
        (camera.position, direction)
    }

    /// Ray-sphere intersection; returns the smallest positive `t` if the ray
    /// hits the sphere in front of the origin.
    fn hit_t(origin: Point3<f64>, dir: Vector3<f64>, center: Point3<f64>, radius: f64) -> Option<f64> {
        let oc = origin - center;
        let b = oc.dot(&dir);
        let c = oc.norm_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let t0 = -b - sqrt_d;
        let t1 = -b + sqrt_d;
        if t0 > 0.0 {
            Some(t0)
        } else if t1 > 0.0 {
            Some(t1)
        } else {
            None
        }
    }

    /// Resolve a pick against `slots` from `camera`, using the pointer's
    /// `(x, y)` as NDC coordinates. Returns the index of the nearest hit
    /// photo slot, or `None` if the ray hits nothing.
    pub fn resolve(&self, camera: CameraPose, ndc_x: f64, ndc_y: f64, slots: &[PhotoSlot]) -> Option<usize> {
        let (origin, dir) = Self::ray_from_ndc(camera, ndc_x, ndc_y);
        let mut best: Option<(f64, usize)> = None;
        for slot in slots {
            if let Some(t) = Self::hit_t(origin, dir, slot.center(), slot.pick_radius()) {
                best = match best {
                    Some((best_t, best_i)) if t < best_t || (t == best_t && slot.index < best_i) => {
                        Some((t, slot.index))
                    }
                    Some(existing) => Some(existing),
                    None => Some((t, slot.index)),
                };
            }
        }
        best.map(|(_, i)| i)
    }
}

impl Default for PickResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph::Rgb;

    fn slot(index: usize, x: f32, y: f32, z: f32, scale: f32) -> PhotoSlot {
        PhotoSlot {
            index,
            aspect_ratio: 1.0,
            transform: ParticleTransform {
                position: Vector3::new(x, y, z),
                rotation: Vector3::new(0.0, 0.0, 0.0),
                scale,
                color: Rgb::new(1.0, 1.0, 1.0),
            },
        }
    }

    #[test]
    fn straight_ahead_ray_hits_centered_photo() {
        let camera = CameraPose::origin_facing(Point3::new(0.0, 0.0, 15.0));
        let slots = [slot(0, 0.0, 0.0, 0.0, 1.0)];
        let resolver = PickResolver::new();
        let hit = resolver.resolve(camera, 0.0, 0.0, &slots);
        assert_eq!(hit, Some(0));
    }

    #[test]
    fn ray_misses_when_no_slot_within_radius() {
        let camera = CameraPose::origin_facing(Point3::new(0.0, 0.0, 15.0));
        let slots = [slot(0, 8.0, 8.0, 0.0, 0.5)];
        let resolver = PickResolver::new();
        let hit = resolver.resolve(camera, 0.0, 0.0, &slots);
        assert_eq!(hit, None);
    }

    #[test]
    fn nearest_slot_wins_over_farther_one() {
        let camera = CameraPose::origin_facing(Point3::new(0.0, 0.0, 15.0));
        let slots = [slot(0, 0.0, 0.0, -5.0, 2.0), slot(1, 0.0, 0.0, 2.0, 2.0)];
        let resolver = PickResolver::new();
        // Both proxies straddle the forward axis; the one closer to the
        // camera (higher z, since camera sits at z=+15 looking at origin)
        // should win.
        let hit = resolver.resolve(camera, 0.0, 0.0, &slots);
        assert_eq!(hit, Some(1));
    }

    #[test]
    fn ties_break_toward_lower_index() {
        let camera = CameraPose::origin_facing(Point3::new(0.0, 0.0, 15.0));
        let slots = [slot(5, 0.0, 0.0, 0.0, 3.0), slot(1, 0.0, 0.0, 0.0, 3.0)];
        let resolver = PickResolver::new();
        let hit = resolver.resolve(camera, 0.0, 0.0, &slots);
        assert_eq!(hit, Some(1));
    }
}
