// src/morph.rs
use crate::mode::Mode;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// RGB color, 0..1 per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    fn scale(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }
}

/// One precomputed, immutable particle entry within a [`Formation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleAttributes {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: f32,
    pub color: Rgb,
}

/// An immutable array of `N` particle entries. Two formations exist (tree,
/// scatter); they share index order so interpolation is index-parallel.
#[derive(Debug, Clone)]
pub struct Formation {
    pub particles: Vec<ParticleAttributes>,
}

const PALETTE: [Rgb; 3] = [
    Rgb::new(0.15, 0.65, 0.25), // green
    Rgb::new(0.85, 0.70, 0.20), // gold
    Rgb::new(0.75, 0.15, 0.15), // red
];

impl Formation {
    /// Cone-stratified tree formation: `k` concentric layers, each placing
    /// `n_j` particles proportional to `radius_j^2` uniformly in a disc that
    /// narrows toward the top of the cone.
    pub fn generate_tree(n: usize, height: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let k = ((n as f64).sqrt().round() as usize).max(1);
        let layer_weights: Vec<f64> = (0..k)
            .map(|j| {
                let y = height / 2.0 - j as f64 * (height / k as f64);
                let radius = 1.0 - y / height;
                (radius.max(0.0)).powi(2)
            })
            .collect();
        let weight_sum: f64 = layer_weights.iter().sum::<f64>().max(1e-9);

        let mut particles = Vec::with_capacity(n);
        let mut remaining = n;
        for (j, &w) in layer_weights.iter().enumerate() {
            let is_last = j + 1 == k;
            let count = if is_last {
                remaining
            } else {
                ((w / weight_sum) * n as f64).round() as usize
            }
            .min(remaining);
            remaining -= count;

            let y = height / 2.0 - j as f64 * (height / k as f64);
            let r_max = 3.0 * (1.0 - y / height).max(0.05).powf(0.7);
            let color = PALETTE[j % PALETTE.len()];

            for _ in 0..count {
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                let radius = r_max * rng.gen_range(0.0_f64..1.0).sqrt();
                let jitter_y = rng.gen_range(-0.05..0.05);
                let scale = rng.gen_range(0.6..1.2);

                particles.push(ParticleAttributes {
                    position: Vector3::new(
                        (radius * angle.cos()) as f32,
                        (y + jitter_y) as f32,
                        (radius * angle.sin()) as f32,
                    ),
                    rotation: Vector3::new(0.0, angle as f32, 0.0),
                    scale: scale as f32,
                    color,
                });
            }
        }
        // Rounding in the per-layer allocation can leave a few particles
        // short; top up from the last layer's color/radius so the count is
        // always exactly N.
        while particles.len() < n {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            particles.push(ParticleAttributes {
                position: Vector3::new(0.0, (height / 2.0) as f32, 0.0),
                rotation: Vector3::new(0.0, angle as f32, 0.0),
                scale: 0.8,
                color: PALETTE[0],
            });
        }

        Self { particles }
    }

    /// Uniform scatter cube; the first `photo_count` indices are sampled in
    /// a tighter sub-cube so photo-bearing particles cluster near origin.
    pub fn generate_scatter(n: usize, bounds: f64, photo_count: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
        let mut particles = Vec::with_capacity(n);
        for i in 0..n {
            let half = if i < photo_count { 0.6 * bounds } else { bounds };
            let position = Vector3::new(
                rng.gen_range(-half..half) as f32,
                rng.gen_range(-half..half) as f32,
                rng.gen_range(-half..half) as f32,
            );
            let rotation = Vector3::new(
                rng.gen_range(0.0..std::f64::consts::TAU) as f32,
                rng.gen_range(0.0..std::f64::consts::TAU) as f32,
                rng.gen_range(0.0..std::f64::consts::TAU) as f32,
            );
            let scale = rng.gen_range(0.6_f64..1.2) as f32;
            let color = PALETTE[i % PALETTE.len()];
            particles.push(ParticleAttributes {
                position,
                rotation,
                scale,
                color,
            });
        }
        Self { particles }
    }
}

/// Final, render-ready per-particle transform for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleTransform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: f32,
    pub color: Rgb,
}

/// Owns both formations and the scalar morph parameter; produces
/// per-particle transforms on demand. Only this controller writes morphing
/// transforms (owner-writer discipline: one writer per shared value).
pub struct MorphController {
    tree: Formation,
    scatter: Formation,
    m: f64,
    elapsed_s: f64,
    k: f64,
}

impl MorphController {
    pub fn new(tree: Formation, scatter: Formation) -> Self {
        assert_eq!(tree.particles.len(), scatter.particles.len(), "formations must share N");
        Self {
            tree,
            scatter,
            m: 0.0,
            elapsed_s: 0.0,
            k: 2.0,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.tree.particles.len()
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    fn target_for(mode: Mode) -> f64 {
        if mode == Mode::Tree {
            0.0
        } else {
            1.0
        }
    }

    /// Advance `m` toward the mode-dependent target and the idle clock, per
    /// `m <- m + clamp(dt*k, 0, 1) * (m* - m)`.
    pub fn advance(&mut self, mode: Mode, dt: f64) {
        self.elapsed_s += dt;
        let target = Self::target_for(mode);
        let step = (dt * self.k).clamp(0.0, 1.0);
        self.m += step * (target - self.m);
        self.m = self.m.clamp(0.0, 1.0);
    }

    /// Pure index-parallel interpolation between the two formations, with no
    /// idle-float perturbation applied. `m = 0` yields exactly
    /// `tree.position[i]`; `m = 1` yields exactly `scatter.position[i]`.
    pub fn interpolated_position(&self, i: usize) -> Vector3<f32> {
        self.tree.particles[i].position.lerp(&self.scatter.particles[i].position, self.m as f32)
    }

    /// The per-particle transform for index `i`, including the idle-float
    /// perturbation and yaw spin/pulsation.
    pub fn transform(&self, i: usize, mode: Mode) -> ParticleTransform {
        let t = self.tree.particles[i];
        let s = self.scatter.particles[i];
        let m = self.m as f32;
        let t_clock = self.elapsed_s;

        let mut position = self.interpolated_position(i);
        if self.m > 0.5 {
            position.x += (t_clock * 0.5 + i as f64).cos() as f32 * 0.02;
            position.y += (t_clock + i as f64).sin() as f32 * 0.02;
        }

        let rotation = t.rotation * (1.0 - m) + s.rotation * m + Vector3::new(0.0, (t_clock * 0.1) as f32, 0.0);

        let scale = t.scale * if mode == Mode::Tree { 1.0 } else { 1.5 };

        let pulsate = (1.0 + 0.5 * (2.0 * t_clock + 13.0 * i as f64).sin() + 0.5) as f32;
        let color = t.color.scale(pulsate);

        ParticleTransform {
            position,
            rotation,
            scale,
            color,
        }
    }
}
