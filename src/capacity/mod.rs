//! Frame-level capacity curves and collapse mechanisms
//!
//! Every mechanism turns the per-node results into one piecewise-linear
//! base-shear-vs-displacement curve. Curves from parallel frames can be
//! scaled by a repetition count and superposed.

pub mod beam_sway;
pub mod column_sway;
pub mod damaged;
pub mod mixed_sway;

use std::ops::{Add, Mul, MulAssign};

use serde::{Deserialize, Serialize};

use crate::math::interp_capacity;

pub use beam_sway::beam_sidesway;
pub use column_sway::column_sidesway;
pub use damaged::damaged_sidesway;
pub use mixed_sway::{mixed_sidesway, mixed_sidesway_low_yielding};

/// Fraction of the total height resisting a beam or mixed mechanism
pub(crate) const SWAY_HEIGHT_RATIO: f64 = 2.0 / 3.0;
/// Fraction of the total height resisting a column (soft-storey) mechanism
pub(crate) const COLUMN_SWAY_HEIGHT_RATIO: f64 = 0.5;

/// Piecewise-linear capacity curve of one frame or a set of parallel frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameCapacity {
    /// Mechanism label
    pub name: String,
    /// Effective seismic mass in t
    pub mass: f64,
    /// Displacement breakpoints in m
    pub disp: Vec<f64>,
    /// Base shear at each breakpoint in kN
    pub base_shear: Vec<f64>,
}

impl FrameCapacity {
    /// Base shear at an arbitrary displacement: linear between breakpoints,
    /// on the elastic ramp before the first, flat past the last
    pub fn base_shear_at(&self, displacement: f64) -> f64 {
        interp_capacity(&self.disp, &self.base_shear, displacement)
    }

    /// Ultimate displacement of the curve
    pub fn ultimate_displacement(&self) -> f64 {
        self.disp.last().copied().unwrap_or(0.0)
    }
}

/// Scaling by a repetition count: `count` identical frames in parallel
impl Mul<f64> for FrameCapacity {
    type Output = FrameCapacity;

    fn mul(mut self, count: f64) -> FrameCapacity {
        self *= count;
        self
    }
}

impl MulAssign<f64> for FrameCapacity {
    fn mul_assign(&mut self, count: f64) {
        for shear in &mut self.base_shear {
            *shear *= count;
        }
        self.mass *= count;
    }
}

/// Superposition of two parallel capacity curves: the union of displacement
/// breakpoints, base shears summed after re-interpolation, masses added
impl Add for FrameCapacity {
    type Output = FrameCapacity;

    fn add(self, other: FrameCapacity) -> FrameCapacity {
        let mut disp: Vec<f64> = self
            .disp
            .iter()
            .chain(other.disp.iter())
            .copied()
            .collect();
        disp.sort_by(|a, b| a.partial_cmp(b).expect("finite displacements"));
        disp.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        let base_shear = disp
            .iter()
            .map(|&x| self.base_shear_at(x) + other.base_shear_at(x))
            .collect();

        FrameCapacity {
            name: self.name,
            mass: self.mass + other.mass,
            disp,
            base_shear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve(name: &str, mass: f64, disp: Vec<f64>, base_shear: Vec<f64>) -> FrameCapacity {
        FrameCapacity {
            name: name.to_string(),
            mass,
            disp,
            base_shear,
        }
    }

    #[test]
    fn scaling_multiplies_shear_and_mass() {
        let scaled = curve("a", 100.0, vec![0.01, 0.05], vec![200.0, 250.0]) * 3.0;
        assert_eq!(scaled.base_shear, vec![600.0, 750.0]);
        assert_relative_eq!(scaled.mass, 300.0);
        assert_eq!(scaled.disp, vec![0.01, 0.05]);
    }

    #[test]
    fn adding_a_curve_to_itself_doubles_it() {
        let a = curve("a", 100.0, vec![0.01, 0.05], vec![200.0, 250.0]);
        let sum = a.clone() + a;
        assert_eq!(sum.disp, vec![0.01, 0.05]);
        assert_eq!(sum.base_shear, vec![400.0, 500.0]);
        assert_relative_eq!(sum.mass, 200.0);
    }

    #[test]
    fn superposition_unions_breakpoints_and_holds_flat() {
        let a = curve("a", 1.0, vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 10.0]);
        let b = curve("b", 1.0, vec![0.0, 1.0], vec![0.0, 5.0]);
        let sum = a + b;
        assert_eq!(sum.disp, vec![0.0, 1.0, 2.0]);
        assert_eq!(sum.base_shear, vec![0.0, 15.0, 15.0]);
        assert_relative_eq!(sum.mass, 2.0);
    }

    #[test]
    fn serializes_to_the_output_record_shape() {
        let a = curve("Mixed Sidesway", 120.5, vec![0.02, 0.08], vec![310.0, 310.0]);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["name"], "Mixed Sidesway");
        assert_eq!(json["mass"], 120.5);
        assert_eq!(json["disp"][1], 0.08);
        assert_eq!(json["base_shear"][0], 310.0);
    }
}
