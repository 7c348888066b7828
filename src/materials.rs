//! Material properties
//!
//! Units follow the rest of the crate: stresses in kPa, strains dimensionless.

use serde::{Deserialize, Serialize};

/// Concrete material record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concrete {
    /// Material identifier
    pub id: String,
    /// Cylinder compressive strength in kPa
    pub fc: f64,
    /// Modulus of elasticity in kPa
    pub e_mod: f64,
    /// Strain at peak stress
    pub epsilon_0: f64,
    /// Ultimate compressive strain
    pub epsilon_u: f64,
}

impl Concrete {
    /// Create a new concrete material
    pub fn new(id: &str, fc: f64, e_mod: f64, epsilon_0: f64, epsilon_u: f64) -> Self {
        Self {
            id: id.to_string(),
            fc,
            e_mod,
            epsilon_0,
            epsilon_u,
        }
    }
}

/// Reinforcing steel material record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Steel {
    /// Material identifier
    pub id: String,
    /// Yield strength in kPa
    pub fy: f64,
    /// Ultimate strength in kPa
    pub fu: f64,
    /// Modulus of elasticity in kPa
    pub e_mod: f64,
    /// Ultimate strain
    pub epsilon_u: f64,
}

impl Steel {
    /// Create a new steel material
    pub fn new(id: &str, fy: f64, fu: f64, e_mod: f64, epsilon_u: f64) -> Self {
        Self {
            id: id.to_string(),
            fy,
            fu,
            e_mod,
            epsilon_u,
        }
    }

    /// Yield strain, fy / E
    pub fn epsilon_y(&self) -> f64 {
        self.fy / self.e_mod
    }
}
