//! Analysis configuration - algorithm choices and numeric constants
//!
//! A single immutable [`AnalysisConfig`] value is built once at program start
//! and passed by reference into the subassembly factory and the mechanism
//! functions. There is no process-wide configuration state.

use serde::{Deserialize, Serialize};

use crate::subassembly::NodeType;

/// Moment-curvature solution algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentCurvatureAlg {
    /// Closed-form rectangular stress-block solution
    StressBlock,
}

/// Shear capacity formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShearFormula {
    /// NZSEE 2017 assessment guidelines, additive concrete/steel/axial model
    Nzsee2017,
}

/// Axial-moment interaction domain algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MnDomainAlg {
    /// Four control points, linearly interpolated
    FourPoints,
}

/// How multiple members of a subassembly are combined into hierarchy candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HierarchyVariant {
    /// Every member and the joint is its own candidate
    Single,
    /// Beams and columns grouped; mean yield rotation, min capacity rotation
    Average,
    /// Beams and columns grouped; min yield rotation, min capacity rotation
    Total,
}

/// How member stiffnesses are combined into a subassembly stiffness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StiffnessVariant {
    /// Arithmetic mean of the member stiffnesses
    Average,
    /// Weakest member governs
    Lowest,
}

/// Yield/ultimate rotation capacity pair for a joint panel
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RotationPair {
    pub yielding: f64,
    pub ultimate: f64,
}

/// Joint panel constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointConfig {
    /// Tension kj coefficient for internal nodes
    pub kj_internal: f64,
    /// Tension kj coefficient for external nodes
    pub kj_external: f64,
    /// Tension kj coefficient for top-floor nodes (internal and external)
    pub kj_top: f64,
    /// Compression strength coefficient for fully internal joints
    pub compression_k: f64,
    /// Rotation capacities of external joints
    pub external_rotation: RotationPair,
    /// Rotation capacities of internal joints
    pub internal_rotation: RotationPair,
    /// Panel cracking rotation, used as the joint yield measure for stiffness
    pub cracking_rotation: f64,
}

impl JointConfig {
    /// Tension kj coefficient for a node classification.
    ///
    /// Base nodes have no joint panel; asking for their kj is a logic error.
    pub fn kj(&self, node_type: NodeType) -> f64 {
        match node_type {
            NodeType::Internal => self.kj_internal,
            NodeType::External => self.kj_external,
            NodeType::TopInternal | NodeType::TopExternal => self.kj_top,
            NodeType::Base => f64::NAN,
        }
    }

    /// Rotation capacities for a joint of the given classification
    pub fn rotation(&self, node_type: NodeType) -> RotationPair {
        match node_type {
            NodeType::External | NodeType::TopExternal => self.external_rotation,
            _ => self.internal_rotation,
        }
    }
}

/// Full analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Moment-curvature algorithm
    pub moment_curvature: MomentCurvatureAlg,
    /// Shear capacity formulation
    pub shear_formula: ShearFormula,
    /// Interaction domain algorithm
    pub mn_domain: MnDomainAlg,
    /// Account for shear-flexure interaction in member responses
    pub shear_interaction: bool,
    /// Hierarchy candidate grouping
    pub hierarchy: HierarchyVariant,
    /// Subassembly stiffness combination
    pub stiffness: StiffnessVariant,
    /// Joint panel constants
    pub joint: JointConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            moment_curvature: MomentCurvatureAlg::StressBlock,
            shear_formula: ShearFormula::Nzsee2017,
            mn_domain: MnDomainAlg::FourPoints,
            shear_interaction: true,
            hierarchy: HierarchyVariant::Single,
            stiffness: StiffnessVariant::Lowest,
            joint: JointConfig {
                kj_internal: 0.8,
                kj_external: 0.2,
                kj_top: 0.42,
                compression_k: 0.3,
                external_rotation: RotationPair {
                    yielding: 0.005,
                    ultimate: 0.01,
                },
                internal_rotation: RotationPair {
                    yielding: 0.0075,
                    ultimate: 0.015,
                },
                cracking_rotation: 0.002,
            },
        }
    }
}

impl AnalysisConfig {
    /// Configuration with a given hierarchy variant, defaults elsewhere
    pub fn with_hierarchy(hierarchy: HierarchyVariant) -> Self {
        Self {
            hierarchy,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kj_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.joint.kj(NodeType::Internal), 0.8);
        assert_eq!(config.joint.kj(NodeType::External), 0.2);
        assert_eq!(config.joint.kj(NodeType::TopExternal), 0.42);
        assert!(config.joint.kj(NodeType::Base).is_nan());
    }

    #[test]
    fn joint_rotations_by_classification() {
        let config = AnalysisConfig::default();
        let external = config.joint.rotation(NodeType::TopExternal);
        let internal = config.joint.rotation(NodeType::Internal);
        assert!(external.yielding < internal.yielding);
        assert!(external.ultimate < internal.ultimate);
    }
}
