//! Damage-adjusted mixed sidesway
//!
//! Capacity of a frame that has already sustained a peak drift. Every
//! resolved node is degraded through ductility-dependent modification
//! factors (Di Ludovico et al. 2013 regressions for plain-bar members;
//! joints lose stiffness only), yield displacements are recomputed from the
//! degraded subassembly stiffnesses, and the curve is evaluated at both the
//! common yield and the ultimate state.

use log::debug;

use crate::capacity::mixed_sway::overturning_moment;
use crate::capacity::{FrameCapacity, SWAY_HEIGHT_RATIO};
use crate::error::{SlamaError, SlamaResult};
use crate::section::Direction;
use crate::subassembly::hierarchy::subassembly_stiffness;
use crate::subassembly::{ElementRole, SubassemblyFactory};

/// Strength, stiffness and residual-drift reduction of one damaged element
#[derive(Debug, Clone, Copy)]
struct ModFactors {
    /// Stiffness ratio damaged/undamaged
    k: f64,
    /// Strength ratio damaged/undamaged
    q: f64,
    /// Residual drift as a fraction of the yield rotation
    res: f64,
}

/// Joints degrade in stiffness only
fn joint_mod_factors(ductility: f64) -> ModFactors {
    ModFactors {
        k: if ductility > 1.0 { 1.0 / ductility } else { 1.0 },
        q: 1.0,
        res: 0.0,
    }
}

/// Beam and column members, plain-bar regressions
fn element_mod_factors(ductility: f64) -> ModFactors {
    ModFactors {
        k: if ductility > 0.9 {
            1.0 - (1.07 - 0.98 * ductility.powf(-0.8))
        } else {
            1.0
        },
        q: if ductility > 4.0 {
            1.0 - 0.03 * (ductility - 4.0)
        } else {
            1.0
        },
        res: if ductility > 2.0 {
            let x = ductility - 2.0;
            0.007 * x * x + 0.3 * x
        } else {
            0.0
        },
    }
}

fn mod_factors(role: ElementRole, ductility: f64) -> ModFactors {
    if role.is_joint() {
        joint_mod_factors(ductility)
    } else {
        element_mod_factors(ductility)
    }
}

#[derive(Debug, Clone, Copy)]
struct DamagedNode {
    moment: f64,
    yielding: f64,
    ultimate: f64,
    /// degraded subassembly stiffness, upper nodes only
    stiffness: f64,
}

/// Capacity curve of the mixed sidesway mechanism after a peak drift
pub fn damaged_sidesway(
    factory: &SubassemblyFactory,
    drift: f64,
    direction: Direction,
) -> SlamaResult<FrameCapacity> {
    let frame = factory.frame();
    let verticals = frame.verticals();
    let shear_interaction = factory.config().shear_interaction;
    let cracking_rotation = factory.config().joint.cracking_rotation;

    let mut nodes = Vec::with_capacity(frame.node_count());

    // ground columns degrade on their own ductility demand
    for vertical in 0..verticals {
        let node = frame.node_id(0, vertical)?;
        let subassembly = factory.get_subassembly(node)?;
        let column = subassembly
            .above_column
            .ok_or(SlamaError::UnresolvedHierarchy { node })?;
        let response = frame.element(column).moment_rotation(
            direction,
            shear_interaction,
            subassembly.axial,
        )?;

        let ductility = drift.abs() / response.rot_y;
        let factors = element_mod_factors(ductility);
        let moment = factors.q * response.mom_c;
        let yielding = response.rot_y * (factors.q / factors.k);
        nodes.push(DamagedNode {
            moment,
            yielding,
            ultimate: response.rot_c - yielding * factors.res,
            stiffness: f64::MAX,
        });
    }

    // upper nodes degrade on the drift left once the rest of the
    // subassembly has deformed elastically
    for node in verticals..frame.node_count() {
        let subassembly = factory.get_subassembly(node)?;
        let outcome = factory.hierarchy(node, direction)?;
        let stiffness = subassembly_stiffness(factory, &subassembly, direction)?;

        let equivalent_yielding = outcome.beam_eq / stiffness;
        let element_yielding = if outcome.weakest.is_joint() {
            cracking_rotation
        } else {
            outcome.rot_y
        };
        let ductility = (drift - equivalent_yielding) / element_yielding + 1.0;
        let factors = mod_factors(outcome.weakest, ductility);

        let ultimate = outcome.rot_c - outcome.rot_y * factors.res;
        let moment = outcome.beam_eq * factors.q;

        let weak_stiffness = if outcome.weakest.is_joint() {
            subassembly.column_count() as f64 * moment / element_yielding
        } else {
            moment / element_yielding
        };
        let softening = (1.0 - factors.k) / factors.k;
        let degraded_stiffness = 1.0
            / (1.0 / stiffness
                + subassembly.beam_count() as f64 / weak_stiffness * softening);

        debug!(
            "node {}: ductility {:.2}, strength ratio {:.3}, stiffness ratio {:.3}",
            node, ductility, factors.q, factors.k
        );

        nodes.push(DamagedNode {
            moment,
            yielding: outcome.rot_y,
            ultimate,
            stiffness: degraded_stiffness,
        });
    }

    // common yield: worst of the base yields and the degraded-stiffness
    // yields of the upper nodes
    let base_yielding = nodes[..verticals]
        .iter()
        .map(|n| n.yielding)
        .fold(f64::MAX, f64::min);
    let top_yielding = nodes[verticals..]
        .iter()
        .map(|n| n.moment / n.stiffness)
        .fold(f64::MAX, f64::min);
    let new_yielding = base_yielding.min(top_yielding);

    // moments consistent with the common yield displacement
    let rescaled: Vec<f64> = nodes
        .iter()
        .enumerate()
        .map(|(node, data)| {
            if node < verticals {
                new_yielding / data.yielding * data.moment
            } else {
                new_yielding * data.stiffness
            }
        })
        .collect();

    let moments: Vec<f64> = nodes.iter().map(|n| n.moment).collect();
    let ultimate_overturning = overturning_moment(factory, &moments, direction)?;
    let yielding_overturning = overturning_moment(factory, &rescaled, direction)?;

    let ultimate_rotation = nodes.iter().map(|n| n.ultimate).fold(f64::MAX, f64::min);
    let effective_height = SWAY_HEIGHT_RATIO * frame.total_height();

    Ok(FrameCapacity {
        name: "Damaged Mixed Sidesway".to_string(),
        mass: frame.effective_mass(),
        disp: vec![
            new_yielding * effective_height,
            ultimate_rotation * effective_height,
        ],
        base_shear: vec![
            yielding_overturning / effective_height,
            ultimate_overturning / effective_height,
        ],
    })
}
