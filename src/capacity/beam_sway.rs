//! Beam sidesway mechanism
//!
//! Every beam end hinges while columns stay elastic above the base. The
//! overturning moment collects the ground-column capacities plus the axial
//! force couples that the hinged beams feed into the verticals, summed floor
//! by floor. Beam responses are taken on the bare flexural backbone.

use log::info;

use crate::capacity::{FrameCapacity, SWAY_HEIGHT_RATIO};
use crate::error::{SlamaError, SlamaResult};
use crate::section::Direction;
use crate::subassembly::SubassemblyFactory;

/// Capacity curve of the beam sidesway mechanism
pub fn beam_sidesway(
    factory: &SubassemblyFactory,
    direction: Direction,
) -> SlamaResult<FrameCapacity> {
    let frame = factory.frame();
    let sign = direction.sign();
    let shear_interaction = factory.config().shear_interaction;

    // ground columns at their static axial load
    let mut column_capacity = 0.0;
    for vertical in 0..frame.verticals() {
        let node = frame.node_id(0, vertical)?;
        let subassembly = factory.get_subassembly(node)?;
        let column = subassembly
            .above_column
            .ok_or(SlamaError::UnresolvedHierarchy { node })?;
        column_capacity += frame
            .element(column)
            .moment_rotation(direction, shear_interaction, subassembly.axial)?
            .mom_c;
    }

    // axial force couples shed by the hinged beam ends
    let mut delta_axials = vec![0.0; frame.verticals()];
    let mut yielding_rotations: Vec<f64> = Vec::new();
    let mut ultimate_rotations: Vec<f64> = Vec::new();

    for vertical in 0..frame.verticals() {
        for floor in 0..frame.floors() {
            let node = frame.node_id(floor + 1, vertical)?;
            let subassembly = factory.get_subassembly(node)?;

            for (beam, side) in [
                (subassembly.left_beam, 1.0),
                (subassembly.right_beam, -1.0),
            ] {
                let Some(beam) = beam else { continue };
                let element = frame.element(beam);
                let mut hinge_sum = 0.0;
                for bending in [Direction::Positive, Direction::Negative] {
                    let response = element.moment_rotation(bending, false, 0.0)?;
                    hinge_sum += response.mom_c;
                    yielding_rotations.push(response.rot_y);
                    ultimate_rotations.push(response.rot_c);
                }
                delta_axials[vertical] += side * sign * hinge_sum / element.length();
            }
        }
    }

    let overturning_moment = sign
        * delta_axials
            .iter()
            .zip(frame.lengths())
            .map(|(delta, x)| delta * x)
            .sum::<f64>()
        + column_capacity;

    let effective_height = SWAY_HEIGHT_RATIO * frame.total_height();
    let base_shear = overturning_moment / effective_height;
    let yielding = yielding_rotations.iter().copied().fold(f64::MAX, f64::min);
    let ultimate = ultimate_rotations.iter().copied().fold(f64::MAX, f64::min);

    info!("beam sidesway: base shear {:.1} kN", base_shear);

    Ok(FrameCapacity {
        name: "Beam Sidesway".to_string(),
        mass: frame.effective_mass(),
        disp: vec![yielding * effective_height, ultimate * effective_height],
        base_shear: vec![base_shear, base_shear],
    })
}
