//! Column sidesway mechanism
//!
//! A soft-storey pattern: every ground column hinges at top and bottom. The
//! overturning moment is the sum of the ground-column capacity moments and
//! the governing rotation is the weakest ground column's, amplified over the
//! first-storey clear height.

use log::info;

use crate::capacity::{FrameCapacity, COLUMN_SWAY_HEIGHT_RATIO};
use crate::error::{SlamaError, SlamaResult};
use crate::section::Direction;
use crate::subassembly::SubassemblyFactory;

/// Capacity curve of the column sidesway mechanism
pub fn column_sidesway(
    factory: &SubassemblyFactory,
    direction: Direction,
) -> SlamaResult<FrameCapacity> {
    let frame = factory.frame();
    let shear_interaction = factory.config().shear_interaction;

    let mut responses = Vec::with_capacity(frame.verticals());
    for vertical in 0..frame.verticals() {
        let node = frame.node_id(0, vertical)?;
        let subassembly = factory.get_subassembly(node)?;
        let column = subassembly
            .above_column
            .ok_or(SlamaError::UnresolvedHierarchy { node })?;
        responses.push((
            column,
            frame.element(column).moment_rotation(
                direction,
                shear_interaction,
                subassembly.axial,
            )?,
        ));
    }

    let overturning_moment: f64 = responses.iter().map(|(_, r)| r.mom_c).sum();
    let yielding_rotation = responses
        .iter()
        .map(|(_, r)| r.rot_y)
        .fold(f64::MAX, f64::min);
    let ultimate_rotation = responses
        .iter()
        .map(|(_, r)| r.rot_c)
        .fold(f64::MAX, f64::min);

    let effective_height = COLUMN_SWAY_HEIGHT_RATIO * frame.total_height();
    let base_shear = overturning_moment / effective_height;
    // the mechanism concentrates in the first storey
    let storey_length = frame.element(responses[0].0).length();

    info!(
        "column sidesway: base shear {:.1} kN over {} ground columns",
        base_shear,
        frame.verticals()
    );

    Ok(FrameCapacity {
        name: "Column Sidesway".to_string(),
        mass: frame.effective_mass(),
        disp: vec![
            yielding_rotation * storey_length,
            ultimate_rotation * storey_length,
        ],
        base_shear: vec![base_shear, base_shear],
    })
}
