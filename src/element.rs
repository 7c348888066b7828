//! Structural member model - a section with a clear length
//!
//! An [`Element`] turns the section's moment-curvature pair into a
//! moment-rotation backbone and folds the degrading shear envelope into it.
//! Two members with equal (section value, rounded length) are the same
//! element; the frame's element arena hands out one shared instance so the
//! expensive moment-rotation result is computed once.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::SlamaResult;
use crate::math::polyline_intersection;
use crate::section::{BasicSection, Direction, SectionKind};

/// Governing failure mode of a member response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureMode {
    /// Flexural failure, shear capacity never governs
    Moment,
    /// Brittle shear failure in the elastic range
    ShearFragile,
    /// Shear failure after flexural yielding
    ShearDuctile,
}

/// Moment-rotation backbone of a member end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentRotation {
    /// Yielding moment in kNm
    pub mom_y: f64,
    /// Capacity moment in kNm
    pub mom_c: f64,
    /// Yielding rotation in rad
    pub rot_y: f64,
    /// Capping rotation in rad
    pub rot_c: f64,
    /// Governing failure mode
    pub failure: FailureMode,
}

type MrKey = (Direction, bool, i64);

/// A frame member: shared section plus rounded clear length
#[derive(Debug)]
pub struct Element {
    section: Rc<BasicSection>,
    length: f64,
    cache: RefCell<HashMap<MrKey, MomentRotation>>,
}

impl Element {
    /// Create a member; the clear length is rounded to 1e-2 m, the
    /// resolution of the dedup key
    pub fn new(section: Rc<BasicSection>, length: f64) -> Self {
        Self {
            section,
            length: (length * 100.0).round() / 100.0,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Whether this element represents the same physical member type
    pub fn matches(&self, section: &Rc<BasicSection>, length: f64) -> bool {
        *self.section == **section && self.length == (length * 100.0).round() / 100.0
    }

    /// The member's section
    pub fn section(&self) -> &Rc<BasicSection> {
        &self.section
    }

    /// Clear length in m
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Beam or column role, inherited from the section
    pub fn kind(&self) -> SectionKind {
        self.section.kind()
    }

    /// Plastic hinge length of this member
    pub fn plastic_hinge_length(&self) -> f64 {
        self.section.plastic_hinge_length(self.length)
    }

    /// Moment-rotation backbone for the given bending direction and axial
    /// load, optionally limited by the shear capacity envelope.
    ///
    /// Memoized per (direction, interaction flag, axial rounded to 1e-2).
    pub fn moment_rotation(
        &self,
        direction: Direction,
        shear_interaction: bool,
        axial: f64,
    ) -> SlamaResult<MomentRotation> {
        let key = (direction, shear_interaction, (axial * 100.0).round() as i64);
        if let Some(cached) = self.cache.borrow().get(&key) {
            return Ok(*cached);
        }
        let result = self.solve_moment_rotation(direction, shear_interaction, axial)?;
        self.cache.borrow_mut().insert(key, result);
        Ok(result)
    }

    fn solve_moment_rotation(
        &self,
        direction: Direction,
        shear_interaction: bool,
        axial: f64,
    ) -> SlamaResult<MomentRotation> {
        let mc = self.section.moment_curvature(direction, axial)?;
        let hinge = self.section.plastic_hinge_length(self.length);

        let rot_y = mc.phi_y * self.length / 6.0;
        let rot_c = rot_y + hinge * (mc.phi_c - mc.phi_y);
        let flexure = MomentRotation {
            mom_y: mc.mom_y,
            mom_c: mc.mom_c,
            rot_y,
            rot_c,
            failure: FailureMode::Moment,
        };

        if !shear_interaction {
            return Ok(flexure);
        }

        let shear = self.section.shear_capacity(self.length, axial);
        // equivalent moment-rotation form of the shear envelope
        let shear_mom = [
            shear.cap_undamaged * self.length / 2.0,
            shear.cap_residual * self.length / 2.0,
        ];
        let shear_rot = [
            rot_y + (shear.duc_undamaged - 1.0) * hinge * mc.phi_y,
            rot_y + (shear.duc_residual - 1.0) * hinge * mc.phi_y,
        ];

        if shear_mom[1] >= flexure.mom_c {
            // residual shear strength above the flexural capacity
            return Ok(flexure);
        }

        if shear_mom[0] <= flexure.mom_y {
            // brittle failure on the elastic branch
            let moment = shear_mom[0];
            let rotation = moment * flexure.rot_y / flexure.mom_y;
            return Ok(MomentRotation {
                mom_y: moment,
                mom_c: moment,
                rot_y: rotation,
                rot_c: rotation,
                failure: FailureMode::ShearFragile,
            });
        }

        if shear_rot[0] >= flexure.rot_c {
            if shear_mom[0] >= flexure.mom_c {
                // degradation starts beyond the backbone and above it
                return Ok(flexure);
            }
        } else {
            let shear_slope =
                (shear_mom[1] - shear_mom[0]) / (shear_rot[1] - shear_rot[0]);
            let plastic_slope =
                (flexure.mom_c - shear_mom[0]) / (flexure.rot_c - shear_rot[0]);
            if shear_slope >= plastic_slope {
                // envelope degrades away from the backbone
                return Ok(flexure);
            }
        }

        // extend the degrading branch to the capping rotation if it ends short
        let mut env_rot = vec![0.0, shear_rot[0], shear_rot[1]];
        let mut env_mom = vec![shear_mom[0], shear_mom[0], shear_mom[1]];
        if shear_rot[1] <= flexure.rot_c {
            env_rot.push(flexure.rot_c);
            env_mom.push(shear_mom[1]);
        }

        let backbone_rot = [0.0, flexure.rot_y, flexure.rot_c];
        let backbone_mom = [0.0, flexure.mom_y, flexure.mom_c];

        match polyline_intersection(&backbone_rot, &backbone_mom, &env_rot, &env_mom) {
            Some((rotation, moment)) => Ok(MomentRotation {
                mom_y: flexure.mom_y,
                mom_c: moment,
                rot_y: flexure.rot_y,
                rot_c: rotation,
                failure: FailureMode::ShearDuctile,
            }),
            None => Ok(flexure),
        }
    }
}
