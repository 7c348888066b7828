//! Hierarchy-of-strength engine
//!
//! For every candidate failure mode of a subassembly, the capacity-vs-axial
//! curve is intersected with the sway demand line by scalar root-finding
//! seeded at the static axial load. The candidate with the smallest moment in
//! magnitude is the weakest link; its capacity is expressed as an equivalent
//! beam moment so that every subassembly is comparable in the same units.

use serde::{Deserialize, Serialize};

use crate::config::HierarchyVariant;
use crate::element::MomentRotation;
use crate::error::{SlamaError, SlamaResult};
use crate::frame::ElementId;
use crate::math::find_root;
use crate::section::Direction;
use crate::subassembly::{NodeType, Subassembly, SubassemblyFactory};

/// The member (or group) a hierarchy candidate stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementRole {
    LeftBeam,
    RightBeam,
    AboveColumn,
    BelowColumn,
    /// Grouped beams (average/total variants)
    Beam,
    /// Grouped columns (average/total variants)
    Column,
    Joint,
}

impl ElementRole {
    /// Stable name for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ElementRole::LeftBeam => "left beam",
            ElementRole::RightBeam => "right beam",
            ElementRole::AboveColumn => "above column",
            ElementRole::BelowColumn => "below column",
            ElementRole::Beam => "beams",
            ElementRole::Column => "columns",
            ElementRole::Joint => "joint",
        }
    }

    /// Whether the role is a joint panel
    pub fn is_joint(self) -> bool {
        self == ElementRole::Joint
    }
}

/// Result of the weakest-link search on one subassembly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HierarchyOutcome {
    /// Weakest-link capacity as an equivalent beam moment in kNm
    pub beam_eq: f64,
    /// Governing yield rotation in rad
    pub rot_y: f64,
    /// Governing capacity rotation in rad
    pub rot_c: f64,
    /// The winning candidate
    pub weakest: ElementRole,
}

/// A candidate after intersection with the demand line
struct Candidate {
    role: ElementRole,
    /// demand-line moment at the equilibrium axial load
    moment: f64,
    /// equilibrium axial load
    axial: f64,
}

/// Solve the hierarchy of one subassembly for the configured variant.
///
/// Base subassemblies are evaluated directly from their column and never pass
/// through here.
pub(super) fn solve(
    factory: &SubassemblyFactory,
    sub: &Subassembly,
    direction: Direction,
) -> SlamaResult<HierarchyOutcome> {
    if sub.node_type == NodeType::Base {
        return Err(SlamaError::InvalidFrame(format!(
            "hierarchy is not defined for base node {}",
            sub.node
        )));
    }
    match factory.config().hierarchy {
        HierarchyVariant::Single => solve_single(factory, sub, direction),
        HierarchyVariant::Average | HierarchyVariant::Total => {
            solve_grouped(factory, sub, direction)
        }
    }
}

/// Every member and the joint as its own candidate
fn solve_single(
    factory: &SubassemblyFactory,
    sub: &Subassembly,
    direction: Direction,
) -> SlamaResult<HierarchyOutcome> {
    let counter = direction.opposite();
    let conversion = sub.conversion_factor();
    let mut candidates = Vec::with_capacity(5);

    if let Some(beam) = sub.left_beam {
        let capacity = conversion * beam_response(factory, beam, counter)?.mom_c;
        candidates.push(intersect(sub, direction, ElementRole::LeftBeam, |_| capacity)?);
    }
    if let Some(beam) = sub.right_beam {
        let capacity = conversion * beam_response(factory, beam, direction)?.mom_c;
        candidates.push(intersect(sub, direction, ElementRole::RightBeam, |_| capacity)?);
    }
    if let Some(column) = sub.above_column {
        let section = factory.frame().element(column).section().clone();
        candidates.push(intersect(sub, direction, ElementRole::AboveColumn, |n| {
            section.domain_mn(n)
        })?);
    }
    if let Some(column) = sub.below_column {
        let section = factory.frame().element(column).section().clone();
        candidates.push(intersect(sub, direction, ElementRole::BelowColumn, |n| {
            section.domain_mn(n)
        })?);
    }
    candidates.push(intersect(sub, direction, ElementRole::Joint, |n| {
        sub.joint_mn(n)
    })?);

    let weakest = pick_weakest(sub, candidates)?;

    let rotations = match weakest.role {
        ElementRole::Joint => {
            let pair = factory.config().joint.rotation(sub.node_type);
            (pair.yielding, pair.ultimate)
        }
        ElementRole::LeftBeam => {
            let response =
                beam_response(factory, sub.left_beam.expect("candidate exists"), counter)?;
            (response.rot_y, response.rot_c)
        }
        ElementRole::RightBeam => {
            let response =
                beam_response(factory, sub.right_beam.expect("candidate exists"), direction)?;
            (response.rot_y, response.rot_c)
        }
        ElementRole::AboveColumn => {
            let response = column_response(
                factory,
                sub.above_column.expect("candidate exists"),
                counter,
                weakest.axial,
            )?;
            (response.rot_y, response.rot_c)
        }
        ElementRole::BelowColumn => {
            let response = column_response(
                factory,
                sub.below_column.expect("candidate exists"),
                direction,
                weakest.axial,
            )?;
            (response.rot_y, response.rot_c)
        }
        ElementRole::Beam | ElementRole::Column => unreachable!("grouped roles in single variant"),
    };

    Ok(HierarchyOutcome {
        beam_eq: weakest.moment / conversion,
        rot_y: rotations.0,
        rot_c: rotations.1,
        weakest: weakest.role,
    })
}

/// Beams and columns grouped into one candidate each.
///
/// The `Average` and `Total` variants share the capacity grouping and differ
/// only in how the winning group's rotations are combined.
fn solve_grouped(
    factory: &SubassemblyFactory,
    sub: &Subassembly,
    direction: Direction,
) -> SlamaResult<HierarchyOutcome> {
    let counter = direction.opposite();
    let conversion = sub.conversion_factor();
    let beam_count = sub.beam_count() as f64;
    let column_count = sub.column_count() as f64;

    let mut beam_capacity = 0.0;
    if let Some(beam) = sub.left_beam {
        beam_capacity += beam_response(factory, beam, counter)?.mom_c;
    }
    if let Some(beam) = sub.right_beam {
        beam_capacity += beam_response(factory, beam, direction)?.mom_c;
    }
    let beam_capacity = conversion / beam_count * beam_capacity;

    let above_section = sub
        .above_column
        .map(|id| factory.frame().element(id).section().clone());
    let below_section = sub
        .below_column
        .map(|id| factory.frame().element(id).section().clone());
    let column_capacity = |axial: f64| {
        let mut total = 0.0;
        if let Some(section) = &above_section {
            total += section.domain_mn(axial);
        }
        if let Some(section) = &below_section {
            total += section.domain_mn(axial);
        }
        total / column_count
    };

    let candidates = vec![
        intersect(sub, direction, ElementRole::Beam, |_| beam_capacity)?,
        intersect(sub, direction, ElementRole::Column, column_capacity)?,
        intersect(sub, direction, ElementRole::Joint, |n| sub.joint_mn(n))?,
    ];

    let weakest = pick_weakest(sub, candidates)?;
    let average = factory.config().hierarchy == HierarchyVariant::Average;

    let rotations = match weakest.role {
        ElementRole::Joint => {
            let pair = factory.config().joint.rotation(sub.node_type);
            (pair.yielding, pair.ultimate)
        }
        ElementRole::Beam => {
            let mut responses = Vec::with_capacity(2);
            if let Some(beam) = sub.left_beam {
                responses.push(beam_response(factory, beam, counter)?);
            }
            if let Some(beam) = sub.right_beam {
                responses.push(beam_response(factory, beam, direction)?);
            }
            combine_rotations(&responses, average)
        }
        ElementRole::Column => {
            let mut responses = Vec::with_capacity(2);
            if let Some(column) = sub.above_column {
                responses.push(column_response(factory, column, counter, weakest.axial)?);
            }
            if let Some(column) = sub.below_column {
                responses.push(column_response(factory, column, direction, weakest.axial)?);
            }
            combine_rotations(&responses, average)
        }
        _ => unreachable!("single roles in grouped variant"),
    };

    Ok(HierarchyOutcome {
        beam_eq: weakest.moment / conversion,
        rot_y: rotations.0,
        rot_c: rotations.1,
        weakest: weakest.role,
    })
}

/// Rotation combination rule of the grouped variants: the capacity rotation
/// is always governed by the weakest member, the yield rotation is averaged
/// in the `Average` variant and governed in the `Total` one.
fn combine_rotations(responses: &[MomentRotation], average: bool) -> (f64, f64) {
    let rot_c = responses.iter().map(|r| r.rot_c).fold(f64::MAX, f64::min);
    let rot_y = if average {
        responses.iter().map(|r| r.rot_y).sum::<f64>() / responses.len() as f64
    } else {
        responses.iter().map(|r| r.rot_y).fold(f64::MAX, f64::min)
    };
    (rot_y, rot_c)
}

/// Equilibrium of one candidate's capacity curve with the demand line
fn intersect<F: Fn(f64) -> f64>(
    sub: &Subassembly,
    direction: Direction,
    role: ElementRole,
    capacity: F,
) -> SlamaResult<Candidate> {
    let axial = find_root(
        |n| capacity(n) - sub.demand_moment(n, direction),
        sub.axial,
    )
    .ok_or(SlamaError::NoIntersection {
        node: sub.node,
        candidate: role.name(),
    })?;
    Ok(Candidate {
        role,
        moment: sub.demand_moment(axial, direction),
        axial,
    })
}

/// Smallest moment in magnitude wins
fn pick_weakest(sub: &Subassembly, candidates: Vec<Candidate>) -> SlamaResult<Candidate> {
    candidates
        .into_iter()
        .filter(|c| c.moment.is_finite())
        .min_by(|a, b| {
            a.moment
                .abs()
                .partial_cmp(&b.moment.abs())
                .expect("finite moments compare")
        })
        .ok_or(SlamaError::UnresolvedHierarchy { node: sub.node })
}

fn beam_response(
    factory: &SubassemblyFactory,
    element: ElementId,
    direction: Direction,
) -> SlamaResult<MomentRotation> {
    factory.frame().element(element).moment_rotation(
        direction,
        factory.config().shear_interaction,
        0.0,
    )
}

fn column_response(
    factory: &SubassemblyFactory,
    element: ElementId,
    direction: Direction,
    axial: f64,
) -> SlamaResult<MomentRotation> {
    factory.frame().element(element).moment_rotation(
        direction,
        factory.config().shear_interaction,
        axial,
    )
}

/// Rotational secant stiffness of a subassembly in beam-equivalent terms.
///
/// Every member contributes its capacity moment (converted to beam units for
/// columns and the joint) over its yield rotation; the joint yields at the
/// panel cracking rotation. The configured variant combines the member
/// stiffnesses by mean or by minimum.
pub fn subassembly_stiffness(
    factory: &SubassemblyFactory,
    sub: &Subassembly,
    direction: Direction,
) -> SlamaResult<f64> {
    use crate::config::StiffnessVariant;

    if sub.node_type == NodeType::Base {
        return Err(SlamaError::InvalidFrame(format!(
            "stiffness is not defined for base node {}",
            sub.node
        )));
    }

    let counter = direction.opposite();
    let conversion = sub.conversion_factor();
    let mut stiffnesses = Vec::with_capacity(5);

    if let Some(beam) = sub.left_beam {
        let response = beam_response(factory, beam, counter)?;
        stiffnesses.push(response.mom_c / response.rot_y);
    }
    if let Some(beam) = sub.right_beam {
        let response = beam_response(factory, beam, direction)?;
        stiffnesses.push(response.mom_c / response.rot_y);
    }
    if let Some(column) = sub.above_column {
        let section = factory.frame().element(column).section().clone();
        let response = column_response(factory, column, counter, sub.axial)?;
        stiffnesses.push(section.domain_mn(sub.axial) / conversion / response.rot_y);
    }
    if let Some(column) = sub.below_column {
        let section = factory.frame().element(column).section().clone();
        let response = column_response(factory, column, direction, sub.axial)?;
        stiffnesses.push(section.domain_mn(sub.axial) / conversion / response.rot_y);
    }
    let cracking = factory.config().joint.cracking_rotation;
    stiffnesses.push(sub.joint_mn(sub.axial) / conversion / cracking);

    let stiffness = match factory.config().stiffness {
        StiffnessVariant::Average => {
            stiffnesses.iter().sum::<f64>() / stiffnesses.len() as f64
        }
        StiffnessVariant::Lowest => stiffnesses.iter().copied().fold(f64::MAX, f64::min),
    };
    Ok(stiffness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::frame::{FrameInput, RegularFrameBuilder};
    use crate::materials::{Concrete, Steel};
    use crate::section::{Direction, SectionCollection, SectionData};
    use std::rc::Rc;

    fn section_data(id: &str, height: f64, area: f64) -> SectionData {
        SectionData {
            id: id.to_string(),
            height,
            base: 0.3,
            area_top: area,
            area_bot: area,
            cover: 0.04,
            eq_bar_diameter: 0.016,
            area_stirrups: 1.0e-4,
            stirrups_spacing: 0.15,
        }
    }

    fn sections() -> SectionCollection {
        let concrete = Rc::new(Concrete::new("C20", 20e3, 25e6, 0.002, 0.0035));
        let steel = Rc::new(Steel::new("B450C", 450e3, 540e3, 200e6, 0.075));
        let mut collection = SectionCollection::new();
        collection.add_column(section_data("C30x40", 0.4, 8.0e-4), &concrete, &steel);
        collection.add_beam(section_data("B30x50", 0.5, 6.0e-4), &concrete, &steel);
        collection
    }

    fn frame(sections: &SectionCollection) -> crate::frame::RegularFrame {
        let input = FrameInput {
            heights: vec![3.0, 6.0],
            lengths: vec![0.0, 4.5, 9.0],
            masses: vec![50.0, 40.0],
            loads: vec![0.0, 0.0, 0.0, 100.0, 200.0, 100.0, 80.0, 160.0, 80.0],
            columns: vec![vec![0, 0, 0], vec![0, 0, 0]],
            beams: vec![vec![0, 0], vec![0, 0]],
        };
        RegularFrameBuilder::new(input, sections).build().unwrap()
    }

    #[test]
    fn outcomes_are_physically_ordered() {
        let sections = sections();
        let frame = frame(&sections);
        let config = AnalysisConfig::default();
        let factory = SubassemblyFactory::new(&frame, &config);

        for node in frame.verticals()..frame.node_count() {
            let outcome = factory.hierarchy(node, Direction::Positive).unwrap();
            assert!(outcome.beam_eq.is_finite(), "node {node}");
            assert!(outcome.rot_y > 0.0, "node {node}");
            assert!(outcome.rot_y <= outcome.rot_c, "node {node}");
        }
    }

    #[test]
    fn hierarchy_is_memoized() {
        let sections = sections();
        let frame = frame(&sections);
        let config = AnalysisConfig::default();
        let factory = SubassemblyFactory::new(&frame, &config);
        let first = factory.hierarchy(4, Direction::Positive).unwrap();
        let second = factory.hierarchy(4, Direction::Positive).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn base_nodes_are_rejected() {
        let sections = sections();
        let frame = frame(&sections);
        let config = AnalysisConfig::default();
        let factory = SubassemblyFactory::new(&frame, &config);
        assert!(factory.hierarchy(0, Direction::Positive).is_err());
    }

    #[test]
    fn grouped_variants_agree_on_capacity() {
        let sections = sections();
        let frame = frame(&sections);

        let average = AnalysisConfig::with_hierarchy(HierarchyVariant::Average);
        let total = AnalysisConfig::with_hierarchy(HierarchyVariant::Total);
        let factory_avg = SubassemblyFactory::new(&frame, &average);
        let factory_tot = SubassemblyFactory::new(&frame, &total);

        for node in frame.verticals()..frame.node_count() {
            let avg = factory_avg.hierarchy(node, Direction::Positive).unwrap();
            let tot = factory_tot.hierarchy(node, Direction::Positive).unwrap();
            assert_eq!(avg.weakest, tot.weakest, "node {node}");
            assert!((avg.beam_eq - tot.beam_eq).abs() < 1e-9, "node {node}");
            // total takes the governed yield, never above the averaged one
            assert!(tot.rot_y <= avg.rot_y + 1e-12, "node {node}");
            assert_eq!(avg.rot_c, tot.rot_c, "node {node}");
        }
    }

    #[test]
    fn stiffness_lowest_never_exceeds_average() {
        let sections = sections();
        let frame = frame(&sections);
        let average = AnalysisConfig {
            stiffness: crate::config::StiffnessVariant::Average,
            ..AnalysisConfig::default()
        };
        let lowest = AnalysisConfig::default();
        let factory_avg = SubassemblyFactory::new(&frame, &average);
        let factory_low = SubassemblyFactory::new(&frame, &lowest);

        for node in frame.verticals()..frame.node_count() {
            let sub = factory_avg.get_subassembly(node).unwrap();
            let avg =
                subassembly_stiffness(&factory_avg, &sub, Direction::Positive).unwrap();
            let sub = factory_low.get_subassembly(node).unwrap();
            let low =
                subassembly_stiffness(&factory_low, &sub, Direction::Positive).unwrap();
            assert!(low <= avg + 1e-9, "node {node}");
        }
    }
}
