//! Beam-column joint subassemblies
//!
//! A [`Subassembly`] is the joint panel of one node together with its up to
//! four adjoining members. It is derived on demand from the frame by the
//! [`SubassemblyFactory`] and memoized by node id: a subassembly is a pure
//! function of the frame it was built from.

pub mod hierarchy;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{SlamaError, SlamaResult};
use crate::frame::{ElementId, RegularFrame};
use crate::section::Direction;

pub use hierarchy::{ElementRole, HierarchyOutcome};

/// Node classification, derived purely from which neighbours are absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Ground node, no column below
    Base,
    /// Facade node with beams on one side only
    External,
    /// Node with beams on both sides and a column above
    Internal,
    /// Top-floor facade node
    TopExternal,
    /// Top-floor node with beams on both sides
    TopInternal,
}

/// Joint panel geometry, precomputed so the capacity is a scalar function of
/// the axial load
#[derive(Debug, Clone, Copy)]
struct JointPanel {
    /// Column width times column depth in m^2
    area: f64,
    /// Concrete strength of the column below, kPa
    fc: f64,
    /// Tension kj coefficient for this node classification
    kj: f64,
    /// Compression coefficient, applied to fully internal joints only
    compression_k: Option<f64>,
    /// Joint shear to equivalent column moment conversion
    conversion_factor: f64,
}

impl JointPanel {
    /// Joint capacity expressed as an equivalent column moment.
    ///
    /// A negative radicand means the axial demand is outside the feasible
    /// range; the capacity is zero there, not an error.
    fn capacity(&self, axial: f64) -> f64 {
        let tensile_mpa = self.kj * (self.fc * 1e-3).sqrt();
        let radicand = 1.0 + axial * 1e-3 / (self.area * tensile_mpa);
        if radicand < 0.0 {
            return 0.0;
        }
        let tension =
            0.85 * self.area * tensile_mpa * 1e3 * radicand.sqrt() * self.conversion_factor;

        if let Some(k) = self.compression_k {
            let compression_mpa = k * self.fc * 1e-3;
            let radicand = 1.0 - axial * 1e-3 / (self.area * compression_mpa);
            if radicand < 0.0 {
                return 0.0;
            }
            let compression = 0.85
                * self.area
                * compression_mpa
                * 1e3
                * radicand.sqrt()
                * self.conversion_factor;
            return tension.min(compression);
        }
        tension
    }
}

/// One joint region: the node, its members, and the sway demand data
#[derive(Debug)]
pub struct Subassembly {
    /// Node id in the frame
    pub node: usize,
    /// Node classification
    pub node_type: NodeType,
    /// Static gravity axial load on the node in kN
    pub axial: f64,
    /// Axial force change per unit sway-induced column moment
    pub delta_axial: f64,
    /// Half-span tributary beam length in m
    pub beam_length: f64,
    /// Half-storey tributary column length in m
    pub column_length: f64,
    /// Beam towards the previous vertical
    pub left_beam: Option<ElementId>,
    /// Beam towards the next vertical
    pub right_beam: Option<ElementId>,
    /// Column of the storey above
    pub above_column: Option<ElementId>,
    /// Column of the storey below
    pub below_column: Option<ElementId>,
    joint: Option<JointPanel>,
}

impl Subassembly {
    /// Number of columns framing into the node (the below column always
    /// exists for non-base nodes)
    pub fn column_count(&self) -> usize {
        self.above_column.is_some() as usize + self.below_column.is_some() as usize
    }

    /// Number of beams framing into the node
    pub fn beam_count(&self) -> usize {
        self.left_beam.is_some() as usize + self.right_beam.is_some() as usize
    }

    /// Beam-to-column count ratio used to express capacities in common units
    pub fn conversion_factor(&self) -> f64 {
        self.beam_count() as f64 / self.column_count() as f64
    }

    /// Joint panel capacity as an equivalent column moment; base nodes have
    /// no panel and return zero
    pub fn joint_mn(&self, axial: f64) -> f64 {
        self.joint.map_or(0.0, |panel| panel.capacity(axial))
    }

    /// Sway demand line: the column moment that produces a given axial load
    /// on this node.
    ///
    /// Interior nodes carry no axial redistribution; a small epsilon stands
    /// in for the zero sensitivity to keep the line defined.
    pub fn demand_moment(&self, axial: f64, direction: Direction) -> f64 {
        let mut delta_n = self.delta_axial * direction.sign();
        if delta_n == 0.0 {
            delta_n = 1e-6;
        }
        (axial - self.axial) / -delta_n
    }
}

/// Classification from neighbour presence
fn classify(
    below: Option<ElementId>,
    above: Option<ElementId>,
    left: Option<ElementId>,
    right: Option<ElementId>,
) -> NodeType {
    if below.is_none() {
        NodeType::Base
    } else if above.is_none() {
        if left.is_none() || right.is_none() {
            NodeType::TopExternal
        } else {
            NodeType::TopInternal
        }
    } else if left.is_none() || right.is_none() {
        NodeType::External
    } else {
        NodeType::Internal
    }
}

type HierarchyKey = (usize, Direction);

/// Derives and memoizes subassemblies and their hierarchy outcomes for one
/// frame
pub struct SubassemblyFactory<'a> {
    frame: &'a RegularFrame,
    config: &'a AnalysisConfig,
    subassemblies: RefCell<HashMap<usize, Rc<Subassembly>>>,
    hierarchy_cache: RefCell<HashMap<HierarchyKey, HierarchyOutcome>>,
}

impl<'a> SubassemblyFactory<'a> {
    /// Create a factory bound to a frame and a configuration
    pub fn new(frame: &'a RegularFrame, config: &'a AnalysisConfig) -> Self {
        Self {
            frame,
            config,
            subassemblies: RefCell::new(HashMap::new()),
            hierarchy_cache: RefCell::new(HashMap::new()),
        }
    }

    /// The frame this factory derives from
    pub fn frame(&self) -> &RegularFrame {
        self.frame
    }

    /// The analysis configuration in use
    pub fn config(&self) -> &AnalysisConfig {
        self.config
    }

    /// The subassembly of a node, built on first request and shared
    /// afterwards
    pub fn get_subassembly(&self, node: usize) -> SlamaResult<Rc<Subassembly>> {
        if let Some(cached) = self.subassemblies.borrow().get(&node) {
            return Ok(Rc::clone(cached));
        }
        let built = Rc::new(self.build_subassembly(node)?);
        self.subassemblies
            .borrow_mut()
            .insert(node, Rc::clone(&built));
        Ok(built)
    }

    /// Hierarchy-of-strength outcome of a node, memoized per direction
    pub fn hierarchy(
        &self,
        node: usize,
        direction: Direction,
    ) -> SlamaResult<HierarchyOutcome> {
        if let Some(cached) = self.hierarchy_cache.borrow().get(&(node, direction)) {
            return Ok(*cached);
        }
        let subassembly = self.get_subassembly(node)?;
        let outcome = hierarchy::solve(self, &subassembly, direction)?;
        trace!(
            "node {}: weakest {:?}, beam-equivalent moment {:.2} kNm",
            node,
            outcome.weakest,
            outcome.beam_eq
        );
        self.hierarchy_cache
            .borrow_mut()
            .insert((node, direction), outcome);
        Ok(outcome)
    }

    fn build_subassembly(&self, node: usize) -> SlamaResult<Subassembly> {
        let frame = self.frame;
        let verticals = frame.verticals();
        let floor = frame.node_floor(node)?;
        let vertical = frame.node_vertical(node)?;

        let mut left_beam = None;
        let mut right_beam = None;
        let mut above_column = None;
        let mut below_column = None;
        let mut beam_length = 0.0;
        let mut column_length = 0.0;

        for &(neighbour, element) in frame.node_edges(node)? {
            if neighbour == node + verticals {
                above_column = Some(element);
                column_length += 0.5 * frame.interstorey_height(floor)?;
            } else if neighbour + verticals == node {
                below_column = Some(element);
                column_length += 0.5 * frame.interstorey_height(floor - 1)?;
            } else if neighbour + 1 == node {
                left_beam = Some(element);
                beam_length += 0.5 * frame.span_length(vertical - 1)?;
            } else if neighbour == node + 1 {
                right_beam = Some(element);
                beam_length += 0.5 * frame.span_length(vertical)?;
            }
        }

        let node_type = classify(below_column, above_column, left_beam, right_beam);

        // a shared panel formulation requires equal beam depths at internal
        // nodes
        if matches!(node_type, NodeType::Internal | NodeType::TopInternal) {
            let left_depth = self.element_height(left_beam);
            let right_depth = self.element_height(right_beam);
            if (left_depth - right_depth).abs() > 1e-9 {
                return Err(SlamaError::MismatchedBeamDepths { node });
            }
        }

        beam_length = (beam_length * 100.0).round() / 100.0;
        column_length = (column_length * 100.0).round() / 100.0;

        let joint = if node_type == NodeType::Base {
            None
        } else {
            Some(self.build_joint_panel(
                node_type,
                below_column.expect("non-base node has a column below"),
                left_beam,
                right_beam,
                beam_length,
                column_length,
            ))
        };

        Ok(Subassembly {
            node,
            node_type,
            axial: frame.axial(node)?,
            delta_axial: frame.delta_axial(node)?,
            beam_length,
            column_length,
            left_beam,
            right_beam,
            above_column,
            below_column,
            joint,
        })
    }

    fn build_joint_panel(
        &self,
        node_type: NodeType,
        below_column: ElementId,
        left_beam: Option<ElementId>,
        right_beam: Option<ElementId>,
        beam_length: f64,
        column_length: f64,
    ) -> JointPanel {
        let frame = self.frame;
        let column_section = frame.element(below_column).section();
        let column_depth = column_section.height();

        let beam_height = self
            .element_height(left_beam)
            .max(self.element_height(right_beam));
        // effective depth of the governing beam
        let beam_section = right_beam
            .or(left_beam)
            .map(|id| frame.element(id).section().clone())
            .expect("joint panel requires at least one beam");
        let beam_depth = beam_section.height() - beam_section.data().cover;

        let beam_factor = match node_type {
            NodeType::Internal | NodeType::TopInternal => beam_length - column_depth,
            _ => beam_length - 0.5 * column_depth,
        };
        let column_factor = match node_type {
            NodeType::TopInternal | NodeType::TopExternal => column_length - 0.5 * beam_height,
            _ => 0.5 * (column_length - beam_height),
        };
        let conversion_factor = (0.9 * column_factor * beam_length * beam_depth)
            / (column_length * beam_factor - 0.9 * beam_length * beam_depth);

        JointPanel {
            area: column_section.width() * column_depth,
            fc: column_section.concrete().fc,
            kj: self.config.joint.kj(node_type),
            compression_k: (node_type == NodeType::Internal)
                .then_some(self.config.joint.compression_k),
            conversion_factor,
        }
    }

    fn element_height(&self, element: Option<ElementId>) -> f64 {
        element.map_or(0.0, |id| self.frame.element(id).section().height())
    }
}
