//! Regular 2D frame model
//!
//! The frame is built once from validated geometry and is immutable
//! afterwards. Node ids are dense integers `floor * verticals + vertical`,
//! floor 0 being the ground. Member clear lengths are net of the intersecting
//! member depths: columns lose the depth of the governing adjoining beam,
//! beams lose half the depth of each adjoining column.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{SlamaError, SlamaResult};
use crate::frame::graph::{ElementArena, ElementId, Graph};
use crate::section::SectionCollection;

/// Validated frame geometry record.
///
/// `heights` are cumulative floor heights without the ground level;
/// `lengths` are cumulative vertical positions starting at 0. `columns` and
/// `beams` hold per-floor positional section tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInput {
    /// Cumulative floor heights in m
    pub heights: Vec<f64>,
    /// Cumulative vertical positions in m
    pub lengths: Vec<f64>,
    /// Per-floor seismic masses in t
    pub masses: Vec<f64>,
    /// Per-node gravity loads in kN
    pub loads: Vec<f64>,
    /// Column section tags, one row per floor
    pub columns: Vec<Vec<usize>>,
    /// Beam section tags, one row per floor
    pub beams: Vec<Vec<usize>>,
}

/// Immutable graph model of a regular frame
#[derive(Debug)]
pub struct RegularFrame {
    heights: Vec<f64>,
    lengths: Vec<f64>,
    masses: Vec<f64>,
    loads: Vec<f64>,
    graph: Graph,
    arena: ElementArena,
}

impl RegularFrame {
    /// Number of verticals (column lines)
    pub fn verticals(&self) -> usize {
        self.lengths.len()
    }

    /// Number of spans
    pub fn spans(&self) -> usize {
        self.lengths.len() - 1
    }

    /// Number of floors above ground
    pub fn floors(&self) -> usize {
        self.heights.len()
    }

    /// Total node count, ground included
    pub fn node_count(&self) -> usize {
        self.verticals() * (self.floors() + 1)
    }

    /// Total frame height in m
    pub fn total_height(&self) -> f64 {
        *self.heights.last().expect("frame has at least one floor")
    }

    /// Total frame length in m
    pub fn total_length(&self) -> f64 {
        *self.lengths.last().expect("frame has at least one vertical")
    }

    /// Cumulative vertical positions
    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Node id from grid position
    pub fn node_id(&self, floor: usize, vertical: usize) -> SlamaResult<usize> {
        if floor > self.floors() {
            return Err(SlamaError::FloorNotFound(floor));
        }
        if vertical > self.spans() {
            return Err(SlamaError::NodeNotFound(vertical));
        }
        Ok(floor * self.verticals() + vertical)
    }

    /// Floor index of a node
    pub fn node_floor(&self, node: usize) -> SlamaResult<usize> {
        if !self.graph.contains(node) {
            return Err(SlamaError::NodeNotFound(node));
        }
        Ok(node / self.verticals())
    }

    /// Vertical index of a node
    pub fn node_vertical(&self, node: usize) -> SlamaResult<usize> {
        if !self.graph.contains(node) {
            return Err(SlamaError::NodeNotFound(node));
        }
        Ok(node % self.verticals())
    }

    /// Interstorey height of a storey, ground storey included
    pub fn interstorey_height(&self, floor: usize) -> SlamaResult<f64> {
        if floor >= self.floors() {
            return Err(SlamaError::FloorNotFound(floor));
        }
        if floor == 0 {
            Ok(self.heights[0])
        } else {
            Ok(self.heights[floor] - self.heights[floor - 1])
        }
    }

    /// Span length by span index
    pub fn span_length(&self, span: usize) -> SlamaResult<f64> {
        if span >= self.spans() {
            return Err(SlamaError::SpanNotFound(span));
        }
        Ok(self.lengths[span + 1] - self.lengths[span])
    }

    /// Members incident to a node as (neighbour, element) pairs
    pub fn node_edges(&self, node: usize) -> SlamaResult<&[(usize, ElementId)]> {
        self.graph.node_edges(node)
    }

    /// Resolve an element handle
    pub fn element(&self, id: ElementId) -> &Element {
        self.arena.get(id)
    }

    /// Number of distinct elements in the frame
    pub fn element_count(&self) -> usize {
        self.arena.len()
    }

    /// Total gravity axial force on a node: the column of loads above it,
    /// rounded to 1e-2 kN
    pub fn axial(&self, node: usize) -> SlamaResult<f64> {
        if !self.graph.contains(node) {
            return Err(SlamaError::NodeNotFound(node));
        }
        let total: f64 = self
            .loads
            .iter()
            .skip(node)
            .step_by(self.verticals())
            .sum();
        Ok((total * 100.0).round() / 100.0)
    }

    /// Linear-with-height lateral force distribution: the share of the base
    /// shear applied at each floor, `m_i h_i / sum(m h)`
    pub fn floor_forces_distribution(&self) -> Vec<f64> {
        let force_height: f64 = self
            .masses
            .iter()
            .zip(&self.heights)
            .map(|(m, h)| m * h)
            .sum();
        self.masses
            .iter()
            .zip(&self.heights)
            .map(|(m, h)| m * h / force_height)
            .collect()
    }

    /// Delta-axial sensitivity of a node: column axial force change per unit
    /// column moment induced by lateral sway.
    ///
    /// Exterior verticals pick up the overturning couple; interior nodes see
    /// no net axial redistribution and return 0.
    pub fn delta_axial(&self, node: usize) -> SlamaResult<f64> {
        let vertical = self.node_vertical(node)?;
        let (influence_length, sign) = if vertical == 0 {
            (self.span_length(0)? / 2.0, 1.0)
        } else if vertical == self.spans() {
            (self.span_length(self.spans() - 1)? / 2.0, -1.0)
        } else {
            return Ok(0.0);
        };

        // storey below the node; base nodes read the ground storey
        let floor = self.node_floor(node)?.saturating_sub(1).min(self.floors() - 1);
        let distribution = self.floor_forces_distribution();
        let floor_shear: f64 = distribution[floor..].iter().sum();
        let storey_height = self.interstorey_height(floor)?;

        let overturning: f64 = distribution[floor..]
            .iter()
            .zip(&self.heights[floor..])
            .map(|(f, h)| f * h)
            .sum();
        let delta_n = sign * (overturning - 0.5 * storey_height * floor_shear)
            / self.total_length();
        let column_moment =
            0.5 * floor_shear * storey_height * influence_length / self.total_length();
        Ok(delta_n / column_moment)
    }

    /// Effective seismic mass of the equivalent single-degree-of-freedom
    /// system, with a height-proportional displacement shape
    pub fn effective_mass(&self) -> f64 {
        let top = self.total_height();
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (mass, height) in self.masses.iter().zip(&self.heights) {
            let shape = height / top;
            numerator += mass * shape;
            denominator += mass * shape * shape;
        }
        numerator * numerator / denominator
    }
}

/// Builds a [`RegularFrame`] from a validated input record and a section
/// collection
pub struct RegularFrameBuilder<'a> {
    input: FrameInput,
    sections: &'a SectionCollection,
}

impl<'a> RegularFrameBuilder<'a> {
    /// Create a builder
    pub fn new(input: FrameInput, sections: &'a SectionCollection) -> Self {
        Self { input, sections }
    }

    /// Build the frame graph, interning one element per distinct
    /// (section, clear length) pair
    pub fn build(self) -> SlamaResult<RegularFrame> {
        self.check_dimensions()?;

        let verticals = self.input.lengths.len();
        let floors = self.input.heights.len();
        let node_count = verticals * (floors + 1);

        let mut graph = Graph::new(node_count);
        let mut arena = ElementArena::new();

        for floor in 0..floors {
            for span in 0..verticals - 1 {
                let length = self.beam_clear_length(floor, span)?;
                let tag = self.input.beams[floor][span];
                let element = arena.intern(self.sections.beam(tag)?.clone(), length);
                let node = span + (floor + 1) * verticals;
                graph.add_edge(node, node + 1, element);
            }
            for vertical in 0..verticals {
                let length = self.column_clear_length(floor, vertical)?;
                let tag = self.input.columns[floor][vertical];
                let element = arena.intern(self.sections.column(tag)?.clone(), length);
                let node = vertical + floor * verticals;
                graph.add_edge(node, node + verticals, element);
            }
        }

        debug!(
            "frame built: {} nodes, {} distinct elements",
            node_count,
            arena.len()
        );

        Ok(RegularFrame {
            heights: self.input.heights,
            lengths: self.input.lengths,
            masses: self.input.masses,
            loads: self.input.loads,
            graph,
            arena,
        })
    }

    fn check_dimensions(&self) -> SlamaResult<()> {
        let input = &self.input;
        let verticals = input.lengths.len();
        let floors = input.heights.len();
        if verticals < 2 {
            return Err(SlamaError::InvalidFrame(
                "frame needs at least two verticals".to_string(),
            ));
        }
        if floors == 0 {
            return Err(SlamaError::InvalidFrame(
                "frame needs at least one floor".to_string(),
            ));
        }
        if input.masses.len() != floors {
            return Err(SlamaError::InvalidFrame(format!(
                "{} masses for {} floors",
                input.masses.len(),
                floors
            )));
        }
        let node_count = verticals * (floors + 1);
        if input.loads.len() != node_count {
            return Err(SlamaError::InvalidFrame(format!(
                "{} loads for {} nodes",
                input.loads.len(),
                node_count
            )));
        }
        let column_tags: usize = input.columns.iter().map(Vec::len).sum();
        if input.columns.len() != floors || column_tags != verticals * floors {
            return Err(SlamaError::InvalidFrame(format!(
                "{} column tags for {} columns",
                column_tags,
                verticals * floors
            )));
        }
        let beam_tags: usize = input.beams.iter().map(Vec::len).sum();
        if input.beams.len() != floors || beam_tags != (verticals - 1) * floors {
            return Err(SlamaError::InvalidFrame(format!(
                "{} beam tags for {} beams",
                beam_tags,
                (verticals - 1) * floors
            )));
        }
        Ok(())
    }

    /// Storey height minus the depth of the governing adjoining beam
    fn column_clear_length(&self, floor: usize, vertical: usize) -> SlamaResult<f64> {
        let storey_height = if floor == 0 {
            self.input.heights[0]
        } else {
            self.input.heights[floor] - self.input.heights[floor - 1]
        };
        let spans = self.input.lengths.len() - 1;
        let beam_depth = if vertical == 0 {
            self.beam_depth(floor, 0)?
        } else if vertical == spans {
            self.beam_depth(floor, spans - 1)?
        } else {
            self.beam_depth(floor, vertical)?
                .max(self.beam_depth(floor, vertical - 1)?)
        };
        Ok(storey_height - beam_depth)
    }

    /// Span length minus half the depth of each adjoining column
    fn beam_clear_length(&self, floor: usize, span: usize) -> SlamaResult<f64> {
        let span_length = self.input.lengths[span + 1] - self.input.lengths[span];
        let left = self.column_depth(floor, span)?;
        let right = self.column_depth(floor, span + 1)?;
        Ok(span_length - 0.5 * (left + right))
    }

    fn beam_depth(&self, floor: usize, span: usize) -> SlamaResult<f64> {
        let tag = self.input.beams[floor][span];
        Ok(self.sections.beam(tag)?.height())
    }

    fn column_depth(&self, floor: usize, vertical: usize) -> SlamaResult<f64> {
        let tag = self.input.columns[floor][vertical];
        Ok(self.sections.column(tag)?.height())
    }
}
