//! Node graph with an explicit element arena
//!
//! Edges do not own members: every edge carries an [`ElementId`] into the
//! arena, so all physical members sharing one (section, clear length) pair
//! resolve to a single [`Element`] instance and its memoized responses.

use std::rc::Rc;

use crate::element::Element;
use crate::error::{SlamaError, SlamaResult};
use crate::section::BasicSection;

/// Handle into the element arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// Interning store of frame members
#[derive(Debug, Default)]
pub struct ElementArena {
    elements: Vec<Element>,
}

impl ElementArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a member, reusing an existing element when the (section value,
    /// rounded length) pair is already present
    pub fn intern(&mut self, section: Rc<BasicSection>, length: f64) -> ElementId {
        if let Some(index) = self
            .elements
            .iter()
            .position(|e| e.matches(&section, length))
        {
            return ElementId(index);
        }
        self.elements.push(Element::new(section, length));
        ElementId(self.elements.len() - 1)
    }

    /// Resolve a handle
    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Number of distinct elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the arena holds no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Undirected graph over dense node ids, edges weighted with element handles
#[derive(Debug)]
pub struct Graph {
    adjacency: Vec<Vec<(usize, ElementId)>>,
}

impl Graph {
    /// Graph with `node_count` isolated nodes
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether a node id is defined
    pub fn contains(&self, node: usize) -> bool {
        node < self.adjacency.len()
    }

    /// Connect two nodes with a member (both directions)
    pub fn add_edge(&mut self, i_node: usize, j_node: usize, element: ElementId) {
        self.adjacency[i_node].push((j_node, element));
        self.adjacency[j_node].push((i_node, element));
    }

    /// Members incident to a node as (neighbour, element) pairs
    pub fn node_edges(&self, node: usize) -> SlamaResult<&[(usize, ElementId)]> {
        self.adjacency
            .get(node)
            .map(|edges| edges.as_slice())
            .ok_or(SlamaError::NodeNotFound(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Concrete, Steel};
    use crate::section::{SectionData, SectionKind};

    fn section() -> Rc<BasicSection> {
        let concrete = Rc::new(Concrete::new("C20", 20e3, 25e6, 0.002, 0.0035));
        let steel = Rc::new(Steel::new("B450C", 450e3, 540e3, 200e6, 0.075));
        Rc::new(BasicSection::new(
            SectionData {
                id: "C30x30".to_string(),
                height: 0.3,
                base: 0.3,
                area_top: 4.0e-4,
                area_bot: 4.0e-4,
                cover: 0.04,
                eq_bar_diameter: 0.016,
                area_stirrups: 1.0e-4,
                stirrups_spacing: 0.15,
            },
            concrete,
            steel,
            SectionKind::Column,
        ))
    }

    #[test]
    fn arena_reuses_equal_members() {
        let mut arena = ElementArena::new();
        let sec = section();
        let first = arena.intern(Rc::clone(&sec), 2.70);
        let second = arena.intern(Rc::clone(&sec), 2.7004);
        let third = arena.intern(sec, 3.0);
        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn edges_are_undirected() {
        let mut arena = ElementArena::new();
        let id = arena.intern(section(), 2.7);
        let mut graph = Graph::new(4);
        graph.add_edge(0, 2, id);
        assert_eq!(graph.node_edges(0).unwrap(), &[(2, id)]);
        assert_eq!(graph.node_edges(2).unwrap(), &[(0, id)]);
        assert!(graph.node_edges(7).is_err());
    }
}
