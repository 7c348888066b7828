//! Frame topology - graph structure and the regular 2D frame model

pub mod graph;
pub mod regular_frame;

pub use graph::{ElementArena, ElementId, Graph};
pub use regular_frame::{FrameInput, RegularFrame, RegularFrameBuilder};
