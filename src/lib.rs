//! Simplified lateral mechanism analysis of RC moment frames
//!
//! This library evaluates the seismic lateral capacity of regular
//! reinforced-concrete moment frames with a hierarchy-of-strength
//! (weakest-link) method:
//! - closed-form section capacities (moment-curvature, shear envelope,
//!   axial-moment interaction domain)
//! - member moment-rotation with shear-flexure interaction
//! - a frame graph with deduplicated members and sway-demand geometry
//! - per-joint weakest-link search under axial redistribution
//! - frame-level collapse mechanisms (column, beam, mixed sidesway)
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//! use slama::prelude::*;
//!
//! let concrete = Rc::new(Concrete::new("C20", 20e3, 25e6, 0.002, 0.0035));
//! let steel = Rc::new(Steel::new("B450C", 450e3, 540e3, 200e6, 0.075));
//!
//! let mut sections = SectionCollection::new();
//! sections.add_column(
//!     SectionData {
//!         id: "C30x40".to_string(),
//!         height: 0.4,
//!         base: 0.3,
//!         area_top: 8.0e-4,
//!         area_bot: 8.0e-4,
//!         cover: 0.04,
//!         eq_bar_diameter: 0.016,
//!         area_stirrups: 1.0e-4,
//!         stirrups_spacing: 0.15,
//!     },
//!     &concrete,
//!     &steel,
//! );
//! sections.add_beam(
//!     SectionData {
//!         id: "B30x50".to_string(),
//!         height: 0.5,
//!         base: 0.3,
//!         area_top: 6.0e-4,
//!         area_bot: 6.0e-4,
//!         cover: 0.04,
//!         eq_bar_diameter: 0.016,
//!         area_stirrups: 1.0e-4,
//!         stirrups_spacing: 0.15,
//!     },
//!     &concrete,
//!     &steel,
//! );
//!
//! // one-storey, one-span portal frame
//! let input = FrameInput {
//!     heights: vec![3.0],
//!     lengths: vec![0.0, 5.0],
//!     masses: vec![40.0],
//!     loads: vec![0.0, 0.0, 150.0, 150.0],
//!     columns: vec![vec![0, 0]],
//!     beams: vec![vec![0]],
//! };
//!
//! let frame = RegularFrameBuilder::new(input, &sections).build()?;
//! let config = AnalysisConfig::default();
//! let factory = SubassemblyFactory::new(&frame, &config);
//!
//! let capacity = mixed_sidesway(&factory, Direction::Positive)?;
//! println!("{}", serde_json::to_string(&capacity)?);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod capacity;
pub mod config;
pub mod element;
pub mod error;
pub mod frame;
pub mod materials;
pub mod math;
pub mod section;
pub mod subassembly;

// Re-export common types
pub mod prelude {
    pub use crate::capacity::{
        beam_sidesway, column_sidesway, damaged_sidesway, mixed_sidesway,
        mixed_sidesway_low_yielding, FrameCapacity,
    };
    pub use crate::config::{
        AnalysisConfig, HierarchyVariant, MnDomainAlg, MomentCurvatureAlg, ShearFormula,
        StiffnessVariant,
    };
    pub use crate::element::{Element, FailureMode, MomentRotation};
    pub use crate::error::{SlamaError, SlamaResult};
    pub use crate::frame::{ElementId, FrameInput, RegularFrame, RegularFrameBuilder};
    pub use crate::materials::{Concrete, Steel};
    pub use crate::section::{
        BasicSection, Direction, SectionCollection, SectionData, SectionKind,
    };
    pub use crate::subassembly::{
        ElementRole, HierarchyOutcome, NodeType, Subassembly, SubassemblyFactory,
    };
}
