//! Pushover example - capacity curves of a three-storey frame
//!
//! Builds a two-span, three-storey frame, runs every collapse mechanism in
//! both push directions and prints the capacity curves as JSON.

use std::rc::Rc;

use anyhow::{Context, Result};
use slama::prelude::*;

fn section(id: &str, base: f64, height: f64, area: f64) -> SectionData {
    SectionData {
        id: id.to_string(),
        height,
        base,
        area_top: area,
        area_bot: area,
        cover: 0.04,
        eq_bar_diameter: 0.016,
        area_stirrups: 1.0e-4,
        stirrups_spacing: 0.15,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let concrete = Rc::new(Concrete::new("C20/25", 20_000.0, 25.0e6, 0.002, 0.0035));
    let steel = Rc::new(Steel::new("B450C", 450_000.0, 540_000.0, 200.0e6, 0.075));

    let mut sections = SectionCollection::new();
    sections.add_column(section("C30x40", 0.3, 0.4, 8.0e-4), &concrete, &steel);
    sections.add_beam(section("B30x50", 0.3, 0.5, 6.0e-4), &concrete, &steel);

    // two spans of 4.5 m, three storeys of 3.0 m
    let input = FrameInput {
        heights: vec![3.0, 6.0, 9.0],
        lengths: vec![0.0, 4.5, 9.0],
        masses: vec![55.0, 55.0, 45.0],
        loads: vec![
            0.0, 0.0, 0.0, // ground
            120.0, 240.0, 120.0, // first floor
            120.0, 240.0, 120.0, // second floor
            90.0, 180.0, 90.0, // roof
        ],
        columns: vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]],
        beams: vec![vec![0, 0], vec![0, 0], vec![0, 0]],
    };

    let frame = RegularFrameBuilder::new(input, &sections)
        .build()
        .context("building frame")?;
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);

    let mut curves = Vec::new();
    for direction in [Direction::Positive, Direction::Negative] {
        curves.push(column_sidesway(&factory, direction)?);
        curves.push(beam_sidesway(&factory, direction)?);
        curves.push(mixed_sidesway(&factory, direction)?);
        curves.push(mixed_sidesway_low_yielding(&factory, direction)?);
    }
    // capacity left after a 1% interstorey drift
    curves.push(damaged_sidesway(&factory, 0.01, Direction::Positive)?);

    println!("{}", serde_json::to_string_pretty(&curves)?);
    Ok(())
}
