//! End-to-end scenario tests on small frames

use std::rc::Rc;

use approx::assert_relative_eq;
use slama::math::find_root;
use slama::prelude::*;

fn materials() -> (Rc<Concrete>, Rc<Steel>) {
    (
        Rc::new(Concrete::new("C20/25", 20_000.0, 25.0e6, 0.002, 0.0035)),
        Rc::new(Steel::new("B450C", 450_000.0, 540_000.0, 200.0e6, 0.075)),
    )
}

fn section(id: &str, base: f64, height: f64, area_top: f64, area_bot: f64) -> SectionData {
    SectionData {
        id: id.to_string(),
        height,
        base,
        area_top,
        area_bot,
        cover: 0.04,
        eq_bar_diameter: 0.016,
        area_stirrups: 1.0e-4,
        stirrups_spacing: 0.15,
    }
}

/// symmetric single-span, single-storey portal frame
fn portal_sections() -> SectionCollection {
    let (concrete, steel) = materials();
    let mut sections = SectionCollection::new();
    sections.add_column(section("C30x40", 0.3, 0.4, 8.0e-4, 8.0e-4), &concrete, &steel);
    sections.add_beam(section("B30x50", 0.3, 0.5, 6.0e-4, 6.0e-4), &concrete, &steel);
    sections
}

fn portal_input() -> FrameInput {
    FrameInput {
        heights: vec![3.0],
        lengths: vec![0.0, 5.0],
        masses: vec![40.0],
        loads: vec![0.0, 0.0, 150.0, 150.0],
        columns: vec![vec![0, 0]],
        beams: vec![vec![0]],
    }
}

/// two-span, three-storey frame with uniform members
fn three_storey_sections() -> SectionCollection {
    let (concrete, steel) = materials();
    let mut sections = SectionCollection::new();
    sections.add_column(section("C30x40", 0.3, 0.4, 8.0e-4, 8.0e-4), &concrete, &steel);
    sections.add_beam(section("B30x50", 0.3, 0.5, 6.0e-4, 4.0e-4), &concrete, &steel);
    sections
}

fn three_storey_input() -> FrameInput {
    FrameInput {
        heights: vec![3.0, 6.0, 9.0],
        lengths: vec![0.0, 4.5, 9.0],
        masses: vec![55.0, 55.0, 45.0],
        loads: vec![
            0.0, 0.0, 0.0, 120.0, 240.0, 120.0, 120.0, 240.0, 120.0, 90.0, 180.0, 90.0,
        ],
        columns: vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]],
        beams: vec![vec![0, 0], vec![0, 0], vec![0, 0]],
    }
}

#[test]
fn symmetric_portal_frame_pushes_equally_both_ways() {
    let sections = portal_sections();
    let frame = RegularFrameBuilder::new(portal_input(), &sections)
        .build()
        .unwrap();
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);

    let positive = mixed_sidesway(&factory, Direction::Positive).unwrap();
    let negative = mixed_sidesway(&factory, Direction::Negative).unwrap();

    assert_relative_eq!(
        positive.base_shear[0],
        negative.base_shear[0],
        max_relative = 1e-9
    );
    assert_relative_eq!(positive.disp[0], negative.disp[0], max_relative = 1e-9);
    assert_relative_eq!(positive.disp[1], negative.disp[1], max_relative = 1e-9);
    assert!(positive.base_shear[0] > 0.0);
}

#[test]
fn column_sidesway_equals_ground_moments_over_half_height() {
    let sections = portal_sections();
    let frame = RegularFrameBuilder::new(portal_input(), &sections)
        .build()
        .unwrap();
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);

    let capacity = column_sidesway(&factory, Direction::Positive).unwrap();

    let mut moment_sum = 0.0;
    for vertical in 0..frame.verticals() {
        let subassembly = factory.get_subassembly(vertical).unwrap();
        let column = subassembly.above_column.unwrap();
        moment_sum += frame
            .element(column)
            .moment_rotation(Direction::Positive, true, subassembly.axial)
            .unwrap()
            .mom_c;
    }

    let expected = moment_sum / (0.5 * frame.total_height());
    assert_relative_eq!(capacity.base_shear[0], expected, max_relative = 1e-12);
    assert_relative_eq!(capacity.base_shear[1], expected, max_relative = 1e-12);
}

#[test]
fn weakest_link_agrees_with_brute_force_candidates() {
    let sections = three_storey_sections();
    let frame = RegularFrameBuilder::new(three_storey_input(), &sections)
        .build()
        .unwrap();
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);
    let direction = Direction::Positive;
    let counter = direction.opposite();

    for node in frame.verticals()..frame.node_count() {
        let sub = factory.get_subassembly(node).unwrap();
        let outcome = factory.hierarchy(node, direction).unwrap();
        let conversion = sub.beam_count() as f64 / sub.column_count() as f64;
        let demand = |n: f64| sub.demand_moment(n, direction);

        // every candidate capacity curve, exactly as the engine builds them
        let mut curves: Vec<Box<dyn Fn(f64) -> f64>> = Vec::new();
        if let Some(beam) = sub.left_beam {
            let cap = conversion
                * frame
                    .element(beam)
                    .moment_rotation(counter, true, 0.0)
                    .unwrap()
                    .mom_c;
            curves.push(Box::new(move |_| cap));
        }
        if let Some(beam) = sub.right_beam {
            let cap = conversion
                * frame
                    .element(beam)
                    .moment_rotation(direction, true, 0.0)
                    .unwrap()
                    .mom_c;
            curves.push(Box::new(move |_| cap));
        }
        if let Some(column) = sub.above_column {
            let section = frame.element(column).section().clone();
            curves.push(Box::new(move |n| section.domain_mn(n)));
        }
        let below = frame.element(sub.below_column.unwrap()).section().clone();
        curves.push(Box::new(move |n| below.domain_mn(n)));
        let joint_sub = Rc::clone(&sub);
        curves.push(Box::new(move |n| joint_sub.joint_mn(n)));

        let minimum = curves
            .iter()
            .filter_map(|curve| find_root(|n| curve(n) - demand(n), sub.axial))
            .map(|axial| demand(axial).abs())
            .fold(f64::MAX, f64::min);

        assert_relative_eq!(
            (outcome.beam_eq * conversion).abs(),
            minimum,
            max_relative = 1e-6
        );
    }
}

#[test]
fn elements_are_shared_across_the_frame() {
    let sections = three_storey_sections();
    let frame = RegularFrameBuilder::new(three_storey_input(), &sections)
        .build()
        .unwrap();
    // 9 columns and 6 beams, all with equal sections and clear lengths
    assert_eq!(frame.element_count(), 2);
}

#[test]
fn subassemblies_are_memoized_per_node() {
    let sections = three_storey_sections();
    let frame = RegularFrameBuilder::new(three_storey_input(), &sections)
        .build()
        .unwrap();
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);
    let first = factory.get_subassembly(4).unwrap();
    let second = factory.get_subassembly(4).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn mechanisms_yield_before_they_cap() {
    let sections = three_storey_sections();
    let frame = RegularFrameBuilder::new(three_storey_input(), &sections)
        .build()
        .unwrap();
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);

    for capacity in [
        column_sidesway(&factory, Direction::Positive).unwrap(),
        beam_sidesway(&factory, Direction::Positive).unwrap(),
        mixed_sidesway(&factory, Direction::Positive).unwrap(),
    ] {
        assert!(capacity.base_shear[0] > 0.0, "{}", capacity.name);
        assert!(capacity.disp[0] < capacity.disp[1], "{}", capacity.name);
        assert!(capacity.mass > 0.0, "{}", capacity.name);
    }
}

#[test]
fn rescaled_yield_shear_never_exceeds_ultimate() {
    let sections = three_storey_sections();
    let frame = RegularFrameBuilder::new(three_storey_input(), &sections)
        .build()
        .unwrap();
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);

    let capacity = mixed_sidesway_low_yielding(&factory, Direction::Positive).unwrap();
    assert!(capacity.base_shear[0] <= capacity.base_shear[1] + 1e-9);
    assert!(capacity.disp[0] <= capacity.disp[1]);
}

#[test]
fn damage_never_raises_the_ultimate_base_shear() {
    let sections = three_storey_sections();
    let frame = RegularFrameBuilder::new(three_storey_input(), &sections)
        .build()
        .unwrap();
    let config = AnalysisConfig::default();
    let factory = SubassemblyFactory::new(&frame, &config);

    let pristine = mixed_sidesway(&factory, Direction::Positive).unwrap();
    let damaged = damaged_sidesway(&factory, 0.02, Direction::Positive).unwrap();
    assert!(damaged.base_shear[1] <= pristine.base_shear[0] + 1e-9);
}

#[test]
fn hierarchy_variants_all_resolve_the_frame() {
    let sections = three_storey_sections();
    let frame = RegularFrameBuilder::new(three_storey_input(), &sections)
        .build()
        .unwrap();

    for variant in [
        HierarchyVariant::Single,
        HierarchyVariant::Average,
        HierarchyVariant::Total,
    ] {
        let config = AnalysisConfig::with_hierarchy(variant);
        let factory = SubassemblyFactory::new(&frame, &config);
        let capacity = mixed_sidesway(&factory, Direction::Positive).unwrap();
        assert!(capacity.base_shear[0] > 0.0, "{variant:?}");
    }
}
