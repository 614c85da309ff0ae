#![allow(clippy::unwrap_used)]

use std::ops::ControlFlow;

use formwork::kernel::BspKernel;
use formwork::math::Point3;
use formwork::model::{Category, Element, ElementId, ElementSolid, Level, LevelParameter, Model};
use formwork::pipeline::{is_intersecting, run_pipeline, Panel, PanelParameter, ParameterValue};
use formwork::topology::Solid;
use formwork::units::mm_to_feet;
use formwork::FormworkConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Axis-aligned box given in millimetres.
fn block_mm(min: [f64; 3], max: [f64; 3]) -> Solid {
    let pt = |c: [f64; 3]| Point3::new(mm_to_feet(c[0]), mm_to_feet(c[1]), mm_to_feet(c[2]));
    Solid::cuboid(pt(min), pt(max)).unwrap()
}

fn add(model: &mut Model, element: Element, solid: Solid) {
    model.add_element(element, vec![ElementSolid::visible(solid)]);
}

fn run(model: &Model, selection: &[ElementId]) -> Vec<Panel> {
    let output = run_pipeline(
        model,
        &BspKernel::new(),
        selection,
        &FormworkConfig::default(),
        |_| ControlFlow::Continue(()),
    )
    .unwrap();
    assert!(!output.cancelled);
    assert!(output.diagnostics.is_empty());
    output.panels
}

fn panels_of(panels: &[Panel], host: i64) -> Vec<&Panel> {
    panels.iter().filter(|p| p.host_element() == ElementId(host)).collect()
}

#[test]
fn disjoint_boxes_get_untrimmed_panels() {
    init_tracing();
    let a = block_mm([0.0, 0.0, 0.0], [1000.0, 1000.0, 1000.0]);
    let b = block_mm([6000.0, 0.0, 0.0], [7000.0, 1000.0, 1000.0]);
    let kernel = BspKernel::new();
    let config = FormworkConfig::default();
    assert!(!is_intersecting(&kernel, &a, &b, &config.classification));

    let mut model = Model::new();
    add(&mut model, Element::new(ElementId(1), Category::Columns), a);
    add(&mut model, Element::new(ElementId(2), Category::Columns), b);
    let panels = run(&model, &[ElementId(1), ElementId(2)]);

    for host in [1, 2] {
        let own = panels_of(&panels, host);
        assert_eq!(own.len(), 5);
        for panel in own {
            assert!((panel.solid().volume() - panel.extruded_volume()).abs() < 1e-12);
            assert!((panel.area_m2() - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn shared_face_panel_is_trimmed_away() {
    init_tracing();
    let a = block_mm([0.0, 0.0, 0.0], [1000.0, 1000.0, 1000.0]);
    let b = block_mm([1000.0, 0.0, 0.0], [2000.0, 1000.0, 1000.0]);
    let kernel = BspKernel::new();
    let config = FormworkConfig::default();
    assert!(is_intersecting(&kernel, &a, &b, &config.classification));
    assert!(is_intersecting(&kernel, &b, &a, &config.classification));

    let mut model = Model::new();
    add(&mut model, Element::new(ElementId(1), Category::Walls), a);
    add(&mut model, Element::new(ElementId(2), Category::Walls), b);
    let panels = run(&model, &[ElementId(1), ElementId(2)]);

    for (host, toward) in [(1, 1.0), (2, -1.0)] {
        let own = panels_of(&panels, host);
        assert!(!own.is_empty());
        for panel in own {
            assert!(panel.solid().volume() <= panel.extruded_volume() + 1e-9);
            if panel.normal().x * toward > 0.5 {
                assert!(panel.solid().volume() < panel.extruded_volume() - 1e-9);
            }
        }
    }
}

#[test]
fn referenced_level_wins_over_nearest() {
    init_tracing();
    let mut model = Model::new();
    model.add_level(Level::new(ElementId(10), "1F", mm_to_feet(3500.0)));
    model.add_level(Level::new(ElementId(11), "2F", mm_to_feet(4000.0)));
    add(
        &mut model,
        Element::new(ElementId(1), Category::StructuralColumns)
            .with_family_name("RC Column")
            .with_type_name("C600")
            .with_level(LevelParameter::BaseLevel, ElementId(11)),
        block_mm([0.0, 0.0, 3000.0], [600.0, 600.0, 4000.0]),
    );
    let panels = run(&model, &[ElementId(1)]);

    assert!(!panels.is_empty());
    for panel in &panels {
        assert_eq!(panel.level().unwrap().name, "2F");
        let record = panel.parameters();
        let level = record
            .iter()
            .find(|(p, _)| *p == PanelParameter::Level)
            .map(|(_, v)| v.clone());
        assert_eq!(level, Some(ParameterValue::Text(Some("2F".to_owned()))));
        assert!(record.contains(&(
            PanelParameter::Family,
            ParameterValue::Text(Some("RC Column".to_owned()))
        )));
    }
}

#[test]
fn hosted_element_is_folded_into_its_wall() {
    init_tracing();
    let mut model = Model::new();
    add(
        &mut model,
        Element::new(ElementId(1), Category::Walls),
        block_mm([0.0, 0.0, 0.0], [3000.0, 200.0, 2000.0]),
    );
    add(
        &mut model,
        Element::new(ElementId(2), Category::StructuralColumns).with_host(ElementId(1)),
        block_mm([1000.0, 200.0, 0.0], [1400.0, 600.0, 2000.0]),
    );
    let panels = run(&model, &[ElementId(2)]);

    assert!(!panels.is_empty());
    assert!(panels.iter().all(|p| p.host_element() == ElementId(1)));
    assert!(panels.iter().all(|p| p.category() == Category::Walls));
}

#[test]
fn unknown_selection_fails_the_run() {
    let model = Model::new();
    let result = run_pipeline(
        &model,
        &BspKernel::new(),
        &[ElementId(7)],
        &FormworkConfig::default(),
        |_| ControlFlow::Continue(()),
    );
    assert!(result.is_err());
}
