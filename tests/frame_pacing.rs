use std::io::Write;

use simview::controller::{
    ControlHook, InputEvent, NullHook, PointMassEngine, Viewer,
};
use simview::model::{Mechanism, SimState};

const TWO_BODY: &str = r#"{
    "name": "two_body",
    "timestep": 0.002,
    "bodies": [
        {"name": "anchor", "mass": 1.0, "pos": [0.0, 1.0, 0.0], "stiffness": 50.0},
        {"name": "weight", "mass": 0.5, "pos": [0.6, 1.0, 0.0], "vel": [0.0, 0.0, 0.4]}
    ]
}"#;

fn load_two_body() -> (Mechanism, SimState) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TWO_BODY.as_bytes()).unwrap();
    Mechanism::load(file.path()).unwrap()
}

struct CountingHook {
    steps: std::rc::Rc<std::cell::Cell<usize>>,
}

impl ControlHook for CountingHook {
    fn compute_actuation(&mut self, _: &Mechanism, _: &SimState, _: &mut [f64]) {
        self.steps.set(self.steps.get() + 1);
    }
}

#[test]
fn one_frame_budget_runs_whole_substeps() {
    let (model, state) = load_two_body();
    let budget = 1.0 / 60.0;
    let mut viewer = Viewer::new(
        model,
        state,
        Box::new(PointMassEngine::new()),
        budget,
        Box::new(NullHook),
    );

    let steps = viewer.advance_frame().unwrap();

    // 1/60 s at 1/500 s per sub-step needs at least 8.33 sub-steps; the
    // scheduler rounds up to whole steps and never starts the next frame's
    // budget early.
    assert!(steps >= 8, "took {steps} sub-steps");
    assert!(viewer.state.time >= budget);
    assert!(viewer.state.time < budget + 0.002);
}

#[test]
fn reset_keeps_the_installed_hook_counting() {
    let (model, state) = load_two_body();
    let mut viewer = Viewer::new(
        model,
        state,
        Box::new(PointMassEngine::new()),
        1.0 / 60.0,
        Box::new(NullHook),
    );
    let steps = std::rc::Rc::new(std::cell::Cell::new(0));
    viewer.install_hook(Box::new(CountingHook { steps: steps.clone() }));

    for _ in 0..3 {
        viewer.advance_frame().unwrap();
    }
    assert!(steps.get() > 0);
    assert!(viewer.state.time > 0.0);
    let before_reset = steps.get();

    viewer.push_event(InputEvent::ResetPressed);
    viewer.process_events(900.0);
    assert_eq!(viewer.state.time, 0.0);

    viewer.advance_frame().unwrap();
    assert!(steps.get() > before_reset);
}

#[test]
fn missing_model_file_is_a_startup_error() {
    let err = Mechanism::load("/nonexistent/model.json").unwrap_err();
    assert!(err.to_string().contains("model.json"));
}
