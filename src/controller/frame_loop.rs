use crate::controller::camera_controller::CameraController;
use crate::controller::control::ControlHook;
use crate::controller::input::{InputAction, InputEvent, InputState};
use crate::controller::physics::{EngineError, PhysicsEngine};
use crate::model::{CameraRig, Mechanism, SimState};

/// Default wall-clock budget per rendered frame.
pub const DEFAULT_FRAME_BUDGET: f64 = 1.0 / 60.0;

/// Fixed-budget catch-up scheduler: advances the simulation by whole
/// sub-steps until one frame budget of simulated time has elapsed, then
/// yields to rendering. Owns the single installed [`ControlHook`] slot.
pub struct FrameScheduler {
    frame_budget: f64,
    hook: Box<dyn ControlHook>,
}

impl FrameScheduler {
    pub fn new(frame_budget: f64, hook: Box<dyn ControlHook>) -> Self {
        Self { frame_budget, hook }
    }

    pub fn frame_budget(&self) -> f64 {
        self.frame_budget
    }

    /// Replaces the installed hook. There is always exactly one.
    pub fn install_hook(&mut self, hook: Box<dyn ControlHook>) {
        self.hook = hook;
    }

    /// Runs sub-steps until the budget is reached. Overshoot within the last
    /// sub-step is accepted, never carried into the next frame. If the engine
    /// runs slower than real time the loop still completes the budget; the
    /// frame rate drops but simulated time stays correct.
    ///
    /// Returns the number of sub-steps taken.
    pub fn advance(
        &mut self,
        engine: &dyn PhysicsEngine,
        model: &Mechanism,
        state: &mut SimState,
    ) -> Result<usize, EngineError> {
        let sim_start = state.time;
        let mut steps = 0;
        while state.time - sim_start < self.frame_budget {
            engine.step(model, state, self.hook.as_mut())?;
            steps += 1;
        }
        tracing::trace!(steps, time = state.time, "frame budget reached");
        Ok(steps)
    }

    /// Restores the initial simulation snapshot and reruns the forward pass
    /// so derived quantities are valid before the next render. The installed
    /// hook is untouched.
    pub fn reset(&mut self, engine: &dyn PhysicsEngine, model: &Mechanism, state: &mut SimState) {
        engine.reset(model, state);
        engine.forward(model, state);
        tracing::debug!("simulation reset");
    }
}

/// Platform-independent per-frame orchestration: owns the simulation, camera
/// rig, input state, and scheduler. The window adapter queues raw input
/// events; each frame the queue is drained completely before stepping, then
/// one scheduler pass runs, and the caller renders from the results.
pub struct Viewer {
    pub model: Mechanism,
    pub state: SimState,
    pub rig: CameraRig,
    engine: Box<dyn PhysicsEngine>,
    input: InputState,
    controller: CameraController,
    scheduler: FrameScheduler,
    events: Vec<InputEvent>,
}

impl Viewer {
    pub fn new(
        model: Mechanism,
        state: SimState,
        engine: Box<dyn PhysicsEngine>,
        frame_budget: f64,
        hook: Box<dyn ControlHook>,
    ) -> Self {
        Self {
            model,
            state,
            rig: CameraRig::new(),
            engine,
            input: InputState::new(),
            controller: CameraController::new(),
            scheduler: FrameScheduler::new(frame_budget, hook),
            events: Vec::new(),
        }
    }

    pub fn install_hook(&mut self, hook: Box<dyn ControlHook>) {
        self.scheduler.install_hook(hook);
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drains the event queue in arrival order, applying camera motions and
    /// reset signals. `window_height` normalizes drag deltas.
    pub fn process_events(&mut self, window_height: f64) {
        for event in std::mem::take(&mut self.events) {
            match self.input.apply(event) {
                Some(InputAction::Reset) => {
                    self.scheduler
                        .reset(self.engine.as_ref(), &self.model, &mut self.state);
                }
                Some(InputAction::Drag { dx, dy }) => {
                    self.controller
                        .drag(&mut self.rig, &self.input, dx, dy, window_height);
                }
                Some(InputAction::Scroll { y }) => {
                    self.controller.scroll(&mut self.rig, y);
                }
                None => {}
            }
        }
    }

    /// One scheduler pass; rendering always follows exactly one of these.
    pub fn advance_frame(&mut self) -> Result<usize, EngineError> {
        self.scheduler
            .advance(self.engine.as_ref(), &self.model, &mut self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::control::NullHook;
    use crate::controller::physics::PointMassEngine;

    use std::cell::Cell;
    use std::rc::Rc;

    fn two_body_viewer(frame_budget: f64) -> Viewer {
        let model: Mechanism = serde_json::from_str(
            r#"{"timestep": 0.002, "bodies": [
                {"name": "a", "mass": 1.0, "pos": [0.0, 1.0, 0.0]},
                {"name": "b", "mass": 2.0, "pos": [0.5, 2.0, 0.0]}
            ]}"#,
        )
        .unwrap();
        let state = model.make_state();
        Viewer::new(
            model,
            state,
            Box::new(PointMassEngine::new()),
            frame_budget,
            Box::new(NullHook),
        )
    }

    /// Increments a shared counter every sub-step; used to observe that the
    /// hook slot survives resets.
    struct CountingHook(Rc<Cell<usize>>);

    impl ControlHook for CountingHook {
        fn compute_actuation(&mut self, _: &Mechanism, _: &SimState, _: &mut [f64]) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn scheduler_reaches_but_never_undershoots_the_budget() {
        let mut viewer = two_body_viewer(1.0 / 60.0);
        for _ in 0..5 {
            let start = viewer.state.time;
            viewer.advance_frame().unwrap();
            let advanced = viewer.state.time - start;
            assert!(advanced >= 1.0 / 60.0 - 1e-12);
            assert!(advanced < 1.0 / 60.0 + 0.002);
        }
    }

    #[test]
    fn reset_zeroes_time_but_leaves_camera_and_hook_alone() {
        let mut viewer = two_body_viewer(1.0 / 60.0);
        let counter = Rc::new(Cell::new(0));
        viewer.install_hook(Box::new(CountingHook(counter.clone())));

        // Disturb the camera, then run a few frames.
        viewer.push_event(InputEvent::Scroll { y: 2.0 });
        viewer.process_events(900.0);
        let distance = viewer.rig.distance;
        for _ in 0..3 {
            viewer.advance_frame().unwrap();
        }
        assert!(viewer.state.time > 0.0);
        let steps_before = counter.get();
        assert!(steps_before > 0);

        // Reset affects the simulation, not the camera or the hook slot.
        viewer.push_event(InputEvent::ResetPressed);
        viewer.process_events(900.0);
        assert_eq!(viewer.state.time, 0.0);
        assert_eq!(viewer.rig.distance, distance);

        viewer.advance_frame().unwrap();
        assert!(counter.get() > steps_before, "hook keeps counting after reset");
    }

    #[test]
    fn events_are_drained_before_stepping() {
        let mut viewer = two_body_viewer(1.0 / 60.0);
        viewer.push_event(InputEvent::Scroll { y: 1.0 });
        viewer.push_event(InputEvent::ResetPressed);
        viewer.push_event(InputEvent::Scroll { y: 1.0 });
        viewer.process_events(900.0);
        // All three were consumed in order.
        assert_eq!(viewer.state.time, 0.0);
        assert!(viewer.rig.distance < CameraRig::new().distance);
    }
}
