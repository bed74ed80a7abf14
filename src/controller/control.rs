use crate::model::{Mechanism, SimState};

/// Actuation strategy invoked exactly once per simulation sub-step, with read
/// access to the state and write access to the actuation vector. If the
/// vector length does not match the strategy's expectation it must leave the
/// vector untouched rather than write out of bounds; the step then runs with
/// zero actuation.
pub trait ControlHook {
    fn compute_actuation(&mut self, model: &Mechanism, state: &SimState, ctrl: &mut [f64]);
}

/// Proportional damping: `ctrl = -gain * qvel`, applicable only to fully
/// actuated mechanisms where actuators and degrees of freedom coincide.
/// Anything else gets no actuation.
pub struct DampingHook {
    pub gain: f64,
}

impl DampingHook {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }
}

impl ControlHook for DampingHook {
    fn compute_actuation(&mut self, _model: &Mechanism, state: &SimState, ctrl: &mut [f64]) {
        if ctrl.len() != state.qvel.len() {
            return;
        }
        for (c, v) in ctrl.iter_mut().zip(&state.qvel) {
            *c = -self.gain * v;
        }
    }
}

/// Applies no actuation; used when damping is disabled.
pub struct NullHook;

impl ControlHook for NullHook {
    fn compute_actuation(&mut self, _model: &Mechanism, _state: &SimState, _ctrl: &mut [f64]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(actuated: bool) -> Mechanism {
        serde_json::from_str(&format!(
            r#"{{"timestep": 0.002, "bodies": [
                {{"name": "a", "mass": 1.0, "pos": [0,1,0], "vel": [2.0, 0.0, -1.0], "actuated": {actuated}}}
            ]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn damping_opposes_velocity_when_fully_actuated() {
        let model = model(true);
        let state = model.make_state();
        let mut ctrl = vec![0.0; model.nu()];
        DampingHook::new(0.1).compute_actuation(&model, &state, &mut ctrl);
        assert_eq!(ctrl, vec![-0.2, 0.0, 0.1]);
    }

    #[test]
    fn damping_noops_on_size_mismatch() {
        let model = model(false);
        let state = model.make_state();
        // No actuators: the hook must not touch the (empty) vector, and must
        // not assume it can index qvel-sized storage.
        let mut ctrl = vec![0.0; model.nu()];
        DampingHook::new(0.1).compute_actuation(&model, &state, &mut ctrl);
        assert!(ctrl.is_empty());
    }
}
