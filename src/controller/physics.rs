use glam::Vec3;
use thiserror::Error;

use crate::controller::control::ControlHook;
use crate::model::{Mechanism, SimState};

/// Faults inside the stepping engine. The viewer has no recovery strategy
/// for a corrupted simulation, so these are fatal.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("simulation diverged to a non-finite state at t = {time}")]
    NonFinite { time: f64 },
}

/// One fixed sub-step of an opaque integrator. `step` advances `state.time`
/// by exactly the model timestep and invokes the hook once; `reset` restores
/// the initial snapshot; `forward` recomputes derived quantities without
/// advancing time.
pub trait PhysicsEngine {
    fn step(
        &self,
        model: &Mechanism,
        state: &mut SimState,
        hook: &mut dyn ControlHook,
    ) -> Result<(), EngineError>;

    fn reset(&self, model: &Mechanism, state: &mut SimState);

    fn forward(&self, model: &Mechanism, state: &mut SimState);
}

/// Semi-implicit Euler integrator over independent point masses. Per dof:
/// gravity, an optional tether spring toward the body's initial position,
/// and hook actuation for actuated bodies.
pub struct PointMassEngine;

impl PointMassEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PhysicsEngine for PointMassEngine {
    fn step(
        &self,
        model: &Mechanism,
        state: &mut SimState,
        hook: &mut dyn ControlHook,
    ) -> Result<(), EngineError> {
        let dt = model.timestep;

        // The hook reads the state it is about to act on, so the actuation
        // vector is detached from the state for the duration of the call.
        let mut ctrl = std::mem::take(&mut state.ctrl);
        ctrl.fill(0.0);
        hook.compute_actuation(model, state, &mut ctrl);

        let mut act_base = 0;
        for (i, body) in model.bodies.iter().enumerate() {
            let inv_mass = 1.0 / body.mass;
            for k in 0..3 {
                let dof = 3 * i + k;
                let mut force = body.mass * model.gravity[k];
                if body.stiffness > 0.0 {
                    force -= body.stiffness * (state.qpos[dof] - body.pos[k]);
                }
                if body.actuated {
                    force += ctrl[act_base + k];
                }
                state.qvel[dof] += dt * force * inv_mass;
                state.qpos[dof] += dt * state.qvel[dof];
            }
            if body.actuated {
                act_base += 3;
            }
        }

        state.ctrl = ctrl;
        state.time += dt;
        self.forward(model, state);

        if state.qpos.iter().chain(&state.qvel).any(|v| !v.is_finite()) {
            return Err(EngineError::NonFinite { time: state.time });
        }
        Ok(())
    }

    fn reset(&self, model: &Mechanism, state: &mut SimState) {
        *state = model.make_state();
    }

    fn forward(&self, model: &Mechanism, state: &mut SimState) {
        debug_assert_eq!(state.xpos.len(), model.bodies.len());
        for (i, xpos) in state.xpos.iter_mut().enumerate() {
            *xpos = Vec3::new(
                state.qpos[3 * i] as f32,
                state.qpos[3 * i + 1] as f32,
                state.qpos[3 * i + 2] as f32,
            );
        }
    }
}

impl Default for PointMassEngine {
    fn default() -> Self {
        Self::new()
    }
}
