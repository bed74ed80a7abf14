use std::path::Path;

use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;

/// Errors produced while loading a mechanism description. All of these are
/// fatal at startup; the viewer never starts with a partially loaded model.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("model has no bodies")]
    NoBodies,
    #[error("timestep must be positive and finite, got {0}")]
    BadTimestep(f64),
    #[error("body '{0}' has non-positive mass {1}")]
    BadMass(String, f64),
}

fn default_radius() -> f32 {
    0.1
}

fn default_color() -> [f32; 4] {
    [0.7, 0.7, 0.75, 1.0]
}

fn default_actuated() -> bool {
    true
}

/// One point mass in the mechanism. `pos`/`vel` are the initial conditions;
/// `stiffness` is an optional tether spring pulling the body back to `pos`.
#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    pub name: String,
    pub mass: f64,
    pub pos: [f64; 3],
    #[serde(default)]
    pub vel: [f64; 3],
    #[serde(default)]
    pub stiffness: f64,
    #[serde(default = "default_actuated")]
    pub actuated: bool,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
}

fn default_gravity() -> [f64; 3] {
    [0.0, -9.81, 0.0]
}

/// Immutable mechanism description, loaded once at startup. The physics
/// engine reads it every sub-step but never writes it.
#[derive(Debug, Clone, Deserialize)]
pub struct Mechanism {
    #[serde(default)]
    pub name: String,
    pub timestep: f64,
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],
    pub bodies: Vec<Body>,
}

impl Mechanism {
    /// Loads a mechanism from a JSON file and builds its initial state.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, SimState), LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mechanism: Mechanism =
            serde_json::from_str(&text).map_err(|source| LoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        mechanism.validate()?;
        let state = mechanism.make_state();
        tracing::info!(
            model = %mechanism.name,
            bodies = mechanism.bodies.len(),
            nu = mechanism.nu(),
            timestep = mechanism.timestep,
            "loaded mechanism"
        );
        Ok((mechanism, state))
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.bodies.is_empty() {
            return Err(LoadError::NoBodies);
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(LoadError::BadTimestep(self.timestep));
        }
        for body in &self.bodies {
            if !(body.mass.is_finite() && body.mass > 0.0) {
                return Err(LoadError::BadMass(body.name.clone(), body.mass));
            }
        }
        Ok(())
    }

    /// Degrees of freedom (three per body).
    pub fn nv(&self) -> usize {
        self.bodies.len() * 3
    }

    /// Actuator count (three per actuated body).
    pub fn nu(&self) -> usize {
        self.bodies.iter().filter(|b| b.actuated).count() * 3
    }

    /// Builds the initial simulation state for this mechanism.
    pub fn make_state(&self) -> SimState {
        let mut state = SimState {
            time: 0.0,
            qpos: Vec::with_capacity(self.nv()),
            qvel: Vec::with_capacity(self.nv()),
            ctrl: vec![0.0; self.nu()],
            xpos: vec![Vec3::ZERO; self.bodies.len()],
        };
        for body in &self.bodies {
            state.qpos.extend_from_slice(&body.pos);
            state.qvel.extend_from_slice(&body.vel);
        }
        state
    }
}

/// Mutable simulation state, advanced only by whole engine sub-steps.
/// `xpos` holds the derived world positions the renderer consumes; it is
/// recomputed by the engine's forward pass after every step and reset.
#[derive(Debug, Clone)]
pub struct SimState {
    pub time: f64,
    pub qpos: Vec<f64>,
    pub qvel: Vec<f64>,
    pub ctrl: Vec<f64>,
    pub xpos: Vec<Vec3>,
}
