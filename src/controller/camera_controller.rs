use glam::Vec3;

use crate::controller::input::InputState;
use crate::model::CameraRig;

/// Camera manipulation modes. H/V select the plane (pan) or axis pairing
/// (rotate) a drag operates in; Zoom is the fallback for any other latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAction {
    RotateV,
    RotateH,
    PanV,
    PanH,
    Zoom,
}

/// Maps normalized drag deltas plus the latched button/modifier state into a
/// [`CameraRig`] mutation. Pure with respect to everything but the rig.
pub struct CameraController {
    /// Degrees of rotation per window height of drag.
    pub rotate_speed: f32,
    /// Lookat translation per window height of drag, in units of distance.
    pub pan_speed: f32,
    /// Exponential zoom rate per window height of drag.
    pub zoom_speed: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            rotate_speed: 180.0,
            pan_speed: 2.0,
            zoom_speed: 3.0,
        }
    }

    /// Resolves the active action from the latched buttons. The order is a
    /// fixed total priority: right pans, else left rotates, else zoom.
    pub fn action_for(input: &InputState) -> CameraAction {
        if input.right_down {
            if input.shift_held {
                CameraAction::PanH
            } else {
                CameraAction::PanV
            }
        } else if input.left_down {
            if input.shift_held {
                CameraAction::RotateH
            } else {
                CameraAction::RotateV
            }
        } else {
            CameraAction::Zoom
        }
    }

    /// Applies a pointer drag. Deltas are divided by the window height (not
    /// width) so sensitivity is aspect-independent.
    pub fn drag(&self, rig: &mut CameraRig, input: &InputState, dx: f64, dy: f64, height: f64) {
        let action = Self::action_for(input);
        self.move_camera(rig, action, dx / height, dy / height);
    }

    /// Applies a scroll-wheel zoom: one notch counts as 5% of the window
    /// height of drag, with forward scroll zooming in.
    pub fn scroll(&self, rig: &mut CameraRig, yoffset: f64) {
        self.move_camera(rig, CameraAction::Zoom, 0.0, -0.05 * yoffset);
    }

    /// The single camera-motion primitive both drag and scroll converge on.
    /// `reldx`/`reldy` are fractions of the window height.
    pub fn move_camera(&self, rig: &mut CameraRig, action: CameraAction, reldx: f64, reldy: f64) {
        let dx = reldx as f32;
        let dy = reldy as f32;
        match action {
            CameraAction::RotateV | CameraAction::RotateH => {
                rig.azimuth -= self.rotate_speed * dx;
                rig.elevation = (rig.elevation - self.rotate_speed * dy)
                    .clamp(-CameraRig::MAX_ELEVATION, CameraRig::MAX_ELEVATION);
            }
            CameraAction::PanV => {
                // Vertical plane: sideways plus world-up, scene follows cursor.
                let scale = self.pan_speed * rig.distance;
                let right = rig.right();
                rig.lookat += (-right * dx + Vec3::Y * dy) * scale;
            }
            CameraAction::PanH => {
                // Horizontal plane: sideways plus flattened view direction.
                let scale = self.pan_speed * rig.distance;
                let right = rig.right();
                let mut flat = rig.forward();
                flat.y = 0.0;
                let flat = flat.normalize_or_zero();
                rig.lookat += (-right * dx - flat * dy) * scale;
            }
            CameraAction::Zoom => {
                // Exponential in the drag fraction: dy > 0 (pointer down)
                // backs away, and the distance can never cross zero.
                rig.distance = (rig.distance * (self.zoom_speed * dy).exp())
                    .clamp(CameraRig::MIN_DISTANCE, CameraRig::MAX_DISTANCE);
            }
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::{InputEvent, MouseButton};

    fn press(input: &mut InputState, button: MouseButton) {
        input.apply(InputEvent::Button {
            button,
            pressed: true,
            x: 0.0,
            y: 0.0,
        });
    }

    #[test]
    fn right_button_wins_over_left() {
        let mut input = InputState::new();
        press(&mut input, MouseButton::Left);
        press(&mut input, MouseButton::Right);
        assert_eq!(CameraController::action_for(&input), CameraAction::PanV);

        let controller = CameraController::new();
        let mut rig = CameraRig::new();
        let (azimuth, elevation) = (rig.azimuth, rig.elevation);
        controller.drag(&mut rig, &input, 40.0, 25.0, 400.0);
        // A pan moves the lookat point and leaves the orbit angles alone.
        assert_eq!(rig.azimuth, azimuth);
        assert_eq!(rig.elevation, elevation);
        assert!(rig.lookat.distance(CameraRig::new().lookat) > 0.0);
    }

    #[test]
    fn left_drag_rotates() {
        let mut input = InputState::new();
        press(&mut input, MouseButton::Left);
        let controller = CameraController::new();
        let mut rig = CameraRig::new();
        controller.drag(&mut rig, &input, 40.0, 0.0, 400.0);
        assert!((rig.azimuth - (90.0 - 18.0)).abs() < 1e-4);
        assert_eq!(rig.lookat, CameraRig::new().lookat);
    }

    #[test]
    fn middle_drag_falls_back_to_zoom() {
        let mut input = InputState::new();
        press(&mut input, MouseButton::Middle);
        let controller = CameraController::new();
        let mut rig = CameraRig::new();
        let before = rig.distance;
        controller.drag(&mut rig, &input, 0.0, 50.0, 400.0);
        assert!(rig.distance > before, "dragging down zooms out");
    }

    #[test]
    fn scroll_and_middle_drag_share_the_zoom_primitive() {
        let controller = CameraController::new();
        let mut input = InputState::new();
        press(&mut input, MouseButton::Middle);

        for yoffset in [-3.0, -1.0, 0.5, 1.0, 2.0] {
            let mut via_scroll = CameraRig::new();
            controller.scroll(&mut via_scroll, yoffset);

            // Scroll pre-normalizes to -0.05 * yoffset; the drag path divides
            // by height, so at 400 px the matching drag delta is -20 * yoffset.
            let mut via_drag = CameraRig::new();
            controller.drag(&mut via_drag, &input, 0.0, -20.0 * yoffset, 400.0);

            assert!((via_scroll.distance - via_drag.distance).abs() < 1e-5);
        }
    }

    #[test]
    fn shift_selects_the_variant_mode() {
        let mut input = InputState::new();
        press(&mut input, MouseButton::Right);
        input.apply(InputEvent::Modifiers { shift: true });
        assert_eq!(CameraController::action_for(&input), CameraAction::PanH);
        input.apply(InputEvent::Modifiers { shift: false });
        assert_eq!(CameraController::action_for(&input), CameraAction::PanV);
    }

    #[test]
    fn distance_stays_positive_under_extreme_zoom() {
        let controller = CameraController::new();
        let mut rig = CameraRig::new();
        for _ in 0..1000 {
            controller.move_camera(&mut rig, CameraAction::Zoom, 0.0, -10.0);
        }
        assert!(rig.distance >= CameraRig::MIN_DISTANCE);
        controller.move_camera(&mut rig, CameraAction::Zoom, 0.0, f64::NEG_INFINITY);
        assert!(rig.distance >= CameraRig::MIN_DISTANCE);
        controller.move_camera(&mut rig, CameraAction::Zoom, 0.0, 1.0e9);
        assert!(rig.distance <= CameraRig::MAX_DISTANCE);
    }

    #[test]
    fn elevation_is_clamped_at_the_poles() {
        let controller = CameraController::new();
        let mut rig = CameraRig::new();
        for _ in 0..100 {
            controller.move_camera(&mut rig, CameraAction::RotateV, 0.0, 1.0);
        }
        assert!(rig.elevation >= -CameraRig::MAX_ELEVATION);
        assert!(rig.elevation <= CameraRig::MAX_ELEVATION);
    }
}
