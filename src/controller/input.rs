/// Platform-independent input events. The window adapter translates winit
/// events into these and queues them; the viewer drains the queue once per
/// frame, before any simulation stepping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The reset key (Backspace) was pressed. No other keys are defined.
    ResetPressed,
    Button {
        button: MouseButton,
        pressed: bool,
        x: f64,
        y: f64,
    },
    CursorMoved {
        x: f64,
        y: f64,
    },
    Scroll {
        y: f64,
    },
    Modifiers {
        shift: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Action derived from a single input event, to be dispatched by the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Reset,
    /// Pointer drag with at least one button latched; raw pixel deltas.
    Drag { dx: f64, dy: f64 },
    /// Scroll wheel motion; always a zoom regardless of button state.
    Scroll { y: f64 },
}

/// Latched button/modifier state plus the cursor baseline used to turn
/// absolute pointer positions into drag deltas. The latches are not mutually
/// exclusive; the camera controller's priority order resolves conflicts.
pub struct InputState {
    pub left_down: bool,
    pub middle_down: bool,
    pub right_down: bool,
    pub shift_held: bool,
    last_cursor: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            left_down: false,
            middle_down: false,
            right_down: false,
            shift_held: false,
            last_cursor: (0.0, 0.0),
        }
    }

    pub fn any_button_down(&self) -> bool {
        self.left_down || self.middle_down || self.right_down
    }

    /// Applies one event and returns the action it implies, if any.
    ///
    /// Every button transition resamples the cursor baseline so a pointer
    /// jump between press and the next move is not misread as a drag. Moves
    /// without a latch only refresh the baseline.
    pub fn apply(&mut self, event: InputEvent) -> Option<InputAction> {
        match event {
            InputEvent::ResetPressed => Some(InputAction::Reset),
            InputEvent::Button {
                button,
                pressed,
                x,
                y,
            } => {
                match button {
                    MouseButton::Left => self.left_down = pressed,
                    MouseButton::Middle => self.middle_down = pressed,
                    MouseButton::Right => self.right_down = pressed,
                }
                self.last_cursor = (x, y);
                None
            }
            InputEvent::Modifiers { shift } => {
                self.shift_held = shift;
                None
            }
            InputEvent::CursorMoved { x, y } => {
                if !self.any_button_down() {
                    self.last_cursor = (x, y);
                    return None;
                }
                let dx = x - self.last_cursor.0;
                let dy = y - self.last_cursor.1;
                self.last_cursor = (x, y);
                Some(InputAction::Drag { dx, dy })
            }
            InputEvent::Scroll { y } => Some(InputAction::Scroll { y }),
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_produces_no_action() {
        let mut input = InputState::new();
        for i in 0..10 {
            let act = input.apply(InputEvent::CursorMoved {
                x: i as f64 * 37.0,
                y: i as f64 * 11.0,
            });
            assert_eq!(act, None);
        }
    }

    #[test]
    fn press_resamples_baseline_before_first_drag() {
        let mut input = InputState::new();
        // Hover far away, then press: the first move after the press must
        // measure from the press position, not from the origin.
        input.apply(InputEvent::CursorMoved { x: 500.0, y: 500.0 });
        input.apply(InputEvent::Button {
            button: MouseButton::Left,
            pressed: true,
            x: 500.0,
            y: 500.0,
        });
        let act = input.apply(InputEvent::CursorMoved { x: 503.0, y: 498.0 });
        assert_eq!(act, Some(InputAction::Drag { dx: 3.0, dy: -2.0 }));
    }

    #[test]
    fn release_stops_dragging() {
        let mut input = InputState::new();
        input.apply(InputEvent::Button {
            button: MouseButton::Right,
            pressed: true,
            x: 0.0,
            y: 0.0,
        });
        assert!(input.any_button_down());
        input.apply(InputEvent::Button {
            button: MouseButton::Right,
            pressed: false,
            x: 10.0,
            y: 10.0,
        });
        assert!(!input.any_button_down());
        assert_eq!(input.apply(InputEvent::CursorMoved { x: 90.0, y: 90.0 }), None);
    }

    #[test]
    fn scroll_acts_without_any_latch() {
        let mut input = InputState::new();
        assert_eq!(
            input.apply(InputEvent::Scroll { y: 1.0 }),
            Some(InputAction::Scroll { y: 1.0 })
        );
    }
}
