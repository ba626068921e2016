use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Frame, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use crate::mask;
use crate::Message;

/// Pointer input for the masking surface, already in surface-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeInput {
    Began(Point),
    Moved(Point),
    Ended,
}

/// Interaction layer laid over the base and overlay images
///
/// Only translates pointer/touch events into [`StrokeInput`] messages; the
/// rasterization itself happens in the surface owned by the app.
pub struct MaskCanvas {
    pub brush_width: f32,
    /// False while generating
    pub enabled: bool,
}

impl Program<Message> for MaskCanvas {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        // Brush outline under the cursor
        if self.enabled {
            if let Some(position) = cursor.position_in(bounds) {
                let outline = Path::circle(position, self.brush_width / 2.0);
                frame.stroke(
                    &outline,
                    Stroke::default()
                        .with_width(1.5)
                        .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.8)),
                );
            }
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        if !self.enabled {
            if state.is_dragging {
                state.reset();
                return (canvas::event::Status::Ignored, Some(Message::Stroke(StrokeInput::Ended)));
            }
            return (canvas::event::Status::Ignored, None);
        }

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.is_dragging = true;
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::Stroke(StrokeInput::Began(position))),
                    );
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.is_dragging {
                    state.reset();
                    return (canvas::event::Status::Captured, Some(Message::Stroke(StrokeInput::Ended)));
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging && state.finger.is_none() {
                    // Leaving the surface ends the stroke
                    let message = match cursor.position_in(bounds) {
                        Some(position) => StrokeInput::Moved(position),
                        None => {
                            state.reset();
                            StrokeInput::Ended
                        }
                    };
                    return (canvas::event::Status::Captured, Some(Message::Stroke(message)));
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorLeft) => {
                if state.is_dragging {
                    state.reset();
                    return (canvas::event::Status::Captured, Some(Message::Stroke(StrokeInput::Ended)));
                }
            }

            // First finger only
            canvas::Event::Touch(touch::Event::FingerPressed { id, position }) => {
                if state.finger.is_none() && bounds.contains(position) {
                    state.is_dragging = true;
                    state.finger = Some(id);
                    return (
                        canvas::event::Status::Captured,
                        Some(Message::Stroke(StrokeInput::Began(to_local(bounds, position)))),
                    );
                }
            }

            canvas::Event::Touch(touch::Event::FingerMoved { id, position }) => {
                if state.finger == Some(id) {
                    let message = if bounds.contains(position) {
                        StrokeInput::Moved(to_local(bounds, position))
                    } else {
                        state.reset();
                        StrokeInput::Ended
                    };
                    return (canvas::event::Status::Captured, Some(Message::Stroke(message)));
                }
            }

            canvas::Event::Touch(touch::Event::FingerLifted { id, .. })
            | canvas::Event::Touch(touch::Event::FingerLost { id, .. }) => {
                if state.finger == Some(id) {
                    state.reset();
                    return (canvas::event::Status::Captured, Some(Message::Stroke(StrokeInput::Ended)));
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(&self, _state: &Self::State, bounds: Rectangle, cursor: Cursor) -> mouse::Interaction {
        if self.enabled && cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

impl From<Point> for mask::Point {
    fn from(point: Point) -> Self {
        mask::Point::new(point.x, point.y)
    }
}

fn to_local(bounds: Rectangle, position: Point) -> Point {
    Point::new(position.x - bounds.x, position.y - bounds.y)
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    /// Finger that owns the active touch stroke
    pub finger: Option<touch::Finger>,
}

impl DragState {
    fn reset(&mut self) {
        self.is_dragging = false;
        self.finger = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(100.0, 50.0), iced::Size::new(200.0, 100.0))
    }

    fn canvas() -> MaskCanvas {
        MaskCanvas {
            brush_width: 20.0,
            enabled: true,
        }
    }

    fn stroke(result: (canvas::event::Status, Option<Message>)) -> Option<StrokeInput> {
        match result.1 {
            Some(Message::Stroke(input)) => Some(input),
            _ => None,
        }
    }

    fn press() -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))
    }

    fn moved(x: f32, y: f32) -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(x, y),
        })
    }

    #[test]
    fn test_mouse_coordinates_are_surface_local() {
        let mut state = DragState::default();
        let cursor = Cursor::Available(Point::new(110.0, 60.0));

        let input = stroke(canvas().update(&mut state, press(), bounds(), cursor));
        assert_eq!(input, Some(StrokeInput::Began(Point::new(10.0, 10.0))));
        assert!(state.is_dragging);
    }

    #[test]
    fn test_press_outside_bounds_is_ignored() {
        let mut state = DragState::default();
        let cursor = Cursor::Available(Point::new(5.0, 5.0));

        assert_eq!(stroke(canvas().update(&mut state, press(), bounds(), cursor)), None);
        assert!(!state.is_dragging);
    }

    #[test]
    fn test_move_without_press_does_nothing() {
        let mut state = DragState::default();
        let cursor = Cursor::Available(Point::new(150.0, 80.0));

        assert_eq!(stroke(canvas().update(&mut state, moved(150.0, 80.0), bounds(), cursor)), None);
    }

    #[test]
    fn test_leaving_bounds_ends_stroke() {
        let mut state = DragState::default();
        let inside = Cursor::Available(Point::new(150.0, 80.0));
        canvas().update(&mut state, press(), bounds(), inside);

        let input = stroke(canvas().update(&mut state, moved(160.0, 90.0), bounds(), Cursor::Available(Point::new(160.0, 90.0))));
        assert_eq!(input, Some(StrokeInput::Moved(Point::new(60.0, 40.0))));

        let outside = Cursor::Available(Point::new(400.0, 90.0));
        let input = stroke(canvas().update(&mut state, moved(400.0, 90.0), bounds(), outside));
        assert_eq!(input, Some(StrokeInput::Ended));
        assert!(!state.is_dragging);
    }

    #[test]
    fn test_first_finger_owns_the_stroke() {
        let mut state = DragState::default();
        let first = touch::Finger(1);
        let second = touch::Finger(2);

        let began = stroke(canvas().update(
            &mut state,
            canvas::Event::Touch(touch::Event::FingerPressed {
                id: first,
                position: Point::new(120.0, 70.0),
            }),
            bounds(),
            Cursor::Unavailable,
        ));
        assert_eq!(began, Some(StrokeInput::Began(Point::new(20.0, 20.0))));

        let ignored = stroke(canvas().update(
            &mut state,
            canvas::Event::Touch(touch::Event::FingerMoved {
                id: second,
                position: Point::new(130.0, 70.0),
            }),
            bounds(),
            Cursor::Unavailable,
        ));
        assert_eq!(ignored, None);

        let ended = stroke(canvas().update(
            &mut state,
            canvas::Event::Touch(touch::Event::FingerLifted {
                id: first,
                position: Point::new(130.0, 70.0),
            }),
            bounds(),
            Cursor::Unavailable,
        ));
        assert_eq!(ended, Some(StrokeInput::Ended));
        assert!(state.finger.is_none());
    }

    #[test]
    fn test_disabled_canvas_ignores_input() {
        let mut state = DragState::default();
        let disabled = MaskCanvas {
            brush_width: 20.0,
            enabled: false,
        };
        let cursor = Cursor::Available(Point::new(150.0, 80.0));

        assert_eq!(stroke(disabled.update(&mut state, press(), bounds(), cursor)), None);
    }
}
