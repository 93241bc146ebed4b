//! Touch-driven pan and pinch-zoom state machine for a single image surface.
//!
//! Every gesture segment (a pan started by the first finger, or a pinch started
//! by a second finger) snapshots the transform it started from. Move events are
//! applied to that snapshot rather than to the live transform, so repeated moves
//! never accumulate rounding drift. The pinch pivot is the finger midpoint at
//! pinch start and stays there for the whole pinch.

use tracing::{debug, trace};

use super::transform::{Point, Transform, ViewportGeometry};

/// Finger spacing (px) below which a two-finger sample is treated as noise.
pub const PINCH_MIN_DISTANCE: f64 = 10.0;
/// Pointer travel (px) from the anchor after which a touch is no longer a tap.
pub const TAP_SLOP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning,
    Pinching,
}

/// Kind of pointer event carried by a `TouchSample`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// First finger touches the surface.
    Down,
    /// An additional finger touches the surface.
    PointerDown,
    Move,
    /// Last finger leaves the surface.
    Up,
    /// A finger leaves while others remain down.
    PointerUp,
}

/// Snapshot of one pointer event with the positions of all active pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchSample {
    pub action: TouchAction,
    pub pointers: Vec<Point>,
}

impl TouchSample {
    pub fn new(action: TouchAction, pointers: Vec<Point>) -> Self {
        Self { action, pointers }
    }

    pub fn down(x: f64, y: f64) -> Self {
        Self::new(TouchAction::Down, vec![Point::new(x, y)])
    }

    pub fn pointer_down(first: Point, second: Point) -> Self {
        Self::new(TouchAction::PointerDown, vec![first, second])
    }

    pub fn move_to(pointers: &[Point]) -> Self {
        Self::new(TouchAction::Move, pointers.to_vec())
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::new(TouchAction::Up, vec![Point::new(x, y)])
    }

    pub fn pointer_up(pointers: &[Point]) -> Self {
        Self::new(TouchAction::PointerUp, pointers.to_vec())
    }

    fn primary(&self) -> Option<Point> {
        self.pointers.first().copied()
    }

    fn pair(&self) -> Option<(Point, Point)> {
        match self.pointers.as_slice() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        }
    }
}

/// Discrete output events emitted alongside the transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Finger went down and up without panning beyond the slop or pinching.
    Tap(Point),
}

/// Result of feeding one touch sample to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchOutcome {
    pub transform: Transform,
    pub event: Option<GestureEvent>,
}

/// Capability set a rendering surface needs from a gesture handler.
///
/// Platform adapters translate their native pointer and resize callbacks into
/// these calls and apply `current_transform` to whatever they draw.
pub trait TouchSurface {
    fn handle_touch(&mut self, sample: &TouchSample) -> TouchOutcome;
    fn handle_geometry(&mut self, geometry: ViewportGeometry) -> Transform;
    fn current_transform(&self) -> Transform;
}

#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    transform: Transform,
    saved: Transform,
    anchor: Point,
    old_distance: f64,
    state: GestureState,
    viewport_size: Option<(f64, f64)>,
    content_size: Option<(f64, f64)>,
    // Last geometry that produced a fit; `reset_zoom` returns to it.
    geometry: Option<ViewportGeometry>,
    tap_candidate: bool,
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn geometry(&self) -> Option<ViewportGeometry> {
        self.geometry
    }

    /// Fits content to the viewport and makes the result the new baseline.
    ///
    /// Degenerate geometry leaves the engine untouched and returns the current
    /// transform.
    pub fn compute_fit_transform(&mut self, geometry: ViewportGeometry) -> Transform {
        let Some(fit) = Transform::fit(&geometry) else {
            debug!("Ignoring degenerate viewport geometry {:?}", geometry);
            return self.transform;
        };

        self.viewport_size = Some((geometry.viewport_width, geometry.viewport_height));
        self.content_size = Some((geometry.content_width, geometry.content_height));
        self.geometry = Some(geometry);
        self.transform = fit;
        self.saved = fit;
        self.state = GestureState::Idle;
        self.tap_candidate = false;

        debug!(
            "Fit {}x{} content into {}x{} viewport at scale {:.4}",
            geometry.content_width,
            geometry.content_height,
            geometry.viewport_width,
            geometry.viewport_height,
            fit.scale
        );
        fit
    }

    /// Viewport was resized; refits once content size is known.
    pub fn on_viewport_resized(&mut self, width: f64, height: f64) -> Transform {
        self.viewport_size = Some((width, height));
        self.refit_pending()
    }

    /// New content was bound to the surface; refits once viewport size is known.
    pub fn on_content_bound(&mut self, width: f64, height: f64) -> Transform {
        self.content_size = Some((width, height));
        self.refit_pending()
    }

    fn refit_pending(&mut self) -> Transform {
        match (self.viewport_size, self.content_size) {
            (Some((vw, vh)), Some((cw, ch))) => {
                self.compute_fit_transform(ViewportGeometry::new(vw, vh, cw, ch))
            }
            _ => self.transform,
        }
    }

    /// Returns to the fit transform for the last known geometry (identity if none).
    pub fn reset_zoom(&mut self) -> Transform {
        let reset = self
            .geometry
            .and_then(|g| Transform::fit(&g))
            .unwrap_or(Transform::IDENTITY);
        self.transform = reset;
        self.saved = reset;
        self.state = GestureState::Idle;
        self.tap_candidate = false;
        reset
    }

    /// Advances the state machine by one touch sample.
    ///
    /// Samples without enough pointers for their action are ignored and the
    /// last transform is returned unchanged.
    pub fn on_touch(&mut self, sample: &TouchSample) -> TouchOutcome {
        let mut event = None;

        match sample.action {
            TouchAction::Down => {
                if let Some(point) = sample.primary() {
                    self.saved = self.transform;
                    self.anchor = point;
                    self.tap_candidate = true;
                    self.set_state(GestureState::Panning);
                }
            }
            TouchAction::PointerDown => {
                if let Some((first, second)) = sample.pair() {
                    // A second finger rules out a tap even when no pinch starts.
                    self.tap_candidate = false;
                    let distance = first.distance(second);
                    if distance > PINCH_MIN_DISTANCE {
                        self.saved = self.transform;
                        self.old_distance = distance;
                        self.anchor = first.midpoint(second);
                        self.set_state(GestureState::Pinching);
                    } else {
                        trace!("Ignoring pinch start at distance {:.2}", distance);
                    }
                }
            }
            TouchAction::Move => match self.state {
                GestureState::Panning => {
                    if let Some(point) = sample.primary() {
                        let dx = point.x - self.anchor.x;
                        let dy = point.y - self.anchor.y;
                        if dx.hypot(dy) > TAP_SLOP {
                            self.tap_candidate = false;
                        }
                        self.transform = self.saved.translate_by(dx, dy);
                    }
                }
                GestureState::Pinching => {
                    if let Some((first, second)) = sample.pair() {
                        let new_distance = first.distance(second);
                        if new_distance > PINCH_MIN_DISTANCE {
                            let factor = new_distance / self.old_distance;
                            self.transform = self.saved.scale_about(factor, self.anchor);
                        }
                    }
                }
                GestureState::Idle => {}
            },
            TouchAction::Up | TouchAction::PointerUp => {
                if self.tap_candidate && self.state == GestureState::Panning {
                    let at = sample.primary().unwrap_or(self.anchor);
                    event = Some(GestureEvent::Tap(at));
                }
                self.tap_candidate = false;
                self.set_state(GestureState::Idle);
            }
        }

        TouchOutcome {
            transform: self.transform,
            event,
        }
    }

    fn set_state(&mut self, next: GestureState) {
        if self.state != next {
            trace!("Gesture state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

impl TouchSurface for GestureEngine {
    fn handle_touch(&mut self, sample: &TouchSample) -> TouchOutcome {
        self.on_touch(sample)
    }

    fn handle_geometry(&mut self, geometry: ViewportGeometry) -> Transform {
        self.compute_fit_transform(geometry)
    }

    fn current_transform(&self) -> Transform {
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn fitted_engine() -> GestureEngine {
        let mut engine = GestureEngine::new();
        engine.compute_fit_transform(ViewportGeometry::new(200.0, 100.0, 100.0, 100.0));
        engine
    }

    #[test]
    fn test_new_engine_is_identity_and_idle() {
        let engine = GestureEngine::new();
        assert_eq!(engine.transform(), Transform::IDENTITY);
        assert_eq!(engine.state(), GestureState::Idle);
        assert!(engine.geometry().is_none());
    }

    #[test]
    fn test_single_finger_pan() {
        let mut engine = fitted_engine();
        let saved = engine.transform();

        engine.on_touch(&TouchSample::down(10.0, 10.0));
        assert_eq!(engine.state(), GestureState::Panning);

        let out = engine.on_touch(&TouchSample::move_to(&[Point::new(30.0, 40.0)]));
        assert!((out.transform.tx - (saved.tx + 20.0)).abs() < EPS);
        assert!((out.transform.ty - (saved.ty + 30.0)).abs() < EPS);
        assert!((out.transform.scale - saved.scale).abs() < EPS);

        let out = engine.on_touch(&TouchSample::up(30.0, 40.0));
        assert_eq!(engine.state(), GestureState::Idle);
        assert_eq!(out.event, None);
        assert!((out.transform.tx - (saved.tx + 20.0)).abs() < EPS);
    }

    #[test]
    fn test_pan_moves_apply_to_snapshot() {
        let mut engine = fitted_engine();
        let saved = engine.transform();

        engine.on_touch(&TouchSample::down(0.0, 0.0));
        for step in 1..=50 {
            engine.on_touch(&TouchSample::move_to(&[Point::new(step as f64, 0.0)]));
        }
        engine.on_touch(&TouchSample::move_to(&[Point::new(5.0, 5.0)]));

        let t = engine.transform();
        assert!((t.tx - (saved.tx + 5.0)).abs() < EPS);
        assert!((t.ty - (saved.ty + 5.0)).abs() < EPS);
    }

    #[test]
    fn test_pinch_doubles_scale_about_start_midpoint() {
        let mut engine = fitted_engine();
        engine.on_touch(&TouchSample::down(50.0, 50.0));

        let p1 = Point::new(50.0, 50.0);
        let p2 = Point::new(150.0, 50.0);
        engine.on_touch(&TouchSample::pointer_down(p1, p2));
        assert_eq!(engine.state(), GestureState::Pinching);
        let saved = engine.transform();
        let pivot = p1.midpoint(p2);

        // Fingers spread to 200px and re-centre elsewhere; pivot stays at the start midpoint.
        let out = engine.on_touch(&TouchSample::move_to(&[
            Point::new(20.0, 70.0),
            Point::new(220.0, 70.0),
        ]));

        let expected = saved.scale_about(2.0, pivot);
        assert!((out.transform.scale - saved.scale * 2.0).abs() < EPS);
        assert!((out.transform.tx - expected.tx).abs() < EPS);
        assert!((out.transform.ty - expected.ty).abs() < EPS);
    }

    #[test]
    fn test_degenerate_pinch_start_is_ignored() {
        let mut engine = fitted_engine();
        let before = engine.transform();

        engine.on_touch(&TouchSample::down(50.0, 50.0));
        engine.on_touch(&TouchSample::pointer_down(
            Point::new(50.0, 50.0),
            Point::new(56.0, 58.0),
        ));
        assert_eq!(engine.state(), GestureState::Panning);

        // Two-finger move while still panning only follows the first finger.
        let out = engine.on_touch(&TouchSample::move_to(&[
            Point::new(50.0, 50.0),
            Point::new(250.0, 50.0),
        ]));
        assert!((out.transform.scale - before.scale).abs() < EPS);
        assert_eq!(out.transform, before);
    }

    #[test]
    fn test_pinch_move_below_threshold_keeps_transform() {
        let mut engine = fitted_engine();
        engine.on_touch(&TouchSample::down(0.0, 0.0));
        engine.on_touch(&TouchSample::pointer_down(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        ));
        let zoomed = engine
            .on_touch(&TouchSample::move_to(&[
                Point::new(0.0, 0.0),
                Point::new(150.0, 0.0),
            ]))
            .transform;

        let out = engine.on_touch(&TouchSample::move_to(&[
            Point::new(0.0, 0.0),
            Point::new(4.0, 3.0),
        ]));
        assert_eq!(out.transform, zoomed);
    }

    #[test]
    fn test_pointer_up_ends_pinch() {
        let mut engine = fitted_engine();
        engine.on_touch(&TouchSample::down(0.0, 0.0));
        engine.on_touch(&TouchSample::pointer_down(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        ));
        let out = engine.on_touch(&TouchSample::pointer_up(&[
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        ]));
        assert_eq!(engine.state(), GestureState::Idle);
        assert_eq!(out.event, None);

        // Remaining finger moving while idle does nothing.
        let before = engine.transform();
        engine.on_touch(&TouchSample::move_to(&[Point::new(40.0, 40.0)]));
        assert_eq!(engine.transform(), before);
    }

    #[test]
    fn test_tap_emitted_without_motion() {
        let mut engine = fitted_engine();
        engine.on_touch(&TouchSample::down(10.0, 10.0));
        engine.on_touch(&TouchSample::move_to(&[Point::new(12.0, 13.0)]));
        let out = engine.on_touch(&TouchSample::up(12.0, 13.0));
        assert_eq!(out.event, Some(GestureEvent::Tap(Point::new(12.0, 13.0))));
    }

    #[test]
    fn test_no_tap_after_pinch() {
        let mut engine = fitted_engine();
        engine.on_touch(&TouchSample::down(0.0, 0.0));
        engine.on_touch(&TouchSample::pointer_down(
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
        ));
        engine.on_touch(&TouchSample::pointer_up(&[
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
        ]));
        let out = engine.on_touch(&TouchSample::up(0.0, 0.0));
        assert_eq!(out.event, None);
    }

    #[test]
    fn test_no_tap_after_rejected_second_finger() {
        let mut engine = fitted_engine();
        engine.on_touch(&TouchSample::down(0.0, 0.0));
        engine.on_touch(&TouchSample::pointer_down(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
        ));
        assert_eq!(engine.state(), GestureState::Panning);

        let out = engine.on_touch(&TouchSample::pointer_up(&[
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
        ]));
        assert_eq!(out.event, None);
        assert_eq!(engine.state(), GestureState::Idle);
    }

    #[test]
    fn test_malformed_samples_are_ignored() {
        let mut engine = fitted_engine();
        let before = engine.transform();

        engine.on_touch(&TouchSample::new(TouchAction::Down, Vec::new()));
        assert_eq!(engine.state(), GestureState::Idle);

        engine.on_touch(&TouchSample::down(0.0, 0.0));
        engine.on_touch(&TouchSample::new(
            TouchAction::PointerDown,
            vec![Point::new(0.0, 0.0)],
        ));
        assert_eq!(engine.state(), GestureState::Panning);

        let out = engine.on_touch(&TouchSample::move_to(&[]));
        assert_eq!(out.transform, before);
    }

    #[test]
    fn test_reset_zoom_returns_fit() {
        let mut engine = GestureEngine::new();
        let fit = engine.compute_fit_transform(ViewportGeometry::new(1080.0, 1920.0, 4000.0, 3000.0));

        engine.on_touch(&TouchSample::down(100.0, 100.0));
        engine.on_touch(&TouchSample::move_to(&[Point::new(400.0, -20.0)]));
        engine.on_touch(&TouchSample::pointer_down(
            Point::new(400.0, -20.0),
            Point::new(600.0, 300.0),
        ));
        engine.on_touch(&TouchSample::move_to(&[
            Point::new(300.0, -100.0),
            Point::new(700.0, 500.0),
        ]));
        engine.on_touch(&TouchSample::up(700.0, 500.0));
        assert_ne!(engine.transform(), fit);

        assert_eq!(engine.reset_zoom(), fit);
        assert_eq!(engine.reset_zoom(), fit);
        assert_eq!(engine.state(), GestureState::Idle);
    }

    #[test]
    fn test_reset_zoom_without_geometry_is_identity() {
        let mut engine = GestureEngine::new();
        engine.on_touch(&TouchSample::down(0.0, 0.0));
        engine.on_touch(&TouchSample::move_to(&[Point::new(25.0, 25.0)]));
        assert_eq!(engine.reset_zoom(), Transform::IDENTITY);
    }

    #[test]
    fn test_degenerate_geometry_keeps_previous_transform() {
        let mut engine = fitted_engine();
        let before = engine.transform();
        let geometry = engine.geometry();

        let out = engine.compute_fit_transform(ViewportGeometry::new(0.0, 100.0, 100.0, 100.0));
        assert_eq!(out, before);
        assert_eq!(engine.geometry(), geometry);
    }

    #[test]
    fn test_resize_and_bind_refit() {
        let mut engine = GestureEngine::new();
        assert_eq!(engine.on_viewport_resized(200.0, 100.0), Transform::IDENTITY);

        let fit = engine.on_content_bound(100.0, 100.0);
        assert_eq!(fit, Transform::new(1.0, 50.0, 0.0));

        engine.on_touch(&TouchSample::down(0.0, 0.0));
        let refit = engine.on_viewport_resized(100.0, 400.0);
        assert_eq!(refit, Transform::new(1.0, 0.0, 150.0));
        assert_eq!(engine.state(), GestureState::Idle);
    }

    #[test]
    fn test_touch_surface_trait() {
        let mut surface: Box<dyn TouchSurface> = Box::new(GestureEngine::new());
        surface.handle_geometry(ViewportGeometry::new(200.0, 100.0, 100.0, 100.0));
        surface.handle_touch(&TouchSample::down(0.0, 0.0));
        surface.handle_touch(&TouchSample::move_to(&[Point::new(-10.0, 5.0)]));
        assert_eq!(surface.current_transform(), Transform::new(1.0, 40.0, 5.0));
    }
}
