use quadview_engine::coords::{Rect, Vec2, Viewport};
use quadview_engine::core::{App, AppControl, FrameCtx};
use quadview_engine::input::{InputFrame, Key};
use quadview_engine::paint::Color;
use quadview_engine::render::{PolygonMode, QuadRenderer};

// Opaque colors: premultiplied equals straight.
const CLEAR_COLOR: Color = Color::from_premul(0.2, 0.3, 0.3, 1.0);
const QUAD_COLOR: Color = Color::from_premul(1.0, 0.5, 0.2, 1.0);

/// The demo application: one quad, toggled between fill and wireframe.
#[derive(Default)]
pub struct HelloQuad {
    mode: PolygonMode,
    renderer: QuadRenderer,
}

impl HelloQuad {
    pub fn mode(&self) -> PolygonMode {
        self.mode
    }

    /// Applies this frame's key presses.
    ///
    /// Escape exits before any mode change. Space toggles once per press;
    /// a key held across frames records no further presses (see `InputState`),
    /// so holding Space does not re-toggle.
    fn handle_keys(&mut self, frame: &InputFrame) -> AppControl {
        if frame.pressed(Key::Escape) {
            return AppControl::Exit;
        }

        if frame.pressed(Key::Space) {
            self.mode = self.mode.toggled();
            log::info!("polygon mode: {:?}", self.mode);
        }

        AppControl::Continue
    }

    /// Quad centered in the viewport at half its extent.
    fn quad_rect(viewport: Viewport) -> Rect {
        Rect::centered(
            viewport.center(),
            Vec2::new(viewport.width / 2.0, viewport.height / 2.0),
        )
    }
}

impl App for HelloQuad {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_keys(ctx.input_frame) == AppControl::Exit {
            return AppControl::Exit;
        }

        let Self { mode, renderer } = self;
        let mode = *mode;

        ctx.render(CLEAR_COLOR, |rctx, target| {
            renderer.render(rctx, target, Self::quad_rect(rctx.viewport), QUAD_COLOR, mode);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(keys: &[Key]) -> InputFrame {
        let mut frame = InputFrame::default();
        for &k in keys {
            frame.keys_pressed.insert(k);
        }
        frame
    }

    // ── polygon mode toggling ─────────────────────────────────────────────

    #[test]
    fn starts_in_fill_mode() {
        assert_eq!(HelloQuad::default().mode(), PolygonMode::Fill);
    }

    #[test]
    fn space_press_toggles_once() {
        let mut app = HelloQuad::default();

        assert_eq!(app.handle_keys(&frame_with(&[Key::Space])), AppControl::Continue);
        assert_eq!(app.mode(), PolygonMode::Wireframe);

        assert_eq!(app.handle_keys(&frame_with(&[Key::Space])), AppControl::Continue);
        assert_eq!(app.mode(), PolygonMode::Fill);
    }

    #[test]
    fn mode_alternates_over_any_press_sequence() {
        let mut app = HelloQuad::default();

        for presses in 1..=10 {
            app.handle_keys(&frame_with(&[Key::Space]));
            let expected = if presses % 2 == 1 {
                PolygonMode::Wireframe
            } else {
                PolygonMode::Fill
            };
            assert_eq!(app.mode(), expected, "after {presses} presses");
        }
    }

    #[test]
    fn held_space_does_not_retoggle() {
        let mut app = HelloQuad::default();
        app.handle_keys(&frame_with(&[Key::Space]));
        assert_eq!(app.mode(), PolygonMode::Wireframe);

        // Subsequent frames while the key stays held: no press transition.
        for _ in 0..5 {
            app.handle_keys(&frame_with(&[]));
        }
        assert_eq!(app.mode(), PolygonMode::Wireframe);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut app = HelloQuad::default();
        app.handle_keys(&frame_with(&[Key::Enter, Key::ArrowLeft]));
        assert_eq!(app.mode(), PolygonMode::Fill);
    }

    // ── escape ────────────────────────────────────────────────────────────

    #[test]
    fn escape_requests_exit() {
        let mut app = HelloQuad::default();
        assert_eq!(app.handle_keys(&frame_with(&[Key::Escape])), AppControl::Exit);
    }

    #[test]
    fn escape_wins_over_space() {
        let mut app = HelloQuad::default();
        assert_eq!(
            app.handle_keys(&frame_with(&[Key::Escape, Key::Space])),
            AppControl::Exit
        );
        assert_eq!(app.mode(), PolygonMode::Fill);
    }

    // ── quad placement ────────────────────────────────────────────────────

    #[test]
    fn quad_is_centered_at_half_extent() {
        let rect = HelloQuad::quad_rect(Viewport::new(800.0, 600.0));
        assert_eq!(rect, Rect::new(200.0, 150.0, 400.0, 300.0));

        let rect = HelloQuad::quad_rect(Viewport::new(1024.0, 768.0));
        assert_eq!(rect, Rect::new(256.0, 192.0, 512.0, 384.0));
    }

    #[test]
    fn quad_tracks_viewport_resize() {
        for (w, h) in [(100.0, 100.0), (1920.0, 1080.0), (333.0, 777.0)] {
            let rect = HelloQuad::quad_rect(Viewport::new(w, h));
            assert_eq!(rect.center(), Vec2::new(w / 2.0, h / 2.0));
            assert_eq!(rect.size, Vec2::new(w / 2.0, h / 2.0));
        }
    }
}
