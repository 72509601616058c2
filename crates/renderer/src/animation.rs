//! Per-frame simulation state for the pyramid demo.
//!
//! All of the mutable values the render loop advances each frame live in
//! [`AnimationState`]: the oscillating translation offset, the absolute spin
//! angle, and the background color phase. The state is owned by the loop and
//! advanced by a pure [`AnimationState::advance`] call, so everything here is
//! unit-testable without a GPU or a window.

use std::f32::consts::PI;
use std::time::Duration;

/// Translation offset applied per nominal frame.
pub const OFFSET_STEP: f32 = 0.015;

/// Oscillation bound for the translation offset.
pub const OFFSET_MAX: f32 = 1.0;

/// Spin applied per nominal frame, in degrees.
pub const ANGLE_STEP: f32 = 1.35;

/// Background color phase advance per nominal frame.
pub const COLOR_STEP: f32 = 0.000_05;

/// Step amounts above are expressed per frame at this rate; `advance` scales
/// them by the measured delta time so animation speed is host-independent.
const NOMINAL_FRAME_RATE: f32 = 60.0;

/// Mutable animation values advanced once per frame by the render loop.
#[derive(Debug, Clone)]
pub struct AnimationState {
    /// Current translation offset along x, oscillating in `[-offset_max, offset_max]`
    /// with up to one step of overshoot.
    pub offset: f32,
    /// Direction of the offset oscillation; `true` while the offset grows.
    pub rising: bool,
    /// Oscillation bound.
    pub offset_max: f32,
    /// Offset change per nominal frame.
    pub offset_step: f32,
    /// Absolute spin angle in degrees, kept in `[0, 360)` by wrapping.
    pub angle: f32,
    /// Phase input for the cycling background color.
    pub color_phase: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            offset: 0.0,
            rising: true,
            offset_max: OFFSET_MAX,
            offset_step: OFFSET_STEP,
            angle: 0.0,
            color_phase: 0.0,
        }
    }
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances all animation values by the measured frame delta.
    ///
    /// The direction flip is checked *after* the offset step is applied, so
    /// the offset may overshoot `offset_max` by up to one step before turning
    /// around. The angle wraps by exactly 360 on the frame it crosses the
    /// threshold; per-frame increments are far smaller than a full turn, so a
    /// single subtraction suffices.
    pub fn advance(&mut self, dt: Duration) {
        let frames = dt.as_secs_f32() * NOMINAL_FRAME_RATE;

        let step = self.offset_step * frames;
        if self.rising {
            self.offset += step;
        } else {
            self.offset -= step;
        }
        if self.offset.abs() >= self.offset_max {
            self.rising = !self.rising;
        }

        self.angle += ANGLE_STEP * frames;
        if self.angle >= 360.0 {
            self.angle -= 360.0;
        }

        self.color_phase += COLOR_STEP * frames;
    }

    /// Current background color as three phase-shifted rectified sine waves.
    ///
    /// Each channel is `|sin(...)|`, so the triple is always inside `[0, 1]`
    /// and cycles smoothly through the color wheel as the phase grows.
    pub fn background_color(&self) -> [f32; 3] {
        let i = self.color_phase;
        let third = 2.0 * PI / 3.0;
        [
            (i + third).sin().abs(),
            i.sin().abs(),
            (i - third).sin().abs(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_nanos(16_666_667);

    #[test]
    fn offset_stays_within_overshoot_envelope() {
        let mut state = AnimationState::new();
        for _ in 0..10_000 {
            state.advance(FRAME);
            let bound = state.offset_max + state.offset_step + 1e-4;
            assert!(
                state.offset.abs() <= bound,
                "offset {} escaped envelope {}",
                state.offset,
                bound
            );
        }
    }

    #[test]
    fn direction_flips_after_sixty_seven_frames() {
        let mut state = AnimationState::new();
        let mut flip_frame = None;
        for frame in 1..=100 {
            state.advance(FRAME);
            if !state.rising {
                flip_frame = Some(frame);
                break;
            }
        }
        assert_eq!(flip_frame, Some(67));
        assert!((state.offset - 1.005).abs() < 1e-3, "offset {}", state.offset);
    }

    #[test]
    fn flip_cadence_matches_configured_step() {
        let mut state = AnimationState {
            offset_max: 0.45,
            offset_step: 0.125,
            ..AnimationState::new()
        };
        // ceil(0.45 / 0.125) = 4 steps to the first flip.
        for _ in 0..3 {
            state.advance(FRAME);
            assert!(state.rising);
        }
        state.advance(FRAME);
        assert!(!state.rising, "fourth step reaches the bound and flips");
    }

    #[test]
    fn overshoot_is_permitted_on_the_flip_frame() {
        let mut state = AnimationState::new();
        while state.rising {
            state.advance(FRAME);
        }
        assert!(state.offset >= state.offset_max);
        assert!(state.offset <= state.offset_max + state.offset_step + 1e-4);
    }

    #[test]
    fn angle_wraps_by_exactly_360_once() {
        let mut state = AnimationState {
            angle: 359.9,
            ..AnimationState::new()
        };
        state.advance(FRAME);
        assert!(state.angle >= 0.0 && state.angle < 360.0);
        // 359.9 + 1.35 - 360.0
        assert!((state.angle - 1.25).abs() < 1e-2, "angle {}", state.angle);
    }

    #[test]
    fn angle_monotonic_modulo_wrap() {
        let mut state = AnimationState::new();
        let mut previous = state.angle;
        for _ in 0..50_000 {
            state.advance(FRAME);
            let grew = state.angle > previous;
            let wrapped = previous > state.angle && previous >= 360.0 - ANGLE_STEP * 2.0;
            assert!(grew || wrapped, "angle went from {previous} to {}", state.angle);
            assert!(state.angle < 360.0 + ANGLE_STEP);
            previous = state.angle;
        }
    }

    #[test]
    fn background_color_channels_stay_in_unit_range() {
        let mut state = AnimationState::new();
        for _ in 0..5_000 {
            // Large steps sweep the phase through several full color cycles.
            state.advance(Duration::from_secs(1));
            for channel in state.background_color() {
                assert!((0.0..=1.0).contains(&channel), "channel {channel}");
            }
        }
    }
}
