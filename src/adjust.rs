//! Slider adjustments and the debounced commit that rasterizes them.

use std::time::{Duration, Instant};

use crate::filters::Filter;

pub const NEUTRAL_PERCENT: f32 = 100.0;
pub const PERCENT_MAX: f32 = 200.0;
pub const HUE_MAX: f32 = 360.0;
pub const BLUR_MAX: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentKind {
    Brightness,
    Contrast,
    Saturation,
    Hue,
    Blur,
}

impl AdjustmentKind {
    pub const ALL: [AdjustmentKind; 5] = [
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::Hue,
        Self::Blur,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Hue => "hue",
            Self::Blur => "blur",
        }
    }

    /// Clamps a raw slider value into this kind's range. Hue wraps into
    /// `[0, 360)`; NaN resets to the neutral value.
    pub fn clamp(self, value: f32) -> f32 {
        if value.is_nan() {
            return AdjustmentState::default().get(self);
        }
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => value.clamp(0.0, PERCENT_MAX),
            Self::Hue => {
                let wrapped = value.rem_euclid(HUE_MAX);
                if wrapped >= HUE_MAX {
                    0.0
                } else {
                    wrapped
                }
            }
            Self::Blur => value.clamp(0.0, BLUR_MAX),
        }
    }
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Pending slider values; not part of history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentState {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub hue: f32,
    pub blur: f32,
}

impl Default for AdjustmentState {
    fn default() -> Self {
        Self {
            brightness: NEUTRAL_PERCENT,
            contrast: NEUTRAL_PERCENT,
            saturation: NEUTRAL_PERCENT,
            hue: 0.0,
            blur: 0.0,
        }
    }
}

impl AdjustmentState {
    pub fn get(&self, kind: AdjustmentKind) -> f32 {
        match kind {
            AdjustmentKind::Brightness => self.brightness,
            AdjustmentKind::Contrast => self.contrast,
            AdjustmentKind::Saturation => self.saturation,
            AdjustmentKind::Hue => self.hue,
            AdjustmentKind::Blur => self.blur,
        }
    }

    /// Stores the clamped value and returns what was stored.
    pub fn set(&mut self, kind: AdjustmentKind, value: f32) -> f32 {
        let value = kind.clamp(value);
        let slot = match kind {
            AdjustmentKind::Brightness => &mut self.brightness,
            AdjustmentKind::Contrast => &mut self.contrast,
            AdjustmentKind::Saturation => &mut self.saturation,
            AdjustmentKind::Hue => &mut self.hue,
            AdjustmentKind::Blur => &mut self.blur,
        };
        *slot = value;
        value
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Filter chain for one combined commit: brightness, contrast,
    /// saturation and hue in that order, then blur when it is non-zero.
    pub fn commit_filters(&self) -> Vec<Filter> {
        let mut chain = vec![
            Filter::Brightness(self.brightness),
            Filter::Contrast(self.contrast),
            Filter::Saturation(self.saturation),
            Filter::HueShift(self.hue),
        ];
        if self.blur > 0.0 {
            chain.push(Filter::Blur(self.blur));
        }
        chain
    }
}

/// Single-slot cancellable timer. A new request replaces the pending one, so
/// the deadline always trails the latest request by `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once when the pending deadline has passed and clears it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_clamped_per_kind() {
        let mut state = AdjustmentState::default();
        assert_eq!(state.set(AdjustmentKind::Brightness, 250.0), 200.0);
        assert_eq!(state.set(AdjustmentKind::Contrast, -5.0), 0.0);
        assert_eq!(state.set(AdjustmentKind::Hue, 370.0), 10.0);
        assert_eq!(state.set(AdjustmentKind::Hue, -90.0), 270.0);
        assert_eq!(state.set(AdjustmentKind::Blur, 42.0), 20.0);
        assert_eq!(state.set(AdjustmentKind::Saturation, f32::NAN), 100.0);
        assert_eq!(state.get(AdjustmentKind::Brightness), 200.0);
    }

    #[test]
    fn commit_chain_order_is_fixed() {
        let state = AdjustmentState {
            brightness: 110.0,
            contrast: 90.0,
            saturation: 130.0,
            hue: 45.0,
            blur: 0.0,
        };
        assert_eq!(
            state.commit_filters(),
            vec![
                Filter::Brightness(110.0),
                Filter::Contrast(90.0),
                Filter::Saturation(130.0),
                Filter::HueShift(45.0),
            ]
        );
        let blurred = AdjustmentState { blur: 2.0, ..state };
        assert_eq!(blurred.commit_filters().last(), Some(&Filter::Blur(2.0)));
    }

    #[test]
    fn default_state_is_neutral() {
        let mut state = AdjustmentState::default();
        assert!(state.is_neutral());
        state.set(AdjustmentKind::Hue, 1.0);
        assert!(!state.is_neutral());
    }

    #[test]
    fn debouncer_fires_once_after_latest_request() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        debounce.request(start);
        debounce.request(start + Duration::from_millis(200));
        assert!(!debounce.poll(start + Duration::from_millis(350)));
        assert!(debounce.poll(start + Duration::from_millis(500)));
        assert!(!debounce.poll(start + Duration::from_millis(900)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn cancelled_debounce_never_fires() {
        let start = Instant::now();
        let mut debounce = Debouncer::new(Duration::from_millis(300));
        debounce.request(start);
        assert!(debounce.cancel());
        assert!(!debounce.poll(start + Duration::from_secs(5)));
        assert!(!debounce.cancel());
    }
}
