//! Routes effect identifiers to filters or geometry ops and owns the
//! processing window.
//!
//! Work runs on a worker thread. Completion is only reported once the
//! configured minimum delay has elapsed since the request, however fast the
//! pixel math was; a zero delay makes completion observable on the first
//! poll after the worker finishes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::buffer::PixelBuffer;
use crate::effects::EffectKind;
use crate::session::{EditError, EditResult};
use crate::state::{EditorEvent, EditorState, StateMachine};
use crate::transform::{self, TransformState};
use crate::worker::{spawn_worker, WorkerHandle, WorkerPoll};

pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(500);

/// Raster produced by one effect plus the orientation it leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectProduct {
    pub buffer: PixelBuffer,
    pub transform: TransformState,
}

/// Outcome of an in-flight effect once its processing window closes.
#[derive(Debug)]
pub struct EffectCompletion {
    pub effect_id: String,
    pub result: EditResult<EffectProduct>,
}

/// What `start` did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Processing,
    CropStarted,
}

#[derive(Debug)]
struct InFlight {
    effect_id: String,
    started_at: Instant,
    job: WorkerHandle<EditResult<EffectProduct>>,
    finished: Option<EditResult<EffectProduct>>,
}

#[derive(Debug)]
pub struct EffectDispatcher {
    delay: Duration,
    machine: StateMachine,
    in_flight: Option<InFlight>,
}

impl EffectDispatcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            machine: StateMachine::new(),
            in_flight: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> EditorState {
        self.machine.state()
    }

    pub fn is_processing(&self) -> bool {
        self.state() == EditorState::Processing
    }

    pub fn in_crop(&self) -> bool {
        self.state() == EditorState::CropPending
    }

    /// Identifier of the effect currently processing.
    pub fn active_effect(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|job| job.effect_id.as_str())
    }

    /// Starts `effect_id` against `source`. A second request while one is
    /// processing is rejected with `Busy`; `crop` only switches state.
    pub fn start(
        &mut self,
        effect_id: &str,
        source: Arc<PixelBuffer>,
        transform: TransformState,
        now: Instant,
    ) -> EditResult<Dispatched> {
        if let Some(active) = self.active_effect() {
            tracing::warn!(requested = %effect_id, active = %active, "effect rejected while processing");
            return Err(EditError::Busy {
                active: active.to_string(),
            });
        }

        let kind = EffectKind::resolve(effect_id);
        if kind == EffectKind::Crop {
            self.machine
                .transition(EditorEvent::EnterCrop)
                .map_err(|_| self.busy_error(effect_id))?;
            return Ok(Dispatched::CropStarted);
        }

        self.machine
            .transition(EditorEvent::StartEffect)
            .map_err(|_| self.busy_error(effect_id))?;

        let seed: u32 = rand::random();
        let job = spawn_worker(move || compute(&kind, &source, transform, seed));
        tracing::debug!(effect = %effect_id, delay_ms = self.delay.as_millis() as u64, "effect started");
        self.in_flight = Some(InFlight {
            effect_id: effect_id.to_string(),
            started_at: now,
            job,
            finished: None,
        });
        Ok(Dispatched::Processing)
    }

    /// Returns the completion once both the worker has finished and the
    /// processing window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<EffectCompletion> {
        let job = self.in_flight.as_mut()?;
        if job.finished.is_none() {
            match job.job.try_take() {
                WorkerPoll::Pending => return None,
                WorkerPoll::Ready(result) => job.finished = Some(result),
                WorkerPoll::Lost => job.finished = Some(Err(worker_lost())),
            }
        }
        if now.saturating_duration_since(job.started_at) < self.delay {
            return None;
        }
        self.finish()
    }

    /// Blocks until the in-flight effect completes, sleeping out whatever is
    /// left of the processing window.
    pub fn wait(&mut self) -> Option<EffectCompletion> {
        let job = self.in_flight.as_mut()?;
        if job.finished.is_none() {
            job.finished = Some(job.job.wait().unwrap_or_else(|| Err(worker_lost())));
        }
        let ready_at = job.started_at + self.delay;
        let remaining = ready_at.saturating_duration_since(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.finish()
    }

    pub fn leave_crop(&mut self) -> bool {
        self.machine.transition(EditorEvent::LeaveCrop).is_ok()
    }

    /// Drops any in-flight work and returns to idle. A result that arrives
    /// afterwards is discarded with its channel.
    pub fn reset(&mut self) {
        if let Some(job) = self.in_flight.take() {
            tracing::debug!(effect = %job.effect_id, "discarding in-flight effect");
        }
        let _ = self.machine.transition(EditorEvent::Reset);
    }

    fn finish(&mut self) -> Option<EffectCompletion> {
        let job = self.in_flight.take()?;
        let result = job.finished.unwrap_or_else(|| Err(worker_lost()));
        let event = if result.is_ok() {
            EditorEvent::FinishEffect
        } else {
            EditorEvent::AbortEffect
        };
        if let Err(err) = self.machine.transition(event) {
            tracing::warn!(error = %err, "dispatcher state out of sync");
        }
        Some(EffectCompletion {
            effect_id: job.effect_id,
            result,
        })
    }

    fn busy_error(&self, effect_id: &str) -> EditError {
        let active = match self.state() {
            EditorState::CropPending => "crop".to_string(),
            _ => self.active_effect().unwrap_or(effect_id).to_string(),
        };
        EditError::Busy { active }
    }
}

impl Default for EffectDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSING_DELAY)
    }
}

fn compute(
    kind: &EffectKind,
    source: &PixelBuffer,
    state: TransformState,
    seed: u32,
) -> EditResult<EffectProduct> {
    let (buffer, transform) = match kind {
        EffectKind::Filter(filter) => (filter.apply_seeded(source, seed), state),
        EffectKind::Rotate => transform::rotate(source, state),
        EffectKind::Flip => transform::flip(source, state),
        EffectKind::Crop => {
            return Err(EditError::DecodeFailure {
                message: "crop does not produce pixels directly".to_string(),
            })
        }
    };
    let buffer = rasterize(buffer)?;
    Ok(EffectProduct { buffer, transform })
}

/// Re-validates a produced buffer before it can be published.
fn rasterize(buffer: PixelBuffer) -> EditResult<PixelBuffer> {
    let (width, height) = buffer.dimensions();
    if buffer.is_empty() {
        return Err(EditError::DecodeFailure {
            message: format!("effect produced an empty {width}x{height} image"),
        });
    }
    Ok(PixelBuffer::from_raw(width, height, buffer.into_pixels())?)
}

fn worker_lost() -> EditError {
    EditError::DecodeFailure {
        message: "effect worker stopped before producing a result".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::gradient;
    use crate::filters::sepia;

    fn source() -> Arc<PixelBuffer> {
        Arc::new(gradient(16, 8))
    }

    #[test]
    fn completion_waits_for_processing_window() {
        let mut dispatcher = EffectDispatcher::new(Duration::from_millis(500));
        let start = Instant::now();
        dispatcher
            .start("sepia", source(), TransformState::default(), start)
            .expect("start");
        assert!(dispatcher.is_processing());
        assert_eq!(dispatcher.active_effect(), Some("sepia"));

        // worker finishes quickly, but the window is still open
        std::thread::sleep(Duration::from_millis(50));
        assert!(dispatcher.poll(start + Duration::from_millis(100)).is_none());
        assert!(dispatcher.is_processing());

        let late = start + Duration::from_millis(600);
        let done = (0..200)
            .find_map(|_| {
                let polled = dispatcher.poll(late);
                if polled.is_none() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                polled
            })
            .expect("completion after window");
        assert_eq!(done.effect_id, "sepia");
        let product = done.result.expect("sepia result");
        assert_eq!(product.buffer, sepia(&gradient(16, 8)));
        assert_eq!(dispatcher.state(), EditorState::Idle);
        assert_eq!(dispatcher.active_effect(), None);
    }

    #[test]
    fn second_request_while_processing_is_busy() {
        let mut dispatcher = EffectDispatcher::new(Duration::from_secs(60));
        let now = Instant::now();
        dispatcher
            .start("hdr", source(), TransformState::default(), now)
            .expect("start");
        let err = dispatcher
            .start("sepia", source(), TransformState::default(), now)
            .expect_err("busy");
        assert_eq!(
            err,
            EditError::Busy {
                active: "hdr".into()
            }
        );
    }

    #[test]
    fn crop_switches_state_without_work() {
        let mut dispatcher = EffectDispatcher::new(Duration::ZERO);
        let outcome = dispatcher
            .start("crop", source(), TransformState::default(), Instant::now())
            .expect("crop");
        assert_eq!(outcome, Dispatched::CropStarted);
        assert!(dispatcher.in_crop());
        assert!(dispatcher.poll(Instant::now()).is_none());
        assert!(matches!(
            dispatcher.start("sepia", source(), TransformState::default(), Instant::now()),
            Err(EditError::Busy { .. })
        ));
        assert!(dispatcher.leave_crop());
        assert_eq!(dispatcher.state(), EditorState::Idle);
    }

    #[test]
    fn geometry_effects_carry_new_transform() {
        let mut dispatcher = EffectDispatcher::new(Duration::ZERO);
        dispatcher
            .start("rotate", source(), TransformState::default(), Instant::now())
            .expect("rotate");
        let product = dispatcher
            .wait()
            .expect("completion")
            .result
            .expect("rotated");
        assert_eq!(product.buffer.dimensions(), (8, 16));
        assert_eq!(product.transform.rotation_degrees(), 90);
    }

    #[test]
    fn empty_source_aborts_with_decode_failure() {
        let mut dispatcher = EffectDispatcher::new(Duration::ZERO);
        let empty = Arc::new(PixelBuffer::filled(0, 0, [0; 4]));
        dispatcher
            .start("sepia", empty, TransformState::default(), Instant::now())
            .expect("start");
        let done = dispatcher.wait().expect("completion");
        assert!(matches!(done.result, Err(EditError::DecodeFailure { .. })));
        assert_eq!(dispatcher.state(), EditorState::Idle);
    }

    #[test]
    fn reset_discards_in_flight_work() {
        let mut dispatcher = EffectDispatcher::new(Duration::from_secs(60));
        dispatcher
            .start("vintage", source(), TransformState::default(), Instant::now())
            .expect("start");
        dispatcher.reset();
        assert_eq!(dispatcher.state(), EditorState::Idle);
        assert!(dispatcher.wait().is_none());
    }
}
