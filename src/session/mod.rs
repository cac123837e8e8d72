//! Editing session: the single owner of history, slider state, orientation
//! and the crop selection for one loaded image.

mod error;

pub use error::{EditError, EditResult};

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::adjust::{AdjustmentKind, AdjustmentState, Debouncer};
use crate::buffer::{ExportFormat, PixelBuffer};
use crate::compare::ComparisonView;
use crate::crop::{CropPhase, CropSession};
use crate::dispatcher::{
    Dispatched, EffectCompletion, EffectDispatcher, DEFAULT_PROCESSING_DELAY,
};
use crate::effects::{Catalog, EffectKind};
use crate::geometry::CropRect;
use crate::history::{HistoryAction, ImageHistory};
use crate::notification::{LogNotifier, Notification, Notifier};
use crate::state::EditorState;
use crate::transform::{self, TransformState};

pub const DEFAULT_ADJUSTMENT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Timing knobs. Tests use `SessionOptions::immediate()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub processing_delay: Duration,
    pub adjustment_debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            processing_delay: DEFAULT_PROCESSING_DELAY,
            adjustment_debounce: DEFAULT_ADJUSTMENT_DEBOUNCE,
        }
    }
}

impl SessionOptions {
    pub const fn immediate() -> Self {
        Self {
            processing_delay: Duration::ZERO,
            adjustment_debounce: Duration::ZERO,
        }
    }
}

pub struct EditorSession {
    history: ImageHistory,
    adjustments: AdjustmentState,
    debounce: Debouncer,
    transform: TransformState,
    crop: CropSession,
    dispatcher: EffectDispatcher,
    catalog: Catalog,
    notifier: Box<dyn Notifier>,
}

impl EditorSession {
    pub fn new(options: SessionOptions) -> Self {
        Self::with_notifier(options, LogNotifier)
    }

    pub fn with_notifier(options: SessionOptions, notifier: impl Notifier + 'static) -> Self {
        Self {
            history: ImageHistory::new(),
            adjustments: AdjustmentState::default(),
            debounce: Debouncer::new(options.adjustment_debounce),
            transform: TransformState::default(),
            crop: CropSession::new(),
            dispatcher: EffectDispatcher::new(options.processing_delay),
            catalog: Catalog::builtin(),
            notifier: Box::new(notifier),
        }
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn has_image(&self) -> bool {
        !self.history.is_empty()
    }

    /// Starts a new session on `buffer`; history becomes `[buffer]`.
    pub fn load_image(&mut self, buffer: PixelBuffer) -> EditResult<()> {
        if buffer.is_empty() {
            let (width, height) = buffer.dimensions();
            return Err(self.report(EditError::DecodeFailure {
                message: format!("image has zero area ({width}x{height})"),
            }));
        }
        self.reset_session_state();
        let (width, height) = buffer.dimensions();
        self.history.reset(Arc::new(buffer));
        tracing::info!(width, height, "image loaded");
        self.notifier
            .send(Notification::success("Image loaded successfully"));
        Ok(())
    }

    /// Decodes an encoded image blob and loads it. A failed decode leaves the
    /// previous session untouched.
    pub fn load_encoded(&mut self, bytes: &[u8]) -> EditResult<()> {
        match PixelBuffer::decode(bytes) {
            Ok(buffer) => self.load_image(buffer),
            Err(err) => Err(self.report(err.into())),
        }
    }

    /// Drops the image and every piece of session state.
    pub fn unload(&mut self) {
        self.reset_session_state();
        self.history.clear();
        tracing::info!("image unloaded");
    }

    /// Dispatches `effect_id` against the current image.
    pub fn apply_effect(&mut self, effect_id: &str, now: Instant) -> EditResult<Dispatched> {
        let Some(source) = self.history.current().cloned() else {
            return Err(self.report(EditError::NoImageLoaded));
        };
        match self.dispatcher.start(effect_id, source, self.transform, now) {
            Ok(Dispatched::CropStarted) => {
                self.crop.begin();
                self.notifier.send(
                    Notification::success("Crop mode activated")
                        .with_description("Drag to select the area you want to keep"),
                );
                Ok(Dispatched::CropStarted)
            }
            Ok(dispatched) => Ok(dispatched),
            Err(err) => Err(self.report(err)),
        }
    }

    /// Publishes a finished effect once its processing window has closed.
    /// `None` while nothing is ready.
    pub fn poll(&mut self, now: Instant) -> Option<EditResult<()>> {
        let completion = self.dispatcher.poll(now)?;
        Some(self.complete_effect(completion))
    }

    /// Blocks until the in-flight effect is published.
    pub fn wait_for_effect(&mut self) -> Option<EditResult<()>> {
        let completion = self.dispatcher.wait()?;
        Some(self.complete_effect(completion))
    }

    pub fn undo(&mut self) -> EditResult<()> {
        self.step_history(HistoryAction::Undo)
    }

    pub fn redo(&mut self) -> EditResult<()> {
        self.step_history(HistoryAction::Redo)
    }

    /// Back to the pristine original with default sliders and orientation.
    pub fn reset_effects(&mut self) -> EditResult<()> {
        let Some(original) = self.history.original().cloned() else {
            return Err(self.report(EditError::NoImageLoaded));
        };
        self.reset_session_state();
        self.history.reset(original);
        tracing::info!("effects reset");
        Ok(())
    }

    /// Stores a slider value and (re)arms the debounced commit. Returns the
    /// clamped value.
    pub fn set_adjustment(&mut self, kind: AdjustmentKind, value: f32, now: Instant) -> f32 {
        let stored = self.adjustments.set(kind, value);
        if self.has_image() {
            self.debounce.request(now);
        }
        tracing::debug!(adjustment = %kind, value = stored, "adjustment changed");
        stored
    }

    pub fn adjustments(&self) -> &AdjustmentState {
        &self.adjustments
    }

    pub fn adjustment_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Fires the debounced adjustment commit when its window has elapsed.
    /// While an effect or crop holds the image the commit is deferred.
    pub fn tick(&mut self, now: Instant) -> Option<EditResult<()>> {
        if !self.debounce.poll(now) {
            return None;
        }
        if self.dispatcher.state() != EditorState::Idle {
            tracing::debug!(state = ?self.dispatcher.state(), "deferring adjustment commit");
            self.debounce.request(now);
            return None;
        }
        Some(self.commit_adjustments())
    }

    /// Rasterizes every slider value into one new history entry now.
    pub fn commit_adjustments(&mut self) -> EditResult<()> {
        self.debounce.cancel();
        let Some(source) = self.history.current().cloned() else {
            return Err(self.report(EditError::NoImageLoaded));
        };
        if let Some(active) = self.dispatcher.active_effect() {
            let err = EditError::Busy {
                active: active.to_string(),
            };
            return Err(self.report(err));
        }

        let adjusted = self
            .adjustments
            .commit_filters()
            .iter()
            .fold((*source).clone(), |buffer, filter| filter.apply(&buffer));
        if adjusted.is_empty() {
            return Err(self.report(EditError::DecodeFailure {
                message: "adjustments produced an empty image".to_string(),
            }));
        }

        self.history.commit(Arc::new(adjusted));
        tracing::info!(
            adjustments = ?self.adjustments,
            cursor = self.history.cursor(),
            "adjustments committed"
        );
        self.notifier.send(
            Notification::success("Adjustments applied")
                .with_description("The image adjustments have been applied"),
        );
        Ok(())
    }

    /// Drops a scheduled adjustment commit. Returns whether one was pending.
    pub fn cancel_pending_adjustments(&mut self) -> bool {
        self.debounce.cancel()
    }

    pub fn crop_phase(&self) -> CropPhase {
        self.crop.phase()
    }

    pub fn crop_pointer_down(&mut self, x: f64, y: f64) -> EditResult<()> {
        if self.crop.pointer_down(x, y) {
            Ok(())
        } else {
            Err(EditError::CropInactive)
        }
    }

    pub fn crop_pointer_move(&mut self, x: f64, y: f64) -> EditResult<Option<CropRect>> {
        if !self.crop.is_active() {
            return Err(EditError::CropInactive);
        }
        Ok(self.crop.pointer_move(x, y))
    }

    pub fn crop_pointer_up(&mut self) {
        self.crop.pointer_up();
    }

    pub fn crop_preview(&self) -> Option<CropRect> {
        self.crop.preview()
    }

    /// Crops the current image to the live selection. On an invalid region
    /// the selection stays so it can be adjusted.
    pub fn commit_crop(&mut self) -> EditResult<()> {
        if !self.crop.is_active() {
            return Err(self.report(EditError::CropInactive));
        }
        let Some(rect) = self.crop.preview() else {
            return Err(self.report(EditError::InvalidRegion {
                reason: "no crop area selected".to_string(),
            }));
        };
        let Some(source) = self.history.current().cloned() else {
            return Err(self.report(EditError::NoImageLoaded));
        };
        let cropped = match transform::crop(&source, rect) {
            Ok(cropped) => cropped,
            Err(err) => return Err(self.report(err.into())),
        };

        let (width, height) = cropped.dimensions();
        self.history.commit(Arc::new(cropped));
        self.crop.cancel();
        self.dispatcher.leave_crop();
        tracing::info!(width, height, cursor = self.history.cursor(), "crop committed");
        self.notifier.send(
            Notification::success("Image cropped")
                .with_description("Your image has been cropped successfully"),
        );
        Ok(())
    }

    /// Leaves crop mode without touching history. Always allowed.
    pub fn cancel_crop(&mut self) {
        self.crop.cancel();
        self.dispatcher.leave_crop();
    }

    pub fn current(&self) -> Option<&PixelBuffer> {
        self.history.current().map(|buffer| buffer.as_ref())
    }

    pub fn original(&self) -> Option<&PixelBuffer> {
        self.history.original().map(|buffer| buffer.as_ref())
    }

    /// Encodes the current image for the caller to deliver.
    pub fn export(&self, format: ExportFormat) -> EditResult<Vec<u8>> {
        let Some(current) = self.history.current() else {
            return Err(self.report(EditError::NoImageLoaded));
        };
        current.encode(format).map_err(|err| self.report(err.into()))
    }

    pub fn comparison(&self, split_percent: f64) -> EditResult<ComparisonView> {
        match (self.history.original(), self.history.current()) {
            (Some(original), Some(current)) => Ok(ComparisonView::new(
                Arc::clone(original),
                Arc::clone(current),
                split_percent,
            )),
            _ => Err(EditError::NoImageLoaded),
        }
    }

    /// Undo is offered only while idle with something to step back to.
    /// `undo` itself is refused only while an effect is processing.
    pub fn can_undo(&self) -> bool {
        self.dispatcher.state() == EditorState::Idle && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.dispatcher.state() == EditorState::Idle && self.history.can_redo()
    }

    pub fn state(&self) -> EditorState {
        self.dispatcher.state()
    }

    pub fn is_processing(&self) -> bool {
        self.dispatcher.is_processing()
    }

    pub fn active_effect(&self) -> Option<&str> {
        self.dispatcher.active_effect()
    }

    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    fn complete_effect(&mut self, completion: EffectCompletion) -> EditResult<()> {
        let EffectCompletion { effect_id, result } = completion;
        let product = match result {
            Ok(product) => product,
            Err(err) => {
                tracing::warn!(effect = %effect_id, "effect aborted, history untouched");
                return Err(self.report(err));
            }
        };

        let (width, height) = product.buffer.dimensions();
        self.history.commit(Arc::new(product.buffer));
        self.transform = product.transform;
        tracing::info!(
            effect = %effect_id,
            width,
            height,
            cursor = self.history.cursor(),
            "effect committed"
        );

        let notification = match EffectKind::resolve(&effect_id) {
            EffectKind::Rotate => Notification::success("Image rotated")
                .with_description("Your image has been rotated 90 degrees"),
            EffectKind::Flip => Notification::success("Image flipped")
                .with_description("Your image has been flipped horizontally"),
            kind => {
                let applied = Notification::success(format!(
                    "{} effect applied",
                    self.catalog.display_name(&effect_id)
                ));
                if kind.is_simulated() {
                    applied.with_description("Simulated preview, not the real effect")
                } else {
                    applied
                }
            }
        };
        self.notifier.send(notification);
        Ok(())
    }

    fn step_history(&mut self, action: HistoryAction) -> EditResult<()> {
        if !self.has_image() {
            return Err(self.report(EditError::NoImageLoaded));
        }
        // an in-flight result would be committed on top of the stepped cursor
        if let Some(active) = self.dispatcher.active_effect() {
            let err = EditError::Busy {
                active: active.to_string(),
            };
            return Err(self.report(err));
        }
        let stepped = self.history.step(action).map(|_| ());
        match stepped {
            Ok(()) => {
                tracing::info!(cursor = self.history.cursor(), "{}", action.applied_message());
                Ok(())
            }
            Err(err) => Err(self.report(err.into())),
        }
    }

    fn reset_session_state(&mut self) {
        self.adjustments = AdjustmentState::default();
        self.debounce.cancel();
        self.transform = TransformState::default();
        self.crop.cancel();
        self.dispatcher.reset();
    }

    fn report(&self, err: EditError) -> EditError {
        tracing::warn!(error = %err, "edit operation failed");
        self.notifier
            .send(Notification::failure(err.title(), err.description()));
        err
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("state", &self.dispatcher.state())
            .field("history_len", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("adjustments", &self.adjustments)
            .field("transform", &self.transform)
            .field("crop", &self.crop.phase())
            .finish()
    }
}
