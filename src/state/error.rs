use super::event::EditorEvent;
use super::model::EditorState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("invalid state transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: EditorState,
        event: EditorEvent,
    },
}
