use super::model::EditorState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    StartEffect,
    FinishEffect,
    AbortEffect,
    EnterCrop,
    LeaveCrop,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<EditorState>,
    pub event: EditorEvent,
    pub to: EditorState,
}

impl StateTransition {
    pub const fn new(from: Option<EditorState>, event: EditorEvent, to: EditorState) -> Self {
        Self { from, event, to }
    }
}
