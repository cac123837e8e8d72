use super::error::{StateError, StateResult};
use super::{EditorEvent, EditorState, StateTransition};

#[derive(Debug)]
pub struct StateMachine {
    state: EditorState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: EditorState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn can_transition(&self, event: EditorEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: EditorEvent) -> Option<EditorState> {
        use EditorEvent::*;
        match (self.state, event) {
            (EditorState::Idle, StartEffect) => Some(EditorState::Processing),
            (EditorState::Processing, FinishEffect | AbortEffect) => Some(EditorState::Idle),
            (EditorState::Idle, EnterCrop) => Some(EditorState::CropPending),
            // re-dispatching crop restarts the selection
            (EditorState::CropPending, EnterCrop) => Some(EditorState::CropPending),
            (EditorState::CropPending, LeaveCrop) => Some(EditorState::Idle),
            (_, Reset) => Some(EditorState::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: EditorEvent) -> StateResult<EditorState> {
        tracing::debug!(from = ?self.state, event = ?event, "request state transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid state transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        if event == EditorEvent::Reset {
            self.transition_history.clear();
        }
        self.transition_history.push(record);

        Ok(self.state)
    }

}

#[cfg(test)]
impl StateMachine {
    fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EditorState::{:?}", self.state)
    }
}
