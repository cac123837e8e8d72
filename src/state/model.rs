/// Coarse editor state driving which operations are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    /// An effect is computing or waiting out the minimum processing delay.
    Processing,
    /// A crop selection owns the image until it is committed or cancelled.
    CropPending,
}

impl EditorState {
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}
