/// One visible piece of the current row, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Read-only heading-plus-value block.
    Field { column: String, value: String },
    /// Editable control registered under the column name, pre-populated with
    /// the current cell value.
    Input { column: String, initial: String },
}

/// A full replacement for whatever the surface showed before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFrame {
    Row {
        index: usize,
        len: usize,
        segments: Vec<Segment>,
    },
    /// Cursor outside [0, len): an explicit notice instead of partial UI.
    OutOfBounds { index: usize, len: usize },
}

impl RowFrame {
    /// Position indicator shown with every frame.
    pub fn position(&self) -> String {
        match self {
            RowFrame::Row { index, len, .. } => format!("Row {}/{}", index + 1, len),
            RowFrame::OutOfBounds { index, .. } => {
                format!("Row index {index} is out of bounds.")
            }
        }
    }
}

/// Display surface the browser renders through. Presenting a frame replaces
/// the previous one: controls for the previous row are discarded and fresh
/// ones registered for each `Input` segment.
pub trait Surface {
    fn present(&mut self, frame: RowFrame);

    /// Live value of the control registered under `column`; `None` when no
    /// such control exists.
    fn input_value(&self, column: &str) -> Option<String>;
}
