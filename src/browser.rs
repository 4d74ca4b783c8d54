use std::collections::HashSet;

use tracing::debug;

use crate::dataset::Dataset;
use crate::surface::{RowFrame, Segment, Surface};

/// Which columns to display and which of those accept edits. Empty lists
/// mean "not given".
#[derive(Debug, Clone, Default)]
pub struct ViewSpec {
    /// Columns to display, in this order. Ignored when `remove` is set.
    pub show: Vec<String>,
    /// Columns to exclude; takes precedence over `show`.
    pub remove: Vec<String>,
    /// Columns rendered as editable controls. Names outside the resolved
    /// column set are dropped.
    pub editable: Vec<String>,
}

/// Shows one record at a time and pages through the dataset. Pending edits
/// are written back into the dataset immediately before every cursor move.
pub struct RowBrowser<'a> {
    data: &'a mut Dataset,
    columns: Vec<String>,
    editable: HashSet<String>,
    cursor: usize,
    /// Control names registered by the last render; rebuilt every frame.
    registered: Vec<String>,
}

impl<'a> RowBrowser<'a> {
    pub fn new(data: &'a mut Dataset, spec: &ViewSpec) -> Self {
        let columns = resolve_columns(data.columns(), &spec.show, &spec.remove);
        let editable = spec
            .editable
            .iter()
            .filter(|c| columns.iter().any(|k| k == *c))
            .cloned()
            .collect();
        Self {
            data,
            columns,
            editable,
            cursor: 0,
            registered: Vec::new(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Dataset {
        self.data
    }

    /// Render the row under the cursor, replacing whatever the surface shows.
    /// An out-of-bounds cursor (only reachable with an empty dataset) renders
    /// a notice and registers nothing.
    pub fn render_current(&mut self, surface: &mut dyn Surface) {
        let len = self.data.len();
        self.registered.clear();
        if self.cursor >= len {
            surface.present(RowFrame::OutOfBounds {
                index: self.cursor,
                len,
            });
            return;
        }
        let mut segments = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = self
                .data
                .cell(self.cursor, column)
                .unwrap_or_default()
                .to_string();
            if self.editable.contains(column) {
                self.registered.push(column.clone());
                segments.push(Segment::Input {
                    column: column.clone(),
                    initial: value,
                });
            } else {
                segments.push(Segment::Field {
                    column: column.clone(),
                    value,
                });
            }
        }
        surface.present(RowFrame::Row {
            index: self.cursor,
            len,
            segments,
        });
    }

    /// Write every registered control's live value into the current row.
    /// Must run to completion before the cursor moves; a no-op when nothing
    /// is registered.
    pub fn commit_pending_edits(&mut self, surface: &dyn Surface) {
        for column in &self.registered {
            if let Some(value) = surface.input_value(column) {
                debug!(row = self.cursor, column = column.as_str(), "commit edit");
                self.data.set_cell(self.cursor, column, value);
            }
        }
    }

    /// Commit, then move one row forward. At the last row the commit still
    /// runs and the cursor stays put.
    pub fn advance(&mut self, surface: &mut dyn Surface) {
        self.commit_pending_edits(surface);
        if self.cursor + 1 < self.data.len() {
            self.cursor += 1;
            self.render_current(surface);
        }
    }

    /// Commit, then move one row back. At row 0 the commit still runs and
    /// the cursor stays put.
    pub fn retreat(&mut self, surface: &mut dyn Surface) {
        self.commit_pending_edits(surface);
        if self.cursor > 0 {
            self.cursor -= 1;
            self.render_current(surface);
        }
    }
}

// Exclusion wins over inclusion; unknown names are dropped, never an error,
// so a typo reads the same as an intentional omission.
fn resolve_columns(all: &[String], show: &[String], remove: &[String]) -> Vec<String> {
    if !remove.is_empty() {
        all.iter()
            .filter(|c| !remove.iter().any(|r| r == *c))
            .cloned()
            .collect()
    } else if !show.is_empty() {
        show.iter()
            .filter(|c| all.iter().any(|a| a == *c))
            .cloned()
            .collect()
    } else {
        all.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Test double for the display surface: remembers the last frame and
    /// exposes the registered controls as a plain map.
    #[derive(Default)]
    struct RecordingSurface {
        last: Option<RowFrame>,
        inputs: HashMap<String, String>,
    }

    impl RecordingSurface {
        fn set_input(&mut self, column: &str, value: &str) {
            assert!(
                self.inputs.contains_key(column),
                "no control registered for {column}"
            );
            self.inputs.insert(column.into(), value.into());
        }

        fn segments(&self) -> &[Segment] {
            match self.last.as_ref().expect("no frame presented") {
                RowFrame::Row { segments, .. } => segments,
                RowFrame::OutOfBounds { .. } => panic!("expected a row frame"),
            }
        }
    }

    impl Surface for RecordingSurface {
        fn present(&mut self, frame: RowFrame) {
            self.inputs.clear();
            if let RowFrame::Row { segments, .. } = &frame {
                for seg in segments {
                    if let Segment::Input { column, initial } = seg {
                        self.inputs.insert(column.clone(), initial.clone());
                    }
                }
            }
            self.last = Some(frame);
        }

        fn input_value(&self, column: &str) -> Option<String> {
            self.inputs.get(column).cloned()
        }
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                vec!["1".into(), "x".into()],
                vec!["2".into(), "y".into()],
            ],
        )
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_all_columns() {
        let mut data = sample();
        let browser = RowBrowser::new(&mut data, &ViewSpec::default());
        assert_eq!(browser.columns(), cols(&["a", "b"]).as_slice());
    }

    #[test]
    fn remove_wins_over_show() {
        let mut data = sample();
        let spec = ViewSpec {
            show: cols(&["a", "b"]),
            remove: cols(&["b"]),
            ..ViewSpec::default()
        };
        let browser = RowBrowser::new(&mut data, &spec);
        assert_eq!(browser.columns(), cols(&["a"]).as_slice());
    }

    #[test]
    fn show_preserves_its_own_order_and_drops_unknown_names() {
        let mut data = sample();
        let spec = ViewSpec {
            show: cols(&["b", "typo", "a"]),
            ..ViewSpec::default()
        };
        let browser = RowBrowser::new(&mut data, &spec);
        assert_eq!(browser.columns(), cols(&["b", "a"]).as_slice());
    }

    #[test]
    fn editable_outside_column_set_is_ignored() {
        let mut data = sample();
        let spec = ViewSpec {
            remove: cols(&["b"]),
            editable: cols(&["b"]),
            ..ViewSpec::default()
        };
        let mut browser = RowBrowser::new(&mut data, &spec);
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);
        assert!(surface.inputs.is_empty());
    }

    #[test]
    fn renders_fields_and_inputs_in_column_order() {
        let mut data = sample();
        let spec = ViewSpec {
            editable: cols(&["b"]),
            ..ViewSpec::default()
        };
        let mut browser = RowBrowser::new(&mut data, &spec);
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);
        assert_eq!(
            surface.segments(),
            &[
                Segment::Field {
                    column: "a".into(),
                    value: "1".into()
                },
                Segment::Input {
                    column: "b".into(),
                    initial: "x".into()
                },
            ]
        );
    }

    #[test]
    fn empty_dataset_renders_out_of_bounds_notice() {
        let mut data = Dataset::new(cols(&["a"]), vec![]);
        let mut browser = RowBrowser::new(&mut data, &ViewSpec::default());
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);
        let frame = surface.last.as_ref().expect("no frame presented");
        assert_eq!(frame, &RowFrame::OutOfBounds { index: 0, len: 0 });
        assert_eq!(frame.position(), "Row index 0 is out of bounds.");
    }

    #[test]
    fn advance_and_retreat_stop_at_the_edges() {
        let mut data = sample();
        let mut browser = RowBrowser::new(&mut data, &ViewSpec::default());
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);

        browser.retreat(&mut surface);
        assert_eq!(browser.cursor(), 0);

        browser.advance(&mut surface);
        assert_eq!(browser.cursor(), 1);
        browser.advance(&mut surface);
        assert_eq!(browser.cursor(), 1);
    }

    #[test]
    fn advance_then_retreat_is_a_round_trip() {
        let mut data = sample();
        let mut browser = RowBrowser::new(&mut data, &ViewSpec::default());
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);

        browser.advance(&mut surface);
        browser.retreat(&mut surface);
        assert_eq!(browser.cursor(), 0);
        assert_eq!(browser.data().cell(0, "a"), Some("1"));
        assert_eq!(browser.data().cell(0, "b"), Some("x"));
        assert_eq!(browser.data().cell(1, "b"), Some("y"));
    }

    #[test]
    fn edits_commit_on_advance() {
        let mut data = sample();
        let spec = ViewSpec {
            editable: cols(&["b"]),
            ..ViewSpec::default()
        };
        let mut browser = RowBrowser::new(&mut data, &spec);
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);
        assert_eq!(surface.input_value("b"), Some("x".into()));

        surface.set_input("b", "z");
        browser.advance(&mut surface);
        assert_eq!(browser.cursor(), 1);
        assert_eq!(browser.data().cell(0, "b"), Some("z"));
    }

    #[test]
    fn commit_still_runs_when_the_cursor_cannot_move() {
        let mut data = sample();
        let spec = ViewSpec {
            editable: cols(&["b"]),
            ..ViewSpec::default()
        };
        let mut browser = RowBrowser::new(&mut data, &spec);
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);

        surface.set_input("b", "first");
        browser.retreat(&mut surface);
        assert_eq!(browser.cursor(), 0);
        assert_eq!(browser.data().cell(0, "b"), Some("first"));

        browser.advance(&mut surface);
        surface.set_input("b", "last");
        browser.advance(&mut surface);
        assert_eq!(browser.cursor(), 1);
        assert_eq!(browser.data().cell(1, "b"), Some("last"));
    }

    #[test]
    fn committed_edit_shows_on_the_next_render() {
        let mut data = sample();
        let spec = ViewSpec {
            editable: cols(&["b"]),
            ..ViewSpec::default()
        };
        let mut browser = RowBrowser::new(&mut data, &spec);
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);

        surface.set_input("b", "z");
        browser.advance(&mut surface);
        browser.retreat(&mut surface);
        assert_eq!(surface.input_value("b"), Some("z".into()));
    }

    #[test]
    fn commit_is_a_noop_without_editable_columns() {
        let mut data = sample();
        let mut browser = RowBrowser::new(&mut data, &ViewSpec::default());
        let mut surface = RecordingSurface::default();
        browser.render_current(&mut surface);
        browser.commit_pending_edits(&surface);
        assert_eq!(browser.data().cell(0, "a"), Some("1"));
    }
}
