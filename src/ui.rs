use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::surface::{RowFrame, Segment, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Editing {
        cursor: usize, // byte cursor in the focused control's buffer
    },
}

/// One live editable control, registered under its column name.
#[derive(Debug, Clone)]
struct InputState {
    column: String,
    initial: String,
    buffer: String,
}

/// Terminal implementation of the display surface: keeps the last presented
/// frame plus the live input controls, and owns the focus/edit state the key
/// handlers drive.
pub struct TuiSurface {
    pub mode: Mode,
    pub status: String,
    pub show_help: bool,
    source: String,
    frame: Option<RowFrame>,
    inputs: Vec<InputState>,
    focus: usize,
}

impl TuiSurface {
    pub fn new(source: String) -> Self {
        Self {
            mode: Mode::Normal,
            status: "←/→ rows | Tab fields | e edit | ? help | q quit".into(),
            show_help: false,
            source,
            frame: None,
            inputs: Vec::new(),
            focus: 0,
        }
    }

    pub fn position(&self) -> String {
        match &self.frame {
            Some(frame) => frame.position(),
            None => "no data".into(),
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // Focus moves over editable controls only.
    pub fn focus_next(&mut self) {
        if !self.inputs.is_empty() {
            self.focus = (self.focus + 1) % self.inputs.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.inputs.is_empty() {
            self.focus = (self.focus + self.inputs.len() - 1) % self.inputs.len();
        }
    }

    pub fn begin_edit(&mut self) {
        match self.inputs.get(self.focus) {
            Some(input) => {
                self.mode = Mode::Editing {
                    cursor: input.buffer.len(),
                };
                self.status = "Editing: Enter to capture, Esc to revert".into();
            }
            None => self.status = "No editable fields on this row".into(),
        }
    }

    pub fn end_edit(&mut self) {
        self.mode = Mode::Normal;
        self.status = "Edit captured (written on the next move)".into();
    }

    /// Drop the in-progress edit and restore the control's initial value.
    pub fn cancel_edit(&mut self) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            input.buffer = input.initial.clone();
        }
        self.mode = Mode::Normal;
        self.status = "Edit reverted".into();
    }

    pub fn edit_insert(&mut self, ch: char) {
        if let Mode::Editing { ref mut cursor } = self.mode
            && let Some(input) = self.inputs.get_mut(self.focus)
        {
            input.buffer.insert(*cursor, ch);
            *cursor += ch.len_utf8();
        }
    }

    pub fn edit_backspace(&mut self) {
        if let Mode::Editing { ref mut cursor } = self.mode
            && let Some(input) = self.inputs.get_mut(self.focus)
            && *cursor > 0
        {
            let new_cursor = prev_char(&input.buffer, *cursor);
            input.buffer.drain(new_cursor..*cursor);
            *cursor = new_cursor;
        }
    }

    pub fn edit_delete(&mut self) {
        if let Mode::Editing { cursor } = self.mode
            && let Some(input) = self.inputs.get_mut(self.focus)
            && cursor < input.buffer.len()
        {
            let next = next_char(&input.buffer, cursor);
            input.buffer.drain(cursor..next);
        }
    }

    pub fn edit_left(&mut self) {
        if let Mode::Editing { ref mut cursor } = self.mode
            && let Some(input) = self.inputs.get(self.focus)
        {
            *cursor = prev_char(&input.buffer, *cursor);
        }
    }

    pub fn edit_right(&mut self) {
        if let Mode::Editing { ref mut cursor } = self.mode
            && let Some(input) = self.inputs.get(self.focus)
        {
            *cursor = next_char(&input.buffer, *cursor);
        }
    }

    pub fn edit_home(&mut self) {
        if let Mode::Editing { ref mut cursor } = self.mode {
            *cursor = 0;
        }
    }

    pub fn edit_end(&mut self) {
        if let Mode::Editing { ref mut cursor } = self.mode
            && let Some(input) = self.inputs.get(self.focus)
        {
            *cursor = input.buffer.len();
        }
    }
}

impl Surface for TuiSurface {
    fn present(&mut self, frame: RowFrame) {
        // Controls for the previous row are discarded before fresh ones are
        // registered; a repeated column name replaces its earlier control.
        self.inputs.clear();
        if let RowFrame::Row { segments, .. } = &frame {
            for seg in segments {
                if let Segment::Input { column, initial } = seg {
                    let state = InputState {
                        column: column.clone(),
                        initial: initial.clone(),
                        buffer: initial.clone(),
                    };
                    match self.inputs.iter_mut().find(|i| i.column == *column) {
                        Some(slot) => *slot = state,
                        None => self.inputs.push(state),
                    }
                }
            }
        }
        self.focus = 0;
        self.mode = Mode::Normal;
        self.frame = Some(frame);
    }

    fn input_value(&self, column: &str) -> Option<String> {
        self.inputs
            .iter()
            .find(|i| i.column == column)
            .map(|i| i.buffer.clone())
    }
}

fn prev_char(s: &str, idx: usize) -> usize {
    s[..idx]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char(s: &str, idx: usize) -> usize {
    s[idx..]
        .chars()
        .next()
        .map(|c| idx + c.len_utf8())
        .unwrap_or(s.len())
}

pub fn draw(f: &mut Frame, surface: &TuiSurface) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(f.size());

    draw_record(f, chunks[0], surface);
    draw_status(f, chunks[1], surface);
    if surface.show_help {
        draw_help(f);
    }
}

fn draw_record(f: &mut Frame, area: Rect, s: &TuiSurface) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} | {} ", s.source, s.position()));
    let Some(frame) = &s.frame else {
        f.render_widget(Paragraph::new("No data").block(block), area);
        return;
    };

    match frame {
        RowFrame::OutOfBounds { .. } => {
            let p = Paragraph::new(frame.position())
                .style(Style::default().fg(Color::Red))
                .block(block);
            f.render_widget(p, area);
        }
        RowFrame::Row { segments, .. } => {
            let heading = Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            let mut lines: Vec<Line> = Vec::new();
            for seg in segments {
                match seg {
                    Segment::Field { column, value } => {
                        lines.push(Line::from(Span::styled(format!("{column}:"), heading)));
                        lines.push(Line::from(value.clone()));
                    }
                    Segment::Input { column, .. } => {
                        let Some(idx) = s.inputs.iter().position(|i| i.column == *column) else {
                            continue;
                        };
                        let input = &s.inputs[idx];
                        let dirty = if input.buffer != input.initial { " *" } else { "" };
                        lines.push(Line::from(Span::styled(
                            format!("{column} [edit]{dirty}:"),
                            heading,
                        )));
                        lines.push(input_line(s, idx));
                    }
                }
                lines.push(Line::default());
            }
            let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
            f.render_widget(p, area);
        }
    }
}

fn input_line(s: &TuiSurface, idx: usize) -> Line<'static> {
    let input = &s.inputs[idx];
    let focused = idx == s.focus;
    let style = if focused {
        Style::default().bg(Color::Blue).fg(Color::Black)
    } else {
        Style::default().fg(Color::Yellow)
    };

    if focused && let Mode::Editing { cursor } = s.mode {
        let (before, after) = input.buffer.split_at(cursor.min(input.buffer.len()));
        let mut spans = vec![Span::styled(before.to_string(), style)];
        let mut rest = after.chars();
        match rest.next() {
            Some(ch) => {
                spans.push(Span::styled(
                    ch.to_string(),
                    style.add_modifier(Modifier::REVERSED),
                ));
                spans.push(Span::styled(rest.as_str().to_string(), style));
            }
            None => spans.push(Span::styled(
                " ".to_string(),
                style.add_modifier(Modifier::REVERSED),
            )),
        }
        return Line::from(spans);
    }

    let shown = if input.buffer.is_empty() {
        " ".to_string()
    } else {
        input.buffer.clone()
    };
    Line::from(Span::styled(shown, style))
}

fn draw_status(f: &mut Frame, area: Rect, s: &TuiSurface) {
    let mode = match s.mode {
        Mode::Normal => "NORMAL",
        Mode::Editing { .. } => "EDIT",
    };
    let text = Line::from(vec![
        Span::styled(
            format!("[{mode}] "),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(s.status.as_str()),
    ]);
    let p = Paragraph::new(text).block(Block::default().borders(Borders::TOP));
    f.render_widget(p, area);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(44, 13, f.size());
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from("Right / n / PgDn   next row"),
        Line::from("Left / p / PgUp    previous row"),
        Line::from("Tab / Down         next field"),
        Line::from("Shift-Tab / Up     previous field"),
        Line::from("Enter / e          edit focused field"),
        Line::from("  Enter            capture edit"),
        Line::from("  Esc              revert edit"),
        Line::from("?                  toggle this help"),
        Line::from("q                  quit"),
    ];
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Keys "));
    f.render_widget(p, area);
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_frame(inputs: &[(&str, &str)]) -> RowFrame {
        RowFrame::Row {
            index: 0,
            len: 1,
            segments: inputs
                .iter()
                .map(|(column, initial)| Segment::Input {
                    column: column.to_string(),
                    initial: initial.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn present_registers_fresh_controls_and_drops_old_ones() {
        let mut s = TuiSurface::new("test".into());
        s.present(row_frame(&[("a", "1"), ("b", "x")]));
        assert_eq!(s.input_value("a"), Some("1".into()));
        assert_eq!(s.input_value("b"), Some("x".into()));

        s.present(row_frame(&[("b", "y")]));
        assert_eq!(s.input_value("a"), None);
        assert_eq!(s.input_value("b"), Some("y".into()));
    }

    #[test]
    fn editing_mutates_the_focused_control() {
        let mut s = TuiSurface::new("test".into());
        s.present(row_frame(&[("b", "x")]));
        s.begin_edit();
        s.edit_insert('y');
        s.edit_backspace();
        s.edit_insert('z');
        assert_eq!(s.input_value("b"), Some("xz".into()));
    }

    #[test]
    fn cancel_edit_restores_the_initial_value() {
        let mut s = TuiSurface::new("test".into());
        s.present(row_frame(&[("b", "x")]));
        s.begin_edit();
        s.edit_insert('!');
        s.cancel_edit();
        assert_eq!(s.mode, Mode::Normal);
        assert_eq!(s.input_value("b"), Some("x".into()));
    }

    #[test]
    fn cursor_steps_respect_char_boundaries() {
        let mut s = TuiSurface::new("test".into());
        s.present(row_frame(&[("b", "aé")]));
        s.begin_edit();
        s.edit_left();
        s.edit_backspace();
        assert_eq!(s.input_value("b"), Some("é".into()));
    }

    #[test]
    fn focus_wraps_over_inputs() {
        let mut s = TuiSurface::new("test".into());
        s.present(row_frame(&[("a", "1"), ("b", "2")]));
        s.focus_next();
        s.focus_next();
        s.begin_edit();
        s.edit_insert('!');
        assert_eq!(s.input_value("a"), Some("1!".into()));
        assert_eq!(s.input_value("b"), Some("2".into()));
    }
}
