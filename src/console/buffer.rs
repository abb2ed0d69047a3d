//! Transcript and input-line state for the console window.

use std::collections::VecDeque;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Console transcript plus the input line being edited.
///
/// Lines are wrapped to the configured column count as they are committed,
/// so the stored rows are exactly what the renderer draws. The scrollback
/// limit caps the number of stored rows (0 means unlimited).
pub struct ConsoleBuffer {
    /// Wrapped transcript rows, oldest first
    rows: VecDeque<String>,
    /// Unterminated program output at the end of the transcript
    partial: String,
    /// Input line currently being edited
    input: String,
    /// Submitted input lines not yet claimed by a reader
    ready_lines: VecDeque<String>,
    columns: usize,
    scrollback_limit: usize,
}

impl ConsoleBuffer {
    pub fn new(columns: usize, scrollback_limit: usize) -> Self {
        ConsoleBuffer {
            rows: VecDeque::new(),
            partial: String::new(),
            input: String::new(),
            ready_lines: VecDeque::new(),
            columns,
            scrollback_limit,
        }
    }

    /// Append program output, committing a transcript row per newline.
    pub fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                let line = std::mem::take(&mut self.partial);
                self.commit_line(&line);
            } else {
                self.partial.push(ch);
            }
        }
    }

    /// Append typed text to the input line.
    pub fn append_input(&mut self, text: &str) {
        self.input.push_str(text);
    }

    /// Remove the last grapheme cluster from the input line.
    pub fn backspace_input(&mut self) {
        if let Some((idx, _)) = self.input.grapheme_indices(true).last() {
            self.input.truncate(idx);
        }
    }

    /// Submit the input line: it completes the current transcript row (the
    /// echo a terminal would show) and becomes available to readers.
    pub fn submit_input(&mut self) {
        let line = std::mem::take(&mut self.input);
        let echoed = std::mem::take(&mut self.partial) + &line;
        self.commit_line(&echoed);
        self.ready_lines.push_back(line);
    }

    /// Claim the oldest submitted input line, if any.
    pub fn pop_ready_line(&mut self) -> Option<String> {
        self.ready_lines.pop_front()
    }

    /// The last `height` display rows, each flagged as pending input or not.
    ///
    /// The final rows are the edit line (unterminated output plus whatever
    /// has been typed); they are flagged only while input is being edited.
    pub fn visible_rows(&self, height: usize) -> Vec<(String, bool)> {
        let mut all: Vec<(String, bool)> =
            self.rows.iter().map(|row| (row.clone(), false)).collect();

        let edit = format!("{}{}", self.partial, self.input);
        let editing = !self.input.is_empty();
        for row in wrap_line(&edit, self.columns) {
            all.push((row, editing));
        }

        if all.len() > height {
            all.split_off(all.len() - height)
        } else {
            all
        }
    }

    /// The full transcript as text, for clipboard copy.
    pub fn transcript_text(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            text.push_str(row);
            text.push('\n');
        }
        text.push_str(&self.partial);
        text
    }

    fn commit_line(&mut self, line: &str) {
        for row in wrap_line(line, self.columns) {
            self.rows.push_back(row);
        }
        if self.scrollback_limit > 0 {
            while self.rows.len() > self.scrollback_limit {
                self.rows.pop_front();
            }
        }
    }
}

/// Wrap a line into display rows of at most `columns` cells.
///
/// Width is measured in terminal cells, so East Asian wide characters count
/// as two. A zero column count disables wrapping. Always yields at least one
/// row, so an empty line still occupies a display row.
fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut width = 0;

    for ch in line.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if columns > 0 && width + ch_width > columns && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            width = 0;
        }
        current.push(ch);
        width += ch_width;
    }

    rows.push(current);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_text_commits_rows_per_newline() {
        let mut buffer = ConsoleBuffer::new(80, 0);
        buffer.push_text("first\nsecond\ntrailing");

        assert_eq!(buffer.rows.len(), 2);
        assert_eq!(buffer.rows[0], "first");
        assert_eq!(buffer.rows[1], "second");
        assert_eq!(buffer.partial, "trailing");
    }

    #[test]
    fn test_wrap_line_by_cell_width() {
        assert_eq!(wrap_line("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_line("abc", 4), vec!["abc"]);
        assert_eq!(wrap_line("", 4), vec![""]);
        // No wrapping when columns is zero
        assert_eq!(wrap_line("abcdef", 0), vec!["abcdef"]);
    }

    #[test]
    fn test_wrap_line_counts_wide_characters_as_two_cells() {
        // Three ideographs are six cells wide
        assert_eq!(wrap_line("日本語", 4), vec!["日本", "語"]);
    }

    #[test]
    fn test_scrollback_limit_trims_oldest_rows() {
        let mut buffer = ConsoleBuffer::new(80, 3);
        buffer.push_text("one\ntwo\nthree\nfour\n");

        assert_eq!(buffer.rows.len(), 3);
        assert_eq!(buffer.rows[0], "two");
        assert_eq!(buffer.rows[2], "four");
    }

    #[test]
    fn test_backspace_removes_whole_grapheme() {
        let mut buffer = ConsoleBuffer::new(80, 0);
        // "e" followed by a combining acute accent is one grapheme cluster
        buffer.append_input("caf");
        buffer.append_input("e\u{301}");
        buffer.backspace_input();
        assert_eq!(buffer.input, "caf");
        buffer.backspace_input();
        assert_eq!(buffer.input, "ca");
    }

    #[test]
    fn test_backspace_on_empty_input_is_a_no_op() {
        let mut buffer = ConsoleBuffer::new(80, 0);
        buffer.backspace_input();
        assert_eq!(buffer.input, "");
    }

    #[test]
    fn test_submit_input_echoes_and_queues_line() {
        let mut buffer = ConsoleBuffer::new(80, 0);
        buffer.push_text("name> ");
        buffer.append_input("kim");
        buffer.submit_input();

        // The prompt row now carries the typed answer
        assert_eq!(buffer.rows.back().map(String::as_str), Some("name> kim"));
        assert_eq!(buffer.partial, "");
        assert_eq!(buffer.pop_ready_line(), Some("kim".to_string()));
        assert_eq!(buffer.pop_ready_line(), None);
    }

    #[test]
    fn test_visible_rows_tail_and_input_flag() {
        let mut buffer = ConsoleBuffer::new(80, 0);
        buffer.push_text("one\ntwo\nthree\n");
        buffer.append_input("typing");

        let rows = buffer.visible_rows(3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ("two".to_string(), false));
        assert_eq!(rows[1], ("three".to_string(), false));
        assert_eq!(rows[2], ("typing".to_string(), true));
    }

    #[test]
    fn test_visible_rows_includes_blank_edit_row() {
        let mut buffer = ConsoleBuffer::new(80, 0);
        buffer.push_text("done\n");

        let rows = buffer.visible_rows(10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], ("".to_string(), false));
    }

    #[test]
    fn test_transcript_text() {
        let mut buffer = ConsoleBuffer::new(80, 0);
        buffer.push_text("alpha\nbeta");
        assert_eq!(buffer.transcript_text(), "alpha\nbeta");
    }
}
