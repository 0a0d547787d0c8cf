//! Multi-line editor buffer.
//!
//! Holds the text of one editable pane as a list of lines plus a cursor
//! and scroll offsets. Every content mutation bumps a revision counter;
//! the render pipeline re-runs when either input buffer's revision moved.
//!
//! Cursor columns are measured in characters, not bytes.

#[derive(Debug)]
pub struct EditorBuffer {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
    row_off: usize,
    col_off: usize,
    revision: u64,
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(|line| line.to_string()).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            cursor_row: 0,
            cursor_col: 0,
            row_off: 0,
            col_off: 0,
            revision: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Wholesale replacement (fetch and format actions).
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(|line| line.to_string()).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.row_off = 0;
        self.col_off = 0;
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|line| line.chars().count()).unwrap_or(0)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(idx, _)| idx)
            .unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        let line = &mut self.lines[self.cursor_row];
        let idx = Self::byte_index(line, self.cursor_col);
        line.insert(idx, ch);
        self.cursor_col += 1;
        self.revision += 1;
    }

    /// Insert a chunk of text at the cursor (paste path). Carriage returns
    /// are dropped so CRLF pastes behave.
    pub fn insert_str(&mut self, text: &str) {
        let mut changed = false;
        for ch in text.chars() {
            if ch == '\r' {
                continue;
            }
            if ch == '\n' {
                self.split_line_at_cursor();
            } else {
                let line = &mut self.lines[self.cursor_row];
                let idx = Self::byte_index(line, self.cursor_col);
                line.insert(idx, ch);
                self.cursor_col += 1;
            }
            changed = true;
        }
        if changed {
            self.revision += 1;
        }
    }

    pub fn insert_newline(&mut self) {
        self.split_line_at_cursor();
        self.revision += 1;
    }

    fn split_line_at_cursor(&mut self) {
        let line = &mut self.lines[self.cursor_row];
        let idx = Self::byte_index(line, self.cursor_col);
        let rest = line.split_off(idx);
        self.lines.insert(self.cursor_row + 1, rest);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_row];
            let idx = Self::byte_index(line, self.cursor_col - 1);
            line.remove(idx);
            self.cursor_col -= 1;
            self.revision += 1;
        } else if self.cursor_row > 0 {
            let removed = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
            self.lines[self.cursor_row].push_str(&removed);
            self.revision += 1;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_row) {
            let line = &mut self.lines[self.cursor_row];
            let idx = Self::byte_index(line, self.cursor_col);
            line.remove(idx);
            self.revision += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&next);
            self.revision += 1;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_row) {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
        } else {
            self.cursor_col = 0;
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
        } else {
            self.cursor_col = self.line_len(self.cursor_row);
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.line_len(self.cursor_row);
    }

    pub fn page_up(&mut self, rows: usize) {
        self.cursor_row = self.cursor_row.saturating_sub(rows.max(1));
        self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
    }

    pub fn page_down(&mut self, rows: usize) {
        self.cursor_row = (self.cursor_row + rows.max(1)).min(self.lines.len() - 1);
        self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max_off = self.lines.len().saturating_sub(1);
        let next = self.row_off as isize + delta;
        self.row_off = next.clamp(0, max_off as isize) as usize;
    }

    /// Adjust scroll offsets so the cursor falls inside a viewport of the
    /// given size, and return them for rendering.
    pub fn ensure_visible(&mut self, width: usize, height: usize) -> (usize, usize) {
        if height > 0 {
            if self.cursor_row < self.row_off {
                self.row_off = self.cursor_row;
            } else if self.cursor_row >= self.row_off + height {
                self.row_off = self.cursor_row + 1 - height;
            }
        }
        if width > 0 {
            if self.cursor_col < self.col_off {
                self.col_off = self.cursor_col;
            } else if self.cursor_col >= self.col_off + width {
                self.col_off = self.cursor_col + 1 - width;
            }
        }
        (self.row_off, self.col_off)
    }

    pub fn offsets(&self) -> (usize, usize) {
        (self.row_off, self.col_off)
    }

    /// Slice of a line visible in a viewport starting at `col_off`.
    pub fn visible_line(&self, row: usize, col_off: usize, width: usize) -> &str {
        let Some(line) = self.lines.get(row) else {
            return "";
        };
        let start = Self::byte_index(line, col_off);
        let end = Self::byte_index(line, col_off + width);
        &line[start..end]
    }
}
