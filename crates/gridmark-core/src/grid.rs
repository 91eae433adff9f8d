use crate::color::Color;
use crate::layout::char_width;
use crossterm::style::{SetBackgroundColor, SetForegroundColor};

/// Marks the second column of a double-width glyph.
const CONTINUATION: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub fn blank(fg: Color, bg: Color) -> Self {
        Self { ch: ' ', fg, bg }
    }

    pub fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }
}

/// Fixed-size character grid the renderer paints into. Coordinates are
/// 0-based; writes outside the grid are ignored.
#[derive(Debug, Clone)]
pub struct CellGrid {
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
}

impl CellGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_colors(width, height, Color::White, Color::Black)
    }

    pub fn with_colors(width: usize, height: usize, fg: Color, bg: Color) -> Self {
        let cells = (0..height)
            .map(|_| (0..width).map(|_| Cell::blank(fg, bg)).collect())
            .collect();
        Self {
            cells,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y][x] = cell;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(y).and_then(|row| row.get(x))
    }

    /// Paint `width` blank cells with background `bg`, keeping each cell's
    /// foreground.
    pub fn fill_row(&mut self, x: usize, y: usize, width: usize, bg: Color) {
        let Some(row) = self.cells.get_mut(y) else {
            return;
        };
        for cell in row.iter_mut().skip(x).take(width) {
            cell.ch = ' ';
            cell.bg = bg;
        }
    }

    /// Write `text` starting at `(x, y)`, stopping before `max_width`
    /// columns are exceeded or the grid edge is reached. Returns the columns
    /// written.
    pub fn put_str(
        &mut self,
        x: usize,
        y: usize,
        text: &str,
        fg: Color,
        bg: Color,
        max_width: usize,
    ) -> usize {
        if y >= self.height {
            return 0;
        }

        let mut col = x;
        let limit = x.saturating_add(max_width).min(self.width);
        for c in text.chars() {
            let cw = char_width(c);
            if cw == 0 {
                continue;
            }
            if col + cw > limit {
                break;
            }
            self.cells[y][col] = Cell::new(c, fg, bg);
            for i in 1..cw {
                self.cells[y][col + i] = Cell::new(CONTINUATION, fg, bg);
            }
            col += cw;
        }
        col - x
    }

    /// Rows as plain text.
    pub fn to_lines(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|c| c.ch != CONTINUATION).map(|c| c.ch).collect())
            .collect()
    }

    /// Rows with ANSI colour sequences, one SGR change per style run.
    pub fn to_ansi_lines(&self) -> Vec<String> {
        self.cells.iter().map(|row| cells_to_ansi(row)).collect()
    }

    pub fn to_string_joined(&self) -> String {
        self.to_ansi_lines().join("\r\n")
    }
}

fn cells_to_ansi(cells: &[Cell]) -> String {
    let mut result = String::new();
    let mut current: Option<(Color, Color)> = None;

    for cell in cells {
        if cell.ch == CONTINUATION {
            continue;
        }

        let style = (cell.fg, cell.bg);
        if current != Some(style) {
            result.push_str(&SetForegroundColor(cell.fg.to_crossterm()).to_string());
            result.push_str(&SetBackgroundColor(cell.bg.to_crossterm()).to_string());
            current = Some(style);
        }

        result.push(cell.ch);
    }

    if current.is_some() {
        result.push_str("\x1b[0m");
    }

    result
}
