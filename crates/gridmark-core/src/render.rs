//! Viewport painting
//!
//! Paints a scrolled window of already laid-out physical lines into a
//! [`CellGrid`] and reports where interactive elements landed. Painting
//! never tokenizes or lays out, and touches only the visible rows.

use crate::grid::CellGrid;
use crate::layout::char_width;
use crate::types::{PhysicalLine, RegisteredElement, RegistryEntry};

/// Screen rectangle to paint into. The origin is 1-based, matching the
/// `base_x` column convention of physical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x: x.max(1),
            y: y.max(1),
            width,
            height,
        }
    }

    /// The whole grid.
    pub fn full(grid: &CellGrid) -> Self {
        Self::new(1, 1, grid.width(), grid.height())
    }
}

/// Result of one paint pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaintOutput {
    pub registry: Vec<RegistryEntry>,
    /// First screen row below the painted content
    pub next_row: usize,
}

/// Paint `lines` starting at physical line `scroll`.
pub fn paint_lines(
    lines: &[PhysicalLine],
    scroll: usize,
    viewport: Viewport,
    grid: &mut CellGrid,
) -> PaintOutput {
    // the fields are public; origin must still be 1-based
    let viewport = Viewport::new(viewport.x, viewport.y, viewport.width, viewport.height);
    let mut registry = Vec::new();
    let right = viewport.x + viewport.width;
    let grid_x = viewport.x - 1;
    let mut painted = 0;

    for (row, line) in lines.iter().enumerate().skip(scroll).take(viewport.height) {
        let y = viewport.y + painted;
        let grid_y = y - 1;

        if let Some(fill) = line.fill() {
            grid.fill_row(grid_x, grid_y, viewport.width, fill);
        }

        match line {
            PhysicalLine::Blank { .. } => {}
            PhysicalLine::HorizontalRule { text, fg, bg, .. } => {
                grid.put_str(grid_x, grid_y, text, *fg, *bg, viewport.width);
            }
            PhysicalLine::Text {
                fragments, base_x, ..
            } => {
                let mut x = viewport.x + base_x - 1;
                for fragment in fragments {
                    if x >= right {
                        break;
                    }
                    let written = grid.put_str(
                        x - 1,
                        grid_y,
                        &fragment.text,
                        fragment.fg,
                        fragment.bg,
                        right - x,
                    );
                    if fragment.kind.is_interactive() && written > 0 {
                        registry.push(RegistryEntry {
                            row,
                            element: RegisteredElement {
                                kind: fragment.kind,
                                x,
                                y,
                                width: written,
                                text: clip_to_width(&fragment.text, written),
                                meta: fragment.meta.clone(),
                            },
                        });
                    }
                    x += fragment.width;
                }
            }
        }

        painted += 1;
    }

    PaintOutput {
        registry,
        next_row: viewport.y + painted,
    }
}

/// Longest prefix of `text` that fits in `width` columns.
fn clip_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += char_width(*c);
            used <= width
        })
        .collect()
}
