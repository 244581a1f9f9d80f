use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Colors as TermColors, Print, ResetColor, SetAttribute, SetColors},
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};

use super::style::Style;

/// Output boundary for a render pass: a grid of styled cells that is
/// cleared, written and then flushed as a whole.
pub trait Screen {
    fn size(&self) -> (u16, u16);
    fn resize(&mut self, width: u16, height: u16);
    fn clear(&mut self);
    /// Cells outside the grid are dropped.
    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style);
    fn flush(&mut self) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', style: Style::Normal }
    }
}

/// In-memory cell grid. Used as the back buffer of `TerminalScreen` and
/// directly by tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Characters of row `y` with trailing blanks removed.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = y as usize * self.width as usize;
        let row: String = self.cells[start..start + self.width as usize]
            .iter()
            .map(|c| c.ch)
            .collect();
        row.trim_end().to_string()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

impl Screen for CellBuffer {
    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u16, height: u16) {
        *self = CellBuffer::new(width, height);
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.cells[y as usize * self.width as usize + x as usize] = Cell { ch, style };
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Crossterm-backed screen. Each flush repaints the whole back buffer inside
/// a synchronized update so a frame is never shown half drawn.
pub struct TerminalScreen<W: Write> {
    buffer: CellBuffer,
    out: W,
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            buffer: CellBuffer::new(width, height),
            out,
        }
    }

    pub fn buffer(&self) -> &CellBuffer {
        &self.buffer
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn size(&self) -> (u16, u16) {
        self.buffer.size()
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.buffer.resize(width, height);
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        self.buffer.set_cell(x, y, ch, style);
    }

    fn flush(&mut self) -> io::Result<()> {
        let (width, height) = self.buffer.size();
        queue!(self.out, BeginSynchronizedUpdate)?;

        for (y, row) in self.buffer.rows().enumerate().take(height as usize) {
            // Writing the bottom-right cell scrolls some terminals.
            let row = if y + 1 == height as usize {
                &row[..row.len().saturating_sub(1)]
            } else {
                row
            };
            queue!(self.out, MoveTo(0, y as u16))?;

            let mut run = String::with_capacity(width as usize);
            let mut run_style: Option<Style> = None;
            for cell in row {
                if run_style != Some(cell.style) {
                    if let Some(style) = run_style {
                        write_run(&mut self.out, style, &run)?;
                        run.clear();
                    }
                    run_style = Some(cell.style);
                }
                run.push(cell.ch);
            }
            if let Some(style) = run_style {
                write_run(&mut self.out, style, &run)?;
            }
        }

        queue!(self.out, ResetColor, SetAttribute(crossterm::style::Attribute::Reset))?;
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()
    }
}

fn write_run(out: &mut impl Write, style: Style, text: &str) -> io::Result<()> {
    let colors = style.colors();
    queue!(
        out,
        SetColors(TermColors::new(colors.fg, colors.bg)),
        SetAttribute(colors.attribute()),
        Print(text)
    )
}
