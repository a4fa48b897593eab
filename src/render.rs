//! Terminal heatmap rendering.
//!
//! Builds each redraw as a single string of ANSI escape codes and writes
//! it to the output in one call, then flushes. One taxel is drawn as a
//! two-column cell with a truecolor background, so the grid comes out
//! roughly square on most terminal fonts.

use std::io::Write;

use crate::heatmap::{color_for, CellColor};
use crate::protocol::{Frame, GridConfig};

/// The one display buffer, sized by the grid configuration.
///
/// Each valid frame overwrites the cell colors in place; there is no
/// history and no double buffering.
#[derive(Debug)]
pub struct Heatmap {
    cells: Vec<CellColor>,
    rows: usize,
    cols: usize,
    ceiling: i32,
    timestamp_us: u64,
}

impl Heatmap {
    pub fn new(config: &GridConfig, ceiling: i32) -> Self {
        Self {
            cells: vec![CellColor::default(); config.taxel_count()],
            rows: config.rows,
            cols: config.cols,
            ceiling,
            timestamp_us: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Timestamp of the frame currently on display.
    pub fn timestamp_us(&self) -> u64 {
        self.timestamp_us
    }

    /// Cell colors, row-major.
    pub fn cells(&self) -> &[CellColor] {
        &self.cells
    }

    /// Overwrite the buffer with a new frame's samples.
    ///
    /// The frame is trusted to match the grid dimensions; the decoder
    /// already rejected anything with the wrong length.
    pub fn update(&mut self, frame: &Frame) {
        for (cell, &sample) in self.cells.iter_mut().zip(frame.samples()) {
            *cell = color_for(sample, self.ceiling);
        }
        self.timestamp_us = frame.timestamp_us;
    }
}

/// Redraw the full heatmap.
///
/// Homes the cursor rather than clearing the screen, so an unchanged
/// cell just gets repainted without flicker. Consecutive cells sharing a
/// color reuse the active background and skip the escape code.
pub fn draw(out: &mut impl Write, map: &Heatmap, fps: f32) -> std::io::Result<()> {
    let mut output = String::new();

    output.push_str("\x1b[H"); // Home
    output.push_str(&format!(
        "taxelview  {}x{}  t={}us  {:.1} fps\x1b[K\r\n",
        map.rows(),
        map.cols(),
        map.timestamp_us(),
        fps,
    ));

    for r in 0..map.rows() {
        let mut active: Option<CellColor> = None;
        for c in 0..map.cols() {
            let color = map.cells()[r * map.cols() + c];
            if active != Some(color) {
                output.push_str(&format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b));
                active = Some(color);
            }
            output.push_str("  ");
        }
        output.push_str("\x1b[0m\x1b[K\r\n");
    }
    output.push_str("\x1b[0m");

    out.write_all(output.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::DEFAULT_CEILING;
    use crate::protocol::Decoder;

    fn frame(line: &str) -> (GridConfig, Frame) {
        let mut decoder = Decoder::new();
        decoder.feed("CFG,2,3");
        let config = *decoder.config().unwrap();
        (config, decoder.feed(line).unwrap())
    }

    #[test]
    fn test_heatmap_starts_cold() {
        let config = GridConfig { rows: 2, cols: 3 };
        let map = Heatmap::new(&config, DEFAULT_CEILING);
        assert_eq!(map.cells().len(), 6);
        assert!(map.cells().iter().all(|&c| c == CellColor::default()));
    }

    #[test]
    fn test_update_overwrites_cells_and_timestamp() {
        let (config, frame) = frame("F,100,0,0,0,1023,1023,1023");
        let mut map = Heatmap::new(&config, DEFAULT_CEILING);
        map.update(&frame);
        assert_eq!(map.timestamp_us(), 100);
        // Bottom row is saturated, top row cold.
        assert!(map.cells()[0].r < 10);
        assert!(map.cells()[5].r > 200);
    }

    #[test]
    fn test_draw_emits_truecolor_backgrounds() {
        let (config, frame) = frame("F,42,0,512,1023,0,512,1023");
        let mut map = Heatmap::new(&config, DEFAULT_CEILING);
        map.update(&frame);

        let mut out = Vec::new();
        draw(&mut out, &map, 12.5).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("\x1b[H"));
        assert!(text.contains("2x3"));
        assert!(text.contains("t=42us"));
        assert!(text.contains("12.5 fps"));
        assert!(text.contains("\x1b[48;2;"));
        // Two grid rows plus the header line.
        assert_eq!(text.matches("\r\n").count(), 3);
    }

    #[test]
    fn test_draw_skips_escape_for_repeated_color() {
        let (config, frame) = frame("F,1,7,7,7,7,7,7");
        let mut map = Heatmap::new(&config, DEFAULT_CEILING);
        map.update(&frame);

        let mut out = Vec::new();
        draw(&mut out, &map, 0.0).unwrap();
        let text = String::from_utf8(out).unwrap();

        // One background escape per row, not per cell.
        assert_eq!(text.matches("\x1b[48;2;").count(), 2);
    }
}
