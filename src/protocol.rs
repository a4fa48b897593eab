//! Wire protocol decoder for the taxel scanner.
//!
//! The scanner streams newline-terminated, comma-separated text lines:
//! a single `CFG,<rows>,<cols>` line announces the grid dimensions, then
//! `F,<timestamp_us>,<v0>,...,<vN-1>` lines each carry one full scan of
//! the array. Anything that doesn't parse is dropped without complaint;
//! the wire has no checksums and the device just keeps streaming.

use log::{debug, info};

/// Upper bound on taxels per frame a CFG may announce. Real arrays are a
/// few hundred taxels; 256x256 leaves generous headroom while keeping a
/// hostile CFG from making the next frame allocate unbounded memory.
pub const MAX_TAXELS: usize = 65_536;

/// Grid dimensions announced by the scanner's CFG line.
///
/// Set exactly once per session: the first valid CFG wins and later
/// announcements are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// Number of supply (row) lines scanned.
    pub rows: usize,
    /// Number of sense (column) lines read per row.
    pub cols: usize,
}

impl GridConfig {
    /// Total number of taxels in one frame.
    pub fn taxel_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// One full scan of the array at one device timestamp.
///
/// Samples are stored flat in row-major order, exactly as they arrive on
/// the wire. A frame is transient: the display only ever shows the most
/// recent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Device-side capture time in microseconds.
    pub timestamp_us: u64,
    samples: Vec<i32>,
    cols: usize,
}

impl Frame {
    /// Flat sample data, row-major.
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.samples.len() / self.cols
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One row of the reshaped matrix.
    ///
    /// # Panics
    /// Panics if `r` is out of range.
    pub fn row(&self, r: usize) -> &[i32] {
        &self.samples[r * self.cols..(r + 1) * self.cols]
    }

    /// Sample at (row, col), or `None` if out of range.
    pub fn get(&self, r: usize, c: usize) -> Option<i32> {
        if c >= self.cols {
            return None;
        }
        self.samples.get(r * self.cols + c).copied()
    }
}

/// A successfully parsed protocol line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Config(GridConfig),
    Data(Frame),
}

/// Parse a single protocol line.
///
/// `config` is the currently known grid configuration, needed to validate
/// data frame lengths. Returns `None` for anything that isn't a complete,
/// well-formed line: empty input, unknown tags, non-numeric tokens, a CFG
/// with missing or zero dimensions or more than [`MAX_TAXELS`] total
/// taxels, or a data frame whose token count
/// doesn't match `rows * cols + 2` (tag and timestamp included).
///
/// Data frames arriving before any CFG are unparseable by definition
/// (their expected length is unknown) and yield `None`.
pub fn parse_line(line: &str, config: Option<&GridConfig>) -> Option<Line> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split(',');
    match parts.next()? {
        "CFG" => {
            let rows: usize = parts.next()?.trim().parse().ok()?;
            let cols: usize = parts.next()?.trim().parse().ok()?;
            if parts.next().is_some() || rows == 0 || cols == 0 {
                return None;
            }
            // Bound the product before anything sizes a buffer from it;
            // rows and cols alone can each parse as huge values.
            let count = rows.checked_mul(cols)?;
            if count > MAX_TAXELS {
                return None;
            }
            Some(Line::Config(GridConfig { rows, cols }))
        }
        "F" => {
            let config = config?;
            let timestamp_us: u64 = parts.next()?.trim().parse().ok()?;
            let mut samples = Vec::with_capacity(config.taxel_count());
            for token in parts {
                samples.push(token.trim().parse::<i32>().ok()?);
            }
            if samples.len() != config.taxel_count() {
                return None;
            }
            Some(Line::Data(Frame {
                timestamp_us,
                samples,
                cols: config.cols,
            }))
        }
        _ => None,
    }
}

/// Stateful line decoder: tracks the grid configuration and hands out
/// complete, validated frames.
///
/// The two phases from the protocol ("waiting for config" and
/// "configured") live in `config` being `None` or `Some`.
#[derive(Debug, Default)]
pub struct Decoder {
    config: Option<GridConfig>,
    dropped: u64,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The grid configuration, once a CFG line has been seen.
    pub fn config(&self) -> Option<&GridConfig> {
        self.config.as_ref()
    }

    /// Number of non-empty lines discarded so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Feed one line; returns a frame when the line was a valid data frame.
    ///
    /// The first valid CFG line latches the grid dimensions; later CFG
    /// lines are ignored. Malformed lines bump the drop counter and are
    /// otherwise silently skipped.
    pub fn feed(&mut self, line: &str) -> Option<Frame> {
        match parse_line(line, self.config.as_ref()) {
            Some(Line::Config(config)) => {
                if self.config.is_none() {
                    info!("configured for {} x {} taxels", config.rows, config.cols);
                    self.config = Some(config);
                } else {
                    debug!("ignoring repeated CFG line");
                }
                None
            }
            Some(Line::Data(frame)) => Some(frame),
            None => {
                if !line.trim().is_empty() {
                    self.dropped += 1;
                    debug!("dropped malformed line ({} total): {:?}", self.dropped, line);
                }
                None
            }
        }
    }
}
