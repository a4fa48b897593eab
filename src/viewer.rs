//! The main viewing loop: read lines, decode frames, redraw.
//!
//! Fully synchronous and single-threaded. Each iteration blocks on the
//! serial port (with a short timeout), feeds any complete line to the
//! decoder, and redraws whenever a valid frame comes out. There is no
//! buffering beyond "latest frame wins".

use std::io::Read;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::info;

use crate::heatmap;
use crate::render::{self, Heatmap};
use crate::protocol::Decoder;
use crate::serial::{self, LineReader, SerialError};
use crate::term::TermGuard;

/// Errors that can occur while running the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Serial(#[from] SerialError),
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("failed to install Ctrl-C handler: {0}")]
    CtrlC(#[from] ctrlc::Error),
}

/// Resolved runtime options for the viewer.
///
/// Defaults reproduce the original hardcoded behavior; config file and
/// CLI flags only override individual fields.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub port: String,
    pub baud: u32,
    pub timeout: Duration,
    pub ceiling: i32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            port: serial::DEFAULT_PORT.to_string(),
            baud: serial::DEFAULT_BAUD,
            timeout: serial::DEFAULT_TIMEOUT,
            ceiling: heatmap::DEFAULT_CEILING,
        }
    }
}

static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl-C has been received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Install the Ctrl-C handler. The handler only sets a flag; the loop
/// notices it on the next iteration and unwinds normally so the terminal
/// gets restored.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
    })
}

/// Open the serial port and run the viewer until interrupted.
pub fn run(opts: &ViewerOptions) -> Result<(), ViewerError> {
    setup_ctrlc_handler()?;

    let port = serial::open_port(&opts.port, opts.baud, opts.timeout)?;
    info!("opened {} at {} baud", opts.port, opts.baud);

    let mut guard = TermGuard::enter()?;
    let mut reader = LineReader::new(port);
    let result = run_loop(
        &mut reader,
        &mut std::io::stdout(),
        opts.ceiling,
        &ctrlc_received,
    );
    guard.exit()?;
    result
}

/// The decode/redraw loop over an explicit line source and output sink.
///
/// Separated from `run` so tests can drive it with in-memory I/O. Ends
/// when `stop` reports true, the reader hits end of input, or I/O fails.
pub fn run_loop<R: Read, W: Write>(
    reader: &mut LineReader<R>,
    out: &mut W,
    ceiling: i32,
    stop: &dyn Fn() -> bool,
) -> Result<(), ViewerError> {
    let mut decoder = Decoder::new();
    let mut map: Option<Heatmap> = None;
    let mut fps = FpsCounter::new();

    while !stop() {
        let line = match reader.next_line()? {
            Some(line) => line,
            None if reader.is_eof() => break,
            None => continue, // read timeout, nothing to do yet
        };

        let Some(frame) = decoder.feed(&line) else {
            continue;
        };

        // The decoder only yields frames once a CFG latched the grid, and
        // every frame matches those dimensions.
        let Some(config) = decoder.config().copied() else {
            continue;
        };
        let map = map.get_or_insert_with(|| Heatmap::new(&config, ceiling));

        map.update(&frame);
        fps.tick();
        render::draw(out, map, fps.rate())?;
    }

    Ok(())
}

/// Frames-per-second estimate over a sliding one-second window.
struct FpsCounter {
    window_start: Instant,
    frames: u32,
    rate: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            rate: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.rate = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    fn rate(&self) -> f32 {
        self.rate
    }
}
