//! Terminal session management with panic-safe cleanup.

use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};

/// Static flag to track if the alternate screen is active (for panic handler)
pub(crate) static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard that ensures the terminal is restored on drop.
/// This handles both normal exits and panics.
pub struct TermGuard {
    /// Whether this guard is responsible for cleanup
    active: bool,
}

impl TermGuard {
    /// Switch to the alternate screen with the cursor hidden, returning a
    /// guard that restores the terminal on drop.
    ///
    /// # Errors
    /// Returns an error if the terminal rejects the escape sequences.
    pub fn enter() -> io::Result<Self> {
        // Install panic hook before touching the terminal
        install_panic_hook();

        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        SESSION_ACTIVE.store(true, Ordering::SeqCst);

        Ok(Self { active: true })
    }

    /// Manually restore the terminal without dropping the guard.
    /// After calling this, the guard's drop is a no-op.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            SESSION_ACTIVE.store(false, Ordering::SeqCst);
            execute!(io::stdout(), Show, LeaveAlternateScreen)?;
        }
        Ok(())
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        if self.active {
            SESSION_ACTIVE.store(false, Ordering::SeqCst);
            // Best-effort cleanup - ignore errors during drop
            let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        }
    }
}

/// Install a panic hook that restores the terminal before panicking, so
/// the panic message lands on a usable screen.
pub(crate) fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return; // Already installed
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if SESSION_ACTIVE.load(Ordering::SeqCst) {
            let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
            SESSION_ACTIVE.store(false, Ordering::SeqCst);
        }

        original_hook(panic_info);
    }));
}
