//! # wave
//!
//! Terminal rendering for the `wave` binary.

use std::fmt::Write;
use wave_portal::Wave;
use yansi::Paint;

/// Renders waves the way the page lists them, one block per wave, separated by blank lines.
pub fn render_waves(waves: &[Wave]) -> String {
    let mut out = String::new();
    for (i, wave) in waves.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let _ = write!(out, "{wave}");
    }
    out
}

/// The line printed when there is nothing to show.
pub fn no_waves() -> String {
    "No waves yet.".dim().to_string()
}
