use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::terminal::colors;

static SPINNER: OnceLock<ProgressBar> = OnceLock::new();

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Starts the shared spinner. Log lines written while it spins are printed
/// above it.
pub fn start(message: String) -> &'static ProgressBar {
    let pb = SPINNER.get_or_init(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(style());
        pb
    });
    pb.reset();
    pb.set_message(message.color(colors::TEXT_DEFAULT).to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn stop() {
    if let Some(pb) = SPINNER.get() {
        pb.finish_and_clear();
    }
}

/// Log sink that steps around the spinner and keeps lines intact in raw
/// terminal mode.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let raw_mode = crossterm::terminal::is_raw_mode_enabled().unwrap_or(false);
        let emit = || -> io::Result<()> {
            let mut stderr = io::stderr().lock();
            if raw_mode {
                let text = String::from_utf8_lossy(buf).replace('\n', "\r\n");
                stderr.write_all(text.as_bytes())
            } else {
                stderr.write_all(buf)
            }
        };

        match SPINNER.get() {
            Some(pb) if !pb.is_finished() => pb.suspend(emit)?,
            _ => emit()?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
