use std::io::Write;
use std::sync::Mutex;

use colored::Colorize;
use download_client::{ProgressSink, ProgressUpdate};

const BAR_WIDTH: usize = 30;

#[derive(Default)]
struct BarState {
    percent: Option<f64>,
    phase: String,
}

/// Single-line terminal progress display. Progress and phase updates arrive
/// independently; each repaint shows the latest of both.
#[derive(Default)]
pub struct ProgressBar {
    state: Mutex<BarState>,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move past the bar line so the final message gets its own line.
    pub fn finish(&self) {
        let state = self.state.lock().unwrap();
        if state.percent.is_some() || !state.phase.is_empty() {
            println!();
        }
    }

    fn repaint(state: &BarState) {
        let percent = state.percent.unwrap_or(0.0);
        let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);

        print!(
            "\r\x1B[K[{}{}] {:>5.1}% {}",
            "#".repeat(filled).blue(),
            "-".repeat(BAR_WIDTH - filled),
            percent,
            state.phase.dimmed()
        );
        let _ = std::io::stdout().flush();
    }
}

impl ProgressSink for ProgressBar {
    fn update(&self, update: ProgressUpdate) {
        let mut state = self.state.lock().unwrap();
        match update {
            ProgressUpdate::Percent(percent) => state.percent = Some(percent),
            ProgressUpdate::Phase(phase) => state.phase = phase,
        }
        Self::repaint(&state);
    }
}
