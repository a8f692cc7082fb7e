use std::collections::HashSet;

use parking_lot::Mutex;
use weatherboard_core::{Card, DashboardView, Render};

/// Streams dashboard changes to the terminal.
///
/// The status line goes to stderr whenever it changes. A card is printed to
/// stdout once, when it first reaches a terminal state, so refreshes and
/// single adds print identically.
#[derive(Debug, Default)]
pub struct TerminalRender {
    status: Mutex<Option<String>>,
    printed: Mutex<HashSet<u64>>,
}

impl TerminalRender {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Render for TerminalRender {
    fn render(&self, view: &DashboardView) {
        {
            let mut status = self.status.lock();
            if *status != view.status {
                if let Some(text) = &view.status {
                    eprintln!("{text}");
                }
                status.clone_from(&view.status);
            }
        }

        let mut printed = self.printed.lock();
        for card in &view.cards {
            if card.forecast.is_terminal() && printed.insert(card.id) {
                print!("{}", format_card(card));
            }
        }
    }
}

pub fn format_card(card: &Card) -> String {
    let mut out = card.title();
    if let Some(band) = card.band {
        out.push_str(&format!(" [{band}]"));
    }
    out.push('\n');
    for line in card.lines() {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}
