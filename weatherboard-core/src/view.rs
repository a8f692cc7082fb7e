//! Display state handed to the presentation layer.
//!
//! The core never draws anything. It mutates a [`DashboardView`] through a
//! [`Board`] and hands a snapshot to a [`Render`] implementation after every
//! change.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;

use crate::model::{ForecastResult, Place, TemperatureBand};

pub const STATUS_LOADING: &str = "Loading weather...";
pub const CARD_LOADING: &str = "Loading...";
pub const CARD_FAILED: &str = "Failed to load";

/// Identifies one card instance. A removed or cleared card's id is never reused.
pub type CardId = u64;

/// One location's forecast card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub label: String,
    pub forecast: ForecastResult,
    /// Band of today's temperature, set once the forecast succeeded.
    pub band: Option<TemperatureBand>,
}

impl Card {
    fn loading(id: CardId, label: &str) -> Self {
        Self { id, label: label.to_owned(), forecast: ForecastResult::Loading, band: None }
    }

    fn complete(&mut self, result: ForecastResult) {
        self.band = match &result {
            ForecastResult::Success { current_temp, .. } => {
                Some(TemperatureBand::classify(*current_temp))
            }
            _ => None,
        };
        self.forecast = result;
    }

    /// Body text rows of the card.
    pub fn lines(&self) -> Vec<String> {
        match &self.forecast {
            ForecastResult::Loading => vec![CARD_LOADING.to_string()],
            ForecastResult::Success { days, .. } => days.iter().map(|d| d.display()).collect(),
            ForecastResult::Error => vec![CARD_FAILED.to_string()],
        }
    }

    /// Header text: icon (when known) followed by the label.
    pub fn title(&self) -> String {
        match self.band {
            Some(band) => format!("{} {}", band.icon(), self.label),
            None => self.label.clone(),
        }
    }
}

/// Everything the presentation layer shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub cards: Vec<Card>,
    /// Global status line. `None` means blank.
    pub status: Option<String>,
    /// Current text of the city input.
    pub query: String,
    pub suggestions: Vec<Place>,
    /// Inline error shown next to the input.
    pub input_error: Option<String>,
}

impl DashboardView {
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }
}

/// Presentation boundary. Called with a fresh snapshot after every change.
pub trait Render: Send + Sync + Debug {
    fn render(&self, view: &DashboardView);
}

/// Renderer that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRender;

impl Render for NoRender {
    fn render(&self, _view: &DashboardView) {}
}

/// Shared, render-on-change handle to the display state.
#[derive(Debug, Clone)]
pub struct Board {
    view: Arc<Mutex<DashboardView>>,
    next_card: Arc<AtomicU64>,
    renderer: Arc<dyn Render>,
}

impl Board {
    pub fn new(renderer: Arc<dyn Render>) -> Self {
        Self {
            view: Arc::new(Mutex::new(DashboardView::default())),
            next_card: Arc::new(AtomicU64::new(1)),
            renderer,
        }
    }

    pub fn snapshot(&self) -> DashboardView {
        self.view.lock().clone()
    }

    /// Apply `change` and render the result. The lock is released before
    /// the renderer runs.
    pub(crate) fn update<T>(&self, change: impl FnOnce(&mut DashboardView) -> T) -> T {
        let (out, snapshot) = {
            let mut view = self.view.lock();
            let out = change(&mut view);
            (out, view.clone())
        };
        self.renderer.render(&snapshot);
        out
    }

    /// Like [`Board::update`], but `change` decides under the lock whether it
    /// changed anything. Nothing is rendered when it returns `false`.
    pub(crate) fn update_if(&self, change: impl FnOnce(&mut DashboardView) -> bool) -> bool {
        let snapshot = {
            let mut view = self.view.lock();
            if !change(&mut view) {
                return false;
            }
            view.clone()
        };
        self.renderer.render(&snapshot);
        true
    }

    pub fn clear_cards(&self) {
        self.update(|view| view.cards.clear());
    }

    /// Append a card in the loading state.
    pub fn push_loading_card(&self, label: &str) -> CardId {
        let id = self.next_card.fetch_add(1, Ordering::Relaxed);
        self.update(|view| view.cards.push(Card::loading(id, label)));
        id
    }

    /// Move a card to its terminal state. Returns `false` when the card is
    /// gone (removed, or cleared by a refresh); nothing is re-created.
    pub fn complete_card(&self, id: CardId, result: ForecastResult) -> bool {
        let mut view = self.view.lock();
        let Some(card) = view.cards.iter_mut().find(|card| card.id == id) else {
            return false;
        };
        card.complete(result);
        let snapshot = view.clone();
        drop(view);

        self.renderer.render(&snapshot);
        true
    }

    /// Drop every card showing `label`.
    pub fn remove_cards(&self, label: &str) {
        self.update(|view| view.cards.retain(|card| card.label != label));
    }

    pub fn set_status(&self, status: Option<&str>) {
        self.update(|view| view.status = status.map(str::to_owned));
    }

    pub fn set_query(&self, query: &str) {
        self.update(|view| view.query = query.to_owned());
    }

    pub fn set_suggestions(&self, suggestions: Vec<Place>) {
        self.update(|view| view.suggestions = suggestions);
    }

    pub fn set_input_error(&self, error: Option<String>) {
        self.update(|view| view.input_error = error);
    }

    /// Reset the input area after a suggestion was picked.
    pub fn clear_input(&self) {
        self.update(|view| {
            view.query.clear();
            view.suggestions.clear();
            view.input_error = None;
        });
    }
}
