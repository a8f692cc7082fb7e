use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    model::Location,
    provider::ForecastClient,
    store::LocationStore,
    view::{Board, CardId, STATUS_LOADING},
};

/// Loads forecasts into cards, one location at a time.
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    client: Arc<dyn ForecastClient>,
    board: Board,
}

impl ForecastPipeline {
    pub fn new(client: Arc<dyn ForecastClient>, board: Board) -> Self {
        Self { client, board }
    }

    /// Full run: clear every card, then fetch each stored location in order.
    ///
    /// Each fetch resolves before the next one is issued. A location removed
    /// from the store before its turn comes is skipped.
    pub async fn refresh(&self, store: &Mutex<LocationStore>) {
        self.board.clear_cards();
        self.board.set_status(Some(STATUS_LOADING));

        let mut queue: VecDeque<Location> = store.lock().locations().iter().cloned().collect();
        debug!(count = queue.len(), "refreshing forecasts");

        while let Some(location) = queue.pop_front() {
            if !store.lock().contains(&location.label) {
                debug!(label = %location.label, "skipping location removed mid-refresh");
                continue;
            }
            self.load_one(&location).await;
        }

        self.board.set_status(None);
    }

    /// Append a loading card for `location`, fetch, and settle the card.
    pub async fn load_one(&self, location: &Location) -> CardId {
        let id = self.board.push_loading_card(&location.label);

        let result = self.client.fetch(location.coordinates()).await;

        if !self.board.complete_card(id, result) {
            debug!(label = %location.label, card = id, "card gone before its forecast arrived");
        }
        id
    }
}
