use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, warn};

use crate::{error::DashboardError, model::Place, provider::GeocodeClient, view::Board};

/// Queries shorter than this (after trimming) issue no request.
pub const MIN_QUERY_CHARS: usize = 3;

/// What happened to one input change.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    /// Too short to search.
    Skipped,
    /// Results were shown (possibly none).
    Shown(Vec<Place>),
    /// A newer query superseded this one before its response arrived.
    Stale,
    /// The search failed; the error text is shown.
    Failed,
}

/// Turns input changes into suggestion lists.
///
/// Every call takes a new sequence number. A response is applied only if its
/// number is still the latest issued when it arrives. Both the numbering and
/// the check happen under the board's lock, so a newer input can never slip
/// in between the check and the write.
#[derive(Debug, Clone)]
pub struct SuggestionPipeline {
    client: Arc<dyn GeocodeClient>,
    board: Board,
    issued: Arc<AtomicU64>,
}

impl SuggestionPipeline {
    pub fn new(client: Arc<dyn GeocodeClient>, board: Board) -> Self {
        Self { client, board, issued: Arc::new(AtomicU64::new(0)) }
    }

    pub async fn on_query_change(&self, query: &str) -> SuggestionOutcome {
        let seq = self.board.update(|view| {
            view.suggestions.clear();
            self.issued.fetch_add(1, Ordering::SeqCst) + 1
        });

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return SuggestionOutcome::Skipped;
        }

        let result = self.client.search(query).await.map_err(DashboardError::SuggestionSearch);

        let applied = self.board.update_if(|view| {
            if self.issued.load(Ordering::SeqCst) != seq {
                return false;
            }
            match &result {
                Ok(places) => view.suggestions.clone_from(places),
                Err(err) => view.input_error = Some(err.to_string()),
            }
            true
        });

        if !applied {
            debug!(%query, seq, "dropping stale suggestions");
            return SuggestionOutcome::Stale;
        }

        match result {
            Ok(places) => SuggestionOutcome::Shown(places),
            Err(err) => {
                warn!(%query, error = ?err, "city search failed");
                SuggestionOutcome::Failed
            }
        }
    }

    /// Candidates of the latest completed search.
    pub fn suggestions(&self) -> Vec<Place> {
        self.board.snapshot().suggestions
    }

    /// Forget remembered candidates, e.g. after one was picked. Searches still
    /// in flight are dropped.
    pub fn clear(&self) {
        self.board.update_if(|view| {
            self.issued.fetch_add(1, Ordering::SeqCst);
            let had_any = !view.suggestions.is_empty();
            view.suggestions.clear();
            had_any
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::NoRender;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use tokio::sync::oneshot;

    fn place(name: &str) -> Place {
        Place { name: name.into(), country: "France".into(), lat: 48.0, lon: 2.0 }
    }

    /// Answers from a table; queries listed in `gates` wait for their sender.
    #[derive(Debug, Default)]
    struct ScriptedGeocoder {
        answers: HashMap<String, Vec<Place>>,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
        requests: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl GeocodeClient for ScriptedGeocoder {
        async fn search(&self, query: &str) -> anyhow::Result<Vec<Place>> {
            self.requests.lock().push(query.to_owned());
            let gate = self.gates.lock().remove(query);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.fail {
                anyhow::bail!("service unavailable");
            }
            Ok(self.answers.get(query).cloned().unwrap_or_default())
        }
    }

    async fn wait_for_request(geocoder: &ScriptedGeocoder, query: &str) {
        while !geocoder.requests.lock().iter().any(|q| q == query) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn short_query_issues_no_request() {
        let geocoder = Arc::new(ScriptedGeocoder::default());
        let board = Board::new(Arc::new(NoRender));
        let pipeline = SuggestionPipeline::new(geocoder.clone(), board.clone());

        assert_eq!(pipeline.on_query_change("ab").await, SuggestionOutcome::Skipped);
        assert_eq!(pipeline.on_query_change("  ab  ").await, SuggestionOutcome::Skipped);

        assert!(geocoder.requests.lock().is_empty());
        assert!(board.snapshot().suggestions.is_empty());
    }

    #[tokio::test]
    async fn query_is_trimmed_before_search() {
        let geocoder = Arc::new(ScriptedGeocoder {
            answers: HashMap::from([("Paris".to_string(), vec![place("Paris")])]),
            ..Default::default()
        });
        let board = Board::new(Arc::new(NoRender));
        let pipeline = SuggestionPipeline::new(geocoder.clone(), board.clone());

        let outcome = pipeline.on_query_change("  Paris ").await;

        assert_eq!(outcome, SuggestionOutcome::Shown(vec![place("Paris")]));
        assert_eq!(*geocoder.requests.lock(), vec!["Paris"]);
        assert_eq!(board.snapshot().suggestions, vec![place("Paris")]);
        assert_eq!(pipeline.suggestions(), vec![place("Paris")]);
    }

    #[tokio::test]
    async fn superseded_response_is_never_shown() {
        let (release_par, gate) = oneshot::channel();
        let geocoder = Arc::new(ScriptedGeocoder {
            answers: HashMap::from([
                ("par".to_string(), vec![place("Parma")]),
                ("pari".to_string(), vec![place("Paris")]),
            ]),
            gates: Mutex::new(HashMap::from([("par".to_string(), gate)])),
            ..Default::default()
        });
        let board = Board::new(Arc::new(NoRender));
        let pipeline = SuggestionPipeline::new(geocoder.clone(), board.clone());

        let slow = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.on_query_change("par").await }
        });
        wait_for_request(&geocoder, "par").await;

        let fresh = pipeline.on_query_change("pari").await;
        release_par.send(()).expect("release");
        let stale = slow.await.expect("search task");

        assert_eq!(fresh, SuggestionOutcome::Shown(vec![place("Paris")]));
        assert_eq!(stale, SuggestionOutcome::Stale);
        assert_eq!(board.snapshot().suggestions, vec![place("Paris")]);
        assert_eq!(pipeline.suggestions(), vec![place("Paris")]);
    }

    #[tokio::test]
    async fn shortening_the_query_drops_the_pending_search() {
        let (release, gate) = oneshot::channel();
        let geocoder = Arc::new(ScriptedGeocoder {
            answers: HashMap::from([("lon".to_string(), vec![place("London")])]),
            gates: Mutex::new(HashMap::from([("lon".to_string(), gate)])),
            ..Default::default()
        });
        let board = Board::new(Arc::new(NoRender));
        let pipeline = SuggestionPipeline::new(geocoder.clone(), board.clone());

        let pending = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.on_query_change("lon").await }
        });
        wait_for_request(&geocoder, "lon").await;

        assert_eq!(pipeline.on_query_change("lo").await, SuggestionOutcome::Skipped);
        release.send(()).expect("release");

        assert_eq!(pending.await.expect("search task"), SuggestionOutcome::Stale);
        assert!(board.snapshot().suggestions.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn newer_input_racing_a_response_always_wins() {
        for round in 0..200 {
            let (release, gate) = oneshot::channel();
            let geocoder = Arc::new(ScriptedGeocoder {
                answers: HashMap::from([("lon".to_string(), vec![place("London")])]),
                gates: Mutex::new(HashMap::from([("lon".to_string(), gate)])),
                ..Default::default()
            });
            let board = Board::new(Arc::new(NoRender));
            let pipeline = SuggestionPipeline::new(geocoder.clone(), board.clone());

            let pending = tokio::spawn({
                let pipeline = pipeline.clone();
                async move { pipeline.on_query_change("lon").await }
            });
            wait_for_request(&geocoder, "lon").await;

            // The response and the newer input now race on different workers.
            release.send(()).expect("release");
            let short = pipeline.on_query_change("lo").await;
            let long = pending.await.expect("search task");

            assert_eq!(short, SuggestionOutcome::Skipped);
            assert!(
                matches!(long, SuggestionOutcome::Shown(_) | SuggestionOutcome::Stale),
                "round {round}: {long:?}"
            );
            assert!(board.snapshot().suggestions.is_empty(), "round {round}: stale list shown");
        }
    }

    #[tokio::test]
    async fn clearing_drops_pending_search() {
        let (release, gate) = oneshot::channel();
        let geocoder = Arc::new(ScriptedGeocoder {
            answers: HashMap::from([("Rome".to_string(), vec![place("Rome")])]),
            gates: Mutex::new(HashMap::from([("Rome".to_string(), gate)])),
            ..Default::default()
        });
        let board = Board::new(Arc::new(NoRender));
        let pipeline = SuggestionPipeline::new(geocoder.clone(), board.clone());

        let pending = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.on_query_change("Rome").await }
        });
        wait_for_request(&geocoder, "Rome").await;

        pipeline.clear();
        release.send(()).expect("release");

        assert_eq!(pending.await.expect("search task"), SuggestionOutcome::Stale);
        assert!(pipeline.suggestions().is_empty());
    }

    #[tokio::test]
    async fn failure_sets_inline_error_and_empty_list() {
        let geocoder = Arc::new(ScriptedGeocoder { fail: true, ..Default::default() });
        let board = Board::new(Arc::new(NoRender));
        let pipeline = SuggestionPipeline::new(geocoder, board.clone());

        assert_eq!(pipeline.on_query_change("Berlin").await, SuggestionOutcome::Failed);

        let view = board.snapshot();
        assert_eq!(view.input_error.as_deref(), Some("City search failed"));
        assert!(view.suggestions.is_empty());
    }
}
