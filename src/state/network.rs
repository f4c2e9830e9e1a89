use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use vex_api::client::VexApi;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Serves [`NetworkRequest`]s. Every request runs on its own task, so a
/// team's profile and match list resolve independently and in any order.
pub struct NetworkWorker {
    client: Arc<VexApi>,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

impl NetworkWorker {
    pub fn new(
        client: VexApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let client = self.client.clone();
            let responses = self.responses.clone();
            let in_flight = self.in_flight.clone();

            tokio::spawn(async move {
                let response = handle_request(&client, request).await;
                debug!("network request complete");

                if let Err(e) = responses.send(response).await {
                    error!("Failed to send network response: {e}");
                }
                stop_loading_animation(&in_flight, &responses).await;
            });
        }
    }

    /// The spinner runs while at least one request is outstanding.
    async fn start_loading_animation(&self) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            return;
        }

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }
}

async fn stop_loading_animation(in_flight: &AtomicUsize, responses: &mpsc::Sender<NetworkResponse>) {
    if in_flight.fetch_sub(1, Ordering::SeqCst) != 1 {
        return;
    }
    tokio::time::sleep(Duration::from_millis(15)).await;
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged { loading_state: LoadingState::default() })
        .await;
}

async fn handle_request(client: &VexApi, request: NetworkRequest) -> NetworkResponse {
    match request {
        NetworkRequest::LoadTeams { query, tag } => {
            debug!("loading teams (query {query:?})");
            let teams = client.fetch_teams(&query).await;
            NetworkResponse::TeamsLoaded { teams, tag }
        }
        NetworkRequest::LoadEvents { tag } => {
            debug!("loading events");
            let events = client.fetch_events().await;
            NetworkResponse::EventsLoaded { events, tag }
        }
        NetworkRequest::LoadTopRegions { tag } => {
            debug!("loading top regions");
            let regions = client.fetch_top_regions().await;
            NetworkResponse::TopRegionsLoaded { regions, tag }
        }
        NetworkRequest::LoadTeamProfile { number, tag } => {
            debug!("loading team {number}");
            let team = client.fetch_team(&number).await;
            NetworkResponse::TeamProfileLoaded { team, tag }
        }
        NetworkRequest::LoadTeamMatches { number, tag } => {
            debug!("loading matches for {number}");
            let matches = client.fetch_matches(&number).await;
            NetworkResponse::TeamMatchesLoaded { matches, tag }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::epoch::Epoch;

    #[tokio::test]
    async fn worker_answers_with_the_request_tag() {
        let (req_tx, req_rx) = mpsc::channel(10);
        let (resp_tx, mut resp_rx) = mpsc::channel(100);
        let worker = NetworkWorker::new(VexApi::fixture(), req_rx, resp_tx);
        let task = tokio::spawn(worker.run());

        let mut epoch = Epoch::default();
        let tag = epoch.advance();
        req_tx
            .send(NetworkRequest::LoadTeamProfile { number: "3150N".into(), tag })
            .await
            .unwrap();

        loop {
            match resp_rx.recv().await {
                Some(NetworkResponse::TeamProfileLoaded { team, tag: got }) => {
                    assert_eq!(got, tag);
                    assert_eq!(team.map(|t| t.number), Some("3150N".to_string()));
                    break;
                }
                Some(NetworkResponse::LoadingStateChanged { .. }) => continue,
                other => panic!("unexpected response: {other:?}"),
            }
        }
        task.abort();
    }
}
