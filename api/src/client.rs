use crate::robotevents::{Listing, Page, RawEvent, RawSkillEntry, TeamDetail};
use crate::{Event, Team, TeamMatch, aggregate, fixture};
use log::{debug, error, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_SEASON_ID: u32 = 197;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);
/// Hard stop for the events pager; upstream pagination metadata is not trusted.
pub const MAX_EVENT_PAGES: u32 = 20;

const SKILLS_GRADE_LEVELS: [&str; 2] = ["Middle School", "High School"];

/// Where records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Live { base_url: String, token: Option<String> },
    Fixture,
}

/// Client settings, normally read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub source: DataSource,
    pub season_id: u32,
    pub page_delay: Duration,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Fixture,
            season_id: DEFAULT_SEASON_ID,
            page_delay: DEFAULT_PAGE_DELAY,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    /// `VEXTUI_API_URL` selects the live source; without it every call is
    /// served from the embedded fixture.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let source = match non_empty("VEXTUI_API_URL") {
            Some(base_url) => DataSource::Live {
                base_url: base_url.trim_end_matches('/').to_owned(),
                token: non_empty("ROBOTEVENTS_TOKEN"),
            },
            None => DataSource::Fixture,
        };
        let season_id = non_empty("VEXTUI_SEASON_ID")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.season_id);
        let page_delay = non_empty("VEXTUI_PAGE_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.page_delay);

        Self { source, season_id, page_delay, ..defaults }
    }
}

/// Competition data client for RobotEvents v2 or a compatible proxy.
#[derive(Debug, Clone)]
pub struct VexApi {
    client: Client,
    config: ApiConfig,
}

impl Default for VexApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Status(StatusCode, String),
    ContentType(Option<String>, String),
    Parsing(reqwest::Error, String),
    NotConfigured(String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status(status, url) => write!(f, "API error for {url}: HTTP {status}"),
            ApiError::ContentType(ct, url) => write!(
                f,
                "Expected JSON but got {} for {url}",
                ct.as_deref().unwrap_or("no content type")
            ),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotConfigured(path) => write!(f, "No API base URL configured for {path}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl VexApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("vextui/0.1 (terminal competition dashboard)")
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    pub fn fixture() -> Self {
        Self::new(ApiConfig::default())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn is_live(&self) -> bool {
        matches!(self.config.source, DataSource::Live { .. })
    }

    /// Teams matching `query` for the configured season. The fixture
    /// fallback matches number or name case-insensitively.
    pub async fn fetch_teams(&self, query: &str) -> Vec<Team> {
        let season = self.config.season_id.to_string();
        match self
            .get::<Listing<Team>>("/teams", &[("season", season.as_str()), ("q", query)])
            .await
        {
            Ok(teams) => teams.into_vec(),
            Err(e) => {
                report(&e);
                fixture::search_teams(query)
            }
        }
    }

    /// Every event of the season, following the upstream pager.
    pub async fn fetch_events(&self) -> Vec<Event> {
        let season = self.config.season_id.to_string();
        let mut events: Vec<Event> = Vec::new();
        let mut page: u32 = 1;

        loop {
            self.pace(page).await;

            let page_param = page.to_string();
            let response = match self
                .get::<Page<RawEvent>>(
                    "/events",
                    &[("season", season.as_str()), ("page", page_param.as_str())],
                )
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    report(&e);
                    break;
                }
            };

            let Some(data) = response.data else {
                break;
            };
            for raw in data {
                let sku = raw.sku.clone().unwrap_or_default();
                match raw.into_event() {
                    Some(event) => events.push(event),
                    None => warn!("dropping event {sku:?} with unusable sku or dates"),
                }
            }

            let Some(last_page) = response.meta.and_then(|m| m.last_page) else {
                break;
            };
            page += 1;
            if page > last_page || page > MAX_EVENT_PAGES {
                break;
            }
        }

        if events.is_empty() {
            return fixture::events();
        }
        events
    }

    /// Waits out the configured delay before every page after the first.
    async fn pace(&self, page: u32) {
        if page > 1 {
            tokio::time::sleep(self.config.page_delay).await;
        }
    }

    /// Team profile by exact team number. `None` means the team is unknown.
    pub async fn fetch_team(&self, number: &str) -> Option<Team> {
        match self.get::<Team>(&format!("/teams/{number}"), &[]).await {
            Ok(team) => Some(team),
            Err(e) => {
                report(&e);
                fixture::find_team(number)
            }
        }
    }

    /// A team's matches: embedded in the team detail when the proxy supplies
    /// them, else the per-team match collection.
    ///
    /// This requests `/teams/{number}` on its own, so opening a team alongside
    /// [`VexApi::fetch_team`] sends that request twice.
    pub async fn fetch_matches(&self, number: &str) -> Vec<TeamMatch> {
        let detail_path = format!("/teams/{number}");
        match self.get::<TeamDetail>(&detail_path, &[]).await {
            Ok(TeamDetail { matches: Some(matches) }) => return matches,
            Ok(_) => debug!("{detail_path} carries no embedded matches"),
            Err(e) => {
                report(&e);
                return fixture::team_matches(number);
            }
        }

        match self
            .get::<Listing<TeamMatch>>(&format!("/teams/{number}/matches"), &[])
            .await
        {
            Ok(matches) => matches.into_vec(),
            Err(e) => {
                report(&e);
                fixture::team_matches(number)
            }
        }
    }

    /// Top skills-ranked middle and high school teams of the season.
    pub async fn fetch_skills_standings(&self) -> Vec<Team> {
        let path = format!("/seasons/{}/skills", self.config.season_id);
        let limit = aggregate::TOP_SKILLS_LIMIT.to_string();
        let mut query: Vec<(&str, &str)> = SKILLS_GRADE_LEVELS
            .iter()
            .map(|grade| ("grade_level", *grade))
            .collect();
        query.extend([("sort", "score"), ("limit", limit.as_str())]);

        match self.get::<Listing<RawSkillEntry>>(&path, &query).await {
            Ok(entries) => entries.into_vec().into_iter().map(Team::from).collect(),
            Err(e) => {
                report(&e);
                fixture::teams()
            }
        }
    }

    /// Regions ranked by how many top skills teams they hold.
    pub async fn fetch_top_regions(&self) -> Vec<String> {
        aggregate::top_regions(&self.fetch_skills_standings().await)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let DataSource::Live { base_url, token } = &self.config.source else {
            return Err(ApiError::NotConfigured(path.to_owned()));
        };

        let mut url = Url::parse(&format!("{base_url}{path}"))
            .map_err(|e| ApiError::Other(format!("invalid url {base_url}{path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let url_str = url.to_string();

        let mut request = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url_str.clone()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status, url_str));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if !content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
        {
            return Err(ApiError::ContentType(content_type, url_str));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url_str))
    }
}

/// Fixture mode is a normal state, not a failure.
fn report(e: &ApiError) {
    match e {
        ApiError::NotConfigured(_) => debug!("{e}; serving fixture data"),
        _ => error!("{e}"),
    }
}
