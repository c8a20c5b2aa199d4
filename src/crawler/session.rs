//! Per-run HTTP session state
//!
//! A `SessionContext` is built once per run and owns the HTTP client, its
//! cookie jar, the User-Agent pool and the set of origins that have already
//! been warmed up. The warmed set is append-only; the check and the insert
//! happen in one `HashSet::insert` call.

use crate::config::CookieMap;
use rand::seq::SliceRandom;
use reqwest::cookie::Jar;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Fallback agent used only if the pool is somehow empty
const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Builds the HTTP client shared by every request of a run
///
/// Cookies set by the server (e.g. during warm-up) are kept in `jar` and
/// replayed on later requests to the same host.
pub fn build_http_client(jar: Arc<Jar>) -> Result<Client, reqwest::Error> {
    Client::builder()
        .cookie_provider(jar)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Session state shared by the fetcher across a whole run
pub struct SessionContext {
    client: Client,
    jar: Arc<Jar>,
    cookies: CookieMap,
    user_agents: Vec<String>,
    forced_user_agent: Option<String>,
    prewarmed: HashSet<String>,
}

impl SessionContext {
    /// Creates a session from the resolved session inputs
    ///
    /// # Arguments
    ///
    /// * `cookies` - Cookies captured from a logged-in browser (may be empty)
    /// * `user_agents` - Candidate agents, one picked at random per request
    /// * `forced_user_agent` - When set, used for every request instead of the pool
    pub fn new(
        cookies: CookieMap,
        user_agents: Vec<String>,
        forced_user_agent: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let jar = Arc::new(Jar::default());
        let client = build_http_client(jar.clone())?;

        Ok(Self {
            client,
            jar,
            cookies,
            user_agents,
            forced_user_agent,
            prewarmed: HashSet::new(),
        })
    }

    /// The HTTP client of this session
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Picks the User-Agent for the next request
    pub fn pick_user_agent(&self) -> String {
        if let Some(ua) = &self.forced_user_agent {
            return ua.clone();
        }
        self.user_agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| FALLBACK_USER_AGENT.to_string())
    }

    /// Records `origin` as warmed; returns true only the first time
    pub fn mark_prewarmed(&mut self, origin: &str) -> bool {
        self.prewarmed.insert(origin.to_string())
    }

    /// Returns true if `origin` has already been warmed up
    pub fn is_prewarmed(&self, origin: &str) -> bool {
        self.prewarmed.contains(origin)
    }

    /// Number of distinct origins warmed so far
    pub fn prewarmed_count(&self) -> usize {
        self.prewarmed.len()
    }

    /// Seeds the configured cookies into the jar for `origin_url`
    ///
    /// Called once per origin, alongside the warm-up request.
    pub fn seed_cookies(&self, origin_url: &Url) {
        for (name, value) in &self.cookies {
            self.jar
                .add_cookie_str(&format!("{}={}; Path=/", name, value), origin_url);
        }
        if !self.cookies.is_empty() {
            tracing::debug!(
                "Seeded {} session cookies for {}",
                self.cookies.len(),
                origin_url
            );
        }
    }
}
