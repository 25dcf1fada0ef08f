//! Crawl engine - traversal orchestration
//!
//! The engine owns all run state: configuration, visited set, fetched bodies,
//! the site graph and the page counter. It drives a [`Fetcher`] and a
//! [`LinkExtractor`] and decides, for every discovered link, whether to
//! dispatch it.
//!
//! With `Workers = 1` the traversal is depth-first in link order, one request
//! at a time, with the pacing delay before every follow-up request. With more
//! workers a breadth-first frontier feeds a bounded pool of fetch tasks and
//! pacing applies per host.

use crate::config::Config;
use crate::crawler::report::CrawlReport;
use crate::crawler::scheduler::{QueuedUrl, Scheduler};
use crate::crawler::{FetchResponse, Fetcher, HtmlLinkExtractor, HttpFetcher, LinkExtractor};
use crate::graph::{SiteGraph, Vertex};
use crate::state::{CrawlState, CrawlStatus};
use crate::url::LinkResolver;
use crate::{Result, SitegraphError, TransportError};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What happens to the visited set when a fetch fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// A URL joins the visited set when it is dispatched, so a failed fetch
    /// is never retried and still counts toward `CrawlDepth`
    #[default]
    MarkVisited,

    /// A URL joins the visited set only after a successful fetch, so a link
    /// to it found later is tried again
    AllowRetry,
}

/// Result of fetching and recording one vertex
enum Outcome {
    /// Fetched and recorded; carries the resolved outbound links
    Success(Vec<Url>),

    /// Transport failure or non-2xx status
    Failed(String),
}

/// Position inside one page's link list during the depth-first walk
struct Frame {
    vertex: Vertex,
    links: Vec<Url>,
    next: usize,
}

/// Finished fetch handed back by a pool task; `None` if cancelled before
/// the request was sent
type PoolResult = (QueuedUrl, Option<std::result::Result<FetchResponse, TransportError>>);

/// Site-graph crawl engine
///
/// # Example
///
/// ```no_run
/// use sitegraph::config::parse_config;
/// use sitegraph::CrawlEngine;
///
/// # async fn run() -> sitegraph::Result<()> {
/// let config = parse_config(r#"
/// TargetURL = "https://example.com/"
/// CrawlDepth = 10
/// PageNumberLimit = 20
/// UserAgent = "sitegraph"
/// RequestDelay = 500
/// "#)?;
///
/// let mut engine = CrawlEngine::http(config)?;
/// let report = engine.start().await?;
/// println!("{} pages, status {}", report.pages_processed, report.status);
/// # Ok(())
/// # }
/// ```
pub struct CrawlEngine<F, E> {
    config: Config,
    fetcher: Arc<F>,
    extractor: E,
    resolver: LinkResolver,
    failure_policy: FailurePolicy,
    state: CrawlState,
    graph: SiteGraph,
    status: CrawlStatus,
    cancel: CancellationToken,
}

impl CrawlEngine<HttpFetcher, HtmlLinkExtractor> {
    /// Creates an engine that fetches over HTTP and parses HTML
    ///
    /// The HTTP client uses the configuration's request timeout.
    ///
    /// # Errors
    ///
    /// * `SitegraphError::Reqwest` - the HTTP client could not be built
    pub fn http(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::with_timeout(config.request_timeout())?;
        Ok(Self::new(config, fetcher, HtmlLinkExtractor::new()))
    }
}

impl<F, E> CrawlEngine<F, E>
where
    F: Fetcher + 'static,
    E: LinkExtractor,
{
    /// Creates an idle engine
    ///
    /// # Arguments
    ///
    /// * `config` - Run configuration
    /// * `fetcher` - Capability used to fetch every vertex
    /// * `extractor` - Capability used to pull links out of fetched bodies
    pub fn new(config: Config, fetcher: F, extractor: E) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            extractor,
            resolver: LinkResolver::new(),
            failure_policy: FailurePolicy::default(),
            state: CrawlState::new(),
            graph: SiteGraph::new(),
            status: CrawlStatus::Idle,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the link resolver (and with it the exclusion policy)
    pub fn with_resolver(mut self, resolver: LinkResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets how failed fetches affect the visited set
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Records into an existing graph instead of a fresh one
    pub fn with_graph(mut self, graph: SiteGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Returns a handle that stops the run when cancelled
    ///
    /// The token is replaced by [`reset`](Self::reset), so fetch a new one
    /// after resetting.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the configuration used when none is supplied
    pub fn default_config() -> Config {
        Config::default()
    }

    /// Replaces the configuration of an idle engine
    ///
    /// # Errors
    ///
    /// * `SitegraphError::InvalidTransition` - the engine is not idle
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        if self.status != CrawlStatus::Idle {
            return Err(SitegraphError::InvalidTransition {
                from: self.status,
                to: CrawlStatus::Idle,
            });
        }
        self.config = config;
        Ok(())
    }

    /// Returns the lifecycle status
    pub fn status(&self) -> CrawlStatus {
        self.status
    }

    /// Returns the failure policy in effect
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Returns the run state
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Fetched bodies keyed by URL
    pub fn results(&self) -> &HashMap<String, String> {
        self.state.results()
    }

    /// Successfully fetched URLs in fetch order
    pub fn crawled_urls(&self) -> &[String] {
        self.state.crawled_urls()
    }

    /// Returns the site graph built so far
    pub fn graph(&self) -> &SiteGraph {
        &self.graph
    }

    /// Number of successful fetches in this run
    pub fn page_count(&self) -> usize {
        self.state.page_count()
    }

    /// Size of the visited set
    pub fn visited_count(&self) -> usize {
        self.state.visited_count()
    }

    /// Returns the engine to a fresh idle state
    ///
    /// Restores the default configuration and discards the visited set,
    /// results, graph and page count. The cancellation token is replaced.
    pub fn reset(&mut self) {
        self.config = Self::default_config();
        self.state = CrawlState::new();
        self.graph.reset();
        self.status = CrawlStatus::Idle;
        self.cancel = CancellationToken::new();
        tracing::debug!("Engine reset to default configuration");
    }

    /// Runs the crawl from the configured seed
    ///
    /// Returns once the frontier is exhausted, the page limit is reached or
    /// the run is cancelled. Partial results stay readable in every case.
    ///
    /// # Errors
    ///
    /// * `SitegraphError::InvalidTransition` - the engine is not idle
    /// * `SitegraphError::InvalidSeed` - `TargetURL` is empty or not absolute
    /// * `SitegraphError::SeedFetch` - the seed could not be fetched
    pub async fn start(&mut self) -> Result<CrawlReport> {
        self.transition(CrawlStatus::Running)?;
        let started_at = Utc::now();

        let seed = match self.parse_seed() {
            Ok(seed) => seed,
            Err(e) => {
                self.status = CrawlStatus::Failed;
                return Err(e);
            }
        };

        tracing::info!(
            "Starting crawl of {} (depth {}, page limit {}, {} worker(s))",
            seed,
            self.config.crawl_depth,
            self.config.page_number_limit,
            self.config.workers
        );

        let outcome = if self.config.is_sequential() {
            self.run_sequential(seed).await
        } else {
            self.run_pool(seed).await
        };

        let status = match outcome {
            Ok(status) => status,
            Err(e) => {
                self.status = CrawlStatus::Failed;
                tracing::error!("Crawl failed: {}", e);
                return Err(e);
            }
        };
        self.transition(status)?;

        let report = CrawlReport {
            status,
            pages_processed: self.state.page_count(),
            visited: self.state.visited_count(),
            vertices: self.graph.vertex_count(),
            edges: self.graph.edge_count(),
            failed_fetches: self.state.failed_count(),
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl {}: {} pages, {} vertices, {} edges, {} failed fetches",
            status,
            report.pages_processed,
            report.vertices,
            report.edges,
            report.failed_fetches
        );

        Ok(report)
    }

    fn transition(&mut self, next: CrawlStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(SitegraphError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    fn parse_seed(&self) -> Result<Url> {
        let target = self.config.target_url.trim();
        if target.is_empty() {
            return Err(SitegraphError::InvalidSeed {
                url: self.config.target_url.clone(),
                reason: "TargetURL is empty".to_string(),
            });
        }

        Url::parse(target).map_err(|e| SitegraphError::InvalidSeed {
            url: self.config.target_url.clone(),
            reason: e.to_string(),
        })
    }

    fn limit_reached(&self) -> bool {
        self.state.page_count() >= self.config.page_number_limit
    }

    /// Depth-first traversal with a single request in flight
    ///
    /// The explicit stack visits vertices in the same order as recursing
    /// into each child link as soon as it is fetched.
    async fn run_sequential(&mut self, seed: Url) -> Result<CrawlStatus> {
        if self.limit_reached() {
            tracing::info!("Page limit is 0, nothing to fetch");
            return Ok(CrawlStatus::LimitReached);
        }
        if self.cancel.is_cancelled() {
            return Ok(CrawlStatus::Cancelled);
        }

        let links = match self.process(&seed, None).await {
            Outcome::Success(links) => links,
            Outcome::Failed(reason) => {
                return Err(SitegraphError::SeedFetch {
                    url: seed.to_string(),
                    reason,
                });
            }
        };
        if self.limit_reached() {
            return Ok(CrawlStatus::LimitReached);
        }

        let delay = self.config.request_delay();
        let mut stack = vec![Frame {
            vertex: Vertex::for_url(&seed),
            links,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled");
                return Ok(CrawlStatus::Cancelled);
            }

            let Some(link) = frame.links.get(frame.next).cloned() else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let parent = frame.vertex.clone();

            if self.state.is_visited(link.as_str()) {
                tracing::trace!("Skipping visited {}", link);
                continue;
            }
            if self.state.visited_count() >= self.config.crawl_depth {
                tracing::trace!("Skipping {}: depth limit {}", link, self.config.crawl_depth);
                continue;
            }

            if !delay.is_zero() {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        tracing::info!("Crawl cancelled");
                        return Ok(CrawlStatus::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            if let Outcome::Success(links) = self.process(&link, Some(&parent)).await {
                if self.limit_reached() {
                    tracing::info!("Page limit {} reached", self.config.page_number_limit);
                    return Ok(CrawlStatus::LimitReached);
                }
                stack.push(Frame {
                    vertex: Vertex::for_url(&link),
                    links,
                    next: 0,
                });
            }
        }

        Ok(CrawlStatus::Completed)
    }

    /// Breadth-first traversal over a bounded pool of fetch tasks
    ///
    /// Only this task touches engine state; workers just fetch. A URL is
    /// dispatched only while the page count plus requests in flight stays
    /// below `PageNumberLimit`, so the limit holds exactly.
    async fn run_pool(&mut self, seed: Url) -> Result<CrawlStatus> {
        let workers = self.config.workers;
        let delay = self.config.request_delay();
        let mut scheduler = Scheduler::new();
        let mut in_flight: JoinSet<PoolResult> = JoinSet::new();
        let mut pending: HashSet<String> = HashSet::new();

        scheduler.add_to_frontier(QueuedUrl::new(seed, None));

        loop {
            while !self.cancel.is_cancelled() && in_flight.len() < workers {
                if self.state.page_count() + in_flight.len() >= self.config.page_number_limit {
                    break;
                }
                let Some(queued) = scheduler.next_url() else {
                    break;
                };

                let key = queued.url.as_str();
                if self.state.is_visited(key) || pending.contains(key) {
                    tracing::trace!("Skipping visited {}", key);
                    continue;
                }

                // Under AllowRetry in-flight URLs are not yet visited
                let reserved = match self.failure_policy {
                    FailurePolicy::MarkVisited => self.state.visited_count(),
                    FailurePolicy::AllowRetry => self.state.visited_count() + pending.len(),
                };
                if !queued.is_seed() && reserved >= self.config.crawl_depth {
                    tracing::trace!("Skipping {}: depth limit {}", key, self.config.crawl_depth);
                    continue;
                }

                if self.failure_policy == FailurePolicy::MarkVisited {
                    self.state.mark_visited(key);
                }
                pending.insert(key.to_string());

                let start_at = scheduler.reserve_slot(&queued.host, delay);
                let fetcher = Arc::clone(&self.fetcher);
                let user_agent = self.config.user_agent.clone();
                let cancel = self.cancel.clone();

                tracing::debug!(
                    "Dispatching {} ({} in flight, {} queued)",
                    queued.url,
                    in_flight.len() + 1,
                    scheduler.frontier_size()
                );

                in_flight.spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => return (queued, None),
                        _ = tokio::time::sleep_until(start_at) => {}
                    }
                    let result = fetcher.fetch(queued.url.as_str(), &user_agent).await;
                    (queued, Some(result))
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let (queued, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::warn!("Fetch task failed: {}", e);
                    continue;
                }
            };

            pending.remove(queued.url.as_str());
            let Some(result) = result else {
                continue;
            };

            match self.complete(&queued.url, queued.parent.as_ref(), result) {
                Outcome::Success(links) => {
                    let vertex = Vertex::for_url(&queued.url);
                    for link in links {
                        scheduler.add_to_frontier(QueuedUrl::new(link, Some(vertex.clone())));
                    }
                }
                Outcome::Failed(reason) if queued.is_seed() => {
                    return Err(SitegraphError::SeedFetch {
                        url: queued.url.to_string(),
                        reason,
                    });
                }
                Outcome::Failed(_) => {}
            }
        }

        if self.limit_reached() {
            tracing::info!("Page limit {} reached", self.config.page_number_limit);
            Ok(CrawlStatus::LimitReached)
        } else if self.cancel.is_cancelled() {
            tracing::info!("Crawl cancelled");
            Ok(CrawlStatus::Cancelled)
        } else {
            Ok(CrawlStatus::Completed)
        }
    }

    /// Fetches one vertex and records the outcome
    async fn process(&mut self, url: &Url, parent: Option<&Vertex>) -> Outcome {
        if self.failure_policy == FailurePolicy::MarkVisited {
            self.state.mark_visited(url.as_str());
        }

        tracing::debug!("Fetching {}", url);
        let result = self.fetcher.fetch(url.as_str(), &self.config.user_agent).await;
        self.complete(url, parent, result)
    }

    /// Records a finished fetch
    ///
    /// On success the vertex joins the visited set, its body is stored, the
    /// edge from `parent` (or the bare seed vertex) is added to the graph and
    /// the page count grows by one.
    fn complete(
        &mut self,
        url: &Url,
        parent: Option<&Vertex>,
        result: std::result::Result<FetchResponse, TransportError>,
    ) -> Outcome {
        let response = match result {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::warn!("{} returned HTTP {}", url, response.status);
                self.state.record_failure();
                return Outcome::Failed(format!("HTTP {}", response.status));
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.state.record_failure();
                return Outcome::Failed(e.to_string());
            }
        };

        self.state.mark_visited(url.as_str());
        let vertex = Vertex::for_url(url);
        match parent {
            Some(parent) => self.graph.add_edge(parent.clone(), vertex),
            None => {
                self.graph.add_vertex(vertex);
            }
        }

        let links = self.resolve_links(url, &response.body);
        self.state.record_success(url.as_str(), response.body);

        tracing::debug!(
            "Fetched {} ({} links, page {}/{})",
            url,
            links.len(),
            self.state.page_count(),
            self.config.page_number_limit
        );

        Outcome::Success(links)
    }

    /// Extracts and resolves the outbound links of a fetched body
    fn resolve_links(&self, base: &Url, body: &str) -> Vec<Url> {
        self.extractor
            .extract_links(body)
            .into_iter()
            .filter_map(|href| match self.resolver.resolve_url(base, &href) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::debug!("Dropping link: {}", e);
                    None
                }
            })
            .collect()
    }
}
