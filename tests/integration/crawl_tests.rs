//! Integration tests for the crawl engine
//!
//! These tests drive the engine against an in-memory site so traversal
//! order, limits and pacing can be checked without a network.

use sitegraph::crawler::{FetchResponse, HtmlLinkExtractor};
use sitegraph::{
    Config, CrawlEngine, CrawlStatus, ExclusionPolicy, FailurePolicy, Fetcher, LinkResolver,
    SameHostPolicy, SiteGraph, SitegraphError, TransportError, Vertex,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// One recorded request: URL, user agent and when it was sent
#[derive(Debug, Clone)]
struct Request {
    url: String,
    user_agent: String,
    at: Instant,
}

/// In-memory site keyed by absolute URL
#[derive(Clone, Default)]
struct MockSite {
    pages: HashMap<String, (u16, String)>,
    log: Arc<Mutex<Vec<Request>>>,
}

impl MockSite {
    fn new() -> Self {
        Self::default()
    }

    /// Adds an HTML page whose anchors point at `links`
    fn page(mut self, url: &str, links: &[&str]) -> Self {
        let body: String = links
            .iter()
            .map(|href| format!("<a href=\"{}\">link</a>\n", href))
            .collect();
        self.pages
            .insert(url.to_string(), (200, format!("<html><body>{}</body></html>", body)));
        self
    }

    fn raw(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(url.to_string(), (status, body.to_string()));
        self
    }

    fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn hits(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.url == url).count()
    }
}

impl Fetcher for MockSite {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<FetchResponse, TransportError> {
        self.log.lock().unwrap().push(Request {
            url: url.to_string(),
            user_agent: user_agent.to_string(),
            at: Instant::now(),
        });

        match self.pages.get(url) {
            Some((status, body)) => Ok(FetchResponse::new(*status, body.clone())),
            None => Err(TransportError::Connect {
                url: url.to_string(),
            }),
        }
    }
}

/// Follows every link, including absolute ones to other hosts
#[derive(Debug)]
struct FollowAll;

impl ExclusionPolicy for FollowAll {
    fn name(&self) -> &'static str {
        "follow-all"
    }

    fn excludes(&self, _base: &Url, href: &str) -> bool {
        href.trim().is_empty()
    }
}

fn create_test_config(target: &str, depth: usize, limit: usize) -> Config {
    Config {
        target_url: target.to_string(),
        crawl_depth: depth,
        page_number_limit: limit,
        user_agent: "TestBot/1.0".to_string(),
        request_delay_ms: 0.0,
        ..Config::default()
    }
}

fn engine(site: &MockSite, config: Config) -> CrawlEngine<MockSite, HtmlLinkExtractor> {
    CrawlEngine::new(config, site.clone(), HtmlLinkExtractor::new())
}

fn v(url: &str) -> Vertex {
    Vertex::for_url(&Url::parse(url).unwrap())
}

/// Seed A links to B and C; B links back to A and on to D
fn cyclic_site() -> MockSite {
    MockSite::new()
        .page("https://site.test/a", &["/b", "/c"])
        .page("https://site.test/b", &["/a", "/d"])
        .page("https://site.test/c", &[])
        .page("https://site.test/d", &[])
}

#[tokio::test]
async fn test_depth_first_order_on_cyclic_site() {
    let site = cyclic_site();
    let mut engine = engine(&site, create_test_config("https://site.test/a", 10, 20));

    let report = engine.start().await.unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(
        engine.crawled_urls(),
        &[
            "https://site.test/a",
            "https://site.test/b",
            "https://site.test/d",
            "https://site.test/c",
        ]
    );

    let graph = engine.graph();
    let a = v("https://site.test/a");
    let b = v("https://site.test/b");
    assert_eq!(graph.root(), Some(&a));
    assert_eq!(graph.children(&a), &[b.clone(), v("https://site.test/c")]);
    // The back-link from B to A creates no edge
    assert_eq!(graph.children(&b), &[v("https://site.test/d")]);
    assert_eq!(graph.edge_count(), 3);
    assert!(graph.validate().is_ok());
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let site = cyclic_site();
    let config = create_test_config("https://site.test/a", 10, 20);

    let mut first = engine(&site, config.clone());
    first.start().await.unwrap();
    let mut second = engine(&site, config);
    second.start().await.unwrap();

    assert_eq!(first.graph(), second.graph());
    assert_eq!(first.crawled_urls(), second.crawled_urls());
    assert_eq!(first.results(), second.results());
}

#[tokio::test]
async fn test_fragment_and_scheme_links_excluded() {
    let site = MockSite::new()
        .raw(
            "https://x/",
            200,
            r##"<a href="/p1">p1</a><a href="#top">top</a><a href="mailto:a@b.com">mail</a>"##,
        )
        .page("https://x/p1", &[]);
    let mut engine = engine(&site, create_test_config("https://x/", 10, 20));

    engine.start().await.unwrap();

    let root = v("https://x/");
    assert_eq!(engine.graph().children(&root), &[v("https://x/p1")]);
    assert_eq!(site.requested_urls(), vec!["https://x/", "https://x/p1"]);
}

#[tokio::test]
async fn test_crawl_depth_one_fetches_only_seed() {
    let site = cyclic_site();
    let mut engine = engine(&site, create_test_config("https://site.test/a", 1, 20));

    let report = engine.start().await.unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(engine.page_count(), 1);
    assert_eq!(engine.graph().edge_count(), 0);
    assert_eq!(engine.graph().vertex_count(), 1);
    assert_eq!(site.requested_urls(), vec!["https://site.test/a"]);
}

#[tokio::test]
async fn test_crawl_depth_zero_still_fetches_seed() {
    let site = cyclic_site();
    let mut engine = engine(&site, create_test_config("https://site.test/a", 0, 20));

    engine.start().await.unwrap();
    assert_eq!(engine.page_count(), 1);
    assert_eq!(site.requested_urls().len(), 1);
}

#[tokio::test]
async fn test_crawl_depth_bounds_visited_not_path_length() {
    // A straight chain: depth in the tree grows, but only 3 vertices may be visited
    let site = MockSite::new()
        .page("https://chain.test/", &["/1"])
        .page("https://chain.test/1", &["/2"])
        .page("https://chain.test/2", &["/3"])
        .page("https://chain.test/3", &["/4"])
        .page("https://chain.test/4", &[]);
    let mut engine = engine(&site, create_test_config("https://chain.test/", 3, 20));

    engine.start().await.unwrap();

    assert_eq!(engine.visited_count(), 3);
    assert_eq!(engine.page_count(), 3);
    assert_eq!(site.requested_urls().len(), 3);
}

#[tokio::test]
async fn test_siblings_linking_to_visited_parent() {
    let site = MockSite::new()
        .page("https://x/", &["/a", "/b"])
        .page("https://x/a", &["/"])
        .page("https://x/b", &["/"]);
    let mut engine = engine(&site, create_test_config("https://x/", 10, 20));

    engine.start().await.unwrap();

    let root = v("https://x/");
    assert_eq!(engine.visited_count(), 3);
    assert_eq!(site.hits("https://x/"), 1);
    assert_eq!(
        engine.graph().children(&root),
        &[v("https://x/a"), v("https://x/b")]
    );
    assert!(engine.graph().children(&v("https://x/a")).is_empty());
    assert_eq!(engine.graph().edge_count(), 2);
}

#[tokio::test]
async fn test_page_limit_is_never_exceeded() {
    let links: Vec<String> = (0..10).map(|i| format!("/p{}", i)).collect();
    let hrefs: Vec<&str> = links.iter().map(String::as_str).collect();
    let mut site = MockSite::new().page("https://x/", &hrefs);
    for link in &links {
        site = site.page(&format!("https://x{}", link), &["/"]);
    }

    for limit in 0..6 {
        let mut engine = engine(&site, create_test_config("https://x/", 100, limit));
        let report = engine.start().await.unwrap();

        assert!(engine.page_count() <= limit);
        assert_eq!(report.status, CrawlStatus::LimitReached);
    }
}

#[tokio::test]
async fn test_page_limit_zero_fetches_nothing() {
    let site = cyclic_site();
    let mut engine = engine(&site, create_test_config("https://site.test/a", 10, 0));

    let report = engine.start().await.unwrap();
    assert_eq!(report.status, CrawlStatus::LimitReached);
    assert!(site.requests().is_empty());
    assert!(engine.graph().is_empty());
}

#[tokio::test]
async fn test_failed_fetch_is_not_retried_by_default() {
    let site = MockSite::new()
        .page("https://x/", &["/bad", "/ok"])
        .page("https://x/ok", &["/bad"])
        .raw("https://x/bad", 500, "oops");
    let mut engine = engine(&site, create_test_config("https://x/", 10, 20));

    let report = engine.start().await.unwrap();

    assert_eq!(site.hits("https://x/bad"), 1);
    assert_eq!(engine.visited_count(), 3);
    assert_eq!(report.failed_fetches, 1);
    assert!(!engine.results().contains_key("https://x/bad"));
    assert!(!engine.graph().contains(&v("https://x/bad")));
}

#[tokio::test]
async fn test_allow_retry_fetches_failed_url_again() {
    let site = MockSite::new()
        .page("https://x/", &["/bad", "/ok"])
        .page("https://x/ok", &["/bad"])
        .raw("https://x/bad", 500, "oops");
    let mut engine = engine(&site, create_test_config("https://x/", 10, 20))
        .with_failure_policy(FailurePolicy::AllowRetry);

    let report = engine.start().await.unwrap();

    assert_eq!(site.hits("https://x/bad"), 2);
    assert_eq!(engine.visited_count(), 2);
    assert_eq!(report.failed_fetches, 2);
}

#[tokio::test]
async fn test_transport_error_skips_vertex() {
    // "/gone" has no page, so the mock returns a transport error
    let site = MockSite::new()
        .page("https://x/", &["/gone", "/ok"])
        .page("https://x/ok", &[]);
    let mut engine = engine(&site, create_test_config("https://x/", 10, 20));

    let report = engine.start().await.unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(engine.crawled_urls(), &["https://x/", "https://x/ok"]);
}

#[tokio::test]
async fn test_seed_failure_fails_run() {
    let site = MockSite::new().raw("https://x/", 404, "not found");
    let mut engine = engine(&site, create_test_config("https://x/", 10, 20));

    let result = engine.start().await;

    assert!(matches!(result, Err(SitegraphError::SeedFetch { .. })));
    assert_eq!(engine.status(), CrawlStatus::Failed);
    assert!(engine.results().is_empty());
    assert!(engine.graph().is_empty());
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let site = cyclic_site();
    let mut engine = engine(&site, create_test_config("https://site.test/a", 10, 20));
    engine.start().await.unwrap();

    assert!(site
        .requests()
        .iter()
        .all(|r| r.user_agent == "TestBot/1.0"));
}

#[tokio::test]
async fn test_same_host_policy() {
    let site = MockSite::new()
        .page("https://x/", &["https://elsewhere.test/", "/local"])
        .page("https://x/local", &[])
        .page("https://elsewhere.test/", &[]);
    let mut engine = engine(&site, create_test_config("https://x/", 10, 20))
        .with_resolver(LinkResolver::with_policy(SameHostPolicy));

    engine.start().await.unwrap();

    assert_eq!(site.requested_urls(), vec!["https://x/", "https://x/local"]);
}

#[tokio::test]
async fn test_supplied_graph_is_extended() {
    let mut graph = SiteGraph::new();
    let earlier = Vertex::new("https://earlier.test/", "/");
    graph.add_vertex(earlier.clone());

    let site = cyclic_site();
    let mut engine = engine(&site, create_test_config("https://site.test/a", 10, 20))
        .with_graph(graph);
    engine.start().await.unwrap();

    assert_eq!(engine.graph().root(), Some(&earlier));
    assert_eq!(engine.graph().vertex_count(), 5);
}

#[tokio::test]
async fn test_reset_allows_a_new_run() {
    let site = cyclic_site();
    let config = create_test_config("https://site.test/a", 10, 20);
    let mut engine = engine(&site, config.clone());
    engine.start().await.unwrap();

    engine.reset();
    engine.set_config(config).unwrap();
    let report = engine.start().await.unwrap();

    assert_eq!(report.pages_processed, 4);
    assert_eq!(site.hits("https://site.test/a"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_request_delay_before_each_follow_up() {
    let site = MockSite::new()
        .page("https://x/", &["/a", "/b"])
        .page("https://x/a", &[])
        .page("https://x/b", &[]);
    let mut config = create_test_config("https://x/", 10, 20);
    config.request_delay_ms = 1000.0;
    let mut engine = engine(&site, config);

    engine.start().await.unwrap();

    let times: Vec<Instant> = site.requests().iter().map(|r| r.at).collect();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(1));
    assert_eq!(times[2] - times[1], Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_no_delay_before_skipped_links() {
    let site = MockSite::new()
        .page("https://x/", &["/", "/", "/a"])
        .page("https://x/a", &[]);
    let mut config = create_test_config("https://x/", 10, 20);
    config.request_delay_ms = 1000.0;
    let mut engine = engine(&site, config);

    engine.start().await.unwrap();

    let times: Vec<Instant> = site.requests().iter().map(|r| r.at).collect();
    assert_eq!(times[1] - times[0], Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_delay_keeps_partial_results() {
    let site = MockSite::new()
        .page("https://x/", &["/a", "/b"])
        .page("https://x/a", &[])
        .page("https://x/b", &[]);
    let mut config = create_test_config("https://x/", 10, 20);
    config.request_delay_ms = 1000.0;
    let mut engine = engine(&site, config);
    let token = engine.cancel_token();

    let (report, _) = tokio::join!(engine.start(), async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        token.cancel();
    });

    let report = report.unwrap();
    assert_eq!(report.status, CrawlStatus::Cancelled);
    assert_eq!(engine.crawled_urls(), &["https://x/", "https://x/a"]);
    assert!(engine.graph().validate().is_ok());
}

#[tokio::test]
async fn test_cancel_before_start() {
    let site = cyclic_site();
    let mut engine = engine(&site, create_test_config("https://site.test/a", 10, 20));
    engine.cancel_token().cancel();

    let report = engine.start().await.unwrap();
    assert_eq!(report.status, CrawlStatus::Cancelled);
    assert!(site.requests().is_empty());
}

mod worker_pool {
    use super::*;

    fn pool_config(target: &str, depth: usize, limit: usize, workers: usize) -> Config {
        Config {
            workers,
            ..create_test_config(target, depth, limit)
        }
    }

    fn wide_site(n: usize) -> MockSite {
        let links: Vec<String> = (0..n).map(|i| format!("/p{}", i)).collect();
        let hrefs: Vec<&str> = links.iter().map(String::as_str).collect();
        let mut site = MockSite::new().page("https://x/", &hrefs);
        for link in &links {
            site = site.page(&format!("https://x{}", link), &["/", "/p0"]);
        }
        site
    }

    #[tokio::test]
    async fn test_pool_crawls_whole_site() {
        let site = cyclic_site();
        let mut engine = engine(&site, pool_config("https://site.test/a", 10, 20, 4));

        let report = engine.start().await.unwrap();

        assert_eq!(report.status, CrawlStatus::Completed);
        assert_eq!(engine.page_count(), 4);
        assert_eq!(engine.crawled_urls()[0], "https://site.test/a");
        assert_eq!(engine.graph().edge_count(), 3);
        assert!(engine.graph().validate().is_ok());
        for url in engine.crawled_urls() {
            assert_eq!(site.hits(url), 1);
        }
    }

    #[tokio::test]
    async fn test_pool_respects_page_limit() {
        let site = wide_site(20);
        let mut engine = engine(&site, pool_config("https://x/", 100, 5, 4));

        let report = engine.start().await.unwrap();

        assert_eq!(report.status, CrawlStatus::LimitReached);
        assert_eq!(engine.page_count(), 5);
        assert_eq!(site.requests().len(), 5);
    }

    #[tokio::test]
    async fn test_pool_respects_crawl_depth() {
        let site = wide_site(20);
        let mut engine = engine(&site, pool_config("https://x/", 4, 100, 4));

        engine.start().await.unwrap();

        assert_eq!(engine.visited_count(), 4);
        assert_eq!(site.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_pool_allow_retry_counts_in_flight_toward_depth() {
        let site = wide_site(20);
        let mut engine = engine(&site, pool_config("https://x/", 4, 100, 4))
            .with_failure_policy(FailurePolicy::AllowRetry);

        engine.start().await.unwrap();

        assert_eq!(site.requests().len(), 4);
        assert_eq!(engine.visited_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_allow_retry_refetches_failed_link() {
        let site = MockSite::new()
            .page("https://r/", &["/bad", "/a"])
            .raw("https://r/bad", 500, "oops")
            .page("https://r/a", &["/bad"]);
        let mut config = pool_config("https://r/", 10, 20, 2);
        config.request_delay_ms = 1000.0;
        let mut engine = engine(&site, config).with_failure_policy(FailurePolicy::AllowRetry);

        let report = engine.start().await.unwrap();

        assert_eq!(report.status, CrawlStatus::Completed);
        assert_eq!(site.hits("https://r/bad"), 2);
        assert_eq!(report.failed_fetches, 2);
        assert_eq!(engine.page_count(), 2);
        assert!(!engine.state().is_visited("https://r/bad"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_mark_visited_never_refetches() {
        let site = MockSite::new()
            .page("https://r/", &["/bad", "/a"])
            .raw("https://r/bad", 500, "oops")
            .page("https://r/a", &["/bad"]);
        let mut config = pool_config("https://r/", 10, 20, 2);
        config.request_delay_ms = 1000.0;
        let mut engine = engine(&site, config);

        let report = engine.start().await.unwrap();

        assert_eq!(site.hits("https://r/bad"), 1);
        assert_eq!(report.failed_fetches, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_paces_per_host() {
        let site = MockSite::new()
            .page(
                "https://x.test/",
                &["https://x.test/a", "https://y.test/a", "https://y.test/b"],
            )
            .page("https://x.test/a", &[])
            .page("https://y.test/a", &[])
            .page("https://y.test/b", &[]);
        let mut config = pool_config("https://x.test/", 10, 20, 4);
        config.request_delay_ms = 1000.0;
        let mut engine = engine(&site, config)
            .with_resolver(LinkResolver::with_policy(FollowAll));

        engine.start().await.unwrap();

        let requests = site.requests();
        let at = |url: &str| {
            requests
                .iter()
                .find(|r| r.url == url)
                .map(|r| r.at)
                .unwrap()
        };
        let start = at("https://x.test/");

        assert_eq!(at("https://x.test/a") - start, Duration::from_secs(1));
        // The first request to a new host is not delayed
        assert_eq!(at("https://y.test/a"), start);
        assert_eq!(at("https://y.test/b") - start, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_pool_seed_failure() {
        let site = MockSite::new();
        let mut engine = engine(&site, pool_config("https://x/", 10, 20, 2));

        assert!(matches!(
            engine.start().await,
            Err(SitegraphError::SeedFetch { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_cancel() {
        let site = wide_site(10);
        let mut config = pool_config("https://x/", 100, 100, 2);
        config.request_delay_ms = 1000.0;
        let mut engine = engine(&site, config);
        let token = engine.cancel_token();

        let (report, _) = tokio::join!(engine.start(), async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            token.cancel();
        });

        let report = report.unwrap();
        assert_eq!(report.status, CrawlStatus::Cancelled);
        assert!(engine.page_count() < 11);
        assert_eq!(engine.page_count(), site.requests().len());
        assert!(engine.graph().validate().is_ok());
    }
}
