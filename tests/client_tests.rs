/// HTTP client tests against a local fake backend.
///
/// Each test starts a `tiny_http` server on an ephemeral port that answers
/// the archiver endpoints from a handler closure, then drives the real
/// `ureq`-based [`HttpBackend`] against it.
use std::sync::{Arc, Mutex};
use std::thread;

use pinna_dash::cli::load_hashtag_pages;
use pinna_dash::client::{Backend, FailureKind, FetchError, HttpBackend};
use pinna_dash::config::DashConfig;
use pinna_dash::config::schema::BackendConfig;
use pinna_dash::dashboard::{Dashboard, Surfaces};
use pinna_dash::logging::EventLog;
use tiny_http::{Response, Server};

// ---------------------------------------------------------------------------
// Fake backend
// ---------------------------------------------------------------------------

struct FakeServer {
    base_url: String,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FakeServer {
    /// Serve every request with `handler(url) -> (status, body)`.
    fn start(handler: impl Fn(&str) -> (u16, String) + Send + 'static) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        thread::spawn(move || {
            for request in server.incoming_requests() {
                let url = request.url().to_string();
                log.lock().unwrap().push(url.clone());
                let (status, body) = handler(&url);
                let _ = request.respond(Response::from_string(body).with_status_code(status));
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    fn backend(&self) -> HttpBackend {
        HttpBackend::from_config(&BackendConfig {
            base_url: self.base_url.clone(),
            timeout_ms: 2_000,
        })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

fn query_param(url: &str, key: &str) -> Option<u64> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key { v.parse().ok() } else { None }
    })
}

/// A backend holding `n` hashtags with descending counts, sliced by `f`/`t`.
fn archive_with(n: u64) -> impl Fn(&str) -> (u16, String) + Send + 'static {
    move |url| {
        let path = url.split('?').next().unwrap_or(url);
        match path {
            "/ajax/get/hashtags" => {
                let from = query_param(url, "f").unwrap_or(0).min(n);
                let to = query_param(url, "t").unwrap_or(n).min(n);
                let pairs: Vec<String> = (from..to)
                    .map(|i| format!("\"tag{i}\": {}", n - i))
                    .collect();
                (200, format!("{{{}}}", pairs.join(", ")))
            }
            "/ajax/get/hashtags-number" => (200, n.to_string()),
            _ => (404, "{}".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint behavior
// ---------------------------------------------------------------------------

#[test]
fn hashtags_send_range_and_keep_order() {
    let server = FakeServer::start(|_| (200, r#"{"b": 10, "a": 3, "c": 1}"#.to_string()));
    let page = server.backend().hashtags(100, 200).unwrap();

    let tags: Vec<_> = page.entries.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, ["b", "a", "c"]);

    let url = &server.seen()[0];
    assert!(url.starts_with("/ajax/get/hashtags?"));
    assert_eq!(query_param(url, "f"), Some(100));
    assert_eq!(query_param(url, "t"), Some(200));
}

#[test]
fn scalar_and_list_endpoints_parse() {
    let server = FakeServer::start(|url| match url {
        "/ajax/get/hashtags-number" => (200, "4242".to_string()),
        "/ajax/get/docs-in-collection" => (200, r#"["Tue, 07 Mar 2017 09:12:44 GMT", 9001]"#.to_string()),
        "/ajax/get/storage-size" => (200, "318".to_string()),
        "/ajax/get/statistics" => (
            200,
            r#"{"z": ["Tweets", 9001], "a": ["Users", 12]}"#.to_string(),
        ),
        _ => (404, String::new()),
    });
    let backend = server.backend();

    assert_eq!(backend.hashtag_total().unwrap(), 4242);

    let reading = backend.docs_in_collection().unwrap();
    assert_eq!(reading.primary, 9001);
    assert_eq!(reading.secondary.to_string(), "Tue, 07 Mar 2017 09:12:44 GMT");

    assert_eq!(backend.storage_size().unwrap().to_string(), "318");

    let stats: Vec<_> = backend
        .statistics()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    // Backend order, not key order
    assert_eq!(stats, ["Tweets: 9001", "Users: 12"]);
}

#[test]
fn empty_page_is_not_an_error() {
    let server = FakeServer::start(|_| (200, "{}".to_string()));
    let page = server.backend().hashtags(0, 100).unwrap();
    assert!(page.is_empty());
}

// ---------------------------------------------------------------------------
// Failure classes
// ---------------------------------------------------------------------------

#[test]
fn non_success_status_is_reported() {
    let server = FakeServer::start(|_| (500, "boom".to_string()));
    let err = server.backend().statistics().unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            endpoint: "/ajax/get/statistics".to_string(),
            status: 500,
        }
    );
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[test]
fn malformed_payload_is_reported() {
    let server = FakeServer::start(|_| (200, "<html>oops</html>".to_string()));
    let err = server.backend().docs_in_collection().unwrap_err();
    assert_eq!(err.kind(), FailureKind::Malformed);
    assert_eq!(err.endpoint(), "/ajax/get/docs-in-collection");
}

#[test]
fn refused_connection_is_transport() {
    // Bind, note the port, and release it so nothing is listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let backend = HttpBackend::from_config(&BackendConfig {
        base_url: format!("http://{addr}"),
        timeout_ms: 1_000,
    });

    let err = backend.hashtag_total().unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
}

// ---------------------------------------------------------------------------
// Pagination end to end
// ---------------------------------------------------------------------------

fn hashtags_only() -> (DashConfig, Surfaces) {
    let surfaces = Surfaces {
        hashtags: true,
        ..Surfaces::none()
    };
    (DashConfig::default(), surfaces)
}

#[test]
fn pages_until_short_page() {
    let server = FakeServer::start(archive_with(250));
    let (config, surfaces) = hashtags_only();
    let mut dashboard = Dashboard::new(&config, surfaces);

    let pages = load_hashtag_pages(
        &mut dashboard,
        &server.backend(),
        &EventLog::disabled(),
        None,
    );

    assert_eq!(pages, 3);
    assert_eq!(dashboard.hashtags().len(), 250);
    assert_eq!(dashboard.hashtag_total(), Some(250));
    assert!(!dashboard.load_more_control().unwrap().visible);
    assert_eq!(dashboard.pager().unwrap().cursor().loaded(), 300);

    let ranges: Vec<_> = server
        .seen()
        .iter()
        .filter(|url| url.starts_with("/ajax/get/hashtags?"))
        .map(|url| (query_param(url, "f").unwrap(), query_param(url, "t").unwrap()))
        .collect();
    assert_eq!(ranges, [(0, 100), (100, 200), (200, 300)]);
}

#[test]
fn full_last_page_costs_one_empty_fetch() {
    let server = FakeServer::start(archive_with(200));
    let (config, surfaces) = hashtags_only();
    let mut dashboard = Dashboard::new(&config, surfaces);

    let pages = load_hashtag_pages(
        &mut dashboard,
        &server.backend(),
        &EventLog::disabled(),
        None,
    );

    assert_eq!(pages, 3);
    assert_eq!(dashboard.hashtags().len(), 200);
    assert!(!dashboard.load_more_control().unwrap().visible);
}

#[test]
fn page_limit_stops_early() {
    let server = FakeServer::start(archive_with(1_000));
    let (config, surfaces) = hashtags_only();
    let mut dashboard = Dashboard::new(&config, surfaces);

    let pages = load_hashtag_pages(
        &mut dashboard,
        &server.backend(),
        &EventLog::disabled(),
        Some(2),
    );

    assert_eq!(pages, 2);
    assert_eq!(dashboard.hashtags().len(), 200);
    // More data exists, so the control stays visible
    assert!(dashboard.load_more_control().unwrap().visible);
    assert_eq!(dashboard.hashtags()[0].tag, "tag0");
}
