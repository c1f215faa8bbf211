use crate::config::EnrichmentConfig;
use crate::enrich::AvatarFetcher;
use std::thread;
use std::time::Duration;

const PROFILE_HTML: &str = r#"<html><body>
<div class="profile-card">header</div>
<div class="img-preview"><img src="https://cdn.example/avatars/a1.jpg?sign=xyz&w=200"></div>
</body></html>"#;

fn serve_once(
    body: &'static str,
    status: u16,
) -> (String, thread::JoinHandle<Option<String>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let handle = thread::spawn(move || {
        let request = server.recv_timeout(Duration::from_secs(5)).ok()??;
        let path = request.url().to_string();
        let response = tiny_http::Response::from_string(body).with_status_code(status);
        let _ = request.respond(response);
        Some(path)
    });
    (format!("http://127.0.0.1:{port}"), handle)
}

fn fetcher_for(host: String) -> AvatarFetcher {
    AvatarFetcher::new(EnrichmentConfig {
        enabled: true,
        profile_host: host,
        timeout_ms: 5000,
        min_interval_ms: 0,
    })
    .unwrap()
}

#[tokio::test]
async fn test_avatar_fetch_extracts_and_strips_query() -> anyhow::Result<()> {
    let (host, handle) = serve_once(PROFILE_HTML, 200);
    let fetcher = fetcher_for(host);

    let url = fetcher.avatar_url("RA H2019").await;
    assert_eq!(url.as_deref(), Some("https://cdn.example/avatars/a1.jpg"));

    // The user id was path-escaped into the request.
    let path = handle
        .join()
        .map_err(|_| anyhow::anyhow!("server thread panicked"))?
        .ok_or_else(|| anyhow::anyhow!("server saw no request"))?;
    assert_eq!(path, "/user/RA%20H2019");
    Ok(())
}

#[tokio::test]
async fn test_avatar_fetch_non_success_status_yields_none() {
    let (host, handle) = serve_once("gone", 404);
    let fetcher = fetcher_for(host);

    assert_eq!(fetcher.avatar_url("someone").await, None);
    handle.join().unwrap();
}

#[tokio::test]
async fn test_avatar_fetch_page_without_preview_yields_none() {
    let (host, handle) = serve_once("<html><body>no preview here</body></html>", 200);
    let fetcher = fetcher_for(host);

    assert_eq!(fetcher.avatar_url("someone").await, None);
    handle.join().unwrap();
}

#[tokio::test]
async fn test_disabled_fetcher_never_touches_the_network() {
    let fetcher = AvatarFetcher::new(EnrichmentConfig {
        enabled: false,
        // An unroutable host: a request would error loudly if one were made.
        profile_host: "http://127.0.0.1:1".to_string(),
        timeout_ms: 100,
        min_interval_ms: 0,
    })
    .unwrap();

    assert!(!fetcher.is_enabled());
    assert_eq!(fetcher.avatar_url("anyone").await, None);
}

#[tokio::test]
async fn test_unreachable_host_degrades_to_none() {
    let fetcher = fetcher_for("http://127.0.0.1:1".to_string());
    assert_eq!(fetcher.avatar_url("anyone").await, None);
}

#[tokio::test]
async fn test_empty_user_id_is_not_fetched() {
    let fetcher = fetcher_for("http://127.0.0.1:1".to_string());
    assert_eq!(fetcher.avatar_url("").await, None);
}
