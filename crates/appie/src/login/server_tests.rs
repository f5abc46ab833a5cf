// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum_test::TestServer;

use super::*;

const LOGIN_URL: &str = "https://login.example.test/secure/oauth/authorize?client_id=appie";

fn capture_server() -> anyhow::Result<(TestServer, mpsc::Receiver<String>)> {
    let (tx, rx) = mpsc::channel(1);
    let router = build_router(LOGIN_URL, "http://127.0.0.1:1/callback", tx);
    Ok((TestServer::new(router)?, rx))
}

#[tokio::test]
async fn index_serves_instruction_page() -> anyhow::Result<()> {
    let (server, _rx) = capture_server()?;
    let resp = server.get("/").await;
    resp.assert_status_ok();
    let page = resp.text();
    assert!(page.contains("href=\"https://login.example.test/secure/oauth/authorize?client_id=appie\""));
    assert!(page.contains("data-callback=\"http://127.0.0.1:1/callback\""));
    Ok(())
}

#[tokio::test]
async fn callback_without_code_is_rejected() -> anyhow::Result<()> {
    let (server, mut rx) = capture_server()?;
    for path in ["/callback", "/callback?code=", "/callback?code=%20%20", "/callback?state=1"] {
        let resp = server.get(path).expect_failure().await;
        resp.assert_status_bad_request();
        assert_eq!(resp.text(), "Missing code", "path {path}");
    }
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn callback_publishes_code() -> anyhow::Result<()> {
    let (server, mut rx) = capture_server()?;
    let resp = server.get("/callback?code=ABC123").await;
    resp.assert_status_ok();
    assert!(resp.text().contains("Ingelogd"));
    assert_eq!(rx.try_recv().ok().as_deref(), Some("ABC123"));
    Ok(())
}

#[tokio::test]
async fn callback_accepts_pasted_redirect_url() -> anyhow::Result<()> {
    let (server, mut rx) = capture_server()?;
    server
        .get("/callback")
        .add_query_param("code", "appie://login-exit?code=XYZ&state=1")
        .await
        .assert_status_ok();
    assert_eq!(rx.try_recv().ok().as_deref(), Some("XYZ"));
    Ok(())
}

#[tokio::test]
async fn duplicate_callbacks_yield_one_code() -> anyhow::Result<()> {
    let (server, mut rx) = capture_server()?;
    server.get("/callback?code=first").await.assert_status_ok();
    server.get("/callback?code=second").await.assert_status_ok();

    assert_eq!(rx.try_recv().ok().as_deref(), Some("first"));
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn unknown_path_is_not_found() -> anyhow::Result<()> {
    let (server, _rx) = capture_server()?;
    server.get("/favicon.ico").expect_failure().await.assert_status_not_found();
    Ok(())
}

#[tokio::test]
async fn live_callback_completes_session() -> anyhow::Result<()> {
    crate::ensure_crypto();
    let mut server = LoginServer::start(LOGIN_URL).await?;
    assert_eq!(server.state(), ServerState::Running);
    assert_eq!(server.local_url(), format!("http://127.0.0.1:{}", server.port()));

    let url = format!("{}?code=ABC123", server.callback_url());
    let browser = tokio::spawn(async move { reqwest::get(url).await.map(|r| r.status()) });

    let code = server.wait_for_code(Duration::from_secs(5)).await?;
    assert_eq!(code, "ABC123");
    assert_eq!(server.state(), ServerState::Stopped);
    assert_eq!(browser.await??, reqwest::StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn concurrent_callbacks_hand_off_exactly_one_code() -> anyhow::Result<()> {
    crate::ensure_crypto();
    let mut server = LoginServer::start(LOGIN_URL).await?;
    let callback = server.callback_url();

    let browsers: Vec<_> = (0..8)
        .map(|i| {
            let url = format!("{callback}?code=C{i}");
            tokio::spawn(async move { reqwest::get(url).await.map(|r| r.status()) })
        })
        .collect();

    let code = server.wait_for_code(Duration::from_secs(5)).await?;
    assert!((0..8).any(|i| code == format!("C{i}")), "unexpected code {code}");

    let mut accepted = 0;
    for browser in browsers {
        // Late requests may be refused once the listener is gone.
        if let Ok(status) = browser.await? {
            assert_eq!(status, reqwest::StatusCode::OK);
            accepted += 1;
        }
    }
    assert!(accepted >= 1);

    let err = match server.wait_for_code(Duration::from_millis(50)).await {
        Ok(extra) => anyhow::bail!("second code {extra} handed off"),
        Err(e) => e,
    };
    assert_eq!(err.kind(), ErrorKind::Timeout);
    Ok(())
}

#[tokio::test]
async fn timeout_fails_and_releases_port() -> anyhow::Result<()> {
    let mut server = LoginServer::start(LOGIN_URL).await?;
    let addr = server.addr();

    let err = match server.wait_for_code(Duration::from_millis(100)).await {
        Ok(code) => anyhow::bail!("unexpected code {code}"),
        Err(e) => e,
    };
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.message().starts_with("Login timed out after"), "{err}");
    assert_eq!(server.state(), ServerState::Stopped);

    let rebound = TcpListener::bind(addr).await?;
    assert_eq!(rebound.local_addr()?, addr);
    Ok(())
}

#[tokio::test]
async fn shutdown_is_idempotent() -> anyhow::Result<()> {
    let mut server = LoginServer::start(LOGIN_URL).await?;
    server.shutdown().await;
    server.shutdown().await;
    assert_eq!(server.state(), ServerState::Stopped);

    let err = match server.wait_for_code(Duration::from_millis(50)).await {
        Ok(code) => anyhow::bail!("unexpected code {code}"),
        Err(e) => e,
    };
    assert_eq!(err.kind(), ErrorKind::Timeout);
    Ok(())
}

#[tokio::test]
async fn drop_releases_listener() -> anyhow::Result<()> {
    let server = LoginServer::start(LOGIN_URL).await?;
    let addr = server.addr();
    drop(server);

    let mut bound = None;
    for _ in 0..50 {
        if let Ok(l) = TcpListener::bind(addr).await {
            bound = Some(l);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(bound.is_some(), "port {addr} still held after drop");
    Ok(())
}

#[yare::parameterized(
    five_minutes = { 300, "5 minutes" },
    one_minute = { 60, "1 minute" },
    seconds = { 90, "90 seconds" },
    one_second = { 1, "1 second" },
)]
fn formats_timeout(secs: u64, expected: &str) {
    assert_eq!(human_duration(Duration::from_secs(secs)), expected);
}
