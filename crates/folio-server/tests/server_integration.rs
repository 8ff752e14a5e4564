//! Server integration tests.
//!
//! These tests verify the server starts correctly and handles requests.

mod common;

use anyhow::Result;

#[tokio::test]
async fn test_server_starts_and_responds_to_health() -> Result<()> {
    let server = common::TestServer::start().await?;

    let healthy = server.health().await?;
    assert!(healthy, "Server should be healthy");

    Ok(())
}

#[tokio::test]
async fn test_server_health_returns_version() -> Result<()> {
    let server = common::TestServer::start().await?;

    let resp = server.get("/api/health").send().await?;
    assert!(resp.status().is_success());

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["status"], "healthy");
    assert!(body.get("version").is_some());
    assert_eq!(body["tools_count"], 0);

    Ok(())
}

#[tokio::test]
async fn test_root_banner() -> Result<()> {
    let server = common::TestServer::start().await?;

    let body: serde_json::Value = server.get("/").send().await?.json().await?;
    assert_eq!(body["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_404() -> Result<()> {
    let server = common::TestServer::start().await?;

    let resp = server.get("/api/sessions").send().await?;
    assert_eq!(resp.status().as_u16(), 404);

    Ok(())
}

#[tokio::test]
async fn test_multiple_servers_different_ports() -> Result<()> {
    let server1 = common::TestServer::start().await?;
    let server2 = common::TestServer::start().await?;

    assert_ne!(
        server1.addr, server2.addr,
        "Servers should be on different ports"
    );
    assert!(server1.health().await?);
    assert!(server2.health().await?);

    Ok(())
}
