#[path = "../common/mod.rs"]
mod common;

use common::{zone_entry, Answer, MockUpstream, TestClient, TestServer};
use std::net::Ipv4Addr;
use std::time::Duration;

const SETTLE: Duration = Duration::from_secs(5);

const U1: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const U2: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

// ============================================================================
// Create, update, delete
// ============================================================================

#[tokio::test]
async fn test_created_zone_is_served_by_its_upstream() {
    let upstream = MockUpstream::answering(U1).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &upstream.upstream())).await;
    let client = TestClient::new(server.addr());

    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);
    assert!(client.wait_for("crd.test.", Answer::Address(U1), SETTLE).await);
    assert_eq!(client.query("a.other.test.").await, Answer::servfail());

    server.stop().await;
}

#[tokio::test]
async fn test_zone_is_served_over_tcp() {
    let upstream = MockUpstream::answering(U1).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &upstream.upstream())).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);

    assert_eq!(client.query_tcp("a.crd.test.").await, Answer::Address(U1));
    assert_eq!(client.query_tcp("a.other.test.").await, Answer::servfail());

    server.stop().await;
}

#[tokio::test]
async fn test_updated_upstream_replaces_handler() {
    let first = MockUpstream::answering(U1).await;
    let second = MockUpstream::answering(U2).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &first.upstream())).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);

    server.write_manifest(&zone_entry("crd", "crd.test", &second.upstream()));

    assert!(client.wait_for("a.crd.test.", Answer::Address(U2), SETTLE).await);
    assert_eq!(server.registry().len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_repointed_zone_releases_old_name() {
    let upstream = MockUpstream::answering(U1).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &upstream.upstream())).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);

    server.write_manifest(&zone_entry("crd", "moved.test", &upstream.upstream()));

    assert!(client.wait_for("a.moved.test.", Answer::Address(U1), SETTLE).await);
    assert_eq!(client.query("a.crd.test.").await, Answer::servfail());
    assert_eq!(server.registry().len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_deleted_zone_stops_being_served() {
    let upstream = MockUpstream::answering(U1).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &upstream.upstream())).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);

    server.write_manifest("");

    assert!(client.wait_for("a.crd.test.", Answer::servfail(), SETTLE).await);
    assert!(server.registry().is_empty());

    server.stop().await;
}

// ============================================================================
// Routing across several zones
// ============================================================================

#[tokio::test]
async fn test_most_specific_zone_wins() {
    let outer = MockUpstream::answering(U1).await;
    let inner = MockUpstream::answering(U2).await;
    let manifest = format!(
        "{}{}",
        zone_entry("outer", "test", &outer.upstream()),
        zone_entry("inner", "crd.test", &inner.upstream())
    );
    let mut server = TestServer::start(&manifest).await;
    let client = TestClient::new(server.addr());

    assert!(client.wait_for("a.crd.test.", Answer::Address(U2), SETTLE).await);
    assert_eq!(client.query("notcrd.test.").await, Answer::Address(U1));
    assert_eq!(client.query("A.CRD.TEST").await, Answer::Address(U2));

    server.stop().await;
}

#[tokio::test]
async fn test_zone_taken_over_by_another_resource() {
    let first = MockUpstream::answering(U1).await;
    let second = MockUpstream::answering(U2).await;
    let mut server = TestServer::start(&zone_entry("a", "shared.test", &first.upstream())).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("x.shared.test.", Answer::Address(U1), SETTLE).await);

    server.write_manifest(&format!(
        "{}{}",
        zone_entry("a", "shared.test", &first.upstream()),
        zone_entry("b", "shared.test", &second.upstream())
    ));

    // Only the new resource changed, so it reconciles last and owns the zone.
    assert!(client.wait_for("x.shared.test.", Answer::Address(U2), SETTLE).await);
    assert_eq!(server.registry().len(), 1);

    server.stop().await;
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_shutdown_stops_every_handler_once() {
    let upstream = MockUpstream::answering(U1).await;
    let manifest = format!(
        "{}{}",
        zone_entry("one", "one.test", &upstream.upstream()),
        zone_entry("two", "two.test", &upstream.upstream())
    );
    let mut server = TestServer::start(&manifest).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("a.two.test.", Answer::Address(U1), SETTLE).await);
    assert!(client.wait_for("a.one.test.", Answer::Address(U1), SETTLE).await);

    server.stop().await;

    assert!(server.registry().is_empty());
    assert!(server.controller().stop().is_err(), "second stop is rejected");
}
