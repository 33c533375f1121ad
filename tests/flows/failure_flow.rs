#[path = "../common/mod.rs"]
mod common;

use common::{zone_entry, zone_entry_in, Answer, MockUpstream, TestClient, TestServer};
use std::net::Ipv4Addr;
use std::time::Duration;

const SETTLE: Duration = Duration::from_secs(5);
const U1: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const U2: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

#[tokio::test]
async fn test_unsupported_upstream_keeps_zone_unbound() {
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", "tls://1.1.1.1")).await;
    let client = TestClient::new(server.addr());

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(server.registry().is_empty());
    assert_eq!(client.query("a.crd.test.").await, Answer::servfail());

    server.stop().await;
}

#[tokio::test]
async fn test_fixed_resource_is_picked_up() {
    let upstream = MockUpstream::answering(U1).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", "tls://1.1.1.1")).await;
    let client = TestClient::new(server.addr());

    server.write_manifest(&zone_entry("crd", "crd.test", &upstream.upstream()));

    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);

    server.stop().await;
}

#[tokio::test]
async fn test_broken_update_keeps_last_good_handler() {
    let upstream = MockUpstream::answering(U1).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &upstream.upstream())).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);

    server.write_manifest(&zone_entry("crd", "crd.test", "tls://1.1.1.1"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(client.query("a.crd.test.").await, Answer::Address(U1));

    server.stop().await;
}

#[tokio::test]
async fn test_unparseable_manifest_keeps_zones() {
    let upstream = MockUpstream::answering(U1).await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &upstream.upstream())).await;
    let client = TestClient::new(server.addr());
    assert!(client.wait_for("a.crd.test.", Answer::Address(U1), SETTLE).await);

    server.write_manifest("[[zones]\nbroken");
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(client.query("a.crd.test.").await, Answer::Address(U1));
    assert_eq!(server.registry().len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_silent_upstream_answers_servfail() {
    let silent = MockUpstream::silent().await;
    let mut server = TestServer::start(&zone_entry("crd", "crd.test", &silent.upstream())).await;
    let client = TestClient::new(server.addr());

    let registry = server.registry().clone();
    let deadline = tokio::time::Instant::now() + SETTLE;
    while registry.is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(client.query("a.crd.test.").await, Answer::servfail());

    server.stop().await;
}

#[tokio::test]
async fn test_other_namespaces_are_ignored() {
    let watched = MockUpstream::answering(U1).await;
    let ignored = MockUpstream::answering(U2).await;
    let manifest = format!(
        "{}{}",
        zone_entry_in("dns", "mine", "mine.test", &watched.upstream()),
        zone_entry_in("other", "theirs", "theirs.test", &ignored.upstream())
    );
    let mut server = TestServer::start_in(&manifest, Some("dns")).await;
    let client = TestClient::new(server.addr());

    assert!(client.wait_for("a.mine.test.", Answer::Address(U1), SETTLE).await);
    assert_eq!(client.query("a.theirs.test.").await, Answer::servfail());
    assert_eq!(server.registry().len(), 1);

    server.stop().await;
}
