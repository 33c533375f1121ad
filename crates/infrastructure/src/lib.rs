//! Ferrous Zones Infrastructure Layer
//!
//! Concrete adapters for the application ports: UDP forwarding handlers,
//! the DNS packet front end and `DnsZone` watchers.
pub mod dns;
pub mod watch;
