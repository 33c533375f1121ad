pub mod forwarding;
pub mod server;
pub mod transport;

pub use forwarding::{ForwardHandler, ForwardHandlerFactory, Upstream};
pub use server::DnsServerHandler;
