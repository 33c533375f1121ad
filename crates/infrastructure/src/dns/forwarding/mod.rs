pub mod factory;
pub mod handler;
pub mod message_builder;
pub mod upstream;

pub use factory::ForwardHandlerFactory;
pub use handler::{ForwardHandler, HandlerState};
pub use message_builder::MessageBuilder;
pub use upstream::Upstream;
