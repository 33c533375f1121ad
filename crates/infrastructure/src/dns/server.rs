use super::forwarding::MessageBuilder;
use async_trait::async_trait;
use ferrous_zones_application::ports::QueryHandler;
use ferrous_zones_domain::{DnsRequest, DomainError};
use hickory_proto::op::{Header, Message, MessageType, ResponseCode};
use hickory_proto::serialize::binary::BinEncodable;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns DNS requests into router calls and router results back into
/// responses.
///
/// Only the question name is read from the request; the request bytes are
/// handed on untouched. Plugs into `hickory_server::ServerFuture` as its
/// [`RequestHandler`].
#[derive(Clone)]
pub struct DnsServerHandler {
    router: Arc<dyn QueryHandler>,
}

impl DnsServerHandler {
    pub fn new(router: Arc<dyn QueryHandler>) -> Self {
        Self { router }
    }

    /// Answers one packet. `None` means drop it silently (unparseable input
    /// or a stray response).
    pub async fn handle_packet(&self, packet: &[u8]) -> Option<Vec<u8>> {
        let message = match Message::from_vec(packet) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, bytes = packet.len(), "Dropping malformed DNS packet");
                return None;
            }
        };

        if message.message_type() != MessageType::Query {
            debug!(id = message.id(), "Dropping DNS packet that is not a query");
            return None;
        }

        let Some(query) = message.queries().first() else {
            return self.error_response(&message, ResponseCode::FormErr);
        };

        let name = query.name().to_utf8();
        let request = DnsRequest::new(name.as_str(), packet);

        match self.router.serve(&request).await {
            Ok(response) => Some(response.wire),
            Err(DomainError::NotHandled(_)) => {
                debug!(query = %name, "No zone handles query");
                self.error_response(&message, ResponseCode::ServFail)
            }
            Err(e) => {
                warn!(query = %name, error = %e, "Query failed");
                self.error_response(&message, ResponseCode::ServFail)
            }
        }
    }

    fn error_response(&self, request: &Message, rcode: ResponseCode) -> Option<Vec<u8>> {
        match MessageBuilder::error_response(request, rcode) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Failed to build error response");
                None
            }
        }
    }
}

#[async_trait]
impl RequestHandler for DnsServerHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let reply = match request.to_bytes() {
            Ok(packet) => self.handle_packet(&packet).await,
            Err(e) => {
                warn!(src = %request.src(), error = %e, "Failed to encode DNS request");
                None
            }
        };

        let mut builder = MessageResponseBuilder::from_message_request(request);
        let sent = match reply.as_deref().map(Message::from_vec) {
            Some(Ok(message)) => {
                if let Some(edns) = message.extensions().clone() {
                    builder.edns(edns);
                }
                let response = builder.build(
                    *message.header(),
                    message.answers(),
                    message.name_servers(),
                    std::iter::empty(),
                    message.additionals(),
                );
                response_handle.send_response(response).await
            }
            other => {
                if let Some(Err(e)) = other {
                    warn!(src = %request.src(), error = %e, "Unparseable reply, answering SERVFAIL");
                }
                let response = builder.error_msg(request.header(), ResponseCode::ServFail);
                response_handle.send_response(response).await
            }
        };

        sent.unwrap_or_else(|e| {
            debug!(src = %request.src(), error = %e, "Failed to send DNS response");
            let mut header = Header::response_from_request(request.header());
            header.set_response_code(ResponseCode::ServFail);
            header.into()
        })
    }
}
