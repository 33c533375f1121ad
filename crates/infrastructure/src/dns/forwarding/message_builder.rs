//! Error responses built in wire format with `hickory-proto`.

use ferrous_zones_domain::DomainError;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

pub struct MessageBuilder;

impl MessageBuilder {
    /// Builds an answerless response to `request` carrying `rcode`.
    ///
    /// ID, opcode, RD flag and question are echoed from the request.
    pub fn error_response(request: &Message, rcode: ResponseCode) -> Result<Vec<u8>, DomainError> {
        let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
        response.set_recursion_desired(request.recursion_desired());
        response.set_response_code(rcode);
        if let Some(query) = request.queries().first() {
            response.add_query(query.clone());
        }

        Self::serialize_message(&response)
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidDnsMessage(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
