//! DNS Message Builder
//!
//! Constructs single-question recursive queries in wire format using
//! `hickory-proto`. The transaction id is supplied by the caller so the
//! response can be matched against it.

use super::record_type_map::RecordTypeMapper;
use dnsweep_domain::{DomainError, RecordType};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a query for `domain` with the RD flag set and serialize it.
    ///
    /// `domain` is taken as given and made fully qualified, so
    /// `example.com` and `example.com.` ask the same question.
    pub fn build_query(
        domain: &str,
        record_type: RecordType,
        id: u16,
    ) -> Result<Vec<u8>, DomainError> {
        let name = Self::parse_name(domain)?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordTypeMapper::to_hickory(record_type));
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        Self::serialize_message(&message)
    }

    fn parse_name(domain: &str) -> Result<Name, DomainError> {
        let fqdn = if domain.ends_with('.') {
            domain.to_string()
        } else {
            format!("{}.", domain)
        };

        Name::from_str(&fqdn).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::InvalidDomainName(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_a_query() {
        let bytes = MessageBuilder::build_query("example.com", RecordType::A, 0xBEEF).unwrap();

        assert!(
            bytes.len() >= 12,
            "DNS message too short: {} bytes",
            bytes.len()
        );
        assert_eq!(&bytes[0..2], &[0xBE, 0xEF]);
        assert_eq!(bytes[2] & 0x01, 0x01, "RD flag should be set");
        assert_eq!(bytes[2] & 0x80, 0x00, "QR flag must be clear on a query");
    }

    #[test]
    fn test_question_is_fully_qualified() {
        let bytes = MessageBuilder::build_query("example.com", RecordType::MX, 1).unwrap();
        let message = Message::from_vec(&bytes).unwrap();

        assert_eq!(message.queries().len(), 1);
        let query = &message.queries()[0];
        assert!(query.name().is_fqdn());
        assert_eq!(query.name().to_utf8(), "example.com.");
        assert_eq!(
            query.query_type(),
            hickory_proto::rr::RecordType::MX
        );
        assert_eq!(query.query_class(), DNSClass::IN);
    }

    #[test]
    fn test_trailing_dot_is_not_doubled() {
        let plain = MessageBuilder::build_query("example.com", RecordType::A, 7).unwrap();
        let dotted = MessageBuilder::build_query("example.com.", RecordType::A, 7).unwrap();
        assert_eq!(plain, dotted);
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let long_label = "a".repeat(64);
        let result = MessageBuilder::build_query(&long_label, RecordType::A, 1);
        assert!(matches!(result, Err(DomainError::InvalidDomainName(_))));
    }
}
