//! Answer extraction for one requested record type.
//!
//! Each supported type has its own extractor, picked by the type that was
//! asked for. Records of any other type in the answer section are ignored.

use dnsweep_domain::{DomainError, RecordType};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Name, RData};
use tracing::debug;

type Extractor = fn(&RData, &mut Vec<String>);

pub struct ResponseParser;

impl ResponseParser {
    /// Decode `response_bytes` and return the answers of `record_type`.
    ///
    /// A response without matching records yields an empty list. The
    /// response code is not an error: NXDOMAIN is simply "no answers".
    pub fn parse(
        response_bytes: &[u8],
        expected_id: u16,
        record_type: RecordType,
    ) -> Result<Vec<String>, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        if message.id() != expected_id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Transaction id mismatch: expected {:#06x}, got {:#06x}",
                expected_id,
                message.id()
            )));
        }

        if message.truncated() {
            debug!(record_type = %record_type, "Truncated UDP response, using partial answers");
        }

        let rcode = message.response_code();
        if rcode != ResponseCode::NoError {
            debug!(rcode = ?rcode, record_type = %record_type, "Non-success response code");
        }

        Ok(Self::extract(&message, record_type))
    }

    pub fn extract(message: &Message, record_type: RecordType) -> Vec<String> {
        let extractor = Self::extractor_for(record_type);
        let mut answers = Vec::new();

        for record in message.answers() {
            extractor(record.data(), &mut answers);
        }

        answers
    }

    fn extractor_for(record_type: RecordType) -> Extractor {
        match record_type {
            RecordType::A => extract_a,
            RecordType::AAAA => extract_aaaa,
            RecordType::NS => extract_ns,
            RecordType::MX => extract_mx,
            RecordType::TXT => extract_txt,
            RecordType::SRV => extract_srv,
            RecordType::CNAME => extract_cname,
            RecordType::PTR => extract_ptr,
        }
    }
}

fn target(name: &Name) -> String {
    name.to_utf8().trim_end_matches('.').to_string()
}

fn extract_a(data: &RData, out: &mut Vec<String>) {
    if let RData::A(a) = data {
        out.push(a.0.to_string());
    }
}

fn extract_aaaa(data: &RData, out: &mut Vec<String>) {
    if let RData::AAAA(aaaa) = data {
        out.push(aaaa.0.to_string());
    }
}

fn extract_ns(data: &RData, out: &mut Vec<String>) {
    if let RData::NS(ns) = data {
        out.push(target(&ns.0));
    }
}

fn extract_mx(data: &RData, out: &mut Vec<String>) {
    if let RData::MX(mx) = data {
        out.push(target(mx.exchange()));
    }
}

/// Every character-string of the record is its own answer.
fn extract_txt(data: &RData, out: &mut Vec<String>) {
    if let RData::TXT(txt) = data {
        out.extend(
            txt.txt_data()
                .iter()
                .map(|segment| String::from_utf8_lossy(segment).into_owned()),
        );
    }
}

fn extract_srv(data: &RData, out: &mut Vec<String>) {
    if let RData::SRV(srv) = data {
        out.push(target(srv.target()));
    }
}

fn extract_cname(data: &RData, out: &mut Vec<String>) {
    if let RData::CNAME(cname) = data {
        out.push(target(&cname.0));
    }
}

fn extract_ptr(data: &RData, out: &mut Vec<String>) {
    if let RData::PTR(ptr) = data {
        out.push(target(&ptr.0));
    }
}
