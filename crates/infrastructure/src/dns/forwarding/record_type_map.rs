//! Mapping between `dnsweep_domain::RecordType` and `hickory_proto::rr::RecordType`.

use dnsweep_domain::RecordType;
use hickory_proto::rr::RecordType as HickoryRecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Domain type to the wire type used when building a question.
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::NS => HickoryRecordType::NS,
            RecordType::MX => HickoryRecordType::MX,
            RecordType::TXT => HickoryRecordType::TXT,
            RecordType::SRV => HickoryRecordType::SRV,
            RecordType::CNAME => HickoryRecordType::CNAME,
            RecordType::PTR => HickoryRecordType::PTR,
        }
    }

    /// `None` for wire types outside the supported vocabulary.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> Option<RecordType> {
        match hickory_type {
            HickoryRecordType::A => Some(RecordType::A),
            HickoryRecordType::AAAA => Some(RecordType::AAAA),
            HickoryRecordType::NS => Some(RecordType::NS),
            HickoryRecordType::MX => Some(RecordType::MX),
            HickoryRecordType::TXT => Some(RecordType::TXT),
            HickoryRecordType::SRV => Some(RecordType::SRV),
            HickoryRecordType::CNAME => Some(RecordType::CNAME),
            HickoryRecordType::PTR => Some(RecordType::PTR),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_roundtrips() {
        for rt in RecordType::ALL {
            let hickory = RecordTypeMapper::to_hickory(rt);
            assert_eq!(
                RecordTypeMapper::from_hickory(hickory),
                Some(rt),
                "Roundtrip failed for {:?} → {:?}",
                rt,
                hickory
            );
        }
    }

    #[test]
    fn test_wire_codes_agree() {
        for rt in RecordType::ALL {
            assert_eq!(u16::from(RecordTypeMapper::to_hickory(rt)), rt.to_u16());
        }
    }

    #[test]
    fn test_unsupported_type_returns_none() {
        assert!(RecordTypeMapper::from_hickory(HickoryRecordType::SOA).is_none());
        assert!(RecordTypeMapper::from_hickory(HickoryRecordType::ANY).is_none());
    }
}
