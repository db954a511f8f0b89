#![allow(dead_code)]
use dnsweep_domain::{DnsJob, Meta, RecordType};

pub struct DnsJobBuilder {
    name: String,
    qtypes: Vec<RecordType>,
    meta: Meta,
}

impl DnsJobBuilder {
    pub fn new() -> Self {
        Self {
            name: "example.com".to_string(),
            qtypes: vec![RecordType::A],
            meta: Meta::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn qtypes(mut self, qtypes: &[RecordType]) -> Self {
        self.qtypes = qtypes.to_vec();
        self
    }

    pub fn meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.meta.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> DnsJob {
        DnsJob::new(self.name, self.qtypes, self.meta)
    }
}
