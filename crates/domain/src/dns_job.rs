//! A multi-type resolution request and the snapshot it produces.
//!
//! A job is an explicit state machine: it is `Pending` on the record type
//! under its cursor until every requested type has been attempted, then
//! `Complete`. Each processing step resolves exactly one type.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::RecordType;

/// Caller supplied data carried through a job untouched.
pub type Meta = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending(RecordType),
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DnsJob {
    name: String,
    qtypes: Vec<RecordType>,
    answers: BTreeMap<RecordType, Vec<String>>,
    meta: Meta,
    cursor: usize,
}

impl DnsJob {
    /// Repeated types are collapsed so that one answer entry exists per
    /// requested type.
    pub fn new(name: impl Into<String>, qtypes: Vec<RecordType>, meta: Meta) -> Self {
        let mut unique = Vec::with_capacity(qtypes.len());
        for rt in qtypes {
            if !unique.contains(&rt) {
                unique.push(rt);
            }
        }

        Self {
            name: name.into(),
            qtypes: unique,
            answers: BTreeMap::new(),
            meta,
            cursor: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qtypes(&self) -> &[RecordType] {
        &self.qtypes
    }

    pub fn answers(&self) -> &BTreeMap<RecordType, Vec<String>> {
        &self.answers
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> JobState {
        match self.qtypes.get(self.cursor) {
            Some(rt) => JobState::Pending(*rt),
            None => JobState::Complete,
        }
    }

    pub fn is_done(&self) -> bool {
        self.answers.len() == self.qtypes.len()
    }

    /// Stores `answers` under the pending type and advances the cursor.
    /// A complete job is left untouched.
    pub fn record_answer(&mut self, answers: Vec<String>) -> JobState {
        if let JobState::Pending(rt) = self.state() {
            self.answers.insert(rt, answers);
            self.cursor += 1;
        }
        debug_assert_eq!(self.answers.len(), self.cursor);
        self.state()
    }

    pub fn into_result(self) -> DnsResult {
        DnsResult {
            name: self.name,
            answers: self.answers,
            meta: self.meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsResult {
    pub name: String,
    pub answers: BTreeMap<RecordType, Vec<String>>,
    pub meta: Meta,
}

impl DnsResult {
    pub fn is_empty(&self) -> bool {
        self.answers.values().all(Vec::is_empty)
    }

    pub fn answer_count(&self) -> usize {
        self.answers.values().map(Vec::len).sum()
    }
}
