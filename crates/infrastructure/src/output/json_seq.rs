//! RFC 7464 JSON text sequences: every record is `RS` + JSON + `LF`.

use dnsweep_domain::DomainError;
use serde::Serialize;
use std::io::Write;

const RECORD_SEPARATOR: u8 = 0x1E;
const LINE_FEED: u8 = 0x0A;

pub struct JsonSeqWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> JsonSeqWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<(), DomainError> {
        self.inner.write_all(&[RECORD_SEPARATOR])?;
        serde_json::to_writer(&mut self.inner, value)
            .map_err(|e| DomainError::IoError(format!("Failed to encode record: {}", e)))?;
        self.inner.write_all(&[LINE_FEED])?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DomainError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
