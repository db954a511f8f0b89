use dnsweep_domain::{DomainError, NameSource};

/// Sources read back to back.
pub struct ChainSource {
    sources: Vec<Box<dyn NameSource>>,
    current: usize,
}

impl ChainSource {
    pub fn new(sources: Vec<Box<dyn NameSource>>) -> Self {
        Self {
            sources,
            current: 0,
        }
    }

    pub fn push(&mut self, source: Box<dyn NameSource>) {
        self.sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl NameSource for ChainSource {
    fn next(&mut self) -> Option<String> {
        while let Some(source) = self.sources.get_mut(self.current) {
            if let Some(name) = source.next() {
                return Some(name);
            }
            self.current += 1;
        }
        None
    }

    fn count(&self) -> u64 {
        self.sources.iter().map(|s| s.count()).sum()
    }

    fn reset(&mut self) -> Result<(), DomainError> {
        for source in &mut self.sources {
            source.reset()?;
        }
        self.current = 0;
        Ok(())
    }

    /// Closes every source, reporting all failures together.
    fn close(&mut self) -> Result<(), DomainError> {
        let failures: Vec<String> = self
            .sources
            .iter_mut()
            .filter_map(|s| s.close().err())
            .map(|e| e.to_string())
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DomainError::IoError(failures.join("; ")))
        }
    }
}
