use dnsweep_domain::{DomainError, NameSource};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Names read one per line from a file. Surrounding whitespace is trimmed
/// and blank lines are skipped, both when iterating and when counting.
pub struct LinesSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    count: u64,
}

impl LinesSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();
        let count = count_lines(&path)?;
        let reader = Some(open_reader(&path)?);

        Ok(Self {
            path,
            reader,
            count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NameSource for LinesSource {
    fn next(&mut self) -> Option<String> {
        let reader = self.reader.as_mut()?;
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let name = line.trim();
                    if !name.is_empty() {
                        return Some(name.to_string());
                    }
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Failed to read line");
                    return None;
                }
            }
        }
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn reset(&mut self) -> Result<(), DomainError> {
        self.reader = Some(open_reader(&self.path)?);
        Ok(())
    }

    fn close(&mut self) -> Result<(), DomainError> {
        self.reader = None;
        Ok(())
    }
}

/// First non-blank line of the file, `None` for an empty file.
pub fn first_line(path: impl AsRef<Path>) -> Result<Option<String>, DomainError> {
    let mut source = LinesSource::open(path)?;
    Ok(source.next())
}

fn open_reader(path: &Path) -> Result<BufReader<File>, DomainError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| DomainError::IoError(format!("Failed to open {}: {}", path.display(), e)))
}

fn count_lines(path: &Path) -> Result<u64, DomainError> {
    let reader = open_reader(path)?;
    let mut count = 0;

    for line in reader.lines() {
        let line = line.map_err(|e| {
            DomainError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        if !line.trim().is_empty() {
            count += 1;
        }
    }

    Ok(count)
}
