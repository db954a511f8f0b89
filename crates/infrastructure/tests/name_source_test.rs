use dnsweep_domain::{DomainError, NameSource};
use dnsweep_infrastructure::input::{first_line, ChainSource, IpRangeSource, LinesSource};
use std::io::Write;
use tempfile::NamedTempFile;

fn file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn collect(source: &mut dyn NameSource) -> Vec<String> {
    let mut names = Vec::new();
    while let Some(name) = source.next() {
        names.push(name);
    }
    names
}

#[test]
fn test_lines_count_includes_final_line_without_newline() {
    let file = file_with("a.example\nb.example\nc.example");
    let source = LinesSource::open(file.path()).unwrap();
    assert_eq!(source.count(), 3);
}

#[test]
fn test_blank_lines_are_skipped() {
    let file = file_with("a.example\n\n   \n b.example \r\n\n");
    let mut source = LinesSource::open(file.path()).unwrap();

    assert_eq!(source.count(), 2);
    assert_eq!(collect(&mut source), vec!["a.example", "b.example"]);
}

#[test]
fn test_reset_rewinds() {
    let file = file_with("a.example\nb.example\n");
    let mut source = LinesSource::open(file.path()).unwrap();

    assert_eq!(source.next().as_deref(), Some("a.example"));
    source.reset().unwrap();
    assert_eq!(collect(&mut source), vec!["a.example", "b.example"]);
}

#[test]
fn test_closed_source_yields_nothing() {
    let file = file_with("a.example\n");
    let mut source = LinesSource::open(file.path()).unwrap();
    source.close().unwrap();
    assert_eq!(source.next(), None);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = LinesSource::open(dir.path().join("missing.txt"));
    assert!(matches!(result, Err(DomainError::IoError(_))));
}

#[test]
fn test_first_line() {
    let file = file_with("\nfirst.example\nsecond.example\n");
    assert_eq!(
        first_line(file.path()).unwrap().as_deref(),
        Some("first.example")
    );

    let empty = file_with("");
    assert_eq!(first_line(empty.path()).unwrap(), None);
}

#[test]
fn test_chain_concatenates_sources() {
    let file = file_with("a.example\nb.example\n");
    let lines = LinesSource::open(file.path()).unwrap();
    let ips = IpRangeSource::parse(&["192.0.2.1-192.0.2.2"]).unwrap();

    let sources: Vec<Box<dyn NameSource>> = vec![Box::new(lines), Box::new(ips)];
    let mut chain = ChainSource::new(sources);
    assert_eq!(chain.count(), 4);
    assert_eq!(
        collect(&mut chain),
        vec!["a.example", "b.example", "192.0.2.1", "192.0.2.2"]
    );

    chain.reset().unwrap();
    assert_eq!(chain.next().as_deref(), Some("a.example"));
    chain.close().unwrap();
}

struct BrokenSource;

impl NameSource for BrokenSource {
    fn next(&mut self) -> Option<String> {
        None
    }

    fn count(&self) -> u64 {
        0
    }

    fn reset(&mut self) -> Result<(), DomainError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), DomainError> {
        Err(DomainError::IoError("broken".to_string()))
    }
}

#[test]
fn test_chain_close_reports_every_failure() {
    let sources: Vec<Box<dyn NameSource>> = vec![Box::new(BrokenSource), Box::new(BrokenSource)];
    let mut chain = ChainSource::new(sources);

    match chain.close() {
        Err(DomainError::IoError(message)) => {
            assert_eq!(message.matches("broken").count(), 2);
        }
        other => panic!("expected combined I/O error, got {:?}", other),
    }
}
