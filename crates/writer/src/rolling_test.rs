//! Tests for the rolling file writer

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use scribe_config::{FileWriterConfig, PolicyConfig};

use crate::rolling::RollingFileWriter;

const CAPACITY: usize = 64;

fn config(path: String, policies: Vec<PolicyConfig>) -> FileWriterConfig {
    FileWriterConfig {
        path,
        charset: "UTF-8".into(),
        buffer_size: CAPACITY,
        policies,
        ..FileWriterConfig::default()
    }
}

fn matching_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files
}

// ============================================================================
// Plain writing
// ============================================================================

#[test]
fn test_records_written_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");

    let writer = RollingFileWriter::new(&config(
        path.display().to_string(),
        vec![PolicyConfig::Endless],
    ))
    .unwrap();

    writer.write("first\n").unwrap();
    writer.write("second\n").unwrap();
    writer.write("third\n").unwrap();
    writer.close().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "first\nsecond\nthird\n"
    );
}

#[test]
fn test_flush_makes_records_visible() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");

    let writer = RollingFileWriter::new(&config(
        path.display().to_string(),
        vec![PolicyConfig::Endless],
    ))
    .unwrap();

    writer.write("hello").unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);

    writer.flush().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn test_empty_record_is_noop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");

    let writer = RollingFileWriter::new(&config(
        path.display().to_string(),
        vec![PolicyConfig::Endless],
    ))
    .unwrap();

    writer.write("").unwrap();
    writer.close().unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn test_writer_closes_on_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");

    {
        let writer = RollingFileWriter::new(&config(
            path.display().to_string(),
            vec![PolicyConfig::Endless],
        ))
        .unwrap();
        writer.write("buffered").unwrap();
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), "buffered");
}

// ============================================================================
// Continuation across restarts
// ============================================================================

#[test]
fn test_endless_policy_continues_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let config = config(path.display().to_string(), vec![PolicyConfig::Endless]);

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write("one").unwrap();
    writer.close().unwrap();

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write("two").unwrap();
    writer.close().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "onetwo");
}

#[test]
fn test_startup_policy_discards_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let config = config(path.display().to_string(), vec![PolicyConfig::Startup]);

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write("one").unwrap();
    writer.close().unwrap();

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write("two").unwrap();
    writer.close().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "two");
}

#[test]
fn test_startup_is_the_default_policy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let config = config(path.display().to_string(), Vec::new());

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write("one").unwrap();
    writer.close().unwrap();

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.close().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn test_continued_file_keeps_block_alignment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, vec![b'-'; 5]).unwrap();

    let writer = RollingFileWriter::new(&config(
        path.display().to_string(),
        vec![PolicyConfig::Endless],
    ))
    .unwrap();

    // The first flush happens after CAPACITY - 5 bytes complete the block
    writer.write(&"x".repeat(CAPACITY - 5)).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len() as usize, CAPACITY);
}

#[test]
fn test_continuation_with_dated_path() {
    let dir = tempdir().unwrap();
    let template = format!("{}/app_{{date: %Y-%m-%d}}.log", dir.path().display());
    let config = config(template, vec![PolicyConfig::Endless]);

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write("one").unwrap();
    writer.close().unwrap();

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write("two").unwrap();
    writer.close().unwrap();

    let files = matching_files(dir.path());
    assert_eq!(files.len(), 1);
    assert_eq!(fs::read_to_string(&files[0]).unwrap(), "onetwo");
}

// ============================================================================
// Size-based rollover
// ============================================================================

#[test]
fn test_size_policy_rolls_over() {
    let dir = tempdir().unwrap();
    // Nanoseconds in the name keep rolled files distinct
    let template = format!("{}/app_{{date: %H-%M-%S-%f}}.log", dir.path().display());

    let writer = RollingFileWriter::new(&config(
        template,
        vec![PolicyConfig::Size { limit: 100 }],
    ))
    .unwrap();

    let record = "r".repeat(60);
    writer.write(&record).unwrap();
    writer.write(&record).unwrap();
    writer.write(&record).unwrap();
    writer.close().unwrap();

    // 60 + 60 > 100, so every record got its own file
    let files = matching_files(dir.path());
    assert_eq!(files.len(), 3);
    for file in files {
        assert_eq!(fs::read_to_string(&file).unwrap(), record);
    }
}

#[test]
fn test_oversized_record_is_still_written() {
    let dir = tempdir().unwrap();
    let template = format!("{}/app_{{date: %H-%M-%S-%f}}.log", dir.path().display());

    let writer = RollingFileWriter::new(&config(
        template,
        vec![PolicyConfig::Size { limit: 100 }],
    ))
    .unwrap();

    // Rejected even by the fresh file's counter, but still written
    writer.write(&"big".repeat(50)).unwrap();
    writer.write("next").unwrap();
    writer.close().unwrap();

    // Initial empty file, the oversized record's file, and "next"'s file
    let files = matching_files(dir.path());
    assert_eq!(files.len(), 3);
    assert_eq!(fs::metadata(&files[0]).unwrap().len(), 0);
    assert_eq!(fs::read_to_string(&files[1]).unwrap(), "big".repeat(50));
    assert_eq!(fs::read_to_string(&files[2]).unwrap(), "next");
}

// ============================================================================
// Rollover failure handling
// ============================================================================

#[test]
fn test_failed_rollover_surfaces_and_recovers() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let template = format!("{}/app_{{date: %H-%M-%S-%f}}.log", out.display());

    let writer = RollingFileWriter::new(&config(
        template,
        vec![PolicyConfig::Size { limit: 10 }],
    ))
    .unwrap();

    writer.write(&"a".repeat(10)).unwrap();

    // Replace the output directory with a plain file so the next rollover
    // cannot create its log file
    fs::remove_dir_all(&out).unwrap();
    fs::write(&out, b"blocker").unwrap();
    assert!(writer.write("rejected").is_err());
    assert!(writer.current_path().is_none());

    // Once the blocker is gone the next write re-attempts the rollover
    fs::remove_file(&out).unwrap();
    writer.write("recovered").unwrap();
    writer.close().unwrap();

    let files = matching_files(&out);
    assert_eq!(files.len(), 1);
    assert_eq!(fs::read_to_string(&files[0]).unwrap(), "recovered");
}

// ============================================================================
// Backups and latest link
// ============================================================================

#[test]
fn test_backups_are_pruned() {
    let dir = tempdir().unwrap();
    let template = format!("{}/app_{{date: %H-%M-%S-%f}}.log", dir.path().display());

    let mut config = config(template, vec![PolicyConfig::Size { limit: 10 }]);
    config.backups = Some(1);

    let writer = RollingFileWriter::new(&config).unwrap();
    for _ in 0..4 {
        writer.write(&"b".repeat(10)).unwrap();
    }
    writer.close().unwrap();

    // Active file plus one backup survive
    assert_eq!(matching_files(dir.path()).len(), 2);
}

#[test]
fn test_latest_link_follows_active_file() {
    let dir = tempdir().unwrap();
    let template = format!("{}/app_{{date: %H-%M-%S-%f}}.log", dir.path().display());
    let link = dir.path().join("latest.log");

    let mut config = config(template, vec![PolicyConfig::Size { limit: 10 }]);
    config.latest_link = Some(link.clone());

    let writer = RollingFileWriter::new(&config).unwrap();
    writer.write(&"1".repeat(10)).unwrap();
    writer.write(&"2".repeat(10)).unwrap();
    writer.flush().unwrap();

    let active = writer.current_path().unwrap();
    assert_eq!(
        fs::read_to_string(&link).unwrap(),
        fs::read_to_string(&active).unwrap()
    );
    writer.close().unwrap();
}

// ============================================================================
// Construction errors
// ============================================================================

#[test]
fn test_invalid_configuration_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log").display().to_string();

    let mut bad_charset = config(path.clone(), Vec::new());
    bad_charset.charset = "EBCDIC".into();
    assert!(RollingFileWriter::new(&bad_charset).is_err());

    let mut tiny_buffer = config(path.clone(), Vec::new());
    tiny_buffer.buffer_size = 4;
    assert!(RollingFileWriter::new(&tiny_buffer).is_err());

    let bad_template = config("app_{quux}.log".into(), Vec::new());
    assert!(RollingFileWriter::new(&bad_template).is_err());

    let bad_policy = config(path, vec![PolicyConfig::Size { limit: 0 }]);
    assert!(RollingFileWriter::new(&bad_policy).is_err());
}

#[test]
fn test_unopenable_initial_file_rejected() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"file, not a directory").unwrap();

    let result = RollingFileWriter::new(&config(
        format!("{}/app.log", blocker.display()),
        Vec::new(),
    ));
    assert!(result.is_err());
}
