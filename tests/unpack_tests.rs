//! Integration tests for the full unpack pipeline: segmentation, parsing,
//! extraction, and manifest assembly.

use std::path::Path;

use listunpack::manifest::ManifestWriter;
use listunpack::parser::segment::EMAIL_SEP;
use listunpack::unpack::{unpack_directory, unpack_logfile};

/// Join transcript bodies into a log file, with a separator before each
/// transcript and one after the last.
fn build_log(transcripts: &[&str]) -> String {
    let mut log = String::new();
    for t in transcripts {
        log.push_str(EMAIL_SEP);
        log.push('\n');
        log.push_str(t);
    }
    log.push_str(EMAIL_SEP);
    log.push('\n');
    log
}

fn simple_message(subject: &str) -> String {
    format!(
        "Date: Mon, 5 Jun 2023 10:00:00 -0400\n\
         Subject: {subject}\n\
         From: sender@example.com\n\
         \n\
         Hello from {subject}.\n"
    )
}

fn run_logfile(log: &str, dir: &Path) -> (String, listunpack::unpack::UnpackStats) {
    let log_path = dir.join("archive.log");
    std::fs::write(&log_path, log).unwrap();

    let out_dir = dir.join("out");
    let manifest_path = dir.join("emails.csv");
    let mut manifest = ManifestWriter::create(&manifest_path).unwrap();
    let stats = unpack_logfile(&log_path, &out_dir, &mut manifest).unwrap();
    manifest.flush().unwrap();

    (std::fs::read_to_string(&manifest_path).unwrap(), stats)
}

// ─── Segmentation edge cases through the whole pipeline ─────────────

#[test]
fn test_trailing_content_after_last_separator_is_dropped() {
    let tmp = tempfile::tempdir().unwrap();
    let mut log = build_log(&[&simple_message("kept")]);
    log.push_str(&simple_message("dropped")); // no separator after this

    let (manifest, stats) = run_logfile(&log, tmp.path());
    assert_eq!(stats.messages_written, 1);
    assert!(manifest.contains("kept"));
    assert!(!manifest.contains("dropped"));
}

#[test]
fn test_repeated_separators_produce_no_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let log = format!("{EMAIL_SEP}\n{EMAIL_SEP}\n{EMAIL_SEP}\n");
    let (manifest, stats) = run_logfile(&log, tmp.path());
    assert_eq!(stats.messages_written, 0);
    assert_eq!(stats.messages_skipped, 0);
    assert_eq!(manifest.lines().count(), 1); // header only
}

// ─── Extraction naming ──────────────────────────────────────────────

#[test]
fn test_declared_filename_used_as_is() {
    let tmp = tempfile::tempdir().unwrap();
    let msg = "Date: Mon, 5 Jun 2023 10:00:00 -0400\n\
               Subject: With attachment\n\
               From: a@example.com\n\
               Content-Type: multipart/mixed; boundary=b\n\
               \n\
               --b\n\
               Content-Type: text/plain\n\
               \n\
               see attached\n\
               --b\n\
               Content-Type: application/pdf\n\
               Content-Disposition: attachment; filename=\"report.pdf\"\n\
               Content-Transfer-Encoding: base64\n\
               \n\
               JVBERi0xLjQ=\n\
               --b--\n";
    let (manifest, stats) = run_logfile(&build_log(&[msg]), tmp.path());
    assert_eq!(stats.messages_written, 1);
    assert!(tmp.path().join("out/1/report.pdf").exists());
    assert!(tmp.path().join("out/1/part-001.txt").exists());
    assert!(manifest.contains("part-001.txt; report.pdf"));
}

#[test]
fn test_unnamed_parts_numbered_sequentially() {
    let tmp = tempfile::tempdir().unwrap();
    let msg = "Date: Mon, 5 Jun 2023 10:00:00 -0400\n\
               Subject: Numbered\n\
               From: a@example.com\n\
               Content-Type: multipart/mixed; boundary=outer\n\
               \n\
               --outer\n\
               Content-Type: multipart/alternative; boundary=inner\n\
               \n\
               --inner\n\
               Content-Type: text/plain\n\
               \n\
               text\n\
               --inner\n\
               Content-Type: text/html\n\
               \n\
               <p>html</p>\n\
               --inner--\n\
               --outer\n\
               Content-Type: image/png\n\
               Content-Transfer-Encoding: base64\n\
               \n\
               aVZCT1J3\n\
               --outer--\n";
    let (_, stats) = run_logfile(&build_log(&[msg]), tmp.path());
    assert_eq!(stats.messages_written, 1);

    // Container nodes advance no numbers: leaves are 001, 002, 003.
    let dir = tmp.path().join("out/1");
    assert!(dir.join("part-001.txt").exists());
    assert!(dir.join("part-002.html").exists());
    assert!(dir.join("part-003.png").exists());
}

// ─── Date policy ────────────────────────────────────────────────────

#[test]
fn test_date_normalization_in_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let (manifest, _) = run_logfile(&build_log(&[&simple_message("dated")]), tmp.path());
    assert!(manifest.contains("2023-06-05 10:00:00-0400"));
}

#[test]
fn test_named_zone_date_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let msg = "Date: Mon, 5 Jun 2023 10:00:00 EDT\n\
               Subject: Named zone\n\
               From: a@example.com\n\
               \n\
               body\n";
    let (manifest, stats) = run_logfile(&build_log(&[msg]), tmp.path());
    assert_eq!(stats.messages_written, 1);
    assert!(manifest.contains("2023-06-05 10:00:00-0400"));
}

#[test]
fn test_unparsable_date_excludes_message_but_keeps_files() {
    let tmp = tempfile::tempdir().unwrap();
    let bad = "Date: not a date\n\
               Subject: Bad date\n\
               From: a@example.com\n\
               \n\
               body\n";
    let (manifest, stats) = run_logfile(&build_log(&[bad, &simple_message("good")]), tmp.path());

    assert_eq!(stats.messages_written, 1);
    assert_eq!(stats.messages_skipped, 1);
    assert!(!manifest.contains("Bad date"));
    assert!(manifest.contains("good"));

    // Extraction ran before the date check; its files are not rolled back,
    // and the directory number was reused by the good message.
    assert!(tmp.path().join("out/1/part-001.txt").exists());
    assert!(!tmp.path().join("out/2").exists());
}

// ─── Part decode failures ───────────────────────────────────────────

#[test]
fn test_undecodable_part_skipped_siblings_listed() {
    let tmp = tempfile::tempdir().unwrap();
    let msg = "Date: Mon, 5 Jun 2023 10:00:00 -0400\n\
               Subject: Partial\n\
               From: a@example.com\n\
               Content-Type: multipart/mixed; boundary=b\n\
               \n\
               --b\n\
               Content-Type: application/octet-stream\n\
               Content-Transfer-Encoding: uuencode\n\
               \n\
               begin 644 data\n\
               --b\n\
               Content-Type: text/plain\n\
               \n\
               still here\n\
               --b--\n";
    let (manifest, stats) = run_logfile(&build_log(&[msg]), tmp.path());
    assert_eq!(stats.messages_written, 1);

    // The failed part consumed number 001 but produced no file or entry.
    assert!(!tmp.path().join("out/1/part-001.bin").exists());
    assert!(tmp.path().join("out/1/part-002.txt").exists());
    assert!(manifest.contains("part-002.txt"));
    assert!(!manifest.contains("part-001"));
}

// ─── Full two-message scenario across a directory ───────────────────

#[test]
fn test_two_message_scenario_full_directory_run() {
    let tmp = tempfile::tempdir().unwrap();
    let logdir = tmp.path().join("logs");
    let outdir = tmp.path().join("out");
    std::fs::create_dir_all(&logdir).unwrap();

    let msg_a = "Date: Mon, 5 Jun 2023 10:00:00 -0400\n\
                 Subject: Plain one\n\
                 From: alice@example.com\n\
                 \n\
                 Just text.\n";
    let msg_b = "Date: Tue, 6 Jun 2023 09:30:00 -0400\n\
                 Subject: With parts\n\
                 From: bob@example.com\n\
                 Content-Type: multipart/mixed; boundary=xyz\n\
                 \n\
                 --xyz\n\
                 Content-Type: application/pdf\n\
                 Content-Disposition: attachment; filename=\"minutes.pdf\"\n\
                 Content-Transfer-Encoding: base64\n\
                 \n\
                 JVBERi0xLjQ=\n\
                 --xyz\n\
                 Content-Type: image/gif\n\
                 Content-Transfer-Encoding: base64\n\
                 \n\
                 R0lGODdh\n\
                 --xyz--\n";
    std::fs::write(logdir.join("list-2306.log"), build_log(&[msg_a, msg_b])).unwrap();

    let stats = unpack_directory(&logdir, &outdir, None).unwrap();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.messages_written, 2);

    // name.log → name/ with numbered message subdirectories.
    assert!(outdir.join("list-2306/1/part-001.txt").exists());
    assert!(outdir.join("list-2306/2/minutes.pdf").exists());
    assert!(outdir.join("list-2306/2/part-002.gif").exists());

    let manifest = std::fs::read_to_string(outdir.join("emails.csv")).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Date,Subject,From,Directory,Attachments");
    assert!(lines[1].starts_with("2023-06-05 10:00:00-0400,Plain one,alice@example.com"));
    assert!(lines[2].starts_with("2023-06-06 09:30:00-0400,With parts,bob@example.com"));
    assert!(lines[2].ends_with("minutes.pdf; part-002.gif"));
}

#[test]
fn test_directory_run_skips_subdirectories_and_missing_dir_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let logdir = tmp.path().join("logs");
    std::fs::create_dir_all(logdir.join("nested")).unwrap();
    std::fs::write(
        logdir.join("a.log"),
        build_log(&[&simple_message("only")]),
    )
    .unwrap();

    let outdir = tmp.path().join("out");
    let stats = unpack_directory(&logdir, &outdir, None).unwrap();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.messages_written, 1);

    assert!(unpack_directory(&tmp.path().join("missing"), &outdir, None).is_err());
}
