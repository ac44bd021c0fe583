#![cfg(test)]
use std::fs;
use std::sync::Arc;

use crate::fakes::{ScriptedProbe, ScriptedResolver};
use hostsweep_common::config::ScanConfig;
use hostsweep_common::network::target::parse_hosts;
use hostsweep_common::report::ReachabilityOutcome;
use hostsweep_core::export::HEADER;
use hostsweep_core::{CsvSink, ExportError, Scanner};

fn scanner() -> Scanner {
    let probe = ScriptedProbe::new().answer("192.168.1.1", ReachabilityOutcome::Reachable);
    let resolver = ScriptedResolver::new().name_of("192.168.1.1", "router.local");
    Scanner::new(Arc::new(probe), Arc::new(resolver), ScanConfig::default())
}

#[tokio::test]
async fn scan_and_export_writes_one_row_per_host() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("lan.csv");
    let hosts = parse_hosts(["192.168.1.1", "192.168.1.2"]).unwrap();

    let scan = scanner().run_list(hosts, true, Some(destination.as_path())).await;

    assert_eq!(scan.exported_to(), Some(destination.as_path()));
    let text = fs::read_to_string(&destination).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "IP Address,Status,Hostname,Aliases,Addresses,DNS Error",
            "192.168.1.1,active,router.local,,192.168.1.1,",
            "192.168.1.2,inactive,,,,No PTR record found",
        ]
    );

    let mut reader = csv::Reader::from_path(&destination).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(&rows[1][5], "No PTR record found");
}

#[tokio::test]
async fn export_toggle_off_leaves_the_directory_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = parse_hosts(["192.168.1.1"]).unwrap();

    let scan = scanner()
        .with_sink(Box::new(CsvSink::in_directory(dir.path())))
        .run_list(hosts, false, None)
        .await;

    assert!(scan.export.is_none());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn default_destination_is_timestamped() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = parse_hosts(["192.168.1.1"]).unwrap();

    let scan = scanner()
        .with_sink(Box::new(CsvSink::in_directory(dir.path())))
        .run_list(hosts, true, None)
        .await;

    let path = scan.exported_to().unwrap();
    let name = path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("scan_results_") && name.ends_with(".csv"), "{name}");
}

#[test]
fn exporting_nothing_writes_only_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("empty.csv");

    let path = scanner().export(&[], Some(destination.as_path())).unwrap();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].iter().collect::<Vec<_>>(), HEADER.to_vec());
}

#[tokio::test]
async fn export_failure_is_reported_after_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("no-such-dir").join("out.csv");
    let hosts = parse_hosts(["192.168.1.1", "192.168.1.2"]).unwrap();

    let scanner = scanner();
    let scan = scanner.run_list(hosts, true, Some(destination.as_path())).await;

    assert_eq!(scan.report.len(), 2);
    assert!(matches!(scan.export, Some(Err(ExportError::Io { .. }))));

    // The in-memory report can be exported again without rescanning.
    let retry = dir.path().join("retry.csv");
    let written = scanner.export(&scan.report.records, Some(retry.as_path())).unwrap();
    assert_eq!(fs::read_to_string(written).unwrap().lines().count(), 3);
}
