#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use crate::fakes::{ScriptedProbe, ScriptedResolver, hosts, jitter};
use hostsweep_common::config::ScanConfig;
use hostsweep_common::network::target::{Target, parse_hosts};
use hostsweep_common::report::{
    Completion, DEADLINE_EXCEEDED, NO_PTR_RECORD, ReachabilityOutcome, SCAN_CANCELLED,
    SKIPPED_UNREACHABLE, Status,
};
use hostsweep_common::signal::StopSignal;
use hostsweep_core::{Scanner, run_scan};

fn is_even(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.octets()[3] % 2 == 0,
        IpAddr::V6(_) => false,
    }
}

fn config() -> ScanConfig {
    ScanConfig::default().with_per_host_timeout(Duration::from_secs(30))
}

/// Every record lands in its input slot, however completion interleaves.
#[tokio::test(start_paused = true)]
async fn report_order_matches_input_for_any_concurrency() {
    let targets = hosts([10, 1, 0], 40);

    for (seed, concurrency) in [(7, 1), (11, 2), (13, 7), (17, 64)] {
        let mut probe = ScriptedProbe::new().reachable_if(&targets, is_even);
        for (target, delay) in targets.iter().zip(jitter(seed, targets.len(), 500)) {
            if let Some(ip) = target.ip() {
                probe = probe.delay(ip, delay);
            }
        }

        let report = run_scan(
            targets.clone(),
            &config().with_concurrency(concurrency),
            Arc::new(probe),
            Arc::new(ScriptedResolver::new()),
        )
        .await;

        assert_eq!(report.len(), targets.len());
        assert!(report.is_complete());
        for (record, target) in report.records.iter().zip(&targets) {
            assert_eq!(&record.target, target);
            let expected = target.ip().is_some_and(is_even);
            assert_eq!(record.is_active(), expected, "{target} at concurrency {concurrency}");
        }
    }
}

#[tokio::test(start_paused = true)]
async fn never_more_than_concurrency_probes_in_flight() {
    let targets = hosts([10, 2, 0], 30);
    let mut probe = ScriptedProbe::new();
    for (target, delay) in targets.iter().zip(jitter(3, targets.len(), 200)) {
        if let Some(ip) = target.ip() {
            probe = probe.delay(ip, delay + Duration::from_millis(1));
        }
    }
    let probe = Arc::new(probe);

    let report = run_scan(
        targets.clone(),
        &config().with_concurrency(5),
        probe.clone(),
        Arc::new(ScriptedResolver::new()),
    )
    .await;

    assert_eq!(report.len(), 30);
    assert_eq!(probe.gauge.calls(), 30);
    assert!(probe.gauge.peak() <= 5, "peak was {}", probe.gauge.peak());
    assert!(probe.gauge.peak() >= 2);
}

#[tokio::test(start_paused = true)]
async fn deadline_yields_a_full_report_with_marked_entries() {
    let targets = hosts([10, 3, 0], 10);
    let mut probe = ScriptedProbe::new().reachable_if(&targets, |_| true);
    // The first half answers quickly, the rest far beyond the deadline.
    for (i, target) in targets.iter().enumerate() {
        let delay = if i < 5 { Duration::from_millis(10) } else { Duration::from_secs(20) };
        if let Some(ip) = target.ip() {
            probe = probe.delay(ip, delay);
        }
    }

    let cfg = config().with_overall_deadline(Some(Duration::from_secs(1)));
    let report = run_scan(targets.clone(), &cfg, Arc::new(probe), Arc::new(ScriptedResolver::new())).await;

    assert_eq!(report.len(), 10);
    assert_eq!(report.completion, Completion::DeadlineExceeded);
    assert_eq!(report.active_count(), 5);
    for record in &report.records[5..] {
        assert_eq!(record.status(), Status::Inactive);
        assert_eq!(
            record.reachability,
            ReachabilityOutcome::ProbeError(DEADLINE_EXCEEDED.to_string())
        );
        assert_eq!(record.identity.error(), Some(DEADLINE_EXCEEDED));
    }
}

#[tokio::test(start_paused = true)]
async fn stop_signal_cancels_and_marks_the_rest() {
    let targets = hosts([10, 4, 0], 8);
    let mut probe = ScriptedProbe::new().reachable_if(&targets, |_| true);
    for (i, target) in targets.iter().enumerate() {
        if let Some(ip) = target.ip() {
            probe = probe.delay(ip, Duration::from_secs(i as u64 * 10));
        }
    }

    let stop = StopSignal::new();
    let scanner = Scanner::new(Arc::new(probe), Arc::new(ScriptedResolver::new()), config())
        .with_stop_signal(stop.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        stop.stop();
    });

    let scan = scanner.run_list(targets, false, None).await;
    trigger.await.unwrap();

    let report = scan.report;
    assert_eq!(report.completion, Completion::Cancelled);
    assert_eq!(report.len(), 8);
    // Delays of 0s, 10s and 20s beat the stop at 25s.
    assert_eq!(report.active_count(), 3);
    for record in &report.records[3..] {
        assert_eq!(record.identity.error(), Some(SCAN_CANCELLED));
    }
}

#[tokio::test]
async fn unreachable_hosts_are_still_resolved_by_default() {
    let targets = hosts([192, 168, 1], 2);
    let probe = ScriptedProbe::new().answer("192.168.1.1", ReachabilityOutcome::Reachable);
    let resolver = Arc::new(
        ScriptedResolver::new()
            .name_of("192.168.1.1", "router.local")
            .name_of("192.168.1.2", "printer.local"),
    );

    let report = run_scan(targets, &config(), Arc::new(probe), resolver.clone()).await;

    assert_eq!(resolver.gauge.calls(), 2);
    assert!(!report.records[1].is_active());
    assert_eq!(report.records[1].identity.hostname(), Some("printer.local"));
}

#[tokio::test]
async fn lookups_can_be_restricted_to_reachable_hosts() {
    let targets = hosts([192, 168, 1], 4);
    let probe = ScriptedProbe::new().reachable_if(&targets, is_even);
    let resolver = Arc::new(ScriptedResolver::new().name_of("192.168.1.2", "nas.local"));

    let cfg = config().with_resolve_only_if_reachable(true);
    let report = run_scan(targets, &cfg, Arc::new(probe), resolver.clone()).await;

    assert_eq!(resolver.gauge.calls(), 2);
    assert_eq!(report.records[0].identity.error(), Some(SKIPPED_UNREACHABLE));
    assert_eq!(report.records[1].identity.hostname(), Some("nas.local"));
    assert_eq!(report.records[2].identity.error(), Some(SKIPPED_UNREACHABLE));
    assert_eq!(report.records[3].identity.error(), Some(NO_PTR_RECORD));
}

#[tokio::test]
async fn failed_lookup_does_not_change_status() {
    let targets = hosts([10, 5, 0], 1);
    let probe = ScriptedProbe::new().answer("10.5.0.1", ReachabilityOutcome::Reachable);
    let report = run_scan(targets, &config(), Arc::new(probe), Arc::new(ScriptedResolver::new())).await;

    let record = &report.records[0];
    assert!(record.is_active());
    assert_eq!(record.identity.hostname(), None);
    assert!(record.identity.addresses().is_empty());
    assert_eq!(record.identity.error(), Some(NO_PTR_RECORD));
}

#[tokio::test]
async fn explicit_host_lists_keep_order_and_duplicates() {
    let hosts = parse_hosts(["10.6.0.9", "gateway", "10.6.0.1", "10.6.0.9"]).unwrap();
    let scanner = Scanner::new(
        Arc::new(ScriptedProbe::new()),
        Arc::new(ScriptedResolver::new()),
        config(),
    );

    let scan = scanner.run_list(hosts.clone(), false, None).await;

    let scanned: Vec<&Target> = scan.report.records.iter().map(|r| &r.target).collect();
    assert_eq!(scanned, hosts.iter().collect::<Vec<_>>());
    assert_eq!(scan.report.records[1].target, Target::Name("gateway".into()));
}

#[test]
fn expanding_twice_gives_identical_targets() {
    let scanner = Scanner::new(
        Arc::new(ScriptedProbe::new()),
        Arc::new(ScriptedResolver::new()),
        ScanConfig::default(),
    );
    let first = scanner.expand("10.0.0.0/28").unwrap();
    let second = scanner.expand("10.0.0.0/28").unwrap();

    assert_eq!(first.len(), 16);
    assert_eq!(first, second);
    assert_eq!(first.first().map(Target::to_string).as_deref(), Some("10.0.0.0"));
    assert_eq!(first.last().map(Target::to_string).as_deref(), Some("10.0.0.15"));
}

#[tokio::test(start_paused = true)]
async fn slow_resolver_does_not_hold_the_scan_past_the_budget() {
    let targets = hosts([10, 7, 0], 3);
    let probe = ScriptedProbe::new().reachable_if(&targets, |_| true);
    let resolver = ScriptedResolver::new().with_delay(Duration::from_secs(60));

    let cfg = ScanConfig::default().with_per_host_timeout(Duration::from_millis(500));
    let report = run_scan(targets, &cfg, Arc::new(probe), Arc::new(resolver)).await;

    assert!(report.is_complete());
    assert_eq!(report.active_count(), 3);
    assert!(report.records.iter().all(|r| r.identity.error().is_some()));
    assert!(report.duration < Duration::from_secs(5));
}

#[tokio::test]
async fn one_failing_probe_does_not_abort_the_others() {
    let targets = hosts([10, 8, 0], 4);
    let probe = ScriptedProbe::new()
        .reachable_if(&targets, |_| true)
        .answer("10.8.0.2", ReachabilityOutcome::ProbeError("permission denied".into()));

    let report = run_scan(targets, &config(), Arc::new(probe), Arc::new(ScriptedResolver::new())).await;

    assert!(report.is_complete());
    assert_eq!(report.len(), 4);
    assert_eq!(
        report.records[1].reachability,
        ReachabilityOutcome::ProbeError("permission denied".into())
    );
    assert_eq!(report.records[1].status(), Status::Inactive);
    assert_eq!(report.active_count(), 3);
}

#[tokio::test]
async fn panicking_worker_leaves_a_marked_record() {
    let targets = hosts([10, 9, 0], 3);
    let probe = ScriptedProbe::new()
        .reachable_if(&targets, |_| true)
        .panic_on("10.9.0.2");

    let report = run_scan(
        targets.clone(),
        &config().with_concurrency(2),
        Arc::new(probe),
        Arc::new(ScriptedResolver::new()),
    )
    .await;

    assert_eq!(report.completion, Completion::Finished);
    assert_eq!(report.len(), 3);
    assert_eq!(report.records[1].target, targets[1]);
    assert_eq!(report.records[1].status(), Status::Inactive);
    let reason = report.records[1].identity.error().unwrap_or_default();
    assert!(reason.starts_with("worker failed"), "{reason}");
    assert_eq!(
        report.records[1].reachability,
        ReachabilityOutcome::ProbeError(reason.to_string())
    );
    assert!(report.records[0].is_active());
    assert!(report.records[2].is_active());
}

#[tokio::test(start_paused = true)]
async fn targets_are_admitted_in_input_order() {
    let targets = parse_hosts(["10.10.0.7", "10.10.0.3", "10.10.0.9", "10.10.0.1", "10.10.0.5"]).unwrap();
    let mut probe = ScriptedProbe::new();
    for (target, delay) in targets.iter().zip(jitter(5, targets.len(), 300)) {
        if let Some(ip) = target.ip() {
            probe = probe.delay(ip, delay);
        }
    }
    let probe = Arc::new(probe);

    run_scan(
        targets.clone(),
        &config().with_concurrency(1),
        probe.clone(),
        Arc::new(ScriptedResolver::new()),
    )
    .await;

    let expected: Vec<IpAddr> = [7, 3, 9, 1, 5]
        .into_iter()
        .map(|d| IpAddr::V4(Ipv4Addr::new(10, 10, 0, d)))
        .collect();
    assert_eq!(probe.call_order(), expected);
}
