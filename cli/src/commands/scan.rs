use std::sync::Arc;

use anyhow::Context;
use colored::*;
use tracing::Instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::commands::{ProbeKind, ScanArgs};
use crate::mprint;
use crate::terminal::{colors, format, input, print, spinner};
use hostsweep_common::config::Config;
use hostsweep_common::probe::{IdentityResolver, ReachabilityProbe};
use hostsweep_common::report::{Completion, ScanRecord, ScanReport};
use hostsweep_common::signal::StopSignal;
use hostsweep_common::{info, success, warn};
use hostsweep_core::{DisabledResolver, ListScan, PingProbe, Scanner, SystemResolver, TcpHandshakeProbe};

pub async fn scan(args: ScanArgs, cfg: &Config) -> anyhow::Result<()> {
    let spec = match &args.target {
        Some(spec) => spec.clone(),
        None => input::prompt_target()?,
    };

    let scan_cfg = args.scan_config();
    let stop = StopSignal::new();

    let scanner = Scanner::new(build_probe(&args), build_resolver(cfg), scan_cfg)
        .with_stop_signal(stop.clone());
    let targets = scanner
        .expand_spec(&spec)
        .with_context(|| format!("cannot scan '{spec}'"))?;

    info!(
        "{}",
        spinner::estimate_message(
            targets.len(),
            scanner.config().concurrency,
            scanner.config().per_host_timeout
        )
    );

    let span = spinner::scan_progress(targets.len(), cfg.quiet, !cfg.disable_input);
    let progress = span.clone();
    let quiet = cfg.quiet;
    let scanner = scanner.on_record(Arc::new(move |_idx: usize, record: &ScanRecord| {
        progress.pb_inc(1);
        if quiet == 0 {
            print::print_status(format::live_status(record));
        }
    }));

    let ctrl_c = tokio::spawn({
        let stop = stop.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.stop();
            }
        }
    });
    let keys = (!cfg.disable_input)
        .then(|| input::KeyWatcher::start(stop.clone()))
        .flatten();

    let scan: ListScan = scanner
        .run_list(targets, !args.no_export, args.output.as_deref())
        .instrument(span)
        .await;

    drop(keys);
    ctrl_c.abort();

    scan_ends(&scan.report, cfg);

    match scan.export {
        Some(Err(e)) => Err(anyhow::Error::new(e).context("scan finished but the results were not exported")),
        _ => Ok(()),
    }
}

fn build_probe(args: &ScanArgs) -> Arc<dyn ReachabilityProbe> {
    match args.probe {
        ProbeKind::Ping => Arc::new(PingProbe::new()),
        ProbeKind::Tcp => Arc::new(TcpHandshakeProbe::new(args.port)),
    }
}

fn build_resolver(cfg: &Config) -> Arc<dyn IdentityResolver> {
    if cfg.no_dns {
        Arc::new(DisabledResolver)
    } else {
        Arc::new(SystemResolver::new())
    }
}

fn scan_ends(report: &ScanReport, cfg: &Config) {
    match report.completion {
        Completion::Finished => {}
        Completion::DeadlineExceeded => warn!("Deadline reached before every host answered"),
        Completion::Cancelled => warn!("Scan stopped early"),
    }

    if report.active_count() == 0 {
        if cfg.quiet == 0 {
            print::header("zero hosts answered", cfg.quiet);
            print::no_results();
        }
    } else if cfg.quiet < 2 {
        if cfg.quiet > 0 {
            mprint!();
        }
        print::header("Scan Results", cfg.quiet);
        print_active_hosts(report);
    }

    print_summary(report, cfg);
}

fn print_active_hosts(report: &ScanReport) {
    let active: Vec<_> = report.records.iter().filter(|r| r.is_active()).collect();
    for (idx, record) in active.iter().enumerate() {
        let name = match record.identity.hostname() {
            Some(hostname) => format!("{} ({})", record.target, hostname),
            None => record.target.to_string(),
        };
        print::tree_head(idx, &name);
        print::as_tree_one_level(format::record_to_details(record));
        if idx + 1 != active.len() {
            mprint!();
        }
    }
}

fn print_summary(report: &ScanReport, cfg: &Config) {
    let active: ColoredString = report.active_count().to_string().bold().green();
    let inactive: ColoredString = report.inactive_count().to_string().bold().red();
    let total_time: ColoredString = format!("{:.2}s", report.duration.as_secs_f64()).bold().yellow();
    let output: String = format!("Summary: {active} active, {inactive} inactive.")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            print::centerln(&format!("finished in {total_time}"));
        }
        _ => success!("{output} ({total_time})"),
    }
}
