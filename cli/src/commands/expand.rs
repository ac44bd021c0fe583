use anyhow::Context;

use crate::terminal::print;
use hostsweep_common::config::Config;
use hostsweep_common::network::target::TargetSpec;
use hostsweep_common::success;

pub fn expand(range: &TargetSpec, max_targets: u64, cfg: &Config) -> anyhow::Result<()> {
    let targets = range
        .to_targets(max_targets)
        .with_context(|| format!("cannot expand '{range}'"))?;

    for target in &targets {
        print::print(&target.to_string());
    }

    if cfg.quiet == 0 {
        success!("{range} expands to {} address(es)", targets.len());
    }
    Ok(())
}
