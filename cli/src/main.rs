mod commands;
mod terminal;

use commands::{CommandLine, Commands, expand, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg = commands.config();

    logging::init_logging(cfg.quiet)?;
    print::banner(cfg.no_banner, cfg.quiet);

    let result = match commands.command {
        Commands::Scan(args) => {
            print::header("starting scanner", cfg.quiet);
            scan::scan(args, &cfg).await
        }
        Commands::Expand { range, max_targets } => expand::expand(&range, max_targets, &cfg),
    };

    print::end_of_program(cfg.quiet);
    result
}
