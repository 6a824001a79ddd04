use clap::Parser;

use taskmerge::{Combiner, Config, Logger, Result, Watcher};

/// Taskmerge - merge task-definition fragments into a single tasks.json
#[derive(Parser, Debug)]
#[command(name = "taskmerge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Keep running and re-merge whenever a fragment file changes
    #[arg(long)]
    pub watch: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::default();
    let logger = Logger::new(&config.log_path);

    if cli.watch {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(Watcher::new(config, logger).run())
    } else {
        // Structural failures are reported through the log; the exit status
        // stays 0 either way, matching the fix-and-rerun model.
        Combiner::new(config, logger).combine();
        Ok(())
    }
}
