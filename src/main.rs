// src/main.rs

use dinorelay::config::load_and_validate;
use dinorelay::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("dinorelay error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let cfg = load_and_validate(&args.config, &args.overrides())?;
    logging::init_logging(args.log_level, &cfg.log)?;
    run(args, cfg).await?;
    Ok(())
}
