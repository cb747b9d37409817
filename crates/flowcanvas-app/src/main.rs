//! Main application entry point.

use clap::Parser;
use flowcanvas_app::Cli;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Starting FlowCanvas with {:?}", cli.command);

    if let Err(err) = flowcanvas_app::run(cli) {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
