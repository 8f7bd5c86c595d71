//! Main application entry point (native).

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting MindCanvas");

    let result = mindcanvas_app::Args::parse(std::env::args().skip(1))
        .and_then(|args| mindcanvas_app::run(&args));
    match result {
        Ok(summary) => {
            log::info!(
                "Laid out {} nodes and {} connections with {} layout",
                summary.nodes,
                summary.connections,
                summary.mode
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            if matches!(e, mindcanvas_app::AppError::Usage(_)) {
                eprintln!("{}", mindcanvas_app::USAGE);
            }
            ExitCode::FAILURE
        }
    }
}
