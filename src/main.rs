use std::process::ExitCode;

use clap::Parser;
use smtp_test_tool::{logging, run, Args};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_level());

    let request = args.into_request();
    tracing::debug!(
        host = %request.host,
        port = request.port,
        security = ?request.security(),
        count = request.count,
        "resolved arguments"
    );

    let summary = run(&request, std::io::stdout(), std::io::stderr()).await;
    summary.exit_code()
}
