use clap::Parser;
use clap::error::ErrorKind;

use client_cert_update::cli::Cli;
use client_cert_update::error::{EXIT_SETUP_FAILURE, EXIT_SUCCESS};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // exit 2 belongs to delivery failures, not usage errors
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_SETUP_FAILURE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    std::process::exit(cli.run().await);
}
