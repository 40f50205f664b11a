//! Thin entrypoint for the `testhub-cli` binary.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = testhub_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
