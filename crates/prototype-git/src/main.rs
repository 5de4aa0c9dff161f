//! Binary entrypoint for the git prototype.

use std::process::ExitCode;

fn main() -> ExitCode {
    prototype_sdk::run_main(prototype_git::prototype)
}
