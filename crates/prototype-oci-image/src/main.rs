//! Binary entrypoint for the OCI image prototype.

use std::process::ExitCode;

fn main() -> ExitCode {
    prototype_sdk::run_main(prototype_oci_image::prototype)
}
