use std::process::ExitCode;

fn main() -> ExitCode {
    motofleet_cli::run()
}
