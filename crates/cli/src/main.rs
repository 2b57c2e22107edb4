use std::process::ExitCode;

fn main() -> ExitCode {
    shoptalk_cli::run()
}
