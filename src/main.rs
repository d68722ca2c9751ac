use std::process::ExitCode;

fn main() -> ExitCode {
    eventstack::app::startup::startup()
}
