use std::process::ExitCode;

fn main() -> ExitCode {
    match gangway::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            gangway::ui::output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
