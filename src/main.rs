use std::process::ExitCode;

fn main() -> ExitCode {
    match photool::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("photool: {err:#}");
            ExitCode::FAILURE
        }
    }
}
