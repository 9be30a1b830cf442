use std::process::ExitCode;
use subtitle_client_lib::Outcome;

#[tokio::main]
async fn main() -> ExitCode {
    match subtitle_client_lib::run(std::env::args().skip(1).collect()).await {
        Ok(Outcome::Succeeded(_)) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}
