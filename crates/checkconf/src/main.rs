use std::process::ExitCode;

use clap::Parser;
use log::error;

use checkconf::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = checkconf::logging::init(&cli.log_level) {
        eprintln!("{}", e);
    }

    let mut stdout = std::io::stdout().lock();
    match cli::run(&cli, &mut stdout) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
