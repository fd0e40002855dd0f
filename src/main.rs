mod cli_app;

use clap::Parser;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("wmh: {e}");
        std::process::exit(1);
    }
}
