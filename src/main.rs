use clap::Parser;
use colored::Colorize;
use hex_validate::driver::{self, Cli};
use std::process;

fn main() {
    let cli = Cli::parse();
    // No config-file loader ships with this binary; distributions that
    // bundle one pass the loaded pipeline here.
    match driver::run(cli, None) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            process::exit(1);
        }
    }
}
