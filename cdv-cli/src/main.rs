//! CDV CLI - turns the raw ACLED, UNOSAT and World Bank downloads into the
//! CSV and GeoJSON files embedded by the site.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cdv-cli",
    version,
    about = "Conflict data narrative preprocessing toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: cdv_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("starting cdv-cli");
    cdv_cmd::run(cli.command)
}
