//! Command implementations for CDV CLI.
//!
//! Each subcommand reads a raw download and writes one of the files the
//! site embeds from `fixtures/`.

use chrono::NaiveDate;
use clap::Subcommand;

pub mod acled;
pub mod damage;
pub mod indicators;

#[derive(Subcommand)]
pub enum Command {
    /// Aggregate an ACLED weekly export into the fatalities, ridge and Sankey CSVs
    Acled {
        /// ACLED weekly aggregated export (WEEK, COUNTRY, EVENT_TYPE, ...)
        #[arg(short = 'i', long)]
        input: String,

        /// Directory receiving the three output CSVs
        #[arg(short = 'o', long, default_value = "fixtures")]
        out_dir: String,

        /// Drop weeks before this date
        #[arg(long, default_value = "2023-01-01")]
        cutoff: NaiveDate,
    },

    /// Cluster damage-site points into non-overlapping circles
    ClusterDamage {
        /// Point FeatureCollection of damaged buildings
        #[arg(short = 'i', long)]
        input: String,

        /// Output GeoJSON of cluster centroids
        #[arg(short = 'o', long)]
        output: String,

        /// Clustering distance in metres
        #[arg(long, default_value_t = damage::DEFAULT_EPS_M)]
        eps: f64,

        /// Gzip the output
        #[arg(long)]
        gzip: bool,
    },

    /// Melt and join the World Bank indicator tables for the small multiples
    Indicators {
        /// GDP per capita table
        #[arg(long)]
        gdp: String,

        /// Safely managed drinking water table
        #[arg(long)]
        water: String,

        /// Safely managed sanitation table
        #[arg(long)]
        sanitation: String,

        /// Food insecurity table
        #[arg(long)]
        food_insecurity: String,

        /// Output path of the combined CSV
        #[arg(short = 'o', long, default_value = "fixtures/Combined_SmallMultiple.csv")]
        output: String,

        /// First year kept
        #[arg(long, default_value_t = indicators::DEFAULT_START_YEAR)]
        start_year: i32,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Acled {
            input,
            out_dir,
            cutoff,
        } => acled::run_acled(&input, &out_dir, cutoff),
        Command::ClusterDamage {
            input,
            output,
            eps,
            gzip,
        } => damage::run_cluster_damage(&input, &output, eps, gzip),
        Command::Indicators {
            gdp,
            water,
            sanitation,
            food_insecurity,
            output,
            start_year,
        } => {
            let tables = indicators::IndicatorTables {
                gdp: &gdp,
                water: &water,
                sanitation: &sanitation,
                food_insecurity: &food_insecurity,
            };
            indicators::run_indicators(&tables, &output, start_year)
        }
    }
}
