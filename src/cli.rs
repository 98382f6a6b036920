// CLI definitions using clap

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagedeck")]
#[command(author, version, about = "Page-based Stream Deck controller")]
pub struct Cli {
    /// Path to the page/button configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    pub config: PathBuf,
}
