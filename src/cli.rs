use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "gmail-threads",
    version,
    about = "Print snippets of multi-message Gmail threads"
)]
pub struct Cli {
    #[arg(
        long,
        default_value = "client_secret.json",
        help = "OAuth client secret file"
    )]
    pub client_secret: PathBuf,
    #[arg(long, default_value = "me", help = "Gmail user id")]
    pub user: String,
    #[arg(short = 'v', long, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
}
