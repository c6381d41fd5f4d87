//! Print the server's OpenAPI document as JSON.

use std::io::Write;

use clap::Parser;
use shareit_server::ApiDoc;
use utoipa::OpenApi;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Print the ShareIt OpenAPI document")]
struct Cli {
    /// Indent the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let doc = ApiDoc::openapi();
    let json = if cli.pretty {
        doc.to_pretty_json()?
    } else {
        doc.to_json()?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}
