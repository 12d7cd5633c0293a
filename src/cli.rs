use std::error::Error as StdError;
use std::io::Write as _;
use std::ops::Range;

use clap::Parser;
use cleanlist::clients::{
    Playlist, SpotifyClient,
    errors::{Error, Result},
};
use cleanlist::config::ConfigBuilder;
use cleanlist::observer::WorkflowObserver;
use cleanlist::workflow::{CleanPlaylistWorkflow, DEFAULT_DESCRIPTION};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "cleanlist")]
#[command(version, about = "Create a clean copy of a Spotify playlist", long_about = None)]
struct Cli {
    /// Source playlist id, URI or link. Asked for on stdin when omitted
    playlist: Option<String>,

    /// Description of the new playlist
    #[arg(long, default_value = DEFAULT_DESCRIPTION)]
    description: String,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

// Progress lines for the terminal
struct ConsoleProgress;

impl WorkflowObserver for ConsoleProgress {
    fn playlist_fetched(&mut self, playlist: &Playlist) {
        println!("Processing playlist: {playlist}");
    }

    fn chunk_appended(&mut self, range: Range<usize>) {
        println!("Added tracks {} to {}", range.start + 1, range.end);
    }
}

pub async fn run() -> std::result::Result<(), Box<dyn StdError>> {
    let cli = Cli::parse();

    info!("Building config ...");
    let config = ConfigBuilder::new().build()?;
    let spotify = SpotifyClient::from_config(&config);

    let mut workflow = CleanPlaylistWorkflow::new(&spotify)
        .with_observer(ConsoleProgress)
        .with_description(cli.description);

    // The OAuth prompt may be shown here
    workflow.authenticate().await?;

    let input = match cli.playlist {
        Some(playlist) => playlist,
        None => prompt_playlist().await?,
    };
    let playlist_id = playlist_ref(&input)
        .ok_or_else(|| Error::ConfigurationError("No playlist id given".into()))?;

    let report = workflow.run(&playlist_id).await?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Created clean playlist with ID: {}", report.destination_id);
    }
    Ok(())
}

async fn prompt_playlist() -> Result<String> {
    print!("Enter playlist ID: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line)
}

// Accepts a bare id, a spotify:playlist: URI or an open.spotify.com link,
// including localized links such as open.spotify.com/intl-de/playlist/<id>
fn playlist_ref(input: &str) -> Option<String> {
    let input = input.trim();
    let id = match input.split_once("open.spotify.com/") {
        Some((_, path)) => path
            .split_once("playlist/")
            .and_then(|(_, rest)| rest.split(['?', '/', '#']).next())
            .unwrap_or_default(),
        None => input,
    };
    (!id.is_empty()).then(|| id.to_string())
}
