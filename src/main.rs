use clap::Parser;
use leadsheet::{Script, SheetError, Settings, Song, TranspositionRequest};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Tag, transpose and renumber chord-and-lyric sheets
#[derive(Parser, Debug)]
#[command(name = "leadsheet", version, about)]
struct Cli {
    /// Sheet text file
    input: PathBuf,

    /// Write here instead of stdout
    output: Option<PathBuf>,

    /// YAML settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Target key or relative shift (e.g. "Eb", "+2", "-3")
    #[arg(short, long, conflicts_with = "offset")]
    transpose: Option<String>,

    /// Raw semitone offset, 0-11
    #[arg(short, long)]
    offset: Option<i32>,

    /// Key the song is shown in when no target is given
    #[arg(short, long)]
    default_key: Option<String>,

    /// Show chords as Nashville numbers
    #[arg(short, long)]
    nashville: bool,

    /// Keep lyrics under their chords when chord lengths change
    #[arg(short, long)]
    align: bool,

    /// Print the tagged token stream as YAML instead of text
    #[arg(long, conflicts_with = "lyrics")]
    tokens: bool,

    /// Print only the lyrics
    #[arg(long)]
    lyrics: bool,
}

fn read(path: &Path) -> Result<String, SheetError> {
    fs::read_to_string(path).map_err(|source| SheetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_settings(cli: &Cli) -> Result<Settings, SheetError> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::from_yaml(&read(path)?)?,
        None => Settings::default(),
    };
    if let Some(target) = &cli.transpose {
        settings.enabled = true;
        settings.key = Some(target.clone());
    }
    if let Some(default_key) = &cli.default_key {
        settings.default_key = Some(default_key.clone());
    }
    settings.nashville |= cli.nashville;
    settings.align |= cli.align;
    Ok(settings)
}

fn format_output(cli: &Cli, script: &Script) -> Result<String, SheetError> {
    if cli.tokens {
        serde_yaml::to_string(script).map_err(|e| SheetError::Output(e.to_string()))
    } else if cli.lyrics {
        Ok(script.lyrics())
    } else {
        Ok(script.to_text())
    }
}

fn run(cli: &Cli) -> Result<(), SheetError> {
    let settings = load_settings(cli)?;
    let text = read(&cli.input)?;
    let name = cli.input.file_stem().and_then(|s| s.to_str());
    let song = Song::from_text(&text, name);

    tracing::info!(title = %song.title, confidence = song.confidence, "loaded song");

    let request = match cli.offset {
        Some(offset) => Some(TranspositionRequest::Offset(offset)),
        None => settings.request(),
    };
    let script = song.render_request(request.as_ref(), &settings)?;
    let out = format_output(cli, &script)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &out).map_err(|source| SheetError::Io {
                path: path.clone(),
                source,
            })?;
            eprintln!("Wrote {} to {}", song.title, path.display());
        }
        None => print!("{}", out),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
