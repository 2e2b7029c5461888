use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use quill_gateway::api::ApiServerBuilder;
use quill_gateway::canvas::png_data_url;
use quill_gateway::{
    AudioPlayback, AudioSink, Config, GeminiClient, InferenceGateway, MutedSink, PcmClip, Point,
    RelayClient, Session, Verdict,
};

/// Quill - handwriting practice with spoken words and model grading
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/quill/config.toml)
    #[arg(short, long, env = "QUILL_CONFIG")]
    config: Option<PathBuf>,

    /// Relay endpoint for client commands
    #[arg(long, env = "QUILL_ENDPOINT")]
    endpoint: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay server (holds the Gemini key)
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Speak a word through the relay
    Say {
        word: String,
        /// Write a WAV file instead of playing
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Grade a PNG of handwriting through the relay
    Grade {
        /// PNG image of the handwriting
        image: PathBuf,
        /// Word the image should show
        word: String,
    },
    /// Interactive practice session driven from stdin
    Practice {
        /// Do not play pronunciations
        #[arg(long)]
        mute: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,quill_gateway=info",
        1 => "info,quill_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let endpoint = cli.endpoint.unwrap_or_else(|| config.endpoint.clone());

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(&config, port).await,
        Command::Say { word, out } => say(&endpoint, &word, out).await,
        Command::Grade { image, word } => grade(&endpoint, &image, &word).await,
        Command::Practice { mute } => practice(&config, &endpoint, mute).await,
    }
}

/// Run the relay server
async fn serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.server.port);
    let gemini = GeminiClient::from_config(&config.gemini)
        .context("the relay needs GEMINI_API_KEY (or API_KEY)")?;

    tracing::info!(
        port,
        speech_model = %config.gemini.speech_model,
        grading_model = %config.gemini.grading_model,
        voice = %config.gemini.voice,
        rate_limit = ?config.server.requests_per_minute,
        "starting quill relay"
    );

    ApiServerBuilder::new(Arc::new(gemini), port)
        .static_dir(config.server.static_dir.clone())
        .requests_per_minute(config.server.requests_per_minute)
        .build()
        .run()
        .await?;

    Ok(())
}

/// Fetch a pronunciation and play or save it
async fn say(endpoint: &str, word: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    let relay = RelayClient::from_endpoint(endpoint)?;

    let bytes = relay.pronounce(word).await?;
    if bytes.is_empty() {
        anyhow::bail!("no audio returned for \"{word}\"");
    }

    let clip = PcmClip::from_le_bytes(&bytes)?;
    println!(
        "Got {} samples ({} ms) for \"{word}\"",
        clip.samples().len(),
        clip.duration().as_millis()
    );

    if let Some(path) = out {
        clip.write_wav(&path)?;
        println!("Wrote {}", path.display());
    } else {
        AudioPlayback::new()?.play(&clip).await?;
    }

    Ok(())
}

/// Grade a PNG file
async fn grade(endpoint: &str, image: &std::path::Path, word: &str) -> anyhow::Result<()> {
    let relay = RelayClient::from_endpoint(endpoint)?;

    let png = std::fs::read(image).with_context(|| format!("reading {}", image.display()))?;
    let data_url = png_data_url(&png);

    let answer = relay.grade(&data_url, word).await?;
    let verdict = Verdict::classify(&answer);

    println!("{verdict:?} (model said: {answer})");
    Ok(())
}

/// One line of practice input
#[derive(Debug, PartialEq)]
enum PracticeCommand {
    Down(Point),
    Move(Point),
    Up,
    Leave,
    Clear,
    Next,
    Say,
    Check,
    Save(PathBuf),
    Word,
    Help,
    Quit,
}

impl FromStr for PracticeCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or_else(|| "empty command".to_string())?;
        let args: Vec<&str> = parts.collect();

        let point = |args: &[&str]| -> Result<Point, String> {
            match args {
                [x, y] => {
                    let x = x.parse().map_err(|_| format!("bad x: {x}"))?;
                    let y = y.parse().map_err(|_| format!("bad y: {y}"))?;
                    Ok(Point::new(x, y))
                }
                _ => Err(format!("{name} takes X Y")),
            }
        };

        match name.to_lowercase().as_str() {
            "down" => point(&args).map(Self::Down),
            "move" => point(&args).map(Self::Move),
            "up" => Ok(Self::Up),
            "leave" => Ok(Self::Leave),
            "clear" => Ok(Self::Clear),
            "next" => Ok(Self::Next),
            "say" => Ok(Self::Say),
            "check" => Ok(Self::Check),
            "save" => match args.as_slice() {
                [path] => Ok(Self::Save(PathBuf::from(*path))),
                _ => Err("save takes FILE".to_string()),
            },
            "word" => Ok(Self::Word),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

const PRACTICE_HELP: &str = "commands: down X Y | move X Y | up | leave | clear | next | say | check | save FILE | word | quit";

/// Line-oriented practice loop
async fn practice(config: &Config, endpoint: &str, mute: bool) -> anyhow::Result<()> {
    let gateway: Arc<dyn InferenceGateway> = Arc::new(RelayClient::from_endpoint(endpoint)?);
    let audio: Arc<dyn AudioSink> = if mute {
        Arc::new(MutedSink)
    } else {
        match AudioPlayback::new() {
            Ok(playback) => Arc::new(playback),
            Err(e) => {
                tracing::warn!(error = %e, "no audio output, pronunciations muted");
                Arc::new(MutedSink)
            }
        }
    };

    let session = Session::new(config.words.clone(), gateway, audio)?;

    println!("Handwriting practice via {endpoint}");
    println!("{PRACTICE_HELP}");
    println!("Write the word: {}", session.current_word().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command = match line.parse::<PracticeCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            PracticeCommand::Down(p) => session.pointer_down(p).await,
            PracticeCommand::Move(p) => session.pointer_move(p).await,
            PracticeCommand::Up => session.pointer_up().await,
            PracticeCommand::Leave => session.pointer_leave().await,
            PracticeCommand::Clear => {
                session.clear().await;
                println!("{}", session.feedback().await);
            }
            PracticeCommand::Next => {
                println!("Write the word: {}", session.next_word().await);
            }
            PracticeCommand::Say => println!("{}", session.request_pronunciation().await),
            PracticeCommand::Check => println!("{}", session.request_check().await),
            PracticeCommand::Save(path) => match session.export_png().await? {
                Some(png) => {
                    std::fs::write(&path, png)?;
                    println!("Saved {}", path.display());
                }
                None => println!("Nothing drawn yet"),
            },
            PracticeCommand::Word => println!("Write the word: {}", session.current_word().await),
            PracticeCommand::Help => println!("{PRACTICE_HELP}"),
            PracticeCommand::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pointer_commands() {
        assert_eq!(
            "down 10 20.5".parse::<PracticeCommand>(),
            Ok(PracticeCommand::Down(Point::new(10.0, 20.5)))
        );
        assert_eq!(
            "MOVE 1 2".parse::<PracticeCommand>(),
            Ok(PracticeCommand::Move(Point::new(1.0, 2.0)))
        );
        assert_eq!("up".parse::<PracticeCommand>(), Ok(PracticeCommand::Up));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!("down 10".parse::<PracticeCommand>().is_err());
        assert!("move x y".parse::<PracticeCommand>().is_err());
        assert!("save".parse::<PracticeCommand>().is_err());
        assert!("dance".parse::<PracticeCommand>().is_err());
    }

    #[test]
    fn parses_session_commands() {
        assert_eq!("check".parse::<PracticeCommand>(), Ok(PracticeCommand::Check));
        assert_eq!("exit".parse::<PracticeCommand>(), Ok(PracticeCommand::Quit));
        assert_eq!(
            "save out.png".parse::<PracticeCommand>(),
            Ok(PracticeCommand::Save(PathBuf::from("out.png")))
        );
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
