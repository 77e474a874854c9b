//! audiogen — 命令行音频生成工具
//!
//! Usage:
//!   audiogen generate --text <TEXT> [--target ..] [--persona ..] [--segment ..] [--length N]
//!   audiogen speak --text <TEXT> [--voice ..] [--out <FILE>]
//!   audiogen voices
//!   audiogen settings show|set|reset

use anyhow::{Context, Result};
use audiogen::settings::FileKeyValueStore;
use audiogen::tts::TtsOverrides;
use audiogen::types::{unix_timestamp_ms, AudioFormat};
use audiogen::{
    AudienceTarget, AudioClient, ClientConfig, FormState, GenerationSession, MemoryBlobStore,
    Outcome, PersonaLevel, Segment, SettingsStore, TextToSpeechClient, TtsSettings,
};
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "audiogen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate narrated audio from text")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Service base URL (overrides config and AUDIOGEN_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Where downloads are written
    #[arg(long, global = true, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Settings storage file
    #[arg(long, global = true, value_name = "FILE")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate audio from text and save it
    Generate(GenerateArgs),
    /// Convert text with the text-to-speech service
    Speak(SpeakArgs),
    /// List available voices
    Voices,
    /// Show or change stored text-to-speech defaults
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Text to narrate
    #[arg(long, short, required_unless_present = "text_file")]
    text: Option<String>,

    /// Read the text from a file instead
    #[arg(long, value_name = "FILE", conflicts_with = "text")]
    text_file: Option<PathBuf>,

    #[arg(long, default_value = "internal")]
    target: AudienceTarget,

    #[arg(long, default_value = "highLevel")]
    persona: PersonaLevel,

    #[arg(long, default_value = "retailEcommerce")]
    segment: Segment,

    /// Episode length in minutes
    #[arg(long, default_value = "3")]
    length: NonZeroU32,

    /// Only report the playback handle; do not save the audio
    #[arg(long)]
    no_download: bool,
}

#[derive(Args, Debug, Default)]
struct VoiceArgs {
    #[arg(long)]
    voice: Option<String>,
    #[arg(long)]
    speed: Option<f32>,
    #[arg(long)]
    pitch: Option<f32>,
    #[arg(long)]
    volume: Option<f32>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long, value_parser = parse_format)]
    format: Option<AudioFormat>,
}

#[derive(Args, Debug)]
struct SpeakArgs {
    #[arg(long, short)]
    text: String,

    #[command(flatten)]
    voice: VoiceArgs,

    /// Output file (default: speech.<format>)
    #[arg(long, short, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Set(VoiceArgs),
    Reset,
}

fn parse_format(s: &str) -> std::result::Result<AudioFormat, String> {
    match s {
        "mp3" => Ok(AudioFormat::Mp3),
        "wav" => Ok(AudioFormat::Wav),
        "ogg" => Ok(AudioFormat::Ogg),
        other => Err(format!("unsupported format '{}' (expected mp3, wav, ogg)", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(base_url = %config.base_url, "audiogen starting");

    match cli.command {
        Command::Generate(args) => cmd_generate(config, args).await,
        Command::Speak(args) => cmd_speak(config, open_settings(&cli.storage)?, args).await,
        Command::Voices => cmd_voices(config, open_settings(&cli.storage)?).await,
        Command::Settings(cmd) => cmd_settings(open_settings(&cli.storage)?, cmd),
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::from_env()?,
    };
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(dir) = &cli.download_dir {
        config = config.with_download_dir(dir.clone());
    }
    Ok(config.validate()?)
}

fn open_settings(storage: &Option<PathBuf>) -> Result<Arc<SettingsStore>> {
    let path = match storage {
        Some(p) => p.clone(),
        None => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".audiogen"))
            .join("audiogen")
            .join("storage.json"),
    };
    let backend = FileKeyValueStore::open(&path)
        .with_context(|| format!("opening settings at {}", path.display()))?;
    Ok(Arc::new(SettingsStore::open(backend)?))
}

async fn cmd_generate(config: ClientConfig, args: GenerateArgs) -> Result<()> {
    let text = match (args.text, args.text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => String::new(),
    };
    let form = FormState::new(text)
        .with_target(args.target)
        .with_persona(args.persona)
        .with_segment(args.segment)
        .with_length_minutes(args.length);

    let client = AudioClient::from_config(&config)?;
    let session = GenerationSession::new(
        client,
        MemoryBlobStore::with_download_dir(&config.download_dir),
    );

    let outcome = session.generate(&form).await;
    let result = match outcome {
        Ok(Outcome::Skipped) => {
            eprintln!("Nothing to generate: text is empty.");
            Ok(())
        }
        Ok(Outcome::Ready(audio)) => {
            println!("Generated {} bytes (handle {})", audio.len(), audio.handle);
            if !args.no_download {
                if let Some(path) = session.download(unix_timestamp_ms())? {
                    println!("Saved {}", path.display());
                }
            }
            Ok(())
        }
        Ok(Outcome::Superseded { seq }) => Err(anyhow::anyhow!("request {} was superseded", seq)),
        Err(err) => Err(anyhow::anyhow!("Error generating audio: {}", err)),
    };
    session.teardown();
    result
}

async fn cmd_speak(config: ClientConfig, settings: Arc<SettingsStore>, args: SpeakArgs) -> Result<()> {
    let client = TextToSpeechClient::builder()
        .config(config)
        .settings(settings)
        .build()?;
    let overrides = TtsOverrides {
        voice: args.voice.voice,
        speed: args.voice.speed,
        pitch: args.voice.pitch,
        volume: args.voice.volume,
        language: args.voice.language,
        format: args.voice.format,
    };
    let audio = client
        .speak(&args.text, &overrides)
        .await
        .map_err(|e| anyhow::anyhow!("Error converting text to speech: {}", e))?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("speech.{}", audio.format.extension())));
    std::fs::write(&out, &audio.data).with_context(|| format!("writing {}", out.display()))?;
    match audio.duration_secs {
        Some(secs) => println!("Saved {} ({:.1}s)", out.display(), secs),
        None => println!("Saved {}", out.display()),
    }
    Ok(())
}

async fn cmd_voices(config: ClientConfig, settings: Arc<SettingsStore>) -> Result<()> {
    let client = TextToSpeechClient::builder()
        .config(config)
        .settings(settings)
        .build()?;
    let voices = client.voices().await?;
    for v in voices {
        let gender = v
            .gender
            .map(|g| format!(" {:?}", g).to_lowercase())
            .unwrap_or_default();
        match v.description {
            Some(desc) => println!("{:<16} {:<20} {}{} - {}", v.id, v.name, v.language, gender, desc),
            None => println!("{:<16} {:<20} {}{}", v.id, v.name, v.language, gender),
        }
    }
    Ok(())
}

fn cmd_settings(settings: Arc<SettingsStore>, cmd: SettingsCommand) -> Result<()> {
    match cmd {
        SettingsCommand::Show => {
            println!("{}", serde_json::to_string_pretty(settings.get().as_ref())?);
        }
        SettingsCommand::Set(args) => {
            let update = TtsSettings {
                default_voice: args.voice,
                default_speed: args.speed,
                default_pitch: args.pitch,
                default_volume: args.volume,
                default_language: args.language,
                default_format: args.format,
            };
            let merged = settings.save(&update)?;
            println!("{}", serde_json::to_string_pretty(merged.as_ref())?);
        }
        SettingsCommand::Reset => {
            settings.reset()?;
            println!("Settings cleared.");
        }
    }
    Ok(())
}
