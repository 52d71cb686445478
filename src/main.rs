use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use confab::voice::{AudioCapture, Recorder, SpeechToText};
use confab::{ChatClient, Config, Overrides, Persona, Repl, config};

/// Confab - voice-driven chat client for the terminal
#[derive(Parser)]
#[command(name = "confab", version, about)]
struct Cli {
    /// Read queries from stdin instead of the microphone
    #[arg(short, long, env = "CONFAB_TEXT")]
    text: bool,

    /// Persona preset seeding each conversation
    #[arg(short, long, value_enum, env = "CONFAB_PERSONA")]
    persona: Option<Persona>,

    /// Chat model identifier
    #[arg(short, long, env = "CONFAB_MODEL")]
    model: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,confab=warn",
        1 => "info,confab=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Command::TestMic { duration }) = cli.command {
        return test_mic(duration).await;
    }

    let config = Config::load(&Overrides {
        persona: cli.persona,
        model: cli.model,
        text_mode: cli.text,
    });
    tracing::debug!(?config, "loaded configuration");

    print!("Loading OpenAI API key... ");
    std::io::stdout().flush()?;
    let api_key = match config::load_api_key(&config.api_key_path) {
        Ok(key) => {
            println!("Done.");
            key
        }
        Err(e) => {
            println!("Failed.");
            println!(
                "Please save an OpenAI API key to {}.",
                config.api_key_path.display()
            );
            return Err(e.into());
        }
    };

    let chat = ChatClient::new(api_key.clone(), config.model.clone());

    print!("Authenticating... ");
    std::io::stdout().flush()?;
    if let Err(e) = chat.probe().await {
        println!("Failed.");
        println!(
            "Please update your OpenAI API key in {}.",
            config.api_key_path.display()
        );
        return Err(e.into());
    }
    println!("Done.");

    let recorder = config
        .voice
        .then(|| Recorder::new(SpeechToText::new(api_key, config.stt_model.clone())));

    Repl::new(chat, recorder, config.persona).run().await?;
    Ok(())
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!");

    let mut capture = AudioCapture::open()?;
    capture.start()?;
    tokio::time::sleep(Duration::from_secs(duration)).await;
    capture.stop();

    let samples = capture.take_buffer();
    let energy = calculate_rms(&samples);
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

    println!("---");
    println!(
        "Captured {} samples | RMS: {energy:.4} | Peak: {peak:.4}",
        samples.len()
    );
    println!("If RMS stayed near 0, check that your mic is plugged in and unmuted.");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
