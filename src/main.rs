use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hearken::capability::{Browser, Listener, Speaker};
use hearken::config::{ApiKeys, VoiceConfig};
use hearken::tools::{JokeBook, SystemBrowser, WikipediaKnowledge, YoutubePlayer};
use hearken::voice::{
    AudioCapture, AudioPlayback, ConsoleListener, ConsoleSpeaker, MicListener, SttProvider,
    Synthesizer, Transcriber, TtsProvider, VoiceSpeaker, rms,
};
use hearken::{
    ActionExecutor, ActionSettings, Collaborators, Config, ConversationLoop, LoadOptions,
    NoteStore, NotesSnapshot, SystemClock,
};

/// hearken - a spoken-command assistant
#[derive(Parser)]
#[command(name = "hearken", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Read commands from stdin and print replies instead of using audio
    #[arg(long, env = "HEARKEN_TEXT_MODE")]
    text: bool,

    /// Note log path
    #[arg(long, env = "HEARKEN_NOTES_FILE")]
    notes_file: Option<PathBuf>,

    /// Wake phrase (repeatable); replaces the configured phrases
    #[arg(long = "wake-word", value_name = "PHRASE")]
    wake_words: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Print the note log
    Notes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,hearken=info",
        1 => "info,hearken=debug",
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
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let options = LoadOptions {
        wake_words: cli.wake_words,
        notes_file: cli.notes_file,
        text_mode: cli.text,
    };

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(options, &text).await,
            Command::Notes => print_notes(options),
        };
    }

    let config = Config::load_with_options(options)?;
    tracing::debug!(
        wake_words = ?config.wake_words,
        notes_file = %config.notes_file.display(),
        voice = config.voice.enabled,
        "loaded configuration"
    );

    if config.voice.enabled {
        let transcriber = transcriber(&config.voice, &config.api_keys)?;
        let speaker: Arc<dyn Speaker> = Arc::new(VoiceSpeaker::new(
            synthesizer(&config.voice, &config.api_keys)?,
            AudioPlayback::new()?,
        ));
        let listener = MicListener::new(transcriber)?;
        converse(&config, listener, speaker).await
    } else {
        converse(&config, ConsoleListener::new(), Arc::new(ConsoleSpeaker)).await
    }
}

/// Wire the collaborators and run the loop until Ctrl-C
#[allow(clippy::future_not_send)]
async fn converse<L: Listener>(
    config: &Config,
    listener: L,
    speaker: Arc<dyn Speaker>,
) -> anyhow::Result<()> {
    let browser: Arc<dyn Browser> = Arc::new(SystemBrowser::detect());
    let collaborators = Collaborators {
        speaker: Arc::clone(&speaker),
        browser: Arc::clone(&browser),
        media: Arc::new(YoutubePlayer::new(browser)?),
        knowledge: Arc::new(WikipediaKnowledge::new()?),
        jokes: Arc::new(JokeBook::new(config.jokes_enabled)),
        clock: Arc::new(SystemClock),
    };

    let executor = ActionExecutor::new(
        collaborators,
        NoteStore::new(&config.notes_file),
        ActionSettings::from_config(config),
    );

    tracing::info!(wake_words = ?config.wake_words, "hearken ready");
    ConversationLoop::new(config, listener, speaker, executor)
        .run(interrupted())
        .await;

    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn transcriber(voice: &VoiceConfig, keys: &ApiKeys) -> hearken::Result<Transcriber> {
    let key = match voice.stt_provider {
        SttProvider::Whisper => keys.openai.clone(),
        SttProvider::Deepgram => keys.deepgram.clone(),
    };
    Transcriber::new(voice.stt_provider, key, voice.stt_model.clone())
}

fn synthesizer(voice: &VoiceConfig, keys: &ApiKeys) -> hearken::Result<Synthesizer> {
    let key = match voice.tts_provider {
        TtsProvider::OpenAi => keys.openai.clone(),
        TtsProvider::ElevenLabs => keys.elevenlabs.clone(),
    };
    Synthesizer::new(
        voice.tts_provider,
        key,
        voice.tts_model.clone(),
        voice.tts_voice.clone(),
        voice.tts_speed,
    )
}

/// Print the note log
fn print_notes(options: LoadOptions) -> anyhow::Result<()> {
    let config = Config::load_with_options(options)?;
    let store = NoteStore::new(&config.notes_file);

    match store.read()? {
        NotesSnapshot::Missing => println!("No notes yet ({})", store.path().display()),
        NotesSnapshot::Empty => println!("Note log is empty ({})", store.path().display()),
        NotesSnapshot::Text(text) => println!("{text}"),
    }
    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    println!("Device: {}", capture.device_name());
    println!("Sample rate: {} Hz", hearken::voice::SAMPLE_RATE);
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek();
        let energy = rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);

        capture.clear();
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new()?;
    let sample_rate = playback.sample_rate();
    let frequency = 440.0_f32;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    println!("Playing {} samples at {sample_rate} Hz...", samples.len());
    playback.play_samples(samples).await?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");

    Ok(())
}

/// Test TTS output
async fn test_tts(options: LoadOptions, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load_with_options(options)?;
    let synthesizer = synthesizer(&config.voice, &config.api_keys)?;

    println!("Synthesizing speech with {:?}...", config.voice.tts_provider);
    let mp3 = synthesizer.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3.len());

    println!("Playing audio...");
    AudioPlayback::new()?.play_mp3(mp3).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}
