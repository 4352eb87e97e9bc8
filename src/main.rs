use std::path::PathBuf;

use clap::Parser;
use log::info;
use sine_wav_recorder::config::{
    DEFAULT_AMPLITUDE, DEFAULT_BUFFER_FRAMES, DEFAULT_FREQUENCY, DEFAULT_NOTE_DURATION_SECS,
    DEFAULT_SAMPLE_RATE,
};
use sine_wav_recorder::keyboard::{ConsoleKeys, Mode, PolledKeys};
use sine_wav_recorder::notes::NOTES;
use sine_wav_recorder::{wav, EngineConfig, Session, TriggerSource, WavWriter};

/// Record a sine tone to a WAV file, switching it on and off from the keyboard.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output WAV file
    #[arg(short, long, default_value = "output.wav")]
    output: PathBuf,

    /// Keyboard mode
    #[arg(short, long, value_enum, default_value_t = Mode::Toggle)]
    mode: Mode,

    /// Tone frequency in Hz for the toggle modes
    #[arg(short, long, default_value_t = DEFAULT_FREQUENCY)]
    frequency: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Frames rendered per buffer
    #[arg(long, default_value_t = DEFAULT_BUFFER_FRAMES)]
    buffer_frames: usize,

    /// Peak level, 0.0 to 1.0
    #[arg(long, default_value_t = DEFAULT_AMPLITUDE)]
    amplitude: f32,

    /// Note length in seconds for notes mode
    #[arg(long, default_value_t = DEFAULT_NOTE_DURATION_SECS)]
    note_duration: f32,

    /// Skip reading the finished file back
    #[arg(long)]
    no_verify: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sample_rate: self.sample_rate,
            amplitude: self.amplitude,
            buffer_frames: self.buffer_frames,
            frequency: self.frequency,
            note_duration_secs: self.note_duration,
        }
    }
}

fn print_prompt(mode: Mode) {
    match mode {
        Mode::Toggle | Mode::Polled => println!("Press SPACE to toggle sound, Q to quit"),
        Mode::Notes => {
            let keys: Vec<String> = NOTES
                .iter()
                .map(|note| format!("{}={}", note.key, note.name))
                .collect();
            println!("Play notes with {}, Q to quit", keys.join(" "));
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).
    let cli = Cli::parse();

    let config = cli.engine_config();
    config.validate()?;
    info!("engine config: {:?}", config);

    let writer = WavWriter::create(&cli.output, config.wav_format())?;
    let mut session = Session::new(&config, writer)?;

    let mut source: Box<dyn TriggerSource> = match cli.mode {
        Mode::Toggle | Mode::Notes => Box::new(ConsoleKeys::new(cli.mode)),
        Mode::Polled => Box::new(PolledKeys::spawn(config.buffer_duration())),
    };

    print_prompt(cli.mode);
    // Patch the header even when key input fails, then report the failure.
    let outcome = session.run(source.as_mut());
    let (summary, _file) = session.finish()?;
    outcome?;

    println!(
        "WAV file created: {} ({} frames)",
        cli.output.display(),
        summary.frames
    );

    if !cli.no_verify {
        let written = wav::inspect(&cli.output)?;
        info!(
            "read back {} channels at {} Hz, {} bits, {:.2} s",
            written.channels, written.sample_rate, written.bits_per_sample, written.duration_secs
        );
        anyhow::ensure!(
            written.header_matches_payload,
            "header sizes of {} do not match its payload",
            cli.output.display()
        );
    }
    Ok(())
}
