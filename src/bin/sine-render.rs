use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use sine_wav_recorder::{wav, EngineConfig, Oscillator, WavWriter};

/// Render a single fixed-length sine note to a WAV file without interaction.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Note frequency in Hz
    #[arg(short, long, default_value_t = 440.0)]
    frequency: f32,

    /// Note length in seconds
    #[arg(short, long, default_value_t = 1.0)]
    duration: f32,

    /// Output WAV file, or `-` for stdout
    #[arg(short, long, default_value = "sine.wav")]
    output: PathBuf,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();
    let cli = Cli::parse();

    let config = EngineConfig {
        frequency: cli.frequency,
        note_duration_secs: cli.duration,
        ..Default::default()
    };
    let mut oscillator = Oscillator::new(&config)?;
    let note = oscillator.render_note(cli.frequency)?;
    info!("rendering {} Hz for {} s in {} buffers", cli.frequency, cli.duration, note.len());

    if cli.output.as_os_str() == "-" {
        // stdout cannot seek, so the whole note is buffered before the header goes out
        let samples: Vec<i16> = note.flat_map(|batch| batch.into_samples()).collect();
        let bytes = wav::encode_wav(&config.wav_format(), &samples)?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    } else {
        let mut writer = WavWriter::create(&cli.output, config.wav_format())?;
        for batch in note {
            writer.append_samples(&batch)?;
        }
        writer.finalize()?;
        info!("wrote {} data bytes to {}", writer.data_bytes(), cli.output.display());
    }
    Ok(())
}
