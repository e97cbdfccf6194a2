mod config;
mod output;
mod telemetry;

use std::io::{BufWriter, Write};

use anyhow::Context;
use clap::Parser;
use config::{ClockKind, CliArgs, Command, DecodeArgs, GeneratorConfig};
use snowgen::{LockSnowflakeGenerator, MonotonicClock, SystemClock, TimeSource};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    init_telemetry()?;

    match args.command {
        Command::Generate(args) => {
            let config = GeneratorConfig::try_from(args)?;
            if cfg!(debug_assertions) {
                tracing::debug!("Generating with full config: {:#?}", config);
            }
            let mut out = BufWriter::new(std::io::stdout().lock());
            match config.clock {
                ClockKind::System => generate(&config, SystemClock, &mut out)?,
                ClockKind::Monotonic => generate(&config, MonotonicClock::new(), &mut out)?,
            }
            out.flush()?;
        }
        Command::Decode(args) => {
            let mut out = BufWriter::new(std::io::stdout().lock());
            decode(&args, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn generate<T: TimeSource, W: Write>(
    config: &GeneratorConfig,
    time: T,
    out: &mut W,
) -> anyhow::Result<()> {
    let generator =
        LockSnowflakeGenerator::with_sequence(config.identity, config.initial_sequence, time)?;

    tracing::info!(
        worker_id = generator.worker_id(),
        datacenter_id = generator.datacenter_id(),
        count = config.count,
        "Generating IDs"
    );

    for n in 0..config.count {
        let id = generator
            .next_id()
            .with_context(|| format!("failed to generate ID {} of {}", n + 1, config.count))?;
        output::write_id(out, id, config.format)?;
    }
    Ok(())
}

fn decode<W: Write>(args: &DecodeArgs, out: &mut W) -> anyhow::Result<()> {
    for &id in &args.ids {
        output::write_decoded(out, id, args.json)?;
    }
    Ok(())
}
