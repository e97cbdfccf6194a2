use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use snowgen::{ConfigError, Identity, SnowflakeId};

/// Command-line interface for the `snowgen` binary.
///
/// Every `generate` option can also be supplied through a `SNOWGEN_*`
/// environment variable or a `.env` file in the working directory. Flags win
/// over the environment.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowgen",
    version,
    about = "Generate and decode Snowflake IDs"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate IDs for one worker/datacenter identity, one per line.
    Generate(GenerateArgs),
    /// Print the fields packed into existing IDs.
    Decode(DecodeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Number of IDs to print.
    ///
    /// Environment variable: `SNOWGEN_COUNT`
    #[arg(short = 'n', long, env = "SNOWGEN_COUNT", default_value_t = 1)]
    pub count: u64,

    /// Worker ID embedded in every ID. Must be within `0..=31` and unique
    /// among the generators sharing a datacenter ID.
    ///
    /// Environment variable: `SNOWGEN_WORKER_ID`
    #[arg(short, long, env = "SNOWGEN_WORKER_ID", allow_negative_numbers = true)]
    pub worker_id: i64,

    /// Datacenter ID embedded in every ID. Must be within `0..=31`.
    ///
    /// Environment variable: `SNOWGEN_DATACENTER_ID`
    #[arg(short, long, env = "SNOWGEN_DATACENTER_ID", allow_negative_numbers = true)]
    pub datacenter_id: i64,

    /// Sequence the generator starts from. Must be within `0..=4095`.
    ///
    /// Environment variable: `SNOWGEN_INITIAL_SEQUENCE`
    #[arg(long, env = "SNOWGEN_INITIAL_SEQUENCE", default_value_t = 0)]
    pub initial_sequence: u64,

    /// Time source used to stamp IDs.
    ///
    /// Environment variable: `SNOWGEN_CLOCK`
    #[arg(long, env = "SNOWGEN_CLOCK", value_enum, default_value_t = ClockKind::System)]
    pub clock: ClockKind,

    /// How each ID is printed.
    ///
    /// Environment variable: `SNOWGEN_FORMAT`
    #[arg(long, env = "SNOWGEN_FORMAT", value_enum, default_value_t = OutputFormat::Decimal)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// IDs to decode, in decimal.
    #[arg(required = true, value_parser = parse_id)]
    pub ids: Vec<SnowflakeId>,

    /// Print one JSON object per ID instead of text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Wall clock. Fails the run if the host clock is set back.
    System,
    /// Wall clock anchored once at startup and advanced by a monotonic timer.
    Monotonic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain decimal integer.
    Decimal,
    /// Decimal zero-padded to 20 digits, so IDs sort lexicographically.
    Padded,
    /// Bit layout table.
    Debug,
    /// One JSON object per line with every field decoded.
    Json,
}

/// Validated settings for `snowgen generate`.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub identity: Identity,
    pub initial_sequence: u64,
    pub clock: ClockKind,
    pub count: u64,
    pub format: OutputFormat,
}

impl TryFrom<GenerateArgs> for GeneratorConfig {
    type Error = anyhow::Error;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        if args.count == 0 {
            bail!("SNOWGEN_COUNT must be greater than 0");
        }

        let identity = Identity::new(args.worker_id, args.datacenter_id)
            .context("invalid generator identity")?;

        if args.initial_sequence > SnowflakeId::MAX_SEQUENCE {
            return Err(ConfigError::SequenceOutOfRange {
                sequence: args.initial_sequence,
                max: SnowflakeId::MAX_SEQUENCE,
            })
            .context("invalid initial sequence");
        }

        Ok(Self {
            identity,
            initial_sequence: args.initial_sequence,
            clock: args.clock,
            count: args.count,
            format: args.format,
        })
    }
}

fn parse_id(raw: &str) -> Result<SnowflakeId, String> {
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("`{raw}` is not an unsigned 64-bit integer: {e}"))?;
    let id = SnowflakeId::from_raw(value);
    if !id.is_valid() {
        return Err(format!("`{raw}` has the reserved high bit set"));
    }
    Ok(id)
}
