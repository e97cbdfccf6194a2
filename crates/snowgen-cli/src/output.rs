use std::io::Write;

use serde::Serialize;
use snowgen::SnowflakeId;

use crate::config::OutputFormat;

/// Every field of an ID, decoded, as printed by `--format json` and
/// `decode --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedId {
    pub id: SnowflakeId,
    #[serde(with = "snowgen::as_padded_string")]
    pub padded: SnowflakeId,
    pub timestamp: u64,
    pub unix_millis: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl From<SnowflakeId> for DecodedId {
    fn from(id: SnowflakeId) -> Self {
        Self {
            id,
            padded: id,
            timestamp: id.timestamp(),
            unix_millis: id.unix_millis(),
            datacenter_id: id.datacenter_id(),
            worker_id: id.worker_id(),
            sequence: id.sequence(),
        }
    }
}

/// Writes one generated ID followed by a newline.
pub fn write_id<W: Write>(
    out: &mut W,
    id: SnowflakeId,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Decimal => writeln!(out, "{id}")?,
        OutputFormat::Padded => writeln!(out, "{}", id.to_padded_string())?,
        OutputFormat::Debug => writeln!(out, "{id:?}")?,
        OutputFormat::Json => write_json(out, id)?,
    }
    Ok(())
}

/// Writes the decoded fields of `id` as a single line.
pub fn write_decoded<W: Write>(out: &mut W, id: SnowflakeId, json: bool) -> anyhow::Result<()> {
    if json {
        return write_json(out, id);
    }
    writeln!(
        out,
        "{id} timestamp={} unix_ms={} datacenter={} worker={} sequence={}",
        id.timestamp(),
        id.unix_millis(),
        id.datacenter_id(),
        id.worker_id(),
        id.sequence(),
    )?;
    Ok(())
}

fn write_json<W: Write>(out: &mut W, id: SnowflakeId) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, &DecodedId::from(id))?;
    writeln!(out)?;
    Ok(())
}
