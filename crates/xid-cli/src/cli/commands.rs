use std::io::Write;

use serde::Serialize;
use xid::{TimeSource, Xid, XidGenerator};

use super::config::{Command, OutputFormat};

/// Fields of a decoded identifier, as printed by `xid inspect`.
#[derive(Debug, Serialize)]
struct Inspection {
    xid: Xid,
    hex: String,
    time: u32,
    machine: String,
    pid: u16,
    counter: u32,
}

impl From<Xid> for Inspection {
    fn from(id: Xid) -> Self {
        Self {
            xid: id,
            hex: hex::encode(id.as_bytes()),
            time: id.time(),
            machine: hex::encode(id.machine()),
            pid: id.pid(),
            counter: id.counter(),
        }
    }
}

/// Runs a validated command, writing its output to `out`.
pub fn run<W: Write>(command: &Command, out: &mut W) -> anyhow::Result<()> {
    match *command {
        Command::New { count, format } => {
            let generator = XidGenerator::new();
            generate(&generator, count, format, out)
        }
        Command::Inspect { id, json } => inspect(id, json, out),
        Command::ToBin { id } => {
            writeln!(out, "{}", hex::encode(id.as_bytes()))?;
            Ok(())
        }
        Command::FromBin { id } => {
            writeln!(out, "{id}")?;
            Ok(())
        }
    }
}

pub fn generate<T, W>(
    generator: &XidGenerator<T>,
    count: usize,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()>
where
    T: TimeSource<u32>,
    W: Write,
{
    tracing::debug!(count, ?format, "generating identifiers");

    let mut buf = [0u8; Xid::ENCODED_LEN];
    for _ in 0..count {
        let id = generator.generate();
        match format {
            OutputFormat::Text => writeln!(out, "{}", id.encode_to_buf(&mut buf))?,
            OutputFormat::Hex => writeln!(out, "{}", hex::encode(id.as_bytes()))?,
        }
    }
    Ok(())
}

fn inspect<W: Write>(id: Xid, json: bool, out: &mut W) -> anyhow::Result<()> {
    let inspection = Inspection::from(id);
    if json {
        serde_json::to_writer(&mut *out, &inspection)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "xid      {}", inspection.xid)?;
    writeln!(out, "hex      {}", inspection.hex)?;
    writeln!(out, "time     {}", inspection.time)?;
    writeln!(out, "machine  {}", inspection.machine)?;
    writeln!(out, "pid      {}", inspection.pid)?;
    writeln!(out, "counter  {}", inspection.counter)?;
    Ok(())
}
