use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use xid::Xid;

/// Largest batch `xid new` will produce in one invocation.
pub const MAX_COUNT: usize = 10_000_000;

/// Command-line arguments for the `xid` binary.
///
/// Every option can also be supplied through the environment (or a `.env`
/// file loaded at startup).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "xid",
    version,
    about = "Generate, inspect and convert globally unique, sortable 12-byte identifiers"
)]
pub struct CliArgs {
    /// Emit logs as JSON lines instead of human-readable text.
    ///
    /// Logs are written to stderr and filtered by `RUST_LOG` (default
    /// `warn`).
    ///
    /// Environment variable: `XID_LOG_JSON`
    #[arg(long, env = "XID_LOG_JSON", global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: CommandArgs,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CommandArgs {
    /// Generate new identifiers, one per line.
    New {
        /// Number of identifiers to generate.
        ///
        /// Environment variable: `XID_COUNT`
        #[arg(short = 'n', long, env = "XID_COUNT", default_value_t = 1)]
        count: usize,

        /// Output form of each identifier.
        ///
        /// Environment variable: `XID_FORMAT`
        #[arg(long, env = "XID_FORMAT", value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Decode an identifier and print its fields.
    Inspect {
        /// The 20-character text form.
        xid: String,

        /// Print the fields as a JSON object.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the binary form of an identifier as hex.
    ToBin {
        /// The 20-character text form.
        xid: String,
    },
    /// Print the text form of a hex-encoded 12-byte identifier.
    FromBin {
        /// 24 hex digits.
        hex: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// 20-character base32hex text.
    #[default]
    Text,
    /// 24 lowercase hex digits of the raw bytes.
    Hex,
}

/// A validated command with its inputs already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New { count: usize, format: OutputFormat },
    Inspect { id: Xid, json: bool },
    ToBin { id: Xid },
    FromBin { id: Xid },
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub log_json: bool,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let command = match args.command {
            CommandArgs::New { count, format } => {
                if count == 0 {
                    bail!("XID_COUNT must be greater than 0");
                }
                if count > MAX_COUNT {
                    bail!("XID_COUNT ({count}) exceeds the maximum of {MAX_COUNT}");
                }
                Command::New { count, format }
            }
            CommandArgs::Inspect { xid, json } => Command::Inspect {
                id: parse_text(&xid)?,
                json,
            },
            CommandArgs::ToBin { xid } => Command::ToBin {
                id: parse_text(&xid)?,
            },
            CommandArgs::FromBin { hex } => Command::FromBin {
                id: parse_hex(&hex)?,
            },
        };

        Ok(Self {
            log_json: args.log_json,
            command,
        })
    }
}

fn parse_text(text: &str) -> anyhow::Result<Xid> {
    text.trim()
        .parse()
        .with_context(|| format!("invalid xid {text:?}"))
}

fn parse_hex(text: &str) -> anyhow::Result<Xid> {
    let bytes = hex::decode(text.trim()).with_context(|| format!("invalid hex {text:?}"))?;
    Xid::decode_bytes(&bytes).with_context(|| format!("invalid binary xid {text:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "9m4e2mr0ui3e8a215n4g";
    const HEX: &str = "4d88e15b60f486e428412dc9";

    fn config(argv: &[&str]) -> anyhow::Result<CliConfig> {
        let args = CliArgs::try_parse_from(argv)?;
        CliConfig::try_from(args)
    }

    #[test]
    fn new_defaults_to_one_text_id() {
        let cfg = config(&["xid", "new"]).unwrap();
        assert_eq!(
            cfg.command,
            Command::New {
                count: 1,
                format: OutputFormat::Text
            }
        );
    }

    #[test]
    fn new_accepts_count_and_format() {
        let cfg = config(&["xid", "new", "-n", "5", "--format", "hex"]).unwrap();
        assert_eq!(
            cfg.command,
            Command::New {
                count: 5,
                format: OutputFormat::Hex
            }
        );
    }

    #[test]
    fn new_rejects_zero_and_oversized_counts() {
        assert!(config(&["xid", "new", "-n", "0"]).is_err());
        assert!(config(&["xid", "new", "-n", "10000001"]).is_err());
    }

    #[test]
    fn inspect_decodes_text() {
        let cfg = config(&["xid", "inspect", TEXT, "--json"]).unwrap();
        let Command::Inspect { id, json } = cfg.command else {
            panic!("expected inspect");
        };
        assert!(json);
        assert_eq!(id.time(), 1_300_816_219);
    }

    #[test]
    fn inspect_rejects_malformed_text() {
        let err = config(&["xid", "inspect", "not-an-xid"]).unwrap_err();
        assert!(err.to_string().contains("invalid xid"), "{err}");
    }

    #[test]
    fn from_bin_decodes_hex() {
        let cfg = config(&["xid", "from-bin", HEX]).unwrap();
        assert_eq!(
            cfg.command,
            Command::FromBin {
                id: TEXT.parse().unwrap()
            }
        );
    }

    #[test]
    fn from_bin_rejects_wrong_length_and_bad_hex() {
        assert!(config(&["xid", "from-bin", "4d88"]).is_err());
        assert!(config(&["xid", "from-bin", "zz88e15b60f486e428412dc9"]).is_err());
    }

    #[test]
    fn log_json_is_global() {
        let cfg = config(&["xid", "to-bin", TEXT, "--log-json"]).unwrap();
        assert!(cfg.log_json);
        assert_eq!(
            cfg.command,
            Command::ToBin {
                id: TEXT.parse().unwrap()
            }
        );
    }
}
