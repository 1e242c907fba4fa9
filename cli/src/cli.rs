//! # CLI Interface
//!
//! Defines the command-line argument structure for `sgaip` using `clap`
//! derive. Key files are raw bytes: 32 for a private key, 32 for a public
//! key, 64 for a signature.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use sgaip_protocol::ProtocolVersion;

/// SGAIP reference tool.
///
/// Generates agent keys, derives Agent IDs, signs challenges and verifies
/// signatures offline. No network access, no registry.
#[derive(Parser, Debug)]
#[command(
    name = "sgaip",
    about = "SGAIP reference command-line tool",
    version,
    propagate_version = true
)]
pub struct SgaipCli {
    /// Default log filter when `RUST_LOG` is not set.
    #[arg(
        long,
        global = true,
        env = "SGAIP_LOG",
        default_value = "sgaip=info,sgaip_protocol=warn"
    )]
    pub log: String,

    /// Log output format: `pretty` or `json`. Logs go to stderr.
    #[arg(long, global = true, env = "SGAIP_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new key pair and print its Agent ID.
    Keygen(KeygenArgs),
    /// Derive the Agent ID of a public key file.
    Aid(AidArgs),
    /// Sign a message or file with a private key.
    Sign(SignArgs),
    /// Produce a fresh random challenge.
    Challenge(ChallengeArgs),
    /// Verify a signature offline and report the signer's Agent ID.
    Verify(VerifyArgs),
    /// Print version and protocol constants.
    Version,
}

/// Protocol version selector.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolArg {
    /// `SHA-256(pk || "SGAIP-v1")`.
    #[default]
    V1,
    /// `SHA-256(0x02 || alg || pk || "SGAIP-v2")`.
    V2,
}

impl From<ProtocolArg> for ProtocolVersion {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::V1 => ProtocolVersion::V1,
            ProtocolArg::V2 => ProtocolVersion::V2,
        }
    }
}

/// Data to sign or verify: exactly one of an inline message or a file.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// UTF-8 message, signed as its raw bytes.
    #[arg(long)]
    pub message: Option<String>,

    /// File whose contents are signed.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Where to write the 32-byte private key. Created owner-only on Unix.
    #[arg(long, default_value = "agent.sk")]
    pub private: PathBuf,

    /// Where to write the 32-byte public key.
    #[arg(long, default_value = "agent.pk")]
    pub public: PathBuf,
}

/// Arguments for the `aid` subcommand.
#[derive(Parser, Debug)]
pub struct AidArgs {
    /// Public key file.
    #[arg(long, default_value = "agent.pk")]
    pub public: PathBuf,

    /// Protocol version to derive under.
    #[arg(long, value_enum, default_value_t = ProtocolArg::V1)]
    pub protocol: ProtocolArg,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Private key file.
    #[arg(long)]
    pub private: PathBuf,

    #[command(flatten)]
    pub input: InputArgs,

    /// Where to write the 64-byte signature.
    #[arg(long, default_value = "signature.bin")]
    pub out: PathBuf,
}

/// Arguments for the `challenge` subcommand.
#[derive(Parser, Debug)]
pub struct ChallengeArgs {
    /// Also write the raw challenge bytes to this file.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Challenge length in bytes.
    #[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u16).range(32..))]
    pub length: u16,
}

/// Arguments for the `verify` subcommand.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Public key file.
    #[arg(long)]
    pub public: PathBuf,

    /// Signature file.
    #[arg(long)]
    pub signature: PathBuf,

    #[command(flatten)]
    pub input: InputArgs,

    /// Expected Agent ID. When given, the signer's derived AID must match.
    #[arg(long)]
    pub aid: Option<String>,

    /// Protocol version for AID derivation.
    #[arg(long, value_enum, default_value_t = ProtocolArg::V1)]
    pub protocol: ProtocolArg,

    /// Print the verification result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        SgaipCli::command().debug_assert();
    }

    #[test]
    fn sign_requires_exactly_one_input() {
        let neither = SgaipCli::try_parse_from(["sgaip", "sign", "--private", "k"]);
        assert!(neither.is_err());

        let both = SgaipCli::try_parse_from([
            "sgaip", "sign", "--private", "k", "--message", "m", "--file", "f",
        ]);
        assert!(both.is_err());

        let one = SgaipCli::try_parse_from(["sgaip", "sign", "--private", "k", "--message", "m"]);
        assert!(one.is_ok());
    }

    #[test]
    fn challenge_length_has_a_floor() {
        assert!(SgaipCli::try_parse_from(["sgaip", "challenge", "--length", "16"]).is_err());
        let cli = SgaipCli::try_parse_from(["sgaip", "challenge", "--length", "48"]).unwrap();
        match cli.command {
            Commands::Challenge(args) => assert_eq!(args.length, 48),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn protocol_flag_maps_to_version() {
        let cli = SgaipCli::try_parse_from(["sgaip", "aid", "--protocol", "v2"]).unwrap();
        match cli.command {
            Commands::Aid(args) => {
                assert_eq!(ProtocolVersion::from(args.protocol), ProtocolVersion::V2)
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
