// Copyright (c) 2026 SGAIP Contributors. MIT License.
// See LICENSE for details.

//! # SGAIP Command-Line Tool
//!
//! Entry point for the `sgaip` binary. Parses CLI arguments, initializes
//! logging, and dispatches to a subcommand:
//!
//! - `keygen`    — generate raw key files and print the Agent ID
//! - `aid`       — derive the Agent ID of a public key file
//! - `sign`      — sign a message or file
//! - `challenge` — produce a random challenge
//! - `verify`    — verify a signature offline
//! - `version`   — print version and protocol constants
//!
//! Exit status is 0 on success, 2 when verification fails, 1 on any other
//! error.

mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::{Commands, SgaipCli};
use logging::LogFormat;

/// Exit status for a signature or AID that does not verify.
const EXIT_VERIFICATION_FAILED: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = SgaipCli::parse();
    logging::init_logging(&cli.log, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Keygen(args) => commands::keygen(&args).map(|_| ExitCode::SUCCESS),
        Commands::Aid(args) => commands::aid(&args).map(|_| ExitCode::SUCCESS),
        Commands::Sign(args) => commands::sign(&args).map(|_| ExitCode::SUCCESS),
        Commands::Challenge(args) => commands::challenge(&args).map(|_| ExitCode::SUCCESS),
        Commands::Verify(args) => match commands::verify(&args)? {
            Some(_) => Ok(ExitCode::SUCCESS),
            None => Ok(ExitCode::from(EXIT_VERIFICATION_FAILED)),
        },
        Commands::Version => {
            commands::version();
            Ok(ExitCode::SUCCESS)
        }
    }
}
