//! Subcommand implementations.
//!
//! Each command does its file I/O here and hands raw bytes to
//! `sgaip_protocol`. Secrets read from disk live in [`Zeroizing`] buffers and
//! never reach a log line or an error message.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

use sgaip_protocol::config::{ChallengeConfig, HASH_FUNCTION, SIGNING_ALGORITHM};
use sgaip_protocol::{
    derive, verify_proof, AgentId, AgentKeypair, Algorithm, ChallengeManager, ProofResult,
    ProtocolVersion,
};

use crate::cli::{AidArgs, ChallengeArgs, InputArgs, KeygenArgs, SignArgs, VerifyArgs};

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

fn read_input(input: &InputArgs) -> Result<Vec<u8>> {
    match (&input.message, &input.file) {
        (Some(message), None) => Ok(message.as_bytes().to_vec()),
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => anyhow::bail!("exactly one of --message or --file is required"),
    }
}

fn load_keypair(path: &Path) -> Result<AgentKeypair> {
    let secret = Zeroizing::new(
        fs::read(path).with_context(|| format!("failed to read private key {}", path.display()))?,
    );
    AgentKeypair::from_secret_slice(&secret)
        .with_context(|| format!("{} is not a raw 32-byte private key", path.display()))
}

/// Write a private key readable by the owner only.
fn write_private_key(path: &Path, secret: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("failed to create private key file {}", path.display()))?;

    // `mode` only applies on creation; tighten an existing file too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(secret)
        .with_context(|| format!("failed to write private key to {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// `keygen`: write a fresh key pair and print its v1 AID.
pub fn keygen(args: &KeygenArgs) -> Result<AgentId> {
    let keypair = AgentKeypair::generate().context("failed to generate key pair")?;
    let public = keypair.public_key_bytes();

    write_private_key(&args.private, keypair.secret_key_bytes().as_slice())?;
    fs::write(&args.public, public)
        .with_context(|| format!("failed to write public key to {}", args.public.display()))?;

    let aid = derive(Algorithm::Ed25519, &public, ProtocolVersion::V1)?;
    tracing::info!(
        aid = %aid,
        private_key = %args.private.display(),
        public_key = %args.public.display(),
        "key pair generated"
    );

    println!("Key pair generated:");
    println!("  Private key : {}", args.private.display());
    println!("  Public key  : {}", args.public.display());
    println!("  Agent ID    : {}", aid);
    Ok(aid)
}

/// `aid`: derive and print the AID of a public key file.
pub fn aid(args: &AidArgs) -> Result<AgentId> {
    let public = fs::read(&args.public)
        .with_context(|| format!("failed to read public key {}", args.public.display()))?;
    let aid = derive(Algorithm::Ed25519, &public, args.protocol.into())
        .with_context(|| format!("cannot derive an AID from {}", args.public.display()))?;
    println!("{}", aid);
    Ok(aid)
}

/// `sign`: sign a message or file and write the raw signature.
pub fn sign(args: &SignArgs) -> Result<()> {
    let keypair = load_keypair(&args.private)?;
    let data = read_input(&args.input)?;
    let signature = keypair.sign(&data);

    fs::write(&args.out, signature.as_bytes())
        .with_context(|| format!("failed to write signature to {}", args.out.display()))?;
    tracing::debug!(bytes = data.len(), out = %args.out.display(), "signed");

    println!("Signature written to {}", args.out.display());
    Ok(())
}

/// `challenge`: print a fresh random challenge as hex, optionally saving the
/// raw bytes.
pub fn challenge(args: &ChallengeArgs) -> Result<Vec<u8>> {
    // Out-of-band use only: the manager dies with this call, so the challenge
    // is not tracked for replay. A verifier must issue through its own
    // long-lived `ChallengeManager`.
    let manager = ChallengeManager::new(ChallengeConfig {
        challenge_len: usize::from(args.length),
        ..ChallengeConfig::default()
    });
    let challenge = manager
        .generate_default()
        .context("failed to generate challenge")?;

    if let Some(out) = &args.out {
        fs::write(out, challenge.as_bytes())
            .with_context(|| format!("failed to write challenge to {}", out.display()))?;
    }
    println!("{}", challenge.to_hex());
    Ok(challenge.as_bytes().to_vec())
}

/// `verify`: check a signature and, if given, the expected AID.
///
/// Returns `Ok(None)` for every verification failure, including malformed
/// keys and signatures, after printing a generic message. The specific
/// reason goes to the log only. I/O failures are still errors.
pub fn verify(args: &VerifyArgs) -> Result<Option<ProofResult>> {
    let public = fs::read(&args.public)
        .with_context(|| format!("failed to read public key {}", args.public.display()))?;
    let signature = fs::read(&args.signature)
        .with_context(|| format!("failed to read signature {}", args.signature.display()))?;
    let data = read_input(&args.input)?;

    let outcome = check(&public, &data, &signature, args.aid.as_deref(), args.protocol.into());
    let result = match outcome {
        Ok(result) if result.valid => result,
        Ok(result) => {
            tracing::warn!(reason = result.outcome.reason(), "verification failed");
            println!("verification failed");
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!(reason = %e, "verification failed");
            println!("verification failed");
            return Ok(None);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Signature valid");
        println!("Derived Agent ID: {}", result.derived_aid);
    }
    Ok(Some(result))
}

fn check(
    public: &[u8],
    data: &[u8],
    signature: &[u8],
    expected_aid: Option<&str>,
    version: ProtocolVersion,
) -> Result<ProofResult> {
    let derived = derive(Algorithm::Ed25519, public, version)?;
    let claimed = match expected_aid {
        Some(text) => AgentId::from_hex(text)?,
        None => derived,
    };
    Ok(verify_proof(
        public,
        data,
        signature,
        &claimed,
        Algorithm::Ed25519,
        version,
    )?)
}

/// `version`: print build and protocol information.
pub fn version() {
    println!("sgaip     {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  v1, v2");
    println!("signature {}", SIGNING_ALGORITHM);
    println!("hash      {}", HASH_FUNCTION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProtocolArg;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn keygen(&self) -> AgentId {
            keygen(&KeygenArgs {
                private: self.path("agent.sk"),
                public: self.path("agent.pk"),
            })
            .unwrap()
        }

        fn sign_message(&self, message: &str) {
            sign(&SignArgs {
                private: self.path("agent.sk"),
                input: message_input(message),
                out: self.path("signature.bin"),
            })
            .unwrap();
        }

        fn verify_message(&self, message: &str, aid: Option<String>) -> Option<ProofResult> {
            verify(&VerifyArgs {
                public: self.path("agent.pk"),
                signature: self.path("signature.bin"),
                input: message_input(message),
                aid,
                protocol: ProtocolArg::V1,
                json: false,
            })
            .unwrap()
        }
    }

    fn message_input(message: &str) -> InputArgs {
        InputArgs {
            message: Some(message.to_string()),
            file: None,
        }
    }

    #[test]
    fn keygen_writes_raw_keys() {
        let ws = Workspace::new();
        let aid = ws.keygen();

        let secret = fs::read(ws.path("agent.sk")).unwrap();
        let public = fs::read(ws.path("agent.pk")).unwrap();
        assert_eq!(secret.len(), 32);
        assert_eq!(public.len(), 32);

        let keypair = AgentKeypair::from_secret_slice(&secret).unwrap();
        assert_eq!(keypair.public_key_bytes().as_slice(), public.as_slice());
        assert_eq!(
            derive(Algorithm::Ed25519, &public, ProtocolVersion::V1).unwrap(),
            aid
        );
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let ws = Workspace::new();
        ws.keygen();
        let mode = fs::metadata(ws.path("agent.sk")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn keygen_sign_verify_roundtrip() {
        let ws = Workspace::new();
        let aid = ws.keygen();
        ws.sign_message("hello agent");

        assert_eq!(fs::read(ws.path("signature.bin")).unwrap().len(), 64);

        let result = ws.verify_message("hello agent", None).unwrap();
        assert_eq!(result.derived_aid, aid);

        assert!(ws.verify_message("hello agent", Some(aid.to_hex())).is_some());
    }

    #[test]
    fn verify_rejects_changed_message() {
        let ws = Workspace::new();
        ws.keygen();
        ws.sign_message("original");
        assert!(ws.verify_message("tampered", None).is_none());
    }

    #[test]
    fn verify_rejects_wrong_aid() {
        let ws = Workspace::new();
        ws.keygen();
        ws.sign_message("msg");
        assert!(ws.verify_message("msg", Some("00".repeat(32))).is_none());
        assert!(ws.verify_message("msg", Some("not hex".to_string())).is_none());
    }

    #[test]
    fn verify_treats_truncated_signature_as_failure() {
        let ws = Workspace::new();
        ws.keygen();
        ws.sign_message("msg");
        let sig = fs::read(ws.path("signature.bin")).unwrap();
        fs::write(ws.path("signature.bin"), &sig[..40]).unwrap();
        assert!(ws.verify_message("msg", None).is_none());
    }

    #[test]
    fn sign_from_file_matches_message() {
        let ws = Workspace::new();
        ws.keygen();
        fs::write(ws.path("data.txt"), b"file contents").unwrap();

        sign(&SignArgs {
            private: ws.path("agent.sk"),
            input: InputArgs {
                message: None,
                file: Some(ws.path("data.txt")),
            },
            out: ws.path("signature.bin"),
        })
        .unwrap();

        assert!(ws.verify_message("file contents", None).is_some());
    }

    #[test]
    fn sign_rejects_malformed_private_key() {
        let ws = Workspace::new();
        fs::write(ws.path("bad.sk"), [0u8; 31]).unwrap();
        let err = sign(&SignArgs {
            private: ws.path("bad.sk"),
            input: message_input("msg"),
            out: ws.path("signature.bin"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("not a raw 32-byte private key"));
    }

    #[test]
    fn aid_command_honours_protocol() {
        let ws = Workspace::new();
        let v1 = ws.keygen();
        let derived_v1 = aid(&AidArgs {
            public: ws.path("agent.pk"),
            protocol: ProtocolArg::V1,
        })
        .unwrap();
        let derived_v2 = aid(&AidArgs {
            public: ws.path("agent.pk"),
            protocol: ProtocolArg::V2,
        })
        .unwrap();
        assert_eq!(derived_v1, v1);
        assert_ne!(derived_v2, v1);
    }

    #[test]
    fn challenge_writes_requested_length() {
        let ws = Workspace::new();
        let bytes = challenge(&ChallengeArgs {
            out: Some(ws.path("challenge.bin")),
            length: 48,
        })
        .unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(fs::read(ws.path("challenge.bin")).unwrap(), bytes);
    }
}
