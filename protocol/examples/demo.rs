//! Walk-through of an SGAIP identity proof, verified entirely offline.
//!
//! An agent generates a keypair and derives its Agent ID; a verifier issues a
//! challenge; the agent signs it; the verifier checks the proof without any
//! registry or network. The demo then shows the three ways a proof gets
//! rejected: wrong challenge, wrong AID, and replay.
//!
//! Run with:
//!   cargo run --example demo

use std::sync::Arc;
use std::time::Instant;

use sgaip_protocol::{
    derive, derive_aid, sign, AgentId, AgentKeypair, Algorithm, ChallengeManager,
    ChallengeVerifier, Proof, ProofOutcome, ProtocolVersion,
};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                              {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    SGAIP  --  Stateless Agent Identity, Offline Proof Demo   {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    Ed25519 + SHA-256  |  no registry, no network             {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                              {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]================================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str, outcome: ProofOutcome) {
    println!(
        "{RED}  [REJECTED] {text}{RESET} {DIM}({}: {}){RESET}",
        outcome,
        outcome.reason()
    );
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let us = elapsed.as_secs_f64() * 1_000_000.0;
    println!("{DIM}  [{label}: {us:.1} us]{RESET}");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    banner();

    // Step 1: the agent creates its identity.
    section(1, "Generate Keypair");
    let t = Instant::now();
    let agent = AgentKeypair::generate().expect("OS entropy");
    timing("keygen", t.elapsed());
    let public_key = agent.public_key_bytes();
    info("Public key", &hex::encode(public_key));
    info("Secret key", &format!("{} bytes (never printed)", agent.secret_key_bytes().len()));

    section(2, "Derive Agent ID");
    let aid = derive_aid(&public_key).expect("valid Ed25519 key");
    info("Agent ID (v1)", &aid.to_hex());
    let aid_v2 = derive(Algorithm::Ed25519, &public_key, ProtocolVersion::V2).expect("valid key");
    info("Agent ID (v2)", &aid_v2.to_hex());
    assert_eq!(aid, derive_aid(&public_key).expect("valid key"));
    success("Derivation is deterministic: same key, same AID, every time");

    // Step 3: the verifier issues a single-use challenge.
    section(3, "Issue Challenge");
    let verifier =
        ChallengeVerifier::new(Arc::new(ChallengeManager::default()), ProtocolVersion::V1);
    let challenge = verifier.issue().expect("challenge");
    info("Challenge", &challenge.to_hex());
    info("Outstanding", &verifier.challenges().outstanding().to_string());

    section(4, "Sign Challenge");
    let signature =
        sign(agent.secret_key_bytes().as_slice(), challenge.as_bytes()).expect("32-byte key");
    info("Signature", &signature.to_hex());

    let proof = Proof {
        algorithm: Algorithm::Ed25519,
        public_key: public_key.to_vec(),
        signature: signature.as_bytes().to_vec(),
        challenge: challenge.as_bytes().to_vec(),
        claimed_aid: aid,
    };

    section(5, "Verify Proof");
    let t = Instant::now();
    let result = verifier.verify(&proof).expect("well-formed proof");
    timing("verify", t.elapsed());
    if result.valid {
        success("Identity verified offline");
        info("Derived Agent ID", &result.derived_aid.to_hex());
    } else {
        rejected("Identity verification failed", result.outcome);
    }

    // Step 6: a signature over some other challenge.
    section(6, "Wrong Challenge");
    let fresh = verifier.issue().expect("challenge");
    let mut wrong_challenge = proof.clone();
    wrong_challenge.challenge = fresh.as_bytes().to_vec();
    let result = verifier.verify(&wrong_challenge).expect("well-formed proof");
    rejected("Signature does not cover this challenge", result.outcome);

    section(7, "Wrong Agent ID");
    let fresh = verifier.issue().expect("challenge");
    let mut wrong_aid = Proof::create(&agent, fresh.as_bytes(), ProtocolVersion::V1)
        .expect("proof");
    wrong_aid.claimed_aid = AgentId::from_bytes([0u8; 32]);
    let result = verifier.verify(&wrong_aid).expect("well-formed proof");
    rejected("Claimed AID is not this key's AID", result.outcome);

    section(8, "Replay");
    let result = verifier.verify(&proof).expect("well-formed proof");
    rejected("Challenge was already redeemed", result.outcome);

    println!();
    success("All steps completed");
    println!();
}
