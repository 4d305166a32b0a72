//! Yappr Auth CLI
//!
//! Debug tool for the wallet key exchange:
//!
//! 1. **inspect**: decode a scanned `dash-key:` or `dash-st:` URI.
//! 2. **wif**: show what a WIF private key controls (never the key itself).
//! 3. **derive**: show the public keys a login key derives for an identity.
//! 4. **request**: produce a fresh `dash-key:` login request URI.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};

use yappr_auth_core::crypto::{
    derive_auth_key, derive_encryption_key, derive_encryption_key_from_auth, hash160,
};
use yappr_auth_core::{wif, IdentityId, LoginKey, LoginSession, Network, ProtocolUri};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "yappr-auth", version, about = "Yappr wallet key-exchange tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a dash-key: or dash-st: URI
    Inspect {
        /// The URI, as scanned
        uri: String,
    },

    /// Show the public key and hash160 behind a WIF private key
    Wif {
        /// WIF-encoded private key
        wif: String,

        /// Network the key is expected to belong to
        #[arg(long, default_value = "testnet", env = "YAPPR_NETWORK")]
        network: Network,
    },

    /// Show the public keys derived from a login key
    Derive {
        /// Login key, 64 hex characters
        #[arg(long, env = "YAPPR_LOGIN_KEY")]
        login_key: String,

        /// Identity id in Base58
        #[arg(long)]
        identity: IdentityId,
    },

    /// Create a login request URI with a fresh ephemeral key
    Request {
        /// Data contract id, 64 hex characters
        #[arg(long, env = "YAPPR_CONTRACT_ID")]
        contract: String,

        /// Login key index
        #[arg(long, default_value_t = 0)]
        key_index: u32,

        /// Label shown by the wallet (at most 64 bytes)
        #[arg(long, default_value = "")]
        label: String,

        /// Target network
        #[arg(long, default_value = "testnet", env = "YAPPR_NETWORK")]
        network: Network,
    },
}

// ── Entry Point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yappr_auth=info,yappr_auth_core=info".into()),
        )
        .init();

    match Args::parse().command {
        Command::Inspect { uri } => inspect(&uri),
        Command::Wif { wif, network } => show_wif(&wif, network),
        Command::Derive {
            login_key,
            identity,
        } => derive(&login_key, &identity),
        Command::Request {
            contract,
            key_index,
            label,
            network,
        } => request(&contract, key_index, label, network),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn inspect(uri: &str) -> Result<()> {
    match uri.trim().parse::<ProtocolUri>()? {
        ProtocolUri::KeyExchange(request, network) => {
            println!("scheme:          dash-key");
            println!("network:         {}", network);
            println!("ephemeral key:   {}", hex::encode(request.app_ephemeral_pub_key));
            println!("contract id:     {}", hex::encode(request.contract_id));
            println!("key index:       {}", request.key_index);
            println!("label:           {:?}", request.label);
            Ok(())
        }
        ProtocolUri::StateTransition(request) => {
            println!("scheme:          dash-st");
            println!("network:         {}", request.network);
            println!("transition type: {}", request.transition_type.code());
            println!("transition size: {} bytes", request.transition_bytes.len());
            println!("transition:      {}", hex::encode(&request.transition_bytes));
            Ok(())
        }
    }
}

fn show_wif(encoded: &str, network: Network) -> Result<()> {
    let decoded = wif::decode(encoded)?;
    let public_key = decoded.private_key.public_key();

    println!("network prefix:  0x{:02x}", decoded.network_prefix);
    println!(
        "matches {}: {}",
        network,
        wif::validate_network(decoded.network_prefix, network)
    );
    println!("compressed:      {}", decoded.compressed);
    println!("public key:      {}", hex::encode(public_key));
    println!("hash160:         {}", hex::encode(hash160(&public_key)));
    Ok(())
}

fn derive(login_key_hex: &str, identity: &IdentityId) -> Result<()> {
    let login_key = LoginKey::from_bytes(&hex::decode(login_key_hex.trim())?)?;

    let auth = derive_auth_key(login_key.as_bytes(), identity.as_bytes())?;
    let encryption = derive_encryption_key(login_key.as_bytes(), identity.as_bytes())?;
    let bootstrap = derive_encryption_key_from_auth(auth.as_bytes(), &identity.to_base58())?;

    println!("identity:                 {}", identity);
    println!("auth public key:          {}", hex::encode(auth.public_key()?));
    println!("encryption public key:    {}", hex::encode(encryption.public_key()?));
    println!("encryption key from auth: {}", hex::encode(bootstrap.public_key()?));
    Ok(())
}

fn request(contract_hex: &str, key_index: u32, label: String, network: Network) -> Result<()> {
    let contract_id: [u8; 32] = hex::decode(contract_hex.trim())?
        .try_into()
        .map_err(|bytes: Vec<u8>| eyre!("contract id must be 32 bytes, got {}", bytes.len()))?;

    let session = LoginSession::new(contract_id, key_index, label, network)?;
    println!("{}", session.uri());
    Ok(())
}
