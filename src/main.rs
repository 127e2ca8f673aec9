use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod auth;
use saltcellar::{
    CredentialHasher, DEFAULT_ITERATIONS, KdfParams, PasswordHash, Prf, Registry, Salt, Storage,
    decode, decode_lenient, default_storage, verify_with,
};

#[derive(Debug, clap::Args)]
struct KdfArgs {
    /// PBKDF2 iterations for new hashes
    #[arg(long, global = true, env = "SALTCELLAR_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,

    /// PBKDF2 pseudorandom function for new hashes (sha1 or sha256)
    #[arg(long, global = true, env = "SALTCELLAR_PRF", default_value_t = Prf::HmacSha1)]
    prf: Prf,
}

impl KdfArgs {
    fn to_kdf_params(&self) -> Result<KdfParams> {
        Ok(KdfParams::new(self.prf, self.iterations)?)
    }

    fn hasher(&self) -> Result<CredentialHasher> {
        Ok(CredentialHasher::new().with_kdf(self.to_kdf_params()?))
    }
}

fn resolve_storage(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => default_storage(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "saltcellar")]
#[command(version, about = "Salted PBKDF2 credential hashing and verification.")]
struct Cli {
    /// Path to the credential file
    #[arg(long, global = true, value_name = "PATH", env = "SALTCELLAR_STORE")]
    store: Option<PathBuf>,

    #[command(flatten)]
    kdf: KdfArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Adds a user with a new password
    #[command(arg_required_else_help = true)]
    Add { username: String },

    /// Checks a user's password
    #[command(arg_required_else_help = true)]
    Verify { username: String },

    /// Removes a user
    #[command(arg_required_else_help = true)]
    Remove { username: String },

    /// Lists stored users
    List {
        /// Also print creation time and failed attempts
        #[arg(short, long, default_value_t = false)]
        all: bool,
    },

    /// Hashes a password under a fresh salt and prints both encoded
    Hash,

    /// Checks a password against an encoded salt and hash
    Check {
        #[arg(long)]
        salt: String,
        #[arg(long)]
        hash: String,
        /// Re-encode values that are not valid base64 instead of failing
        #[arg(long, default_value_t = false)]
        legacy_decode: bool,
    },

    /// Prints a fresh encoded salt
    Salt,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Only commands that create hashes read `--iterations`/`--prf`; stored records
/// are verified with their own parameters.
fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Add { username } => {
            let storage = resolve_storage(cli.store)?;
            let mut registry = Registry::open_with_hasher(storage, cli.kdf.hasher()?)?;
            let password = auth::read_new_password_with_confirmation()?;
            registry.add_user(&username, &password)?;
            registry.save()?;
            println!("added user '{username}'");
        }
        Commands::Verify { username } => {
            let storage = resolve_storage(cli.store)?;
            let mut registry = Registry::open(storage)?;
            let password = auth::read_password()?;
            let accepted = registry.verify_user(&username, &password)?;
            registry.save()?;
            if accepted {
                println!("password accepted");
            } else {
                println!("password rejected");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Remove { username } => {
            let storage = resolve_storage(cli.store)?;
            let mut registry = Registry::open(storage)?;
            registry.remove_user(&username)?;
            registry.save()?;
            println!("user '{username}' removed");
        }
        Commands::List { all } => {
            let storage = resolve_storage(cli.store)?;
            let registry = Registry::open(storage)?;
            if all {
                print_table(&registry);
            } else {
                for username in registry.list() {
                    println!("{username}");
                }
            }
        }
        Commands::Hash => {
            let password = auth::read_password()?;
            let (salt, hash) = cli.kdf.hasher()?.create(&password)?;
            println!("salt: {}", salt.to_encoded());
            println!("hash: {}", hash.to_encoded());
        }
        Commands::Check {
            salt,
            hash,
            legacy_decode,
        } => {
            let (salt, expected) = if legacy_decode {
                (decode_lenient(&salt), decode_lenient(&hash))
            } else {
                (
                    decode(&salt).context("invalid --salt")?,
                    decode(&hash).context("invalid --hash")?,
                )
            };
            let salt = Salt::from_slice(&salt)?;
            let expected = PasswordHash::from_slice(&expected)?;

            let kdf = cli.kdf.to_kdf_params()?;
            let password = auth::read_password()?;
            if verify_with(&password, &salt, expected.as_ref(), kdf)? {
                println!("password accepted");
            } else {
                println!("password rejected");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Salt => {
            println!("{}", CredentialHasher::new().generate_salt()?.to_encoded());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_table(registry: &Registry) {
    let records = registry.list_all();
    if records.is_empty() {
        println!("No users stored.");
        return;
    }

    let name_width = records
        .iter()
        .map(|r| r.username().len())
        .chain(std::iter::once("User".len()))
        .max()
        .unwrap_or(0);
    let created_width = records
        .iter()
        .map(|r| r.created().len())
        .chain(std::iter::once("Created".len()))
        .max()
        .unwrap_or(0);

    println!("{:<name_width$}  {:<created_width$}  Failed", "User", "Created");
    println!("{:-<name_width$}  {:-<created_width$}  ------", "", "");
    for r in records {
        println!(
            "{:<name_width$}  {:<created_width$}  {}",
            r.username(),
            r.created(),
            r.failed_attempts()
        );
    }
}
