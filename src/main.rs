//! Operator CLI for the identity-linking service.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use alloy_primitives::Address;
    use clap::{Parser, Subcommand};
    use thiserror::Error;
    use tracing_subscriber::EnvFilter;

    use flock_wallet::WalletConfig;
    use flock_wallet::core::{
        CredentialSource, IdentityLinker, IdentityService, RawKey, ServiceError, WalletError,
        parse_recipient,
    };
    use flock_wallet::utils::HttpIdentityService;

    #[derive(Parser)]
    #[command(name = "flock-wallet", about = "Inspect and manage wallet email identities")]
    struct Cli {
        /// TOML file overriding the default configuration.
        #[arg(long, global = true)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Print the public identifier derived from a private key.
        Identify {
            #[arg(long)]
            key: String,
        },
        /// Look up the email linked to a wallet address.
        Lookup {
            #[arg(long)]
            wallet: String,
        },
        /// Link an email to a wallet, signing the credential with its key.
        Link {
            #[arg(long)]
            wallet: String,
            #[arg(long)]
            email: String,
            #[arg(long)]
            key: String,
        },
    }

    #[derive(Debug, Error)]
    enum CliError {
        #[error("failed to read config: {0}")]
        Io(#[from] std::io::Error),
        #[error("invalid config: {0}")]
        Config(#[from] toml::de::Error),
        #[error(transparent)]
        Wallet(#[from] WalletError),
        #[error(transparent)]
        Service(#[from] ServiceError),
        #[error("key does not control wallet {0}")]
        KeyMismatch(Address),
    }

    fn load_config(path: Option<&PathBuf>) -> Result<WalletConfig, CliError> {
        match path {
            Some(path) => Ok(WalletConfig::from_toml_str(&std::fs::read_to_string(path)?)?),
            None => Ok(WalletConfig::default()),
        }
    }

    async fn run(cli: Cli) -> Result<(), CliError> {
        let config = load_config(cli.config.as_ref())?;
        let service = HttpIdentityService::from_config(&config);

        match cli.command {
            Commands::Identify { key } => {
                let key = RawKey::parse(&key)?;
                println!("address:    {}", key.address());
                println!("identifier: {}", key.public_identifier());
            }
            Commands::Lookup { wallet } => {
                let wallet = parse_recipient(&wallet)?;
                match service.fetch_email(&wallet).await? {
                    Some(email) => println!("{email}"),
                    None => println!("no email linked to {wallet}"),
                }
            }
            Commands::Link { wallet, email, key } => {
                let wallet = parse_recipient(&wallet)?;
                let key = RawKey::parse(&key)?;
                if key.address() != wallet {
                    return Err(CliError::KeyMismatch(wallet));
                }
                let linker = IdentityLinker::new(std::rc::Rc::new(service));
                let identity = linker
                    .link_identity(wallet, &email, &CredentialSource::Symmetric { key })
                    .await?;
                println!(
                    "linked {} to {}",
                    identity.email.unwrap_or_default(),
                    identity.address
                );
            }
        }
        Ok(())
    }

    pub fn main() -> ExitCode {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();

        let cli = Cli::parse();
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        };

        match runtime.block_on(run(cli)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
