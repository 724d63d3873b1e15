use clap::{Args, Parser, Subcommand};
use keysigner::cli::{self, Command, MessageInput};
use keysigner::{KeyEncoding, KeySigner, SignerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "keysigner", version, about = "Sign and verify messages with RSA keys (SHA256withRSA)", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). If omitted, keysigner.toml is searched for.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Key encoding: der, pem or auto. Overrides the config file.")]
    encoding: Option<KeyEncoding>,
    #[arg(long, help = "Log level (error|warn|info|debug|trace). Logs are written only when a log dir is configured.")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct MessageArgs {
    #[arg(long, help = "Message text (signed as UTF-8)")]
    message: Option<String>,
    #[arg(long, help = "File whose raw contents are the message")]
    input: Option<PathBuf>,
}

impl MessageArgs {
    fn into_input(self) -> MessageInput {
        match (self.message, self.input) {
            (_, Some(p)) => MessageInput::File(p),
            (Some(m), None) => MessageInput::Text(m),
            (None, None) => MessageInput::Text(String::new()),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Sign a message and print the Base64 signature")]
    Sign {
        #[arg(long, help = "PKCS#8 private key file. Defaults to the configured private_key.")]
        key: Option<PathBuf>,
        #[command(flatten)]
        msg: MessageArgs,
    },
    #[command(about = "Verify a Base64 signature; exits 1 when invalid")]
    Verify {
        #[arg(long, help = "X.509 SubjectPublicKeyInfo public key file. Defaults to the configured public_key.")]
        key: Option<PathBuf>,
        #[arg(long, help = "Base64 signature to check")]
        signature: String,
        #[command(flatten)]
        msg: MessageArgs,
    },
    #[command(about = "Print the SHA-256 fingerprint of a public key")]
    Fingerprint {
        #[arg(long, help = "X.509 SubjectPublicKeyInfo public key file. Defaults to the configured public_key.")]
        key: Option<PathBuf>,
    },
}

fn execute(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let mut cfg = SignerConfig::load(cli.config.as_deref())?;
    if let Some(enc) = cli.encoding {
        cfg.encoding = Some(enc);
    }
    if cli.log_level.is_some() {
        cfg.log_level = cli.log_level;
    }
    keysigner::logger::configure_from_config(&cfg)?;
    // Keys named on the command line are loaded by the runner; don't pre-load the configured ones.
    let signer = KeySigner::with_options(cfg.algorithm()?, cfg.encoding());
    let cmd = match cli.command {
        Commands::Sign { key, msg } => Command::Sign { key: key.or(cfg.private_key), message: msg.into_input() },
        Commands::Verify { key, signature, msg } => {
            Command::Verify { key: key.or(cfg.public_key), message: msg.into_input(), signature }
        }
        Commands::Fingerprint { key } => Command::Fingerprint { key: key.or(cfg.public_key) },
    };
    let outcome = cli::run(&signer, cmd, &mut std::io::stdout().lock())?;
    Ok(outcome.exit_code())
}

fn main() {
    let cli = Cli::parse();
    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}
