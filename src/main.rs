// Entrypoint for the `boxee` CLI.
// - Parses arguments, captures the environment once and hands a fresh
//   `Invocation` to the chosen command.
// - Everything printed on stdout is JSON; logs and progress go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use boxee_cli::commands::Invocation;
use boxee_cli::config::ConfigStore;
use boxee_cli::decode::Decoded;
use boxee_cli::resolve::{Environment, Overrides};
use clap::{Args, Parser, Subcommand};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boxee", about = "Command line client for the Box-ee platform API")]
struct Cli {
    /// Config file to use instead of the discovered `.box-ee.yaml`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service address, overriding the config file and BOXEE_ADDRESS
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log requests and config access to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or refresh the config file in the current directory
    Init {
        /// Email used to register
        #[arg(short, long)]
        email: String,
    },
    /// Log in and store the session token
    Login {
        /// Email to log in with instead of the configured one
        #[arg(short, long)]
        email: Option<String>,
        #[command(flatten)]
        password: PasswordArg,
    },
    /// Register a new account
    Register {
        #[arg(short, long)]
        email: String,
        #[command(flatten)]
        password: PasswordArg,
    },
    /// Send a password recovery link
    Recover {
        #[arg(short, long)]
        email: String,
    },
    /// Manage devices
    #[command(subcommand)]
    Device(DeviceCommand),
    /// Manage trackings
    #[command(subcommand)]
    Tracking(TrackingCommand),
    /// Print the client version
    Version,
}

#[derive(Args)]
struct PasswordArg {
    /// Prompted for when omitted
    #[arg(short, long)]
    password: Option<String>,
}

impl PasswordArg {
    fn resolve(self) -> Result<String> {
        match self.password {
            Some(password) => Ok(password),
            None => Password::new()
                .with_prompt("Password")
                .interact()
                .context("Failed to read password"),
        }
    }
}

#[derive(Subcommand)]
enum DeviceCommand {
    /// Add a device
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short = 't', long = "type")]
        kind: String,
    },
    /// Rename a device
    Update {
        #[arg(short, long)]
        id: String,
        #[arg(long)]
        to_name: String,
    },
    /// Delete a device
    Delete {
        #[arg(short, long)]
        id: String,
    },
    /// List all devices
    List,
    /// Generate a client key for a device
    Generate {
        #[arg(short, long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum TrackingCommand {
    /// Add a tracking number
    Add {
        #[arg(long)]
        tracking_number: String,
        #[arg(long)]
        device_id: Option<String>,
    },
    /// Delete a tracking
    Delete {
        #[arg(short, long)]
        id: String,
    },
    /// List trackings, optionally for one device
    List {
        #[arg(long)]
        device_id: Option<String>,
    },
    /// Add every tracking number listed in a file, one per line
    File {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long)]
        device_id: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = match cli.config {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::locate(),
    };
    let overrides = Overrides {
        email: match &cli.command {
            Command::Login { email, .. } => email.clone(),
            _ => None,
        },
        address: cli.address,
        timeout: cli.timeout.map(Duration::from_secs),
    };
    let mut invocation = Invocation::new(store, Environment::capture(), overrides);

    match cli.command {
        Command::Init { email } => {
            let saved = invocation.init(&email)?;
            print_json(&serde_json::json!({
                "config": invocation.store().path().display().to_string(),
                "email": saved.email,
                "address": saved.address,
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Login { password, .. } => {
            let password = password.resolve()?;
            print_decoded(&invocation.login(&password)?)
        }
        Command::Register { email, password } => {
            let password = password.resolve()?;
            print_decoded(&invocation.register(&email, &password)?)
        }
        Command::Recover { email } => print_decoded(&invocation.recover(&email)?),
        Command::Device(cmd) => run_device(&mut invocation, cmd),
        Command::Tracking(cmd) => run_tracking(&mut invocation, cmd),
        Command::Version => {
            let version = std::env::var("VERSION")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned());
            println!("{version}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_device(invocation: &mut Invocation, cmd: DeviceCommand) -> Result<ExitCode> {
    match cmd {
        DeviceCommand::Add { name, kind } => print_decoded(&invocation.device_add(&name, &kind)?),
        DeviceCommand::Update { id, to_name } => {
            print_decoded(&invocation.device_update(&id, &to_name)?)
        }
        DeviceCommand::Delete { id } => print_decoded(&invocation.device_delete(&id)?),
        DeviceCommand::List => print_decoded(&invocation.device_list()?),
        DeviceCommand::Generate { id } => print_decoded(&invocation.device_generate_key(&id)?),
    }
}

fn run_tracking(invocation: &mut Invocation, cmd: TrackingCommand) -> Result<ExitCode> {
    match cmd {
        TrackingCommand::Add {
            tracking_number,
            device_id,
        } => print_decoded(&invocation.tracking_add(&tracking_number, device_id.as_deref())?),
        TrackingCommand::Delete { id } => print_decoded(&invocation.tracking_delete(&id)?),
        TrackingCommand::List { device_id } => {
            print_decoded(&invocation.tracking_list(device_id.as_deref())?)
        }
        TrackingCommand::File { file, device_id } => {
            let bar = ProgressBar::new(0);
            bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} trackings")?);
            let results = invocation.tracking_file(&file, device_id.as_deref(), |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })?;
            bar.finish_and_clear();

            let reports: Vec<_> = results.iter().map(|r| r.report()).collect();
            print_json(&reports)?;
            Ok(if results.iter().all(|r| r.is_success()) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Print the payload or standard error as JSON. Anything but a success
/// exits non-zero.
fn print_decoded<T: Serialize>(decoded: &Decoded<T>) -> Result<ExitCode> {
    print_json(decoded)?;
    Ok(if decoded.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{out}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
