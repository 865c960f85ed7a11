use aeon::gui::app::AppModel;
use aeon::sys::{runtime, server::SOCKET_PATH};
use aeon::{catalog, config};
use clap::{Parser, Subcommand};
use orrery::DialEngine;
use relm4::prelude::*;
use std::io::Write;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "aeon", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Expand an age on the running dial, or collapse it if it is already open.
    Select {
        /// Category id from the catalog
        id: String,
    },
    /// Collapse whatever age is expanded
    Close,
    /// Re-read the configuration file
    Reload,
    /// Write the default configuration file and print its path
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Select { id }) => send_command(&format!("select {id}")),
        Some(Commands::Close) => send_command("close"),
        Some(Commands::Reload) => send_command("reload"),
        Some(Commands::InitConfig) => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
        None => run_dial(),
    }
}

fn run_dial() -> anyhow::Result<()> {
    let config = config::load_or_default();
    let engine = DialEngine::new(config.dial.clone())?;

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, catalog::catalog_path(&config));

    let app = RelmApp::new("org.aeon.dial").with_args(Vec::new());
    app.run::<AppModel>((engine, rx));
    Ok(())
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to the dial at {}: {}. Is aeon running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
