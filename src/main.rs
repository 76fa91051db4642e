use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{error, info};

use excalidraw_shell::bridge::Bridge;
use excalidraw_shell::config::Config;
use excalidraw_shell::host::StdioHost;
use excalidraw_shell::native::SaveLocation;
use excalidraw_shell::window::ShellWindow;

#[derive(Parser, Debug)]
#[command(name = "excalidraw-shell")]
#[command(
    version,
    about = "Native file handling for an embedded Excalidraw editor",
    long_about = "Native file handling for an embedded Excalidraw editor.\n\n\
                  Talks line-delimited JSON with the process hosting the webview: \
                  script messages, dialog answers and actions on stdin; scripts to \
                  run and window commands on stdout. Logs go to stderr."
)]
struct Cli {
    /// Drawing to open at startup (path or file:// URI)
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Close the window after the first successful save
    #[arg(long, short = 'c', action = ArgAction::SetTrue)]
    close_on_save: bool,

    /// Start fullscreen
    #[arg(long, short = 'f', action = ArgAction::SetTrue)]
    fullscreen: bool,

    /// Enable debug logging (also enabled by EXCALIDRAW_DEBUG)
    #[arg(long, short = 'd', action = ArgAction::SetTrue)]
    debug: bool,

    /// Read configuration from PATH instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug || std::env::var_os("EXCALIDRAW_DEBUG").is_some() {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if cli.close_on_save {
        config.window.close_on_save = true;
    }
    if cli.fullscreen {
        config.window.fullscreen = true;
    }

    let initial = cli
        .file
        .as_deref()
        .map(SaveLocation::from_commandline_arg)
        .transpose()
        .context("Invalid FILE argument")?;

    let keymap = config
        .keybindings
        .build_action_map()
        .map_err(anyhow::Error::msg)?;
    let host = Rc::new(StdioHost::new(io::stdin().lock(), io::stdout(), keymap));
    host.show(&config);

    let bridge = Bridge::new(host.clone());
    let window = ShellWindow::new(host.dependencies(), bridge, config.window_options());

    if let Some(location) = initial {
        info!("Opening {}", location);
        if let Err(err) = window.open_initial(location) {
            error!("Failed to open initial file: {}", err);
        }
    }

    loop {
        for action in host.take_actions() {
            window.activate(action);
        }
        // Started actions must reach their first wait before more input is read.
        window.bridge().pump();
        if !window.bridge().iterate() {
            break;
        }
    }

    info!("Shell finished");
    Ok(())
}
