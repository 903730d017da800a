//! Terminal client for a LinkVault bookmark server: tags, a conjunctive tag
//! filter, and bookmark create/edit/delete over the server's REST API.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod model;
pub mod render;
pub mod selection;
pub mod shared;
pub mod shell;
pub mod state;
pub mod tags;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use tracing::info;

use crate::api::HttpBackend;
use crate::cli::{Cli, Command};
use crate::client::BookmarkClient;
use crate::config::Config;
use crate::formatting::FormatContext;
use crate::shell::Shell;
use crate::state::AppState;

pub fn entry() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref(), cli.api.as_deref())?;
    let _guard = logging::init_logging(&config);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    // Logged here because no subscriber exists while the config loads.
    match &config.source {
        Some(path) => info!(path = %path.display(), api = %config.api_base, "config loaded"),
        None => info!(api = %config.api_base, "no config file, using defaults"),
    }
    let ctx = FormatContext::from_env(cli.plain);
    let backend = HttpBackend::from_config(&config)?;
    let mut client =
        BookmarkClient::new(backend, AppState::new(&config.default_tag_color));

    match command {
        Command::Shell => {
            let mut shell =
                Shell::new(client, io::stdin().lock(), io::stdout(), ctx);
            shell.run()?;
        }
        other => {
            let mut out = io::stdout().lock();
            let mut prompt = |text: &str| {
                shell::ask(&mut io::stdin().lock(), &mut io::stderr(), text)
            };
            cli::execute(other, &mut client, &ctx, &mut out, &mut prompt)?;
        }
    }

    Ok(())
}
