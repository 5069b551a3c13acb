//! Command dispatch and handlers.

pub mod edit;
pub mod view;
pub mod workspace;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::context::ServiceContext;

/// Dispatch a parsed command line to its handler.
///
/// Configuration is loaded from the environment and the store's
/// `config.yaml`, then the command runs on a single-threaded runtime.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let config = Config::load().map_err(|e| e.to_string())?;
    let ctx = ServiceContext::live(config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;
    runtime.block_on(dispatch_with_context(cli, &ctx))
}

/// Dispatch a command with the given service context.
async fn dispatch_with_context(cli: &Cli, ctx: &ServiceContext) -> Result<(), String> {
    let out = match &cli.command {
        Command::List => view::list(ctx, &cli.hide, cli.json).await?,
        Command::Today => view::today(ctx, &cli.hide, cli.json).await?,
        Command::Upcoming { limit } => view::upcoming(ctx, &cli.hide, *limit, cli.json).await?,
        Command::Add(args) => edit::add(ctx, args).await?,
        Command::Update(args) => edit::update(ctx, args).await?,
        Command::Done { id } => edit::done(ctx, id).await?,
        Command::Delete { id } => edit::delete(ctx, id).await?,
        Command::Project(args) => workspace::project(ctx, args)?,
        Command::Assign(args) => workspace::assign(ctx, args)?,
    };
    print!("{out}");
    Ok(())
}
