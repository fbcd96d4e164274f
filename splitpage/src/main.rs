use clap::ArgMatches;
use commands::command_argument_builder;
use splitpage::{RewriteOptions, ServeOptions, fetch_catalog_json, preview_file, serve};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    init_tracing(chosen_command.get_flag("verbose"));

    let outcome = match chosen_command.subcommand() {
        Some(("serve", primary_command)) => handle_serve(primary_command).await,
        Some(("catalog", primary_command)) => handle_catalog(primary_command).await,
        Some(("preview", primary_command)) => handle_preview(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn rewrite_options(args: &ArgMatches) -> RewriteOptions {
    let defaults = RewriteOptions::default();
    let pick = |name: &str, fallback: String| {
        args.get_one::<String>(name).cloned().unwrap_or(fallback)
    };

    RewriteOptions {
        title_text: pick("title-text", defaults.title_text),
        link_href: pick("link-href", defaults.link_href),
        link_text: pick("link-text", defaults.link_text),
    }
}

async fn handle_serve(args: &ArgMatches) -> anyhow::Result<()> {
    let options = ServeOptions {
        listen: *args
            .get_one::<SocketAddr>("listen")
            .expect("listen has a default"),
        catalog_url: args
            .get_one::<String>("catalog-url")
            .expect("catalog-url has a default")
            .clone(),
        timeout_secs: args.get_one::<u64>("timeout").copied(),
        rewrite: rewrite_options(args),
    };

    serve(options).await
}

async fn handle_catalog(args: &ArgMatches) -> anyhow::Result<()> {
    let catalog_url = args
        .get_one::<String>("catalog-url")
        .expect("catalog-url has a default");
    let timeout_secs = args.get_one::<u64>("timeout").copied();

    println!("{}", fetch_catalog_json(catalog_url, timeout_secs).await?);
    Ok(())
}

fn handle_preview(args: &ArgMatches) -> anyhow::Result<()> {
    let file = args.get_one::<PathBuf>("FILE").expect("FILE is required");

    print!("{}", preview_file(file, rewrite_options(args))?);
    Ok(())
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
