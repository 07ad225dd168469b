use anyhow::Context;
use catalog_client::{cli, commands, config, error, render, shell};
use catalog_common::{Notice, ProductDraft};
use clap::Parser;
use cli::{Cli, Commands};
use commands::Client;
use config::Config;
use dialoguer::{Input, Password};
use error::{ClientError, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().context("failed to load configuration")?;
    let client = commands::connect(&config).context("failed to initialize client")?;

    if let Err(e) = run(cli.command, config, &client).await {
        eprintln!("✗ {}", e);
        if e.is_session_expired() {
            eprintln!("  Run `catalog login` to sign in again.");
        }
        std::process::exit(1);
    }
    Ok(())
}

/// `RUST_LOG` があればそれを、無ければ `-v` で debug / 既定で warn
fn init_logging(verbose: bool) {
    let default = if verbose { "catalog=debug,catalog_client=debug,catalog_common=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Commands, config: Config, client: &Client) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            let username = match username {
                Some(u) => u,
                None => prompt_text("Username")?,
            };
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .allow_empty_password(true)
                    .interact()
                    .map_err(|e| ClientError::Prompt(e.to_string()))?,
            };
            commands::login(client, &username, &password).await?;
            println!("✔ Logged in ({})", config.base_url);
        }

        Commands::Logout => {
            client.logout();
            println!("✔ Logged out");
        }

        Commands::Status => {
            println!("Server: {}", config.base_url);
            match client.gateway().health().await {
                Ok(status) => println!("  health: {}", status),
                Err(e) => println!("  health: unreachable ({})", e),
            }
            println!(
                "Session: {}",
                if client.is_authenticated() { "logged in" } else { "not logged in" }
            );
            println!("Theme: {}", commands::theme(client, false)?);
        }

        Commands::Search { requirements, filter } => {
            let outcome = commands::search(client, &requirements).await?;
            commands::apply_view(client, &filter)?;
            if !filter.json {
                eprintln!("{}", commands::outcome_message(outcome));
            }
            commands::print_results(client, filter.json)?;
        }

        Commands::List { filter } => {
            let outcome = commands::list(client).await?;
            commands::apply_view(client, &filter)?;
            if !filter.json {
                eprintln!("{}", commands::outcome_message(outcome));
            }
            commands::print_results(client, filter.json)?;
        }

        Commands::Save { company, name, product_type, specs, datasheet_path } => {
            let draft = ProductDraft {
                company_name: company,
                product_name: name,
                product_type,
                specs,
                datasheet_path: datasheet_path.unwrap_or_default(),
            };
            let ack = commands::save(client, &draft).await?;
            println!("✔ Product saved (id {})", ack.product_id);
        }

        Commands::Upload { file, search } => {
            let ack = commands::upload(client, &file).await?;
            println!("✔ {}", commands::upload_message(&ack));

            if let Some(requirements) = search.filter(|s| !s.trim().is_empty()) {
                let outcome = commands::search(client, &requirements).await?;
                eprintln!("{}", commands::outcome_message(outcome));
                println!("{}", render::render_screen(&client.screen()));
            }
        }

        Commands::Download { id, path, out } => {
            let saved = commands::download(client, id, path.as_deref(), &out).await?;
            println!("✔ Saved {}", saved.display());
        }

        Commands::Theme { toggle } => {
            let theme = commands::theme(client, toggle)?;
            println!("{}", theme);
        }

        Commands::Config { set_base_url, show } => {
            let mut config = config;

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ Base URL set to {}", config.base_url);
            }

            if show {
                println!("Config: {}", Config::config_path()?.display());
                println!("  base_url: {}", config.base_url);
                println!("  timeout: {}s", config.timeout_seconds);
                println!("  storage: {}", Config::storage_path()?.display());
            }
        }

        Commands::Shell => {
            if !client.is_authenticated() {
                println!("{}", Notice::Info("Please log in to continue.".into()));
                let username = prompt_text("Username")?;
                let password = Password::new()
                    .with_prompt("Password")
                    .allow_empty_password(true)
                    .interact()
                    .map_err(|e| ClientError::Prompt(e.to_string()))?;
                commands::login(client, &username, &password).await?;
            }
            let download_dir = std::env::current_dir()?;
            shell::run_shell(client, &download_dir).await?;
        }
    }

    Ok(())
}

fn prompt_text(prompt: &str) -> Result<String> {
    Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| ClientError::Prompt(e.to_string()))
}
