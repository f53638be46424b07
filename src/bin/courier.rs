use anyhow::{Context, Result};
use courier::board::ItemBoard;
use courier::cli::{CliArgs, Command, PASSWORD_ENV, parse_args, print_help, render_board};
use courier::client::ApiClient;
use courier::config::Config;
use courier::context::{AppContext, StandardContext};
use courier::model::{DeliveryItem, classify, local_now, parse_delivery_time};
use courier::session::{MemorySession, SharedSession};
use simplelog::{
    ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::env;
use std::sync::Arc;

fn init_logging(ctx: &dyn AppContext, level: LevelFilter) {
    let log_config = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("rustls")
        .add_filter_ignore_str("hyper_util")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));
    if let Some(path) = ctx.get_log_path()
        && let Ok(file) = std::fs::File::create(&path)
    {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, file));
    }
    // Only fails if a logger is already installed.
    let _ = CombinedLogger::init(loggers);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let CliArgs {
        root,
        verbose,
        command,
    } = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help("courier");
            std::process::exit(2);
        }
    };

    if command == Command::Help {
        print_help("courier");
        return Ok(());
    }

    let ctx = StandardContext::new(root);
    let config = Config::load_or_default(&ctx)?;
    let level = if verbose {
        LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    init_logging(&ctx, level);

    match command {
        Command::Help => unreachable!(),
        Command::ConfigPath => {
            println!("{}", Config::get_path_string(&ctx)?);
        }
        Command::Parse { label, now } => {
            let now = now.unwrap_or_else(local_now);
            match parse_delivery_time(&label) {
                Some(moment) => println!("{}", moment.format("%Y-%m-%d %H:%M")),
                None => println!("unparseable"),
            }
            println!("tab: {}", classify(label.as_str(), now));
        }
        Command::Classify {
            file,
            status,
            tab,
            now,
        } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read items file '{}'", file.display()))?;
            let items: Vec<DeliveryItem> = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse items file '{}'", file.display()))?;

            let mut board = ItemBoard::new(status).with_tab(tab.unwrap_or(config.default_tab));
            board.set_items(items);
            print!("{}", render_board(&board, now.unwrap_or_else(local_now)));
        }
        Command::List { status, tab, agent } => {
            let session: SharedSession = Arc::new(MemorySession::new());
            let client =
                ApiClient::from_config(&config, session).map_err(|e| anyhow::anyhow!(e))?;

            let items = if let Some(username) = agent {
                let password = env::var(PASSWORD_ENV)
                    .with_context(|| format!("{} is not set", PASSWORD_ENV))?;
                client
                    .login(&username, &password)
                    .await
                    .map_err(|e| anyhow::anyhow!("Login failed: {}", e))?;
                client.agent_items(status).await
            } else {
                client.items_by_status(status).await
            }
            .map_err(|e| anyhow::anyhow!(e))?;

            // Clock is read once for the whole render.
            let now = local_now();
            let mut board = ItemBoard::new(status).with_tab(tab.unwrap_or(config.default_tab));
            board.set_items(items);
            print!("{}", render_board(&board, now));
        }
        Command::Counts => {
            let session: SharedSession = Arc::new(MemorySession::new());
            let client =
                ApiClient::from_config(&config, session).map_err(|e| anyhow::anyhow!(e))?;
            let counts = client
                .status_counts()
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
            for (status, n) in counts.iter() {
                println!("{:<20} {}", status.to_string(), n);
            }
            println!("{:<20} {}", "Total", counts.total());
        }
    }

    Ok(())
}
