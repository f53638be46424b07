// File: ./src/cli.rs
//! Command-line parsing and text output for the `courier` binary.
use crate::board::ItemBoard;
use crate::model::{Bucket, DeliveryStatus, parse_delivery_time};
use chrono::NaiveDateTime;
use std::fmt::Write;
use std::path::PathBuf;

/// Environment variable holding the password for `list --agent`.
pub const PASSWORD_ENV: &str = "COURIER_PASSWORD";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// Show how a single label parses and which tab it lands in.
    Parse {
        label: String,
        now: Option<NaiveDateTime>,
    },
    /// Classify a JSON dump of items offline.
    Classify {
        file: PathBuf,
        status: DeliveryStatus,
        tab: Option<Bucket>,
        now: Option<NaiveDateTime>,
    },
    /// Fetch a status list from the server.
    List {
        status: DeliveryStatus,
        tab: Option<Bucket>,
        agent: Option<String>,
    },
    Counts,
    ConfigPath,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    parse_delivery_time(value).ok_or_else(|| format!("Cannot parse --now value: '{}'", value))
}

fn take_value<'a>(
    flag: &str,
    iter: &mut impl Iterator<Item = &'a String>,
) -> Result<&'a String, String> {
    iter.next().ok_or_else(|| format!("{} expects a value", flag))
}

/// Parses arguments without the program name.
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut root = None;
    let mut verbose = false;
    let mut tab = None;
    let mut now = None;
    let mut status = None;
    let mut agent = None;
    let mut positional: Vec<&String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => {
                return Ok(CliArgs {
                    root,
                    verbose,
                    command: Command::Help,
                });
            }
            "-r" | "--root" => root = Some(PathBuf::from(take_value(arg, &mut iter)?)),
            "-v" | "--verbose" => verbose = true,
            "--tab" => tab = Some(take_value(arg, &mut iter)?.parse::<Bucket>()?),
            "--now" => now = Some(parse_now(take_value(arg, &mut iter)?)?),
            "--status" => status = Some(take_value(arg, &mut iter)?.parse::<DeliveryStatus>()?),
            "--agent" => agent = Some(take_value(arg, &mut iter)?.clone()),
            s if s.starts_with('-') && s.len() > 1 => {
                return Err(format!("Unknown option: {}", s));
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.split_first() {
        None => Command::Help,
        Some((cmd, rest)) => match (cmd.as_str(), rest) {
            ("parse", [label]) => Command::Parse {
                label: (*label).clone(),
                now,
            },
            ("classify", [file]) => Command::Classify {
                file: PathBuf::from(file.as_str()),
                status: status.unwrap_or(DeliveryStatus::Pending),
                tab,
                now,
            },
            ("list", [st]) => Command::List {
                status: st.parse()?,
                tab,
                agent,
            },
            ("counts", []) => Command::Counts,
            ("config", []) => Command::ConfigPath,
            (other, _) => return Err(format!("Unknown command or wrong arguments: {}", other)),
        },
    };

    Ok(CliArgs {
        root,
        verbose,
        command,
    })
}

/// Tab bar line, e.g. `[Today 2] Tomorrow 1 | Future 0 | Expired 3`.
pub fn render_tabs(board: &ItemBoard, now: NaiveDateTime) -> String {
    let counts = board.tab_counts(now);
    counts
        .iter()
        .map(|(bucket, n)| {
            if bucket == board.active_tab() {
                format!("[{} {}]", bucket, n)
            } else {
                format!("{} {}", bucket, n)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn render_board(board: &ItemBoard, now: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", board.status());
    if board.shows_tabs() {
        let _ = writeln!(out, "{}", render_tabs(board, now));
    }

    let visible = board.visible(now);
    if visible.is_empty() {
        let _ = writeln!(out, "  {}", board.empty_message());
        return out;
    }
    for item in visible {
        let _ = writeln!(
            out,
            "  #{:<6} {:<24} {}",
            item.id,
            item.display_name(),
            item.delivery_time_text.as_deref().unwrap_or("-")
        );
        if let Some(agent) = &item.delivery_boy_name {
            let _ = writeln!(out, "          agent: {}", agent);
        }
    }
    out
}

pub fn print_help(binary_name: &str) {
    println!(
        "Courier v{} - delivery dispatch client",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} parse \"<label>\" [--now <time>]", binary_name);
    println!(
        "    {} classify <items.json> [--status <status>] [--tab <tab>] [--now <time>]",
        binary_name
    );
    println!("    {} list <status> [--tab <tab>] [--agent <username>]", binary_name);
    println!("    {} counts", binary_name);
    println!("    {} config", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and logs.");
    println!("    -v, --verbose         Debug logging on stderr.");
    println!("    --tab <tab>           today, tomorrow, future or expired (Pending lists only).");
    println!("    --now <time>          Reference time, e.g. \"Jun 10, 2025, 1:00 PM\" or 2025-06-10T13:00.");
    println!(
        "    --agent <username>    Sign in as this agent ({} holds the password) and list their items.",
        PASSWORD_ENV
    );
    println!("    -h, --help            Show this help message.");
    println!();
    println!("STATUSES:");
    println!("    Pending, Assigned, Picked, Out_For_Delivery, Delivery_Attempted, Delivered");
    println!();
    println!("EXAMPLES:");
    println!("    {} parse \"Nov 21, 2025, 4:06 PM - 7:06 PM\"", binary_name);
    println!("    {} classify dump.json --tab expired", binary_name);
    println!("    {} list out_for_delivery", binary_name);
}
