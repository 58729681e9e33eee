mod channel;
mod config;
mod script;
mod ui;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use vizdesk_core::config::Config;
use vizdesk_core::state::DeskState;
use vizdesk_render::chart;
use vizdesk_render::chart::ChartTag;
use vizdesk_render::templates;

use crate::channel::FileChannel;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("vizdesk {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "replay" => {
            let parsed = parse_args(args.collect::<Vec<_>>(), &["--config"])?;
            let Some(ref script) = parsed.positional else {
                return Err("replay requires a script path".into());
            };
            let config = config::load(parsed.value("--config").as_deref())?;
            run_replay(PathBuf::from(script), &config)
        }
        "watch" => {
            let parsed = parse_args(
                args.collect::<Vec<_>>(),
                &["--config", "--inbox", "--outbox", "--messages"],
            )?;
            if let Some(ref extra) = parsed.positional {
                return Err(format!("unsupported argument: {extra}").into());
            }
            let Some(inbox) = parsed.value("--inbox") else {
                return Err("watch requires --inbox PATH".into());
            };
            let Some(outbox) = parsed.value("--outbox") else {
                return Err("watch requires --outbox PATH".into());
            };
            let messages = parsed
                .value("--messages")
                .unwrap_or_else(|| FileChannel::default_messages_path(&outbox));
            let config = config::load(parsed.value("--config").as_deref())?;
            let channel = FileChannel::new(inbox, outbox, messages);
            ui::run(
                DeskState::new(&config),
                channel,
                Duration::from_millis(config.cli.poll_interval_ms.max(10)),
            )
        }
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

#[derive(Debug, Default)]
struct ParsedArgs {
    flags: Vec<(String, String)>,
    positional: Option<String>,
}

impl ParsedArgs {
    fn value(&self, flag: &str) -> Option<PathBuf> {
        self.flags
            .iter()
            .rev()
            .find(|(name, _)| name == flag)
            .map(|(_, value)| PathBuf::from(value))
    }
}

fn parse_args(args: Vec<String>, allowed: &[&str]) -> Result<ParsedArgs, Box<dyn std::error::Error>> {
    let mut parsed = ParsedArgs::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if allowed.contains(&arg) {
            let Some(value) = args.get(i + 1) else {
                return Err(format!("{arg} requires a path").into());
            };
            parsed.flags.push((arg.to_string(), value.clone()));
            i += 2;
        } else if arg.starts_with("--") || parsed.positional.is_some() {
            return Err(format!("unsupported argument: {arg}").into());
        } else {
            parsed.positional = Some(arg.to_string());
            i += 1;
        }
    }
    Ok(parsed)
}

fn run_replay(script_path: PathBuf, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.cli.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let events = script::load(&script_path)?;
    let mut state = DeskState::new(config);
    let steps = script::replay(&mut state, events);

    for step in &steps {
        let effects: Vec<String> = step.effects.iter().map(script::describe_effect).collect();
        let highlighted: Vec<&str> = step.highlighted.iter().map(|field| field.as_str()).collect();
        println!(
            "#{:<3} {:<32} effects=[{}] highlight=[{}]",
            step.index,
            step.label,
            effects.join(", "),
            highlighted.join(", ")
        );
    }

    println!();
    println!("{}", serde_json::to_string_pretty(&state.document)?);
    println!();
    print!(
        "{}",
        chart::render(&ChartTag::from(state.document.kind), &state.document.data_points)
    );
    if let Some(request) = &state.last_component {
        println!();
        print!("{}", templates::resolve(&request.component, &request.data));
    }
    for issue in &state.agent.last_issues {
        eprintln!("warning: {issue}");
    }
    Ok(())
}

fn print_help() {
    println!("vizdesk {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  vizdesk replay SCRIPT [--config PATH]");
    println!("  vizdesk watch --inbox PATH --outbox PATH [--messages PATH] [--config PATH]");
    println!("  vizdesk --help");
    println!("  vizdesk --version");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn flags_and_one_positional() {
        let parsed = parse_args(
            strings(&["script.yaml", "--config", "a.toml"]),
            &["--config"],
        )
        .unwrap();
        assert_eq!(parsed.positional.as_deref(), Some("script.yaml"));
        assert_eq!(parsed.value("--config"), Some(PathBuf::from("a.toml")));
    }

    #[test]
    fn unknown_flag_and_missing_value_are_errors() {
        assert!(parse_args(strings(&["--repo", "x"]), &["--config"]).is_err());
        assert!(parse_args(strings(&["--inbox"]), &["--inbox"]).is_err());
        assert!(parse_args(strings(&["a", "b"]), &[]).is_err());
    }
}
