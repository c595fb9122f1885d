use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;

use heapscope_proto::{secret_digest, HandshakeOptions};
use heapscope_session::{probe_server_with_deadline, Monitor, MonitorConfig, SessionEvent};
use heapscope_table::HeapObject;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.format).await,
        Command::Probe(args) => cmd_probe(args).await,
        Command::Digest(args) => cmd_digest(args),
    }
}

async fn cmd_serve(args: ServeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let handshake = match (args.relay, args.psk) {
        (Some(server), Some(psk)) => HandshakeOptions::relay(server, psk),
        _ => HandshakeOptions::default(),
    };
    let config = MonitorConfig { bind_addr: args.bind, handshake, ..MonitorConfig::default() };

    let monitor = Arc::new(Monitor::new(config));
    let mut events = monitor.subscribe();

    println!(
        "{} heapscope monitor on {}",
        "●".green().bold(),
        args.bind.to_string().bold()
    );

    let printer = Arc::clone(&monitor);
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&printer, &format, event),
                // After a lag the deltas are gone, but the table is not:
                // re-pull the live set and carry on.
                Err(RecvError::Lagged(_)) => print_live_set(&printer.live_objects(), &format),
                Err(RecvError::Closed) => break,
            }
        }
    });

    monitor.run().await?;
    Ok(())
}

fn print_event(monitor: &Monitor, format: &OutputFormat, event: SessionEvent) {
    match event {
        SessionEvent::Refreshed => print_live_set(&monitor.live_objects(), format),
        SessionEvent::Connected { success } => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "event": "connect", "success": success }));
            }
            OutputFormat::Text if success => {
                println!("{} emitter reached its relay", "✓".green());
            }
            OutputFormat::Text => {
                println!("{} emitter failed to reach its relay", "✗".red());
            }
        },
        SessionEvent::Closed { leaked } => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "event": "closed", "leaked": leaked }));
            }
            OutputFormat::Text if leaked == 0 => {
                println!("{} stream ended with a clean heap", "✓".green().bold());
            }
            OutputFormat::Text => {
                println!(
                    "{} stream ended with {} leaked object(s)",
                    "✗".red().bold(),
                    leaked.to_string().yellow()
                );
            }
        },
    }
}

fn print_live_set(live: &[HeapObject], format: &OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(live) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("{} could not render the live set: {err}", "✗".red()),
        },
        OutputFormat::Text => {
            if live.is_empty() {
                println!("{}", "heap: no live objects".dimmed());
                return;
            }
            println!("{}", format!("heap: {} live object(s)", live.len()).bold());
            for object in live {
                println!(
                    "  {}  {:>3} ref(s)  {}  {}  {}",
                    format!("{}@{}", object.id, object.locality).yellow(),
                    object.ref_count,
                    object.type_name.cyan(),
                    object.address.dimmed(),
                    object.value
                );
            }
        }
    }
}

async fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let deadline = Duration::from_secs(args.timeout);
    let authorized =
        probe_server_with_deadline(args.server.as_str(), &args.psk, deadline).await;

    if authorized {
        println!("{} {} accepted the key", "✓".green().bold(), args.server.bold());
        Ok(())
    } else {
        println!(
            "{} {} rejected the key or is unreachable",
            "✗".red().bold(),
            args.server.bold()
        );
        std::process::exit(1);
    }
}

fn cmd_digest(args: DigestArgs) -> anyhow::Result<()> {
    println!("{}", secret_digest(&args.psk));
    Ok(())
}
