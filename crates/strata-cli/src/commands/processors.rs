//! Processor type listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::{Args, Subcommand};
use serde_json::{Value, json};
use strata_core::Capabilities;
use strata_registry::{TypeInfo, all_descriptions, control_description};

#[derive(Args)]
pub struct ProcessorsArgs {
    #[command(subcommand)]
    command: ProcessorsCommand,
}

#[derive(Subcommand)]
enum ProcessorsCommand {
    /// List every processor type, grouped
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the parameters of one processor type
    Describe {
        /// Streaming name (e.g. "biquad-filter") or display name
        name: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn run(args: ProcessorsArgs) -> anyhow::Result<()> {
    match args.command {
        ProcessorsCommand::List { json } => list(json),
        ProcessorsCommand::Describe { name, json } => describe(&name, json),
    }
}

/// Finds a type by streaming name or display name, case-insensitively.
pub fn find(name: &str) -> Option<&'static TypeInfo> {
    all_descriptions().into_iter().find(|info| {
        info.streaming_name.eq_ignore_ascii_case(name) || info.name.eq_ignore_ascii_case(name)
    })
}

/// Short channel-shape summary, e.g. `mono, mono>stereo, stereo`.
pub fn shapes(caps: Capabilities) -> String {
    let mut out = Vec::new();
    if caps.contains(Capabilities::MONO_TO_MONO) {
        out.push("mono");
    }
    if caps.contains(Capabilities::MONO_TO_STEREO) {
        out.push("mono>stereo");
    }
    if caps.contains(Capabilities::STEREO_TO_STEREO) {
        out.push("stereo");
    }
    out.join(", ")
}

fn info_json(info: &TypeInfo) -> Value {
    json!({
        "code": info.code.raw(),
        "name": info.name,
        "streaming_name": info.streaming_name,
        "group": info.display_group,
        "float_params": info.float_param_count,
        "int_params": info.int_param_count,
        "default_mix": info.default_mix,
        "group_only": info.group_only,
        "version": info.streaming_version,
        "shapes": shapes(info.capabilities),
    })
}

/// JSON description of one type including parameter metadata.
pub fn describe_json(info: &TypeInfo) -> Value {
    let desc = control_description(info.code);
    let floats: Vec<Value> = desc
        .floats
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.map(|p| (i, p)))
        .map(|(i, p)| {
            json!({
                "index": i,
                "name": p.name,
                "min": p.min,
                "max": p.max,
                "default": p.default,
                "unit": p.unit.suffix().trim(),
            })
        })
        .collect();
    let ints: Vec<Value> = desc
        .ints
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.map(|p| (i, p)))
        .map(|(i, p)| {
            json!({
                "index": i,
                "name": p.name,
                "min": p.min,
                "max": p.max,
                "default": p.default,
                "labels": p.labels,
            })
        })
        .collect();
    let mut value = info_json(info);
    value["keytrack"] = json!(desc.supports_keytrack);
    value["temposync"] = json!(desc.supports_temposync);
    value["floats"] = Value::Array(floats);
    value["ints"] = Value::Array(ints);
    value
}

fn list(as_json: bool) -> anyhow::Result<()> {
    let infos = all_descriptions();
    if as_json {
        let list: Vec<Value> = infos.iter().map(|i| info_json(i)).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("Available Processors");
    println!("====================");
    let mut group = None;
    for info in infos.iter().filter(|i| !i.code.is_none()) {
        if group != Some(info.display_group) {
            group = Some(info.display_group);
            println!();
            println!("{}:", info.display_group);
        }
        let marker = if info.group_only { " [group only]" } else { "" };
        println!(
            "  {:16} {:18} {}{}",
            info.streaming_name,
            info.name,
            shapes(info.capabilities),
            marker
        );
    }
    println!();
    println!("Use 'strata processors describe <name>' for parameter details.");
    Ok(())
}

fn describe(name: &str, as_json: bool) -> anyhow::Result<()> {
    let info = find(name).ok_or_else(|| anyhow::anyhow!("Unknown processor: {}", name))?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&describe_json(info))?);
        return Ok(());
    }

    let desc = control_description(info.code);
    println!("{}", info.name);
    println!("{}", "=".repeat(info.name.len()));
    println!();
    println!("Streaming name: {}", info.streaming_name);
    println!("Group:          {}", info.display_group);
    println!("Channels:       {}", shapes(info.capabilities));
    println!("Default mix:    {:.0}%", info.default_mix * 100.0);
    println!("Layout version: {}", info.streaming_version);
    if info.group_only {
        println!("Group chains only");
    }
    if desc.supports_keytrack {
        println!("Supports keytrack");
    }
    if desc.supports_temposync {
        println!("Supports temposync");
    }
    println!();

    if desc.float_count() > 0 {
        println!("Parameters:");
        println!();
        println!("  {:3}  {:12}  {:12}  {}", "#", "Name", "Default", "Range");
        println!("  {:3}  {:12}  {:12}  {}", "-", "----", "-------", "-----");
        for (i, p) in desc.floats.iter().enumerate() {
            let Some(p) = p else { continue };
            println!(
                "  {:3}  {:12}  {:12}  {} to {}",
                i,
                p.name,
                p.display(p.default).to_string(),
                p.display(p.min),
                p.display(p.max)
            );
        }
        println!();
    }

    if desc.int_count() > 0 {
        println!("Switches:");
        println!();
        for (i, p) in desc.ints.iter().enumerate() {
            let Some(p) = p else { continue };
            let labels = if p.labels.is_empty() {
                format!("{} to {}", p.min, p.max)
            } else {
                p.labels.join(" / ")
            };
            let default = p.label(p.default).unwrap_or("?");
            println!("  {:3}  {:12}  {:12}  {}", i, p.name, default, labels);
        }
        println!();
    }

    Ok(())
}
