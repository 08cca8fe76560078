//! Preset management commands.
//!
//! Provides commands to list, show, validate and export chain presets.

use crate::commands::common::load_preset;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use strata_config::{ChainPreset, factory_presets, validate_preset};
use strata_registry::control_description;

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory presets
    List,

    /// Show details of a preset
    Show {
        /// Factory preset name or path
        name: String,
    },

    /// Check a preset against processor metadata
    Validate {
        /// Factory preset name or path
        name: String,

        /// Validate for a voice chain (group-only processors are errors)
        #[arg(long)]
        voice: bool,
    },

    /// Write a preset to a TOML file
    Export {
        /// Factory preset name or path
        name: String,

        /// Destination file
        output: PathBuf,

        /// Overwrite if the file already exists
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => list_presets(),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Validate { name, voice } => validate(&name, voice),
        PresetsCommand::Export {
            name,
            output,
            force,
        } => export(&name, &output, force),
    }
}

fn list_presets() -> anyhow::Result<()> {
    println!("Factory Presets:");
    println!("================");
    for preset in factory_presets() {
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:14} {:11} {}", preset.name, preset.topology, desc);
    }
    println!();
    Ok(())
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name)?;

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    println!();

    if let Some(desc) = &preset.description {
        println!("Description: {}", desc);
        println!();
    }

    println!(
        "Topology: {} ({})",
        preset.topology,
        preset.topology.diagram()
    );
    println!();

    let restored = preset.restore();
    println!("Slots:");
    for (i, storage) in restored.storage.iter().enumerate() {
        let bypass_marker = if storage.bypassed { " [BYPASSED]" } else { "" };
        println!(
            "  {}. {}{}",
            i,
            strata_registry::name(storage.type_code),
            bypass_marker
        );
        if storage.type_code.is_none() {
            continue;
        }

        let desc = control_description(storage.type_code);
        for (n, (p, value)) in desc.floats.iter().zip(storage.floats).enumerate() {
            let Some(p) = p else { continue };
            let off = if storage.deactivated[n] { " (off)" } else { "" };
            println!("      {} = {}{}", p.name, p.display(value), off);
        }
        for (p, value) in desc.ints.iter().zip(storage.ints) {
            let Some(p) = p else { continue };
            match p.label(value) {
                Some(label) => println!("      {} = {}", p.name, label),
                None => println!("      {} = {}", p.name, value),
            }
        }
        println!(
            "      mix = {:.0}%, level = {:.1} dB{}",
            storage.mix * 100.0,
            storage.output_level_db,
            if storage.temposync { ", temposync" } else { "" }
        );
    }
    for warning in &restored.warnings {
        println!("  warning: {warning}");
    }

    Ok(())
}

fn validate(name: &str, voice: bool) -> anyhow::Result<()> {
    let preset = load_preset(name)?;
    match validate_preset(&preset, !voice) {
        Ok(()) => {
            println!("Preset '{}' is valid.", preset.name);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Preset '{}' is invalid: {}", preset.name, e)),
    }
}

fn export(name: &str, output: &std::path::Path, force: bool) -> anyhow::Result<()> {
    let preset: ChainPreset = load_preset(name)?;
    if output.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            output.display()
        );
    }
    preset.save(output)?;
    println!("Saved preset '{}' to {}", preset.name, output.display());
    Ok(())
}
