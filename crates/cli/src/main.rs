// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tandem_config::{Config, ConfigManager};

mod commands;

fn build_cli() -> Command {
    Command::new("tandem")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Tandem Developers")
        .about("Keeps app data in sync between a device and its paired companion")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(Command::new("init").about("Write a default config file"))
        .subcommand(
            Command::new("save-profile")
                .about("Save the user profile and send it to the companion")
                .arg(
                    Arg::new("name")
                        .required(true)
                        .value_name("NAME")
                        .help("Display name"),
                ),
        )
        .subcommand(Command::new("show-profile").about("Show the stored profile"))
        .subcommand(Command::new("delete-profile").about("Delete the stored profile"))
        .subcommand(Command::new("status").about("Show the shared namespace and stored items"))
        .subcommand(
            Command::new("pair-demo")
                .about("Sync profiles between a simulated phone and watch")
                .arg(
                    Arg::new("names")
                        .value_name("NAME")
                        .help("Profile names to send")
                        .action(ArgAction::Append)
                        .num_args(1..)
                        .default_values(["Ada", "Grace"]),
                ),
        )
}

fn open_config(matches: &clap::ArgMatches) -> Result<(ConfigManager, Config)> {
    let manager = match matches.get_one::<PathBuf>("config") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")?;

    let config = manager
        .load_with_env_overrides()
        .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;

    Ok((manager, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let (manager, config) = open_config(&matches)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();
    console::set_colors_enabled(config.app.color_output);

    match matches.subcommand() {
        Some(("init", _)) => commands::init_config(&manager).map(|_| ()),
        Some(("save-profile", sub_matches)) => {
            let name = sub_matches
                .get_one::<String>("name")
                .ok_or_else(|| anyhow::anyhow!("Profile name is required"))?;
            commands::save_profile(&config, name).await.map(|_| ())
        }
        Some(("show-profile", _)) => commands::show_profile(&config).await.map(|_| ()),
        Some(("delete-profile", _)) => commands::delete_profile(&config).await.map(|_| ()),
        Some(("status", _)) => commands::status(&config, &manager).await.map(|_| ()),
        Some(("pair-demo", sub_matches)) => {
            let names: Vec<String> = sub_matches
                .get_many::<String>("names")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            commands::pair_demo(&config, &names).await.map(|_| ())
        }
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
