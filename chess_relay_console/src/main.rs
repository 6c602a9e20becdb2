// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod network;
pub mod tui;

mod client_main;
mod server_config;
mod server_main;

use anyhow::Context;
use clap::{Command, arg};
use server_config::ServerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = Command::new("Chess relay")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Two-player chess relay: console client and server")
        .subcommand_required(true)
        .subcommand(Command::new("server").about("Run as server").arg(
            arg!([config_file] "Path to the configuration file: yaml-serialized ServerConfig."),
        ))
        .subcommand(
            Command::new("client")
                .about("Run as client")
                .arg(arg!(<server_address> "Server address, e.g. localhost:14361")),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => {
            let config = match sub_matches.get_one::<String>("config_file") {
                Some(filename) => read_config_file(filename)?,
                None => ServerConfig::default(),
            };
            server_main::run(config)
        }
        Some(("client", sub_matches)) => {
            client_main::run(client_main::ClientConfig {
                server_address: sub_matches.get_one::<String>("server_address").unwrap().clone(),
            })?;
            Ok(())
        }
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}

fn read_config_file(filename: &str) -> anyhow::Result<ServerConfig> {
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Reading config file {filename}"))?;
    serde_yaml::from_str(&contents).with_context(|| format!("Parsing config file {filename}"))
}
