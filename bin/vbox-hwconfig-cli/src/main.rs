// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hwprofile_config_toml::plan::{self, MissingPolicy};
use slog::{o, Drain, Level, Logger};

#[derive(Debug, Parser)]
#[clap(about, version)]
/// Inspect the VirtualBox hardware-identity schema and turn hardware
/// profiles into extra-data settings
struct Opt {
    /// Enable debugging
    #[clap(short, long, action)]
    debug: bool,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the top-level device-configuration paths
    Paths,

    /// Show which profile field feeds a device setting
    Resolve {
        /// Configuration path, optionally with a port segment
        #[clap(action)]
        path: String,

        /// Setting name under that path
        #[clap(action)]
        setting: String,
    },

    /// Dump the whole schema as JSON
    Dump,

    /// Print the VBoxManage commands applying a hardware profile
    Plan {
        /// Hardware profile (TOML)
        #[clap(value_name = "PROFILE", action)]
        profile: PathBuf,

        /// Name or UUID of the target VM
        #[clap(long, action)]
        vm: String,

        /// Fail if the profile lacks a value for any mapped setting
        #[clap(long, action)]
        strict: bool,
    },
}

fn build_log(debug: bool) -> (Logger, slog_async::AsyncGuard) {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let level = if debug { Level::Debug } else { Level::Info };
    let drain = slog::LevelFilter(drain, level).fuse();
    let (drain, guard) = slog_async::Async::new(drain).build_with_guard();
    (Logger::root(drain.fuse(), o!()), guard)
}

/// Quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'\''"#))
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    let (log, _log_async_guard) = build_log(opt.debug);

    match opt.cmd {
        Command::Paths => {
            for path in vbox_hwconfig::all_paths() {
                println!("{path}");
            }
        }
        Command::Resolve { path, setting } => {
            let entry = vbox_hwconfig::resolve_setting(&path, &setting)?;
            println!("{entry}");
        }
        Command::Dump => {
            let dumped = serde_json::to_string_pretty(&vbox_hwconfig::schema())
                .context("Failed to serialize schema")?;
            println!("{dumped}");
        }
        Command::Plan { profile, vm, strict } => {
            let log = log.new(o!("profile" => profile.display().to_string()));
            let hwprofile =
                hwprofile_config_toml::parse(&profile).with_context(|| {
                    format!("Failed to load profile {}", profile.display())
                })?;
            let policy =
                if strict { MissingPolicy::Deny } else { MissingPolicy::Skip };
            let planned = plan::plan(&hwprofile, policy, &log)
                .context("Failed to plan hardware overrides")?;
            for extra in planned {
                println!(
                    "VBoxManage setextradata {} {} {}",
                    shell_quote(&vm),
                    shell_quote(&extra.key()),
                    shell_quote(&extra.value)
                );
            }
        }
    }

    Ok(())
}
