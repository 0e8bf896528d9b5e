// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Functions for joining a [`super::HardwareProfile`] against the VirtualBox
//! device-configuration schema.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use thiserror::Error;
use vbox_hwconfig::SettingEntry;

use crate::HardwareProfile;

/// What to do with a schema setting the profile has no value for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Leave the hypervisor default in place.
    #[default]
    Skip,
    /// Treat the gap as an error in the profile.
    Deny,
}

/// A single setting to apply to the VM: the device-configuration path, the
/// setting name beneath it, and the value to set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraData {
    pub path: String,
    pub setting: &'static str,
    pub value: String,
}

impl ExtraData {
    pub fn key(&self) -> String {
        format!("{}/{}", self.path, self.setting)
    }
}

impl Display for ExtraData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}={}", self.path, self.setting, self.value)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("profile has no value for {entry} (needed by {key})")]
    MissingValue { key: String, entry: SettingEntry },

    #[error("unsupported {kind} value for {entry}")]
    UnsupportedValue { entry: SettingEntry, kind: &'static str },
}

/// Renders a profile value the way the hypervisor expects to read it back.
///
/// VirtualBox stores an extra-data value that parses as a number as an
/// integer, so numeric-looking strings carry the `string:` prefix. An empty
/// value would delete the key; `<EMPTY>` sets an empty string instead.
/// Booleans become `1`/`0`. Arrays, tables and datetimes have no extra-data
/// representation.
pub fn render_value(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(render_string(s)),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(if *b { "1" } else { "0" }.to_owned()),
        toml::Value::Datetime(_)
        | toml::Value::Array(_)
        | toml::Value::Table(_) => None,
    }
}

fn render_string(s: &str) -> String {
    if s.is_empty() {
        "<EMPTY>".to_owned()
    } else if s.parse::<i64>().is_ok() || s.parse::<u64>().is_ok() {
        format!("string:{s}")
    } else {
        s.to_owned()
    }
}

/// Produces the settings `profile` overrides, in schema order.
pub fn plan(
    profile: &HardwareProfile,
    policy: MissingPolicy,
    log: &slog::Logger,
) -> Result<Vec<ExtraData>, PlanError> {
    let mut planned = Vec::new();
    let mut referenced = BTreeSet::new();

    for leaf in vbox_hwconfig::entries() {
        referenced.insert(leaf.entry);

        let Some(value) = profile.value(&leaf.entry) else {
            match policy {
                MissingPolicy::Skip => {
                    slog::debug!(log, "no profile value, skipping";
                        "key" => leaf.key(),
                        "entry" => %leaf.entry);
                    continue;
                }
                MissingPolicy::Deny => {
                    return Err(PlanError::MissingValue {
                        key: leaf.key(),
                        entry: leaf.entry,
                    });
                }
            }
        };

        let value = render_value(value).ok_or(PlanError::UnsupportedValue {
            entry: leaf.entry,
            kind: value.type_str(),
        })?;
        planned.push(ExtraData {
            path: leaf.path,
            setting: leaf.setting,
            value,
        });
    }

    for (category, field, _) in profile.fields() {
        let used = referenced
            .iter()
            .any(|entry| entry.category == category && entry.field == field);
        if !used {
            slog::warn!(log, "profile field not used by any setting";
                "category" => category,
                "field" => field);
        }
    }

    slog::info!(log, "planned hardware overrides"; "count" => planned.len());
    Ok(planned)
}
