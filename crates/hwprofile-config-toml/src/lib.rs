// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

pub use vbox_hwconfig::SettingEntry;

pub mod plan;

/// A hardware profile: the identity values a guest should present.
///
/// Each TOML table is a category (`[bios]`, `[primary_master]`, ...) whose
/// keys are the fields referenced by the device-configuration schema.
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
#[serde(transparent)]
pub struct HardwareProfile {
    pub sections: BTreeMap<String, Section>,
}

impl HardwareProfile {
    pub fn section<S: AsRef<str>>(&self, category: S) -> Option<&Section> {
        self.sections.get(category.as_ref())
    }

    /// Raw value for the profile field `entry` points at.
    pub fn value(&self, entry: &SettingEntry) -> Option<&toml::Value> {
        self.section(entry.category)?.options.get(entry.field)
    }

    /// Every `(category, field, value)` in the profile.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str, &toml::Value)> {
        self.sections.iter().flat_map(|(category, section)| {
            section.options.iter().map(move |(field, value)| {
                (category.as_str(), field.as_str(), value)
            })
        })
    }
}

impl FromStr for HardwareProfile {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

/// One category of a hardware profile.
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq)]
#[serde(transparent)]
pub struct Section {
    pub options: BTreeMap<String, toml::Value>,
}

/// Errors which may be returned when parsing a hardware profile.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot parse toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a TOML file into a hardware profile.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<HardwareProfile, ParseError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    contents.parse()
}
