// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping from VirtualBox device-configuration keys to hardware-profile
//! fields.
//!
//! VirtualBox exposes a guest's DMI strings, IDE drive identity, ACPI table
//! overrides and VGA BIOS through "extra data" keys rooted at
//! `VBoxInternal/Devices`. This crate records, for each such key, which
//! `(category, field)` of a hardware profile supplies its value. The table
//! is compile-time data; nothing here allocates until a caller asks for an
//! owned path.

use std::fmt::{self, Display};

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_derive::Serialize;
use thiserror::Error;

mod table;

pub use table::{ACPI, PCBIOS, PIIX3IDE, VGA};

/// Reference into a hardware profile: the section (`category`) and the key
/// within it (`field`) holding a substitution value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub struct SettingEntry {
    pub category: &'static str,
    pub field: &'static str,
}

impl SettingEntry {
    pub const fn new(category: &'static str, field: &'static str) -> Self {
        Self { category, field }
    }
}

impl Display for SettingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.field)
    }
}

/// A node in the device-configuration tree.
#[derive(Debug, PartialEq, Eq)]
pub enum SchemaNode {
    /// Device settings mapped directly to profile fields.
    Settings(&'static [(&'static str, SettingEntry)]),
    /// Per-port (or per-drive) sub-paths, each with its own node.
    Nested(&'static [(&'static str, SchemaNode)]),
}

impl SchemaNode {
    /// Profile reference for `name`, if this node maps it.
    ///
    /// Always `None` for a [`SchemaNode::Nested`] node: settings live under
    /// its children.
    pub fn setting(&self, name: &str) -> Option<SettingEntry> {
        self.settings().find(|(n, _)| *n == name).map(|(_, entry)| entry)
    }

    /// Child node registered under the sub-path segment `name`.
    pub fn child(&self, name: &str) -> Option<&'static SchemaNode> {
        self.children().find(|(n, _)| *n == name).map(|(_, node)| node)
    }

    pub fn settings(
        &self,
    ) -> impl Iterator<Item = (&'static str, SettingEntry)> + Clone {
        let settings: &'static [(&'static str, SettingEntry)] = match self {
            SchemaNode::Settings(settings) => *settings,
            SchemaNode::Nested(_) => &[],
        };
        settings.iter().copied()
    }

    pub fn children(
        &self,
    ) -> impl Iterator<Item = (&'static str, &'static SchemaNode)> + Clone
    {
        let children: &'static [(&'static str, SchemaNode)] = match self {
            SchemaNode::Settings(_) => &[],
            SchemaNode::Nested(children) => *children,
        };
        children.iter().map(|(name, node)| (*name, node))
    }

    /// Number of settings or sub-paths held directly by this node.
    pub fn len(&self) -> usize {
        match self {
            SchemaNode::Settings(settings) => settings.len(),
            SchemaNode::Nested(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_entries(&self, path: String, out: &mut Vec<SchemaEntry>) {
        match self {
            SchemaNode::Settings(settings) => {
                out.extend(settings.iter().map(|(setting, entry)| {
                    SchemaEntry {
                        path: path.clone(),
                        setting: *setting,
                        entry: *entry,
                    }
                }));
            }
            SchemaNode::Nested(children) => {
                for (segment, child) in children.iter() {
                    child.collect_entries(format!("{path}/{segment}"), out);
                }
            }
        }
    }
}

impl Serialize for SchemaNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        match self {
            SchemaNode::Settings(settings) => {
                for (name, entry) in settings.iter() {
                    map.serialize_entry(name, entry)?;
                }
            }
            SchemaNode::Nested(children) => {
                for (name, node) in children.iter() {
                    map.serialize_entry(name, node)?;
                }
            }
        }
        map.end()
    }
}

/// A single leaf of the schema with its full configuration path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaEntry {
    /// Path of the node holding the setting, including any port segment,
    /// e.g. `VBoxInternal/Devices/piix3ide/0/Config/PrimaryMaster`.
    pub path: String,
    pub setting: &'static str,
    pub entry: SettingEntry,
}

impl SchemaEntry {
    /// The complete extra-data key, `<path>/<setting>`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.path, self.setting)
    }
}

/// The whole table, for callers wanting to walk or serialize it at once.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
    nodes: &'static [(&'static str, SchemaNode)],
}

impl Schema {
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&'static str, &'static SchemaNode)> + Clone
    {
        let nodes = self.nodes;
        nodes.iter().map(|(path, node)| (*path, node))
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.nodes.len()))?;
        for (path, node) in self.nodes.iter() {
            map.serialize_entry(path, node)?;
        }
        map.end()
    }
}

/// Errors returned when a path or setting has no mapping.
///
/// Absence is expected for keys deliberately left unmapped; whether a given
/// miss is worth reporting is up to the caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("configuration path {0:?} not found")]
    PathNotFound(String),

    #[error("setting {setting:?} not found under {path:?}")]
    SettingNotFound { path: String, setting: String },
}

pub fn schema() -> Schema {
    Schema { nodes: table::VBOX_CONFIG }
}

/// Returns the node registered at `path`.
///
/// `path` is either one of the top-level configuration paths or one of them
/// followed by `/`-separated sub-path segments, such as
/// `VBoxInternal/Devices/piix3ide/0/Config/PrimaryMaster`.
pub fn lookup(path: &str) -> Result<&'static SchemaNode, LookupError> {
    let not_found = || LookupError::PathNotFound(path.to_owned());

    for (top, node) in table::VBOX_CONFIG.iter() {
        if path == *top {
            return Ok(node);
        }
        if let Some(rest) =
            path.strip_prefix(top).and_then(|rest| rest.strip_prefix('/'))
        {
            return rest
                .split('/')
                .try_fold(node, |node, segment| node.child(segment))
                .ok_or_else(not_found);
        }
    }
    Err(not_found())
}

/// Enumerates the top-level configuration paths in declaration order.
pub fn all_paths() -> impl Iterator<Item = &'static str> + Clone {
    schema().iter().map(|(path, _)| path)
}

/// Returns the profile reference for `setting` at the node found at `path`.
pub fn resolve_setting(
    path: &str,
    setting: &str,
) -> Result<SettingEntry, LookupError> {
    lookup(path)?.setting(setting).ok_or_else(|| {
        LookupError::SettingNotFound {
            path: path.to_owned(),
            setting: setting.to_owned(),
        }
    })
}

/// Flattens the table into its leaves, in declaration order.
pub fn entries() -> impl Iterator<Item = SchemaEntry> {
    let mut out = Vec::new();
    for (path, node) in schema().iter() {
        node.collect_entries(path.to_owned(), &mut out);
    }
    out.into_iter()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_test::{assert_ser_tokens, Token};
    use std::collections::BTreeSet;

    const PRIMARY_MASTER: &str =
        "VBoxInternal/Devices/piix3ide/0/Config/PrimaryMaster";

    #[test]
    fn top_level_paths_are_non_empty() {
        let paths: Vec<_> = all_paths().collect();
        assert_eq!(paths, vec![PCBIOS, PIIX3IDE, ACPI, VGA]);
        for path in paths {
            let node = lookup(path).unwrap();
            assert!(!node.is_empty(), "{path} has no entries");
        }
    }

    #[test]
    fn all_paths_is_restartable() {
        let paths = all_paths();
        assert_eq!(paths.clone().count(), 4);
        assert_eq!(paths.count(), 4);
        assert_eq!(all_paths().count(), 4);
    }

    #[test]
    fn top_level_paths_are_unique() {
        let unique: BTreeSet<_> = all_paths().collect();
        assert_eq!(unique.len(), all_paths().count());
    }

    #[test]
    fn leaf_components_are_non_empty() {
        for leaf in entries() {
            assert!(!leaf.entry.category.is_empty(), "{}", leaf.key());
            assert!(!leaf.entry.field.is_empty(), "{}", leaf.key());
        }
    }

    #[test]
    fn leaf_keys_are_unique() {
        let keys: BTreeSet<_> = entries().map(|leaf| leaf.key()).collect();
        assert_eq!(keys.len(), 43);
        assert_eq!(entries().count(), 43);
    }

    #[test]
    fn depth_is_bounded() {
        for (path, node) in schema().iter() {
            for (segment, child) in node.children() {
                assert!(
                    matches!(child, SchemaNode::Settings(_)),
                    "{path}/{segment} nests further"
                );
            }
        }
    }

    #[test]
    fn resolve_bios_vendor() {
        assert_eq!(
            resolve_setting(PCBIOS, "DmiBIOSVendor"),
            Ok(SettingEntry::new("bios", "vendor"))
        );
        assert_eq!(
            resolve_setting(VGA, "BiosRom"),
            Ok(SettingEntry::new("vga", "bios_rom_path"))
        );
        assert_eq!(
            resolve_setting(PCBIOS, "BiosRom"),
            Ok(SettingEntry::new("bios", "bios_rom_path"))
        );
    }

    #[test]
    fn ide_settings_require_port() {
        assert_eq!(
            resolve_setting(PIIX3IDE, "SerialNumber"),
            Err(LookupError::SettingNotFound {
                path: PIIX3IDE.to_owned(),
                setting: "SerialNumber".to_owned(),
            })
        );
        assert_eq!(
            resolve_setting(PRIMARY_MASTER, "SerialNumber"),
            Ok(SettingEntry::new("primary_master", "serial"))
        );
        let nested = lookup(PIIX3IDE)
            .unwrap()
            .child("SecondaryMaster")
            .unwrap()
            .setting("ATAPIRevision");
        assert_eq!(
            nested,
            Some(SettingEntry::new("secondary_master", "atapi_revision"))
        );
    }

    #[test]
    fn port0_is_empty() {
        let node =
            lookup("VBoxInternal/Devices/piix3ide/0/Config/Port0").unwrap();
        assert!(node.is_empty());
        assert_eq!(node.settings().count(), 0);
        assert!(entries().all(|leaf| !leaf.path.ends_with("/Port0")));
        assert!(matches!(
            resolve_setting(
                "VBoxInternal/Devices/piix3ide/0/Config/Port0",
                "ATAPIVendorId"
            ),
            Err(LookupError::SettingNotFound { .. })
        ));
    }

    #[test]
    fn missing_paths() {
        for path in [
            "",
            "VBoxInternal/Devices/pcbios/1/Config",
            "VBoxInternal/Devices/pcbios/0/Config/",
            "VBoxInternal/Devices/pcbios/0/ConfigX",
            "VBoxInternal/Devices/pcbios/0/Config/Port0",
            "VBoxInternal/Devices/piix3ide/0/Config/Port1",
            "VBoxInternal/Devices/piix3ide/0/Config/PrimaryMaster/Extra",
        ] {
            assert_eq!(
                lookup(path),
                Err(LookupError::PathNotFound(path.to_owned())),
                "{path:?}"
            );
        }
        assert!(matches!(
            resolve_setting("VBoxInternal/Devices/nope", "BiosRom"),
            Err(LookupError::PathNotFound(_))
        ));
    }

    #[test]
    fn lookups_are_idempotent() {
        let first = resolve_setting(ACPI, "AcpiOemId");
        let second = resolve_setting(ACPI, "AcpiOemId");
        assert_eq!(first, second);
        assert!(std::ptr::eq(lookup(ACPI).unwrap(), lookup(ACPI).unwrap()));
        assert_eq!(
            entries().collect::<Vec<_>>(),
            entries().collect::<Vec<_>>()
        );
    }

    #[test]
    fn entry_keys() {
        let leaf = entries()
            .find(|leaf| {
                leaf.entry == SettingEntry::new("primary_master", "model")
            })
            .unwrap();
        assert_eq!(leaf.path, PRIMARY_MASTER);
        assert_eq!(
            leaf.key(),
            "VBoxInternal/Devices/piix3ide/0/Config/PrimaryMaster/ModelNumber"
        );
        let first = entries().next().unwrap();
        assert_eq!(
            first.key(),
            "VBoxInternal/Devices/pcbios/0/Config/DmiBIOSFirmwareMajor"
        );
    }

    #[test]
    fn setting_entry_display() {
        assert_eq!(
            SettingEntry::new("oem_vbox", "rev").to_string(),
            "oem_vbox.rev"
        );
    }

    #[test]
    fn setting_entry_serialization() {
        assert_ser_tokens(
            &SettingEntry::new("chassis", "type"),
            &[
                Token::Struct { name: "SettingEntry", len: 2 },
                Token::Str("category"),
                Token::Str("chassis"),
                Token::Str("field"),
                Token::Str("type"),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn schema_serialization() {
        let dumped = serde_json::to_value(schema()).unwrap();
        assert_eq!(
            dumped[VGA],
            serde_json::json!({
                "BiosRom": { "category": "vga", "field": "bios_rom_path" }
            })
        );
        assert_eq!(dumped[PIIX3IDE]["Port0"], serde_json::json!({}));
        assert_eq!(
            dumped[PIIX3IDE]["PrimaryMaster"]["FirmwareRevision"]["field"],
            "revision"
        );
        assert_eq!(dumped.as_object().unwrap().len(), 4);
    }
}
