// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The VirtualBox device-configuration keys which carry hardware identity.
//!
//! The layout mirrors VirtualBox's own CFGM tree (device → instance →
//! `Config` → optional port/drive → key) so that entries can be audited
//! against the hypervisor's documentation line by line.

use crate::{SchemaNode, SettingEntry};

const fn e(category: &'static str, field: &'static str) -> SettingEntry {
    SettingEntry::new(category, field)
}

pub const PCBIOS: &str = "VBoxInternal/Devices/pcbios/0/Config";
pub const PIIX3IDE: &str = "VBoxInternal/Devices/piix3ide/0/Config";
pub const ACPI: &str = "VBoxInternal/Devices/acpi/0/Config";
pub const VGA: &str = "VBoxInternal/Devices/vga/0/Config";

// http://blog.prowling.nu/2012/08/modifying-virtualbox-settings-for.html
// http://blog.prowling.nu/2012/10/modifying-virtualbox-settings-for.html
const PCBIOS_SETTINGS: &[(&str, SettingEntry)] = &[
    ("DmiBIOSFirmwareMajor", e("bios", "firmware_major")),
    ("DmiBIOSFirmwareMinor", e("bios", "firmware_minor")),
    ("DmiBIOSReleaseDate", e("bios", "release_date")),
    ("DmiBIOSReleaseMajor", e("bios", "release_major")),
    ("DmiBIOSReleaseMinor", e("bios", "release_minor")),
    ("DmiBIOSVendor", e("bios", "vendor")),
    ("DmiBIOSVersion", e("bios", "version")),
    ("DmiChassisAssetTag", e("chassis", "asset")),
    ("DmiChassisSerial", e("chassis", "serial")),
    ("DmiChassisVendor", e("chassis", "vendor")),
    ("DmiChassisVersion", e("chassis", "version")),
    ("DmiChassisType", e("chassis", "type")),
    ("DmiBoardVendor", e("board", "vendor")),
    ("DmiBoardProduct", e("board", "product")),
    ("DmiBoardVersion", e("board", "version")),
    ("DmiBoardSerial", e("board", "serial")),
    ("DmiBoardAssetTag", e("board", "asset")),
    ("DmiBoardLocInChass", e("board", "location")),
    ("DmiBoardBoardType", e("board", "type")),
    ("DmiSystemVendor", e("system", "vendor")),
    ("DmiSystemProduct", e("system", "product")),
    ("DmiSystemVersion", e("system", "version")),
    ("DmiSystemSerial", e("system", "serial")),
    ("DmiSystemSKU", e("system", "sku")),
    ("DmiSystemFamily", e("system", "family")),
    ("DmiSystemUuid", e("system", "uuid")),
    ("DmiOEMVBoxVer", e("oem_vbox", "ver")),
    ("DmiOEMVBoxRev", e("oem_vbox", "rev")),
    ("BiosRom", e("bios", "bios_rom_path")),
    ("LanBootRom", e("bios", "lan_boot_rom_path")),
];

// The primary port's ATAPI identity (ATAPIVendorId, ATAPIProductId,
// ATAPIRevision) is left unmapped.
// http://downloads.cuckoosandbox.org/slides/blackhat.pdf, Page 82
// https://forums.virtualbox.org/viewtopic.php?f=1&t=48718
const PORT0_SETTINGS: &[(&str, SettingEntry)] = &[];

// http://blog.prowling.nu/2012/08/modifying-virtualbox-settings-for.html
const PRIMARY_MASTER_SETTINGS: &[(&str, SettingEntry)] = &[
    ("SerialNumber", e("primary_master", "serial")),
    ("FirmwareRevision", e("primary_master", "revision")),
    ("ModelNumber", e("primary_master", "model")),
];

// http://blog.prowling.nu/2012/08/modifying-virtualbox-settings-for.html
const SECONDARY_MASTER_SETTINGS: &[(&str, SettingEntry)] = &[
    ("SerialNumber", e("secondary_master", "serial")),
    ("FirmwareRevision", e("secondary_master", "revision")),
    ("ModelNumber", e("secondary_master", "model")),
    ("ATAPIVendorId", e("secondary_master", "atapi_vendor")),
    ("ATAPIProductId", e("secondary_master", "atapi_product")),
    ("ATAPIRevision", e("secondary_master", "atapi_revision")),
];

const PIIX3IDE_PORTS: &[(&str, SchemaNode)] = &[
    ("Port0", SchemaNode::Settings(PORT0_SETTINGS)),
    ("PrimaryMaster", SchemaNode::Settings(PRIMARY_MASTER_SETTINGS)),
    ("SecondaryMaster", SchemaNode::Settings(SECONDARY_MASTER_SETTINGS)),
];

const ACPI_SETTINGS: &[(&str, SettingEntry)] = &[
    ("AcpiOemId", e("acpi", "oem")),
    ("DsdtFilePath", e("acpi", "dsdt_path")),
    ("SsdtFilePath", e("acpi", "ssdt_path")),
];

const VGA_SETTINGS: &[(&str, SettingEntry)] =
    &[("BiosRom", e("vga", "bios_rom_path"))];

/// Every top-level configuration path, in the order the provisioning logic
/// applies them.
pub(crate) static VBOX_CONFIG: &[(&str, SchemaNode)] = &[
    (PCBIOS, SchemaNode::Settings(PCBIOS_SETTINGS)),
    (PIIX3IDE, SchemaNode::Nested(PIIX3IDE_PORTS)),
    (ACPI, SchemaNode::Settings(ACPI_SETTINGS)),
    (VGA, SchemaNode::Settings(VGA_SETTINGS)),
];
