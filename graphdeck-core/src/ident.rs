// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Metric identifiers
//!
//! An [`Identifier`] names one monitored metric source by five fields:
//! host, plugin, plugin instance, type and type instance. The same type is
//! used for graph selectors, where any field may hold one of two wildcards:
//!
//! - [`Field::Any`] (`/any/`) matches every value but keeps matched values
//!   apart, so each distinct value becomes its own graph instance.
//! - [`Field::All`] (`/all/`) matches every value and folds all of them into
//!   a single aggregate instance.
//!
//! Wildcard tokens are parsed once, when the identifier is built, so matching
//! never has to re-inspect token text. The token spellings are reserved: any
//! field spelled `/any/` or `/all/`, in any case, is a wildcard and is written
//! back in lowercase. Every other value serializes byte for byte.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitOr;
use std::str::FromStr;
use std::time::SystemTime;

/// Textual form of the "distinguish by value" wildcard
pub const ANY_TOKEN: &str = "/any/";

/// Textual form of the "aggregate all values" wildcard
pub const ALL_TOKEN: &str = "/all/";

/// Extension of data files produced by [`Identifier::to_file_path`]
pub const FILE_EXTENSION: &str = ".rrd";

/// Marker for an empty path component in the file path encoding
const EMPTY_COMPONENT: &str = "-";

/// A single identifier field: a literal value or a wildcard
///
/// An empty literal means the field is not used. Equality, ordering and
/// hashing all go through [`Field::as_str`], so a field compares exactly like
/// its textual form.
#[derive(Debug, Clone)]
pub enum Field {
    Literal(String),
    Any,
    All,
}

impl Field {
    /// Parse a field, recognizing the wildcard tokens case-insensitively
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case(ANY_TOKEN) {
            Field::Any
        } else if value.eq_ignore_ascii_case(ALL_TOKEN) {
            Field::All
        } else {
            Field::Literal(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Field::Literal(s) => s.as_str(),
            Field::Any => ANY_TOKEN,
            Field::All => ALL_TOKEN,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Field::Any | Field::All)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Literal(s) if s.is_empty())
    }

    /// Selector-side test: wildcards match anything, literals match
    /// case-insensitively.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Field::Any | Field::All => true,
            Field::Literal(s) => s.eq_ignore_ascii_case(value),
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::Literal(String::new())
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::parse(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case(ANY_TOKEN) || value.eq_ignore_ascii_case(ALL_TOKEN) {
            Field::parse(&value)
        } else {
            Field::Literal(value)
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Field {}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().as_bytes().cmp(other.as_str().as_bytes())
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Field::from(value))
    }
}

/// Names one of the five identifier fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentField {
    Host,
    Plugin,
    PluginInstance,
    Type,
    TypeInstance,
}

impl IdentField {
    /// All fields in comparison order
    pub const ALL: [IdentField; 5] = [
        IdentField::Host,
        IdentField::Plugin,
        IdentField::PluginInstance,
        IdentField::Type,
        IdentField::TypeInstance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IdentField::Host => "host",
            IdentField::Plugin => "plugin",
            IdentField::PluginInstance => "plugin_instance",
            IdentField::Type => "type",
            IdentField::TypeInstance => "type_instance",
        }
    }
}

impl fmt::Display for IdentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IdentField {
    type Err = GraphError;

    /// Accepts `plugin_instance`, `PluginInstance` and `plugin-instance`
    /// spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "host" => Ok(IdentField::Host),
            "plugin" => Ok(IdentField::Plugin),
            "plugininstance" => Ok(IdentField::PluginInstance),
            "type" => Ok(IdentField::Type),
            "typeinstance" => Ok(IdentField::TypeInstance),
            _ => Err(GraphError::InvalidArgument(format!(
                "unknown identifier field: {}",
                s
            ))),
        }
    }
}

/// Controls which wildcard kinds [`Identifier::with_selector`] replaces with
/// the concrete value of the source identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorFlags(u8);

impl SelectorFlags {
    pub const NONE: SelectorFlags = SelectorFlags(0);
    pub const REPLACE_ALL: SelectorFlags = SelectorFlags(0x01);
    pub const REPLACE_ANY: SelectorFlags = SelectorFlags(0x02);

    pub const fn contains(self, other: SelectorFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SelectorFlags {
    type Output = SelectorFlags;

    fn bitor(self, rhs: SelectorFlags) -> SelectorFlags {
        SelectorFlags(self.0 | rhs.0)
    }
}

/// Five-field metric identifier
///
/// `mtime` is carried along from file discovery for the renderer's cache
/// decisions. It takes no part in equality, ordering or serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(default)]
    host: Field,
    #[serde(default)]
    plugin: Field,
    #[serde(default)]
    plugin_instance: Field,
    #[serde(default, rename = "type")]
    type_: Field,
    #[serde(default)]
    type_instance: Field,
    #[serde(skip)]
    mtime: Option<SystemTime>,
}

impl Identifier {
    pub fn new(
        host: &str,
        plugin: &str,
        plugin_instance: &str,
        type_: &str,
        type_instance: &str,
    ) -> Self {
        Self {
            host: Field::parse(host),
            plugin: Field::parse(plugin),
            plugin_instance: Field::parse(plugin_instance),
            type_: Field::parse(type_),
            type_instance: Field::parse(type_instance),
            mtime: None,
        }
    }

    /// Build the canonical identifier of a graph instance.
    ///
    /// Literal selector fields are copied from the selector. A wildcard field
    /// takes `ident`'s value when `flags` asks for that wildcard kind to be
    /// replaced, and otherwise keeps the wildcard itself. The result carries
    /// `ident`'s mtime.
    pub fn with_selector(selector: &Identifier, ident: &Identifier, flags: SelectorFlags) -> Self {
        let pick = |sel: &Field, value: &Field| -> Field {
            match sel {
                Field::Literal(_) => sel.clone(),
                Field::Any if flags.contains(SelectorFlags::REPLACE_ANY) => value.clone(),
                Field::All if flags.contains(SelectorFlags::REPLACE_ALL) => value.clone(),
                Field::Any => Field::Any,
                Field::All => Field::All,
            }
        };

        Self {
            host: pick(&selector.host, &ident.host),
            plugin: pick(&selector.plugin, &ident.plugin),
            plugin_instance: pick(&selector.plugin_instance, &ident.plugin_instance),
            type_: pick(&selector.type_, &ident.type_),
            type_instance: pick(&selector.type_instance, &ident.type_instance),
            mtime: ident.mtime,
        }
    }

    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    pub fn plugin(&self) -> &str {
        self.plugin.as_str()
    }

    pub fn plugin_instance(&self) -> &str {
        self.plugin_instance.as_str()
    }

    pub fn type_(&self) -> &str {
        self.type_.as_str()
    }

    pub fn type_instance(&self) -> &str {
        self.type_instance.as_str()
    }

    pub fn set_host(&mut self, host: impl Into<Field>) {
        self.host = host.into();
    }

    pub fn set_plugin(&mut self, plugin: impl Into<Field>) {
        self.plugin = plugin.into();
    }

    pub fn set_plugin_instance(&mut self, plugin_instance: impl Into<Field>) {
        self.plugin_instance = plugin_instance.into();
    }

    pub fn set_type(&mut self, type_: impl Into<Field>) {
        self.type_ = type_.into();
    }

    pub fn set_type_instance(&mut self, type_instance: impl Into<Field>) {
        self.type_instance = type_instance.into();
    }

    pub fn field(&self, field: IdentField) -> &Field {
        match field {
            IdentField::Host => &self.host,
            IdentField::Plugin => &self.plugin,
            IdentField::PluginInstance => &self.plugin_instance,
            IdentField::Type => &self.type_,
            IdentField::TypeInstance => &self.type_instance,
        }
    }

    pub fn set_field(&mut self, field: IdentField, value: impl Into<Field>) {
        let value = value.into();
        match field {
            IdentField::Host => self.host = value,
            IdentField::Plugin => self.plugin = value,
            IdentField::PluginInstance => self.plugin_instance = value,
            IdentField::Type => self.type_ = value,
            IdentField::TypeInstance => self.type_instance = value,
        }
    }

    fn fields(&self) -> [&Field; 5] {
        [
            &self.host,
            &self.plugin,
            &self.plugin_instance,
            &self.type_,
            &self.type_instance,
        ]
    }

    pub fn has_wildcard(&self) -> bool {
        self.fields().iter().any(|f| f.is_wildcard())
    }

    pub fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    pub fn set_mtime(&mut self, mtime: Option<SystemTime>) {
        self.mtime = mtime;
    }

    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Field-by-field byte comparison in host, plugin, plugin instance, type,
    /// type instance order.
    pub fn compare(&self, other: &Identifier) -> Ordering {
        self.fields()
            .iter()
            .zip(other.fields().iter())
            .map(|(a, b)| a.cmp(b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Treat `self` as a selector and test `ident` against it.
    ///
    /// Every field must match: a wildcard matches any value, a literal must be
    /// equal ignoring ASCII case.
    pub fn matches(&self, ident: &Identifier) -> bool {
        self.fields()
            .iter()
            .zip(ident.fields().iter())
            .all(|(sel, value)| sel.matches(value.as_str()))
    }

    /// Filesystem-safe relative path, `host/plugin[-inst]/type[-inst].rrd`.
    ///
    /// Each field is percent-escaped so that `/`, `-` and `%` never appear
    /// raw; a leading `.` is escaped too. Empty host, plugin or type
    /// components are written as `-`.
    pub fn to_file_path(&self) -> String {
        let host = component(&escape_path_field(self.host()));
        let plugin = joined_component(self.plugin(), self.plugin_instance());
        let type_ = joined_component(self.type_(), self.type_instance());

        format!("{}/{}/{}{}", host, plugin, type_, FILE_EXTENSION)
    }

    /// Inverse of [`Identifier::to_file_path`].
    ///
    /// Only the last three path components are used, so a data directory
    /// prefix may be left on the path. Raw `-` is accepted inside host and
    /// instance parts, as collectd writes them.
    pub fn from_file_path(path: &str) -> Result<Self> {
        let trimmed = path.strip_suffix(FILE_EXTENSION).ok_or_else(|| {
            GraphError::InvalidArgument(format!("not a {} file: {}", FILE_EXTENSION, path))
        })?;

        let parts: Vec<&str> = trimmed.rsplitn(4, '/').collect();
        if parts.len() < 3 {
            return Err(GraphError::InvalidArgument(format!(
                "expected host/plugin/type path: {}",
                path
            )));
        }

        let (type_, type_instance) = split_component(parts[0])?;
        let (plugin, plugin_instance) = split_component(parts[1])?;
        let host = if parts[2] == EMPTY_COMPONENT {
            String::new()
        } else {
            unescape_path_field(parts[2])?
        };

        Ok(Self::new(
            &host,
            &plugin,
            &plugin_instance,
            &type_,
            &type_instance,
        ))
    }

    /// JSON object with the five fields as strings; unset fields are `""`.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "host": self.host(),
            "plugin": self.plugin(),
            "plugin_instance": self.plugin_instance(),
            "type": self.type_(),
            "type_instance": self.type_instance(),
        })
        .to_string()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Identifier {}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for field in self.fields() {
            field.hash(state);
        }
    }
}

/// Human-readable title: `host/plugin-inst/type-inst` with empty parts left
/// out.
impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segments = [
            self.host().to_string(),
            join_instance(self.plugin(), self.plugin_instance()),
            join_instance(self.type_(), self.type_instance()),
        ];

        let mut first = true;
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            if !first {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
            first = false;
        }
        Ok(())
    }
}

fn join_instance(name: &str, instance: &str) -> String {
    match (name.is_empty(), instance.is_empty()) {
        (_, true) => name.to_string(),
        (true, false) => instance.to_string(),
        (false, false) => format!("{}-{}", name, instance),
    }
}

fn component(escaped: &str) -> String {
    if escaped.is_empty() {
        EMPTY_COMPONENT.to_string()
    } else {
        escaped.to_string()
    }
}

fn joined_component(name: &str, instance: &str) -> String {
    let name = escape_path_field(name);
    if instance.is_empty() {
        component(&name)
    } else {
        format!("{}-{}", name, escape_path_field(instance))
    }
}

/// Split `name-instance` at the first `-`. Names never hold a raw `-`, but
/// instances written by other tools often do (`disk-dm-0`), so the instance
/// part is taken verbatim.
fn split_component(component: &str) -> Result<(String, String)> {
    match component.split_once('-') {
        Some((name, instance)) => Ok((unescape_path_field(name)?, unescape_path_field(instance)?)),
        None => Ok((unescape_path_field(component)?, String::new())),
    }
}

fn escape_path_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, byte) in value.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'_' || (byte == b'.' && i > 0);
        if keep {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

fn unescape_path_field(value: &str) -> Result<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = value.get(i + 1..i + 3).ok_or_else(|| {
                    GraphError::InvalidArgument(format!("truncated escape in {:?}", value))
                })?;
                let byte = u8::from_str_radix(hex, 16).map_err(|_| {
                    GraphError::InvalidArgument(format!("bad escape %{} in {:?}", hex, value))
                })?;
                out.push(byte);
                i += 3;
            }
            b'/' => {
                return Err(GraphError::InvalidArgument(format!(
                    "unescaped separator in {:?}",
                    value
                )))
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8(out)
        .map_err(|_| GraphError::InvalidArgument(format!("invalid UTF-8 in {:?}", value)))
}

/// Percent-encode everything outside the URI unreserved set.
pub(crate) fn uri_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// `host=..;plugin=..;plugin_instance=..;type=..;type_instance=..`
pub(crate) fn uri_params(ident: &Identifier) -> String {
    IdentField::ALL
        .iter()
        .map(|field| format!("{}={}", field.name(), uri_escape(ident.field(*field).as_str())))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cpu(instance: &str) -> Identifier {
        Identifier::new("web01", "cpu", instance, "cpu", "idle")
    }

    #[test]
    fn test_parse_tokens_case_insensitive() {
        assert_eq!(Field::parse("/ANY/"), Field::Any);
        assert_eq!(Field::parse("/all/"), Field::All);
        assert!(matches!(Field::parse("/All/"), Field::All));
        assert_eq!(Field::parse("any"), Field::Literal("any".to_string()));
        assert!(Field::parse("").is_empty());
    }

    #[test]
    fn test_compare_orders_fields() {
        let a = Identifier::new("a", "z", "", "", "");
        let b = Identifier::new("b", "a", "", "", "");
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(cpu("0").compare(&cpu("0")), Ordering::Equal);
        // case-sensitive byte order
        let upper = Identifier::new("Web01", "cpu", "0", "cpu", "idle");
        assert_eq!(upper.compare(&cpu("0")), Ordering::Less);
    }

    #[test]
    fn test_compare_ignores_mtime() {
        let a = cpu("0").with_mtime(SystemTime::UNIX_EPOCH);
        assert_eq!(a, cpu("0"));
    }

    #[test]
    fn test_matches_literals_and_wildcards() {
        let selector = Identifier::new("/any/", "cpu", "/all/", "cpu", "IDLE");
        assert!(selector.matches(&cpu("0")));
        assert!(selector.matches(&cpu("7")));
        assert!(!selector.matches(&Identifier::new("web01", "memory", "", "memory", "used")));

        let exact = cpu("0");
        assert!(exact.matches(&cpu("0")));
        assert!(!exact.matches(&cpu("1")));
    }

    #[test]
    fn test_with_selector_flags() {
        let selector = Identifier::new("", "cpu", "/any/", "cpu", "/all/");
        let file = cpu("3");

        let canonical = Identifier::with_selector(&selector, &file, SelectorFlags::REPLACE_ANY);
        assert_eq!(canonical.host(), "");
        assert_eq!(canonical.plugin_instance(), "3");
        assert_eq!(canonical.type_instance(), ALL_TOKEN);

        let both = Identifier::with_selector(
            &selector,
            &file,
            SelectorFlags::REPLACE_ANY | SelectorFlags::REPLACE_ALL,
        );
        assert_eq!(both.type_instance(), "idle");

        let none = Identifier::with_selector(&selector, &file, SelectorFlags::NONE);
        assert_eq!(none, selector);
    }

    #[test]
    fn test_display_elides_empty_parts() {
        assert_eq!(cpu("0").to_string(), "web01/cpu-0/cpu-idle");
        assert_eq!(
            Identifier::new("web01", "load", "", "load", "").to_string(),
            "web01/load/load"
        );
        assert_eq!(Identifier::new("", "cpu", "", "cpu", "").to_string(), "cpu/cpu");
    }

    #[test]
    fn test_file_path_encoding() {
        let ident = Identifier::new("web01.example.com", "disk", "sda-1", "disk_octets", "");
        let path = ident.to_file_path();
        assert_eq!(path, "web01.example.com/disk-sda%2D1/disk_octets.rrd");
        assert_eq!(Identifier::from_file_path(&path).unwrap(), ident);

        let dotted = Identifier::new("..", "", "", "x", "");
        assert_eq!(dotted.to_file_path(), "%2E./-/x.rrd");
    }

    #[test]
    fn test_from_file_path_with_prefix() {
        let ident = Identifier::from_file_path("/var/lib/rrd/web01/cpu-0/cpu-idle.rrd").unwrap();
        assert_eq!(ident, cpu("0"));
    }

    #[test]
    fn test_from_file_path_hyphenated_instances() {
        let ident = Identifier::from_file_path("web01/disk-dm-0/disk_octets.rrd").unwrap();
        assert_eq!(ident.plugin(), "disk");
        assert_eq!(ident.plugin_instance(), "dm-0");
        assert_eq!(ident.type_(), "disk_octets");

        let ident = Identifier::from_file_path("web-01/df-boot-efi/df_complex-used.rrd").unwrap();
        assert_eq!(ident.host(), "web-01");
        assert_eq!(ident.plugin_instance(), "boot-efi");
        assert_eq!(ident.type_instance(), "used");

        let ident = Identifier::from_file_path("gw/interface-br-lan/if_octets.rrd").unwrap();
        assert_eq!(ident, Identifier::new("gw", "interface", "br-lan", "if_octets", ""));
    }

    #[test]
    fn test_from_file_path_rejects_garbage() {
        assert!(Identifier::from_file_path("web01/cpu-0/cpu-idle.txt").is_err());
        assert!(Identifier::from_file_path("cpu-idle.rrd").is_err());
        assert!(Identifier::from_file_path("web01/cpu-0/cpu%Z1.rrd").is_err());
    }

    #[test]
    fn test_json_has_five_string_fields() {
        let value: serde_json::Value =
            serde_json::from_str(&Identifier::new("h", "p", "", "t", "").to_json()).unwrap();
        assert_eq!(value["host"], "h");
        assert_eq!(value["plugin_instance"], "");
        assert_eq!(value["type"], "t");
        assert_eq!(value.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_ident_field_from_str() {
        assert_eq!("plugin_instance".parse::<IdentField>().unwrap(), IdentField::PluginInstance);
        assert_eq!("TypeInstance".parse::<IdentField>().unwrap(), IdentField::TypeInstance);
        assert!("colour".parse::<IdentField>().is_err());
    }

    #[test]
    fn test_uri_params() {
        let ident = Identifier::new("a b", "cpu", "/any/", "cpu", "");
        assert_eq!(
            uri_params(&ident),
            "host=a%20b;plugin=cpu;plugin_instance=%2Fany%2F;type=cpu;type_instance="
        );
    }

    /// Printable ASCII, with wildcard spellings mixed in
    fn field_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            8 => "[ -~]{0,10}",
            1 => prop_oneof![
                Just("/ANY/".to_string()),
                Just("/any/".to_string()),
                Just("/All/".to_string()),
            ],
        ]
    }

    fn fields_strategy() -> impl Strategy<Value = [String; 5]> {
        (
            field_strategy(),
            field_strategy(),
            field_strategy(),
            field_strategy(),
            field_strategy(),
        )
            .prop_map(|(h, p, pi, t, ti)| [h, p, pi, t, ti])
    }

    fn build(fields: &[String; 5]) -> Identifier {
        Identifier::new(&fields[0], &fields[1], &fields[2], &fields[3], &fields[4])
    }

    fn ident_strategy() -> impl Strategy<Value = Identifier> {
        fields_strategy().prop_map(|fields| build(&fields))
    }

    /// Text a field is expected to read back as: wildcard spellings come
    /// back in their canonical lowercase form, everything else verbatim.
    fn expected_text(value: &str) -> String {
        if value.eq_ignore_ascii_case(ANY_TOKEN) || value.eq_ignore_ascii_case(ALL_TOKEN) {
            value.to_ascii_lowercase()
        } else {
            value.to_string()
        }
    }

    fn assert_fields(decoded: &Identifier, fields: &[String; 5]) {
        for (field, value) in IdentField::ALL.iter().zip(fields.iter()) {
            assert_eq!(decoded.field(*field).as_str(), expected_text(value));
        }
    }

    #[test]
    fn test_wildcard_spelling_is_normalized() {
        let ident = Identifier::new("/ANY/", "cpu", "/All/", "cpu", "");
        assert_eq!(ident.field(IdentField::Host), &Field::Any);

        let json: serde_json::Value = serde_json::from_str(&ident.to_json()).unwrap();
        assert_eq!(json["host"], ANY_TOKEN);
        assert_eq!(json["plugin_instance"], ALL_TOKEN);
        assert_eq!(Identifier::from_json(&ident.to_json()).unwrap(), ident);

        let decoded = Identifier::from_file_path(&ident.to_file_path()).unwrap();
        assert_eq!(decoded.host(), ANY_TOKEN);
        assert_eq!(decoded, ident);
    }

    proptest! {
        #[test]
        fn prop_compare_is_a_total_order(a in ident_strategy(), b in ident_strategy(), c in ident_strategy()) {
            prop_assert_eq!(a.compare(&a), Ordering::Equal);
            prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
            if a.compare(&b) != Ordering::Greater && b.compare(&c) != Ordering::Greater {
                prop_assert_ne!(a.compare(&c), Ordering::Greater);
            }
        }

        #[test]
        fn prop_literal_selector_matches_itself(a in ident_strategy()) {
            prop_assert!(a.matches(&a));
        }

        #[test]
        fn prop_file_path_round_trip(fields in fields_strategy()) {
            let a = build(&fields);
            let decoded = Identifier::from_file_path(&a.to_file_path()).unwrap();
            assert_fields(&decoded, &fields);
            prop_assert_eq!(decoded, a);
        }

        #[test]
        fn prop_json_round_trip(fields in fields_strategy()) {
            let a = build(&fields);
            let decoded = Identifier::from_json(&a.to_json()).unwrap();
            assert_fields(&decoded, &fields);
            prop_assert_eq!(decoded, a);
        }
    }
}
