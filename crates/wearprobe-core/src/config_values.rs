//! Configuration values read once from the static configuration source.
//!
//! The source is a nested key-value structure (a TOML table). The SDK's keys
//! live under the top-level [`SECTION`] table. Every recognized key is
//! string-valued; a missing or non-string value is reported as
//! [`ConfigValue::Absent`] and rendered as [`ABSENT_DISPLAY`].

use std::fmt;

use serde::{Serialize, Serializer};

/// Name of the table that holds the SDK keys.
pub const SECTION: &str = "MWDAT";

/// Display value for a key that is not present in the source.
pub const ABSENT_DISPLAY: &str = "(absent)";

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// The fixed set of recognized configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    MetaAppId,
    ClientToken,
    TeamId,
    AppLinkUrlScheme,
}

impl ConfigKey {
    /// All keys, in display order.
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::MetaAppId,
        ConfigKey::ClientToken,
        ConfigKey::TeamId,
        ConfigKey::AppLinkUrlScheme,
    ];

    /// The key as it is spelled in the configuration source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaAppId => "MetaAppID",
            Self::ClientToken => "ClientToken",
            Self::TeamId => "TeamID",
            Self::AppLinkUrlScheme => "AppLinkURLScheme",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Present(String),
    Absent,
}

impl ConfigValue {
    /// The value if present.
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Present(v) => Some(v.as_str()),
            Self::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(v) => f.write_str(v),
            Self::Absent => f.write_str(ABSENT_DISPLAY),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of reading the static source.
#[derive(Debug, Clone)]
pub struct ConfigRead {
    pub values: ConfigValues,
    /// `false` when the [`SECTION`] table was missing entirely.
    pub section_found: bool,
}

/// Immutable mapping from every [`ConfigKey`] to its [`ConfigValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValues {
    meta_app_id: ConfigValue,
    client_token: ConfigValue,
    team_id: ConfigValue,
    app_link_url_scheme: ConfigValue,
}

impl ConfigValues {
    /// Read the recognized keys out of a static configuration source.
    ///
    /// Never fails: a missing section yields all-absent values with
    /// `section_found == false`.
    pub fn read_from(source: &toml::Table) -> ConfigRead {
        let Some(section) = source.get(SECTION).and_then(|v| v.as_table()) else {
            return ConfigRead {
                values: Self::all_absent(),
                section_found: false,
            };
        };

        let lookup = |key: ConfigKey| match section.get(key.as_str()).and_then(|v| v.as_str()) {
            Some(s) => ConfigValue::Present(s.to_owned()),
            None => ConfigValue::Absent,
        };

        ConfigRead {
            values: Self {
                meta_app_id: lookup(ConfigKey::MetaAppId),
                client_token: lookup(ConfigKey::ClientToken),
                team_id: lookup(ConfigKey::TeamId),
                app_link_url_scheme: lookup(ConfigKey::AppLinkUrlScheme),
            },
            section_found: true,
        }
    }

    /// Values with every key absent.
    pub fn all_absent() -> Self {
        Self {
            meta_app_id: ConfigValue::Absent,
            client_token: ConfigValue::Absent,
            team_id: ConfigValue::Absent,
            app_link_url_scheme: ConfigValue::Absent,
        }
    }

    pub fn get(&self, key: ConfigKey) -> &ConfigValue {
        match key {
            ConfigKey::MetaAppId => &self.meta_app_id,
            ConfigKey::ClientToken => &self.client_token,
            ConfigKey::TeamId => &self.team_id,
            ConfigKey::AppLinkUrlScheme => &self.app_link_url_scheme,
        }
    }

    /// Iterate `(key, value)` pairs in [`ConfigKey::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigKey, &ConfigValue)> {
        ConfigKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

impl Serialize for ConfigValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> toml::Table {
        text.parse::<toml::Table>().unwrap()
    }

    #[test]
    fn reads_present_key_and_marks_others_absent() {
        let read = ConfigValues::read_from(&source(
            r#"
            [MWDAT]
            MetaAppID = "abc123"
            "#,
        ));

        assert!(read.section_found);
        let values = read.values;
        assert_eq!(
            values.get(ConfigKey::MetaAppId),
            &ConfigValue::Present("abc123".to_string())
        );
        for key in [
            ConfigKey::ClientToken,
            ConfigKey::TeamId,
            ConfigKey::AppLinkUrlScheme,
        ] {
            assert_eq!(values.get(key), &ConfigValue::Absent);
            assert_eq!(values.get(key).to_string(), "(absent)");
        }
    }

    #[test]
    fn missing_section_yields_all_absent() {
        let read = ConfigValues::read_from(&source("[other]\nkey = 1\n"));
        assert!(!read.section_found);
        assert_eq!(read.values, ConfigValues::all_absent());
    }

    #[test]
    fn non_string_value_is_absent() {
        let read = ConfigValues::read_from(&source(
            r#"
            [MWDAT]
            TeamID = 42
            ClientToken = "tok"
            "#,
        ));
        assert_eq!(read.values.get(ConfigKey::TeamId), &ConfigValue::Absent);
        assert_eq!(read.values.get(ConfigKey::ClientToken).as_deref(), Some("tok"));
    }

    #[test]
    fn iter_follows_display_order() {
        let values = ConfigValues::all_absent();
        let keys: Vec<&str> = values.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["MetaAppID", "ClientToken", "TeamID", "AppLinkURLScheme"]
        );
    }

    #[test]
    fn serializes_as_flat_map() {
        let read = ConfigValues::read_from(&source("[MWDAT]\nTeamID = \"T1\"\n"));
        let json = serde_json::to_value(&read.values).unwrap();
        assert_eq!(json["TeamID"], "T1");
        assert_eq!(json["MetaAppID"], "(absent)");
    }
}
