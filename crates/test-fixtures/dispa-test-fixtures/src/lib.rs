//! Shared JSON fixtures for the timeline crates, resolved through `fixtures/manifest.json`.
//!
//! The manifest has one section per [`Kind`]; each entry maps a fixture key to a
//! path relative to the `fixtures/` directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    timelines: BTreeMap<String, String>,
    #[serde(default)]
    bundles: BTreeMap<String, String>,
}

/// Manifest section a fixture is listed under.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A single stored timeline document.
    Timeline,
    /// `{ "timelines": [ ... ] }`
    Bundle,
}

impl Kind {
    fn section(self) -> &'static BTreeMap<String, String> {
        match self {
            Kind::Timeline => &MANIFEST.timelines,
            Kind::Bundle => &MANIFEST.bundles,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Kind::Timeline => "timeline",
            Kind::Bundle => "bundle",
        }
    }

    /// Fixture keys in sorted order.
    pub fn keys(self) -> Vec<String> {
        self.section().keys().cloned().collect()
    }

    pub fn get(self, key: &str) -> Result<Fixture> {
        let Some(rel) = self.section().get(key) else {
            bail!(
                "no {} fixture '{key}' (known: {})",
                self.label(),
                self.keys().join(", ")
            );
        };
        Ok(Fixture {
            kind: self,
            key: key.to_string(),
            path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../../../fixtures")
                .join(rel),
        })
    }
}

/// A resolved manifest entry.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub kind: Kind,
    pub key: String,
    pub path: PathBuf,
}

impl Fixture {
    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).with_context(|| {
            format!(
                "reading {} fixture '{}' from {}",
                self.kind.label(),
                self.key,
                self.path.display()
            )
        })
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.read()?;
        serde_json::from_str(&text)
            .with_context(|| format!("decoding {} fixture '{}'", self.kind.label(), self.key))
    }
}

pub mod timelines {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Timeline.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Timeline.get(name)?.read()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Timeline.get(name)?.parse()
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(Kind::Timeline.get(name)?.path)
    }
}

pub mod bundles {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Bundle.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Bundle.get(name)?.read()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Kind::Bundle.get(name)?.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_resolves_to_json() {
        for key in timelines::keys() {
            let v: serde_json::Value = timelines::load(&key).unwrap();
            assert_eq!(v["name"], serde_json::Value::String(key.clone()));
            assert!(timelines::path(&key).unwrap().exists());
        }
        for key in bundles::keys() {
            let v: serde_json::Value = bundles::load(&key).unwrap();
            assert!(v["timelines"].is_array());
        }
    }

    #[test]
    fn unknown_key_lists_known_fixtures() {
        let err = Kind::Timeline.get("missing").unwrap_err().to_string();
        assert!(err.contains("no timeline fixture 'missing'"), "{err}");
        assert!(err.contains("dtest-atest"), "{err}");
        assert!(timelines::json("missing").is_err());
    }
}
