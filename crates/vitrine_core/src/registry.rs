use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

use crate::names::to_kebab_case;

pub const DEFAULT_MAIN_ENTRY: &str = "storefront";

const EXPECTED_SHAPE: &str = r#"{
  "plugins": [{
    "name": "AcmeProductOrigin",
    "mapping": {
      "acme-product-origin-map": "/src/plugin/acme-product-origin-map.js"
    }
  }]
}"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Continuing without registrations would silently fold plugin code into
    /// the shared bundle, so the build must stop here.
    #[error(
        "missing option \"plugins\". Declare the plugin names that must stay \
         independently loadable instead of being merged into the shared \
         storefront bundle, e.g.:\n{}",
        EXPECTED_SHAPE
    )]
    MissingPlugins,
    #[error("output chunk \"{chunk}\" is declared by both \"{first}\" and \"{second}\"")]
    DuplicateOutputChunk {
        chunk: String,
        first: String,
        second: String,
    },
    #[error("malformed split options: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One plugin's declaration: which output chunks it owns and which source
/// entry feeds each of them.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PluginRegistration {
    pub name: String,
    /// output chunk name -> source entry path
    pub mapping: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SplitOptions {
    #[serde(default)]
    pub plugins: Option<Vec<PluginRegistration>>,
    #[serde(default = "default_main_entry")]
    pub main_entry: String,
}

fn default_main_entry() -> String {
    DEFAULT_MAIN_ENTRY.to_string()
}

impl SplitOptions {
    pub fn new(plugins: Vec<PluginRegistration>) -> Self {
        Self {
            plugins: Some(plugins),
            main_entry: default_main_entry(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Clone, Debug)]
pub struct RegisteredPlugin {
    pub name: String,
    /// Canonical chunk-matching key, kebab-cased from `name`.
    pub kebab_name: String,
    pub mapping: BTreeMap<String, String>,
}

/// Validated view over the plugin registrations of one build.
#[derive(Clone, Debug)]
pub struct PluginSet {
    plugins: Vec<RegisteredPlugin>,
    target_chunks: BTreeSet<String>,
    main_entry: String,
}

impl PluginSet {
    pub fn from_options(options: SplitOptions) -> Result<Self, ConfigError> {
        let Some(registrations) = options.plugins else {
            tracing::error!("plugin chunk splitting is configured without a \"plugins\" option");
            return Err(ConfigError::MissingPlugins);
        };

        let mut plugins = Vec::with_capacity(registrations.len());
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        for registration in registrations {
            for chunk in registration.mapping.keys() {
                if let Some(first) = owners.insert(chunk.clone(), registration.name.clone()) {
                    return Err(ConfigError::DuplicateOutputChunk {
                        chunk: chunk.clone(),
                        first,
                        second: registration.name,
                    });
                }
            }
            plugins.push(RegisteredPlugin {
                kebab_name: to_kebab_case(&registration.name, true),
                name: registration.name,
                mapping: registration.mapping,
            });
        }

        Ok(Self {
            plugins,
            target_chunks: owners.into_keys().collect(),
            main_entry: options.main_entry,
        })
    }

    pub fn plugins(&self) -> &[RegisteredPlugin] {
        &self.plugins
    }

    pub fn main_entry(&self) -> &str {
        &self.main_entry
    }

    /// Output chunk names across all registrations; chunks outside this set
    /// are left to the optimizer.
    pub fn is_target_chunk(&self, chunk_name: &str) -> bool {
        self.target_chunks.contains(chunk_name)
    }

    pub fn by_kebab_name(&self, kebab_name: &str) -> Option<&RegisteredPlugin> {
        self.plugins.iter().find(|p| p.kebab_name == kebab_name)
    }
}
