//! Compiler plugin and Solidity compiler settings.
//!
//! Both optimizer blocks may be written nested (`settings.optimizer`) or flat
//! (`optimizer`). The nested form is what gets serialized.

use serde::{Deserialize, Serialize};

/// Default optimizer runs used by solc when none are given
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

/// Where the compiler plugin obtains its compiler binary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerSource {
    #[default]
    Binary,
    Docker,
    #[serde(other)]
    Other,
}

impl CompilerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerSource::Binary => "binary",
            CompilerSource::Docker => "docker",
            CompilerSource::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginOptimizer {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolidityOptimizer {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_runs")]
    pub runs: u32,
}

impl Default for SolidityOptimizer {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    }
}

fn default_runs() -> u32 {
    DEFAULT_OPTIMIZER_RUNS
}

/// Settings for the external compiler add-on (e.g. zksolc)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CompilerRepr<PluginOptimizer>", into = "CompilerRepr<PluginOptimizer>")]
pub struct CompilerSettings {
    pub version: String,
    pub compiler_source: CompilerSource,
    pub optimizer: PluginOptimizer,
}

/// Solidity compiler version and optimizer profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CompilerRepr<SolidityOptimizer>", into = "CompilerRepr<SolidityOptimizer>")]
pub struct SolidityConfig {
    pub version: String,
    pub optimizer: SolidityOptimizer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsBlock<O> {
    optimizer: O,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CompilerRepr<O> {
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compiler_source: Option<CompilerSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<SettingsBlock<O>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    optimizer: Option<O>,
}

impl<O: Default> CompilerRepr<O> {
    fn take_optimizer(&mut self) -> Result<O, String> {
        match (self.settings.take(), self.optimizer.take()) {
            (Some(_), Some(_)) => Err(
                "optimizer given both as `optimizer` and `settings.optimizer`; use one".to_string(),
            ),
            (Some(settings), None) => Ok(settings.optimizer),
            (None, Some(optimizer)) => Ok(optimizer),
            (None, None) => Ok(O::default()),
        }
    }
}

impl TryFrom<CompilerRepr<PluginOptimizer>> for CompilerSettings {
    type Error = String;

    fn try_from(mut repr: CompilerRepr<PluginOptimizer>) -> Result<Self, Self::Error> {
        let optimizer = repr.take_optimizer()?;
        Ok(CompilerSettings {
            version: repr.version,
            compiler_source: repr.compiler_source.unwrap_or_default(),
            optimizer,
        })
    }
}

impl From<CompilerSettings> for CompilerRepr<PluginOptimizer> {
    fn from(value: CompilerSettings) -> Self {
        CompilerRepr {
            version: value.version,
            compiler_source: Some(value.compiler_source),
            settings: Some(SettingsBlock {
                optimizer: value.optimizer,
            }),
            optimizer: None,
        }
    }
}

impl TryFrom<CompilerRepr<SolidityOptimizer>> for SolidityConfig {
    type Error = String;

    fn try_from(mut repr: CompilerRepr<SolidityOptimizer>) -> Result<Self, Self::Error> {
        if repr.compiler_source.is_some() {
            return Err("unknown field `compilerSource` in solidity".to_string());
        }
        let optimizer = repr.take_optimizer()?;
        Ok(SolidityConfig {
            version: repr.version,
            optimizer,
        })
    }
}

impl From<SolidityConfig> for CompilerRepr<SolidityOptimizer> {
    fn from(value: SolidityConfig) -> Self {
        CompilerRepr {
            version: value.version,
            compiler_source: None,
            settings: Some(SettingsBlock {
                optimizer: value.optimizer,
            }),
            optimizer: None,
        }
    }
}
