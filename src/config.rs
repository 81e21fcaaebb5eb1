use crate::error::{PlanscopeError, Result};
use crate::types::config::{PlanscopeConfig, Settings};
use std::path::{Path, PathBuf};
use toml::map::{Entry, Map};
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "planscope.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".planscope/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/planscope/config.toml";

pub fn load_config(root: &Path) -> Result<Option<PlanscopeConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

/// Resolves the settings for `root`, falling back to the built-in defaults
/// when the project has no `planscope.toml`.
pub fn load_settings(root: &Path) -> Result<Settings> {
    match load_config(root)? {
        Some(cfg) => Ok(cfg.settings(root)),
        None => {
            tracing::debug!(root = %root.display(), "no {} found, using defaults", DEFAULT_CONFIG_FILE);
            Ok(Settings::defaults(root))
        }
    }
}

/// Where a configuration file sits in the override order, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigLayer {
    Global,
    Project,
    Local,
}

impl ConfigLayer {
    fn name(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
            Self::Local => "local",
        }
    }
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<PlanscopeConfig>> {
    let project_path = root.join(DEFAULT_CONFIG_FILE);
    if !project_path.exists() {
        return Ok(None);
    }

    let layers = global_path
        .map(|path| (ConfigLayer::Global, path.to_path_buf()))
        .into_iter()
        .chain([
            (ConfigLayer::Project, project_path),
            (ConfigLayer::Local, root.join(DEFAULT_LOCAL_FILE)),
        ]);

    let mut merged = Map::new();
    for (layer, path) in layers {
        if !path.exists() {
            continue;
        }
        let overlay = read_layer(layer, &path)?;
        overlay_sections(&mut merged, overlay, layer, "")?;
        tracing::debug!(layer = layer.name(), path = %path.display(), "applied config layer");
    }

    let cfg: PlanscopeConfig = Value::Table(merged)
        .try_into()
        .map_err(|e: toml::de::Error| PlanscopeError::ConfigParse(e.to_string()))?;
    cfg.validate()?;
    Ok(Some(cfg))
}

fn read_layer(layer: ConfigLayer, path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        PlanscopeError::ConfigParse(format!(
            "{} config {}: {}",
            layer.name(),
            path.display(),
            e
        ))
    })
}

/// Overlays `overlay` onto `base` key by key. Tables merge recursively and
/// any other value, arrays included, replaces what a lower layer set. A
/// layer may not turn a section into a scalar or the reverse.
fn overlay_sections(
    base: &mut Map<String, Value>,
    overlay: Map<String, Value>,
    layer: ConfigLayer,
    prefix: &str,
) -> Result<()> {
    for (key, value) in overlay {
        let key_path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let mut slot = match base.entry(key) {
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                continue;
            }
            Entry::Occupied(occupied) => occupied,
        };
        match (slot.get_mut(), value) {
            (Value::Table(existing), Value::Table(section)) => {
                overlay_sections(existing, section, layer, &key_path)?;
            }
            (Value::Table(_), _) | (_, Value::Table(_)) => {
                return Err(PlanscopeError::ConfigParse(format!(
                    "{} config redefines `{}` with a different shape",
                    layer.name(),
                    key_path
                )));
            }
            (existing, value) => *existing = value,
        }
    }
    Ok(())
}
