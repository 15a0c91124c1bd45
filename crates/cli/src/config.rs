use anyhow::{bail, Context, Result};
use billshare_import::import::create_pattern_table;
use billshare_import::patterns::default_patterns;
use billshare_import::{BillPattern, PatternTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on the household size, from the command line or the config.
pub const MAX_OCCUPANTS: i64 = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub household: Household,
    #[serde(default = "default_patterns")]
    pub patterns: Vec<BillPattern>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Household {
    /// Names used when printing each occupant's share.
    #[serde(default)]
    pub occupants: Vec<String>,
    /// Only needed when occupants are not listed by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant_count: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            household: Household::default(),
            patterns: default_patterns(),
        }
    }
}

impl Household {
    /// `None` when the household has not been configured at all.
    pub fn occupant_count(&self) -> Result<Option<i64>> {
        let named = self.occupants.len() as i64;
        let count = match self.occupant_count {
            Some(n) if named > 0 && n != named => bail!(
                "household.occupant_count is {n} but {named} occupants are listed"
            ),
            Some(n) => Some(n),
            None if named > 0 => Some(named),
            None => None,
        };
        if let Some(n) = count.filter(|&n| n > MAX_OCCUPANTS) {
            bail!("household has {n} occupants, at most {MAX_OCCUPANTS} are supported");
        }
        Ok(count)
    }

    /// Labels for `count` shares: configured names when they line up,
    /// numbered placeholders otherwise.
    pub fn share_labels(&self, count: i64) -> Vec<String> {
        if self.occupants.len() as i64 == count {
            return self.occupants.clone();
        }
        (1..=count.clamp(0, MAX_OCCUPANTS)).map(|i| format!("Occupant {i}")).collect()
    }
}

impl Config {
    pub fn pattern_table(&self) -> Result<PatternTable> {
        create_pattern_table(self.patterns.clone()).context("invalid pattern table in config")
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "billshare")
        .context("could not determine a config directory for this platform")?;
    Ok(dirs.config_dir().join("config.toml"))
}

/// An explicit path must exist; the default path falls back to built-ins.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                tracing::debug!("No config at {}, using built-in defaults", p.display());
                return Ok(Config::default());
            }
            p
        }
    };
    read_config(&path)
}

pub fn read_config(path: &Path) -> Result<Config> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if path.exists() {
        bail!("config already exists: {}", path.display());
    }
    save_config(&Config::default(), &path)?;
    Ok(path)
}
