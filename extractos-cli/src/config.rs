use anyhow::{bail, Context, Result};
use extractos_core::DEFAULT_TIMEZONE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "extractos.toml";

/// Run settings. Credentials never live here; they come from the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input: InputSection,
    pub output: OutputSection,
    pub run: RunSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Bank list with "N°", "Cuenta" and optional "Entidad" columns
    pub accounts: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Parent of the "Movimientos <date>" and "Sin movimientos <date>" folders
    pub root: PathBuf,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// IANA zone that decides which day "today" is
    pub timezone: String,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            accounts: PathBuf::from("bancos.xlsx"),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            sheet_name: "Movimientos".to_string(),
        }
    }
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// An explicit path must exist; the default file is optional.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let p = config_path(explicit);
    if !p.exists() {
        if explicit.is_some() {
            bail!("config file not found: {}", p.display());
        }
        return Ok(Settings::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let s = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = config_path(explicit);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_settings(&p, &Settings::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let s: Settings = toml::from_str(
            r#"
[output]
root = "/srv/extractos"
"#,
        )
        .unwrap();
        assert_eq!(s.output.root, PathBuf::from("/srv/extractos"));
        assert_eq!(s.output.sheet_name, "Movimientos");
        assert_eq!(s.input.accounts, PathBuf::from("bancos.xlsx"));
        assert_eq!(s.run.timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_init_writes_once_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("extractos.toml");

        init_config(Some(p.as_path())).unwrap();
        assert_eq!(load_settings(Some(p.as_path())).unwrap(), Settings::default());

        fs::write(&p, "[run]\ntimezone = \"UTC\"\n").unwrap();
        init_config(Some(p.as_path())).unwrap();
        assert_eq!(load_settings(Some(p.as_path())).unwrap().run.timezone, "UTC");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nope.toml");
        assert!(load_settings(Some(p.as_path())).is_err());
    }
}
