//! `cyclemate init`: write a default config file.

use std::path::Path;

use cyclemate_config::AppConfig;

pub fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config_path);

    if write_default(&path, force)? {
        println!("Created config at: {}", path.display());
        println!("\nNext steps:");
        println!("   1. Set CYCLEMATE_API_KEY or edit provider.api_key in the file");
        println!("   2. Run: cyclemate serve");
    } else {
        println!("Config already exists at: {}", path.display());
        println!("   Re-run with --force to overwrite it.");
    }

    Ok(())
}

/// Write the default config. Returns `false` if a file exists and `force` is off.
fn write_default(path: &Path, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(write_default(&path, false).unwrap());
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.conversation.max_pairs, 10);
    }

    #[test]
    fn keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway]\nport = 9000\n").unwrap();

        assert!(!write_default(&path, false).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("9000"));

        assert!(write_default(&path, true).unwrap());
        assert!(!std::fs::read_to_string(&path).unwrap().contains("9000"));
    }
}
