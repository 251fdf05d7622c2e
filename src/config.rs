use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Default screen framebuffer width in pixels.
pub const SCREEN_WIDTH: i32 = 640;
/// Default screen framebuffer height in pixels.
pub const SCREEN_HEIGHT: i32 = 480;
/// Default number of device-context slots.
pub const MAX_DCS: usize = 32;
/// Default number of graphics-object slots.
pub const MAX_OBJECTS: usize = 256;

/// Sizing for one GDI context: screen framebuffer and table capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GdiConfig {
    pub screen_width: i32,
    pub screen_height: i32,
    pub max_dcs: usize,
    pub max_objects: usize,
}

impl Default for GdiConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            max_dcs: MAX_DCS,
            max_objects: MAX_OBJECTS,
        }
    }
}

impl GdiConfig {
    pub fn with_screen(mut self, width: i32, height: i32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    pub fn with_capacities(mut self, max_dcs: usize, max_objects: usize) -> Self {
        self.max_dcs = max_dcs;
        self.max_objects = max_objects;
        self
    }

    /// Screen dimensions must fit signed 16-bit coordinates; each table
    /// needs at least one slot and no more slots than there are handles.
    pub fn validate(&self) -> Result<()> {
        let max_dim = i16::MAX as i32;
        if self.screen_width <= 0 || self.screen_width > max_dim {
            anyhow::bail!("screen width {} out of range (1..={})", self.screen_width, max_dim);
        }
        if self.screen_height <= 0 || self.screen_height > max_dim {
            anyhow::bail!("screen height {} out of range (1..={})", self.screen_height, max_dim);
        }
        let max_slots = u16::MAX as usize;
        if self.max_dcs == 0 || self.max_dcs > max_slots {
            anyhow::bail!("max_dcs {} out of range (1..={})", self.max_dcs, max_slots);
        }
        if self.max_objects == 0 || self.max_objects > max_slots {
            anyhow::bail!("max_objects {} out of range (1..={})", self.max_objects, max_slots);
        }
        Ok(())
    }
}

/// Parse `key = value` lines, invoking `handler` for each pair.
///
/// Blank lines and `#` comments (including trailing ones) are skipped;
/// keys and values are trimmed. Lines without `=` are logged and ignored.
pub fn parse_properties(data: &str, handler: &mut dyn FnMut(&str, &str)) {
    for raw in data.lines() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    log::warn!("Property without key: {:?}", raw);
                    continue;
                }
                handler(key, value.trim());
            }
            None => log::warn!("Key without value: {:?}", raw),
        }
    }
}

/// Apply property-file text on top of `base`.
pub fn config_from_str(data: &str, base: GdiConfig) -> Result<GdiConfig> {
    let mut config = base;
    let mut failure: Option<anyhow::Error> = None;

    parse_properties(data, &mut |key, value| {
        if failure.is_some() {
            return;
        }
        let applied = match key.to_ascii_lowercase().as_str() {
            "screen_width" => value
                .parse()
                .map(|v| config.screen_width = v)
                .context("Invalid screen_width value"),
            "screen_height" => value
                .parse()
                .map(|v| config.screen_height = v)
                .context("Invalid screen_height value"),
            "resolution" => parse_resolution(value).map(|res| {
                config.screen_width = res.width;
                config.screen_height = res.height;
            }),
            "max_dcs" => value
                .parse()
                .map(|v| config.max_dcs = v)
                .context("Invalid max_dcs value"),
            "max_objects" => value
                .parse()
                .map(|v| config.max_objects = v)
                .context("Invalid max_objects value"),
            other => {
                log::warn!("Ignoring unknown config key {:?}", other);
                Ok(())
            }
        };
        if let Err(err) = applied {
            failure = Some(err);
        }
    });

    if let Some(err) = failure {
        return Err(err);
    }
    config.validate()?;
    Ok(config)
}

/// Load a configuration file. A missing file yields the defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<GdiConfig> {
    let Some(path) = path else {
        return Ok(GdiConfig::default());
    };
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(data) => config_from_str(&data, GdiConfig::default())
            .with_context(|| format!("Invalid config file {}", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("Config file {} not found, using defaults", path.display());
            Ok(GdiConfig::default())
        }
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read config file {}", path.display()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

/// Parse a resolution string in the format "WIDTHxHEIGHT"
pub fn parse_resolution(s: &str) -> Result<Resolution> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        anyhow::bail!("Resolution must be in WIDTHxHEIGHT format");
    }

    let width: i32 = parts[0].trim().parse().context("Invalid width value")?;
    let height: i32 = parts[1].trim().parse().context("Invalid height value")?;

    if width <= 0 || height <= 0 {
        anyhow::bail!("Resolution values must be positive");
    }

    Ok(Resolution { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_resolution_valid() {
        let res = parse_resolution("640x480").unwrap();
        assert_eq!(res.width, 640);
        assert_eq!(res.height, 480);
    }

    #[test]
    fn test_parse_resolution_invalid_format() {
        assert!(parse_resolution("640-480").is_err());
        assert!(parse_resolution("640x480x120").is_err());
    }

    #[test]
    fn test_parse_resolution_invalid_values() {
        assert!(parse_resolution("0x480").is_err());
        assert!(parse_resolution("640x0").is_err());
        assert!(parse_resolution("abcxdef").is_err());
    }

    #[test]
    fn test_config_default() {
        let config = GdiConfig::default();
        assert_eq!(config.screen_width, 640);
        assert_eq!(config.screen_height, 480);
        assert_eq!(config.max_dcs, MAX_DCS);
        assert_eq!(config.max_objects, MAX_OBJECTS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(GdiConfig::default().with_screen(0, 10).validate().is_err());
        assert!(GdiConfig::default().with_screen(40_000, 10).validate().is_err());
        assert!(GdiConfig::default().with_capacities(0, 4).validate().is_err());
        assert!(GdiConfig::default().with_capacities(4, 70_000).validate().is_err());
    }

    #[test]
    fn test_parse_properties_comments() {
        let mut seen = Vec::new();
        parse_properties(
            "# header\n a = 1 \nb=2 # trailing\nnovalue\n\n",
            &mut |k, v| seen.push((k.to_string(), v.to_string())),
        );
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_config_from_str() {
        let config = config_from_str(
            "RESOLUTION = 320x200\nmax_dcs=4\nmax_objects = 8\nunknown = 1\n",
            GdiConfig::default(),
        )
        .unwrap();
        assert_eq!(config.screen_width, 320);
        assert_eq!(config.screen_height, 200);
        assert_eq!(config.max_dcs, 4);
        assert_eq!(config.max_objects, 8);
    }

    #[test]
    fn test_config_from_str_bad_value() {
        assert!(config_from_str("max_dcs = lots", GdiConfig::default()).is_err());
        assert!(config_from_str("max_dcs = 0", GdiConfig::default()).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "screen_width = 100").unwrap();
        writeln!(file, "screen_height = 50").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.screen_width, 100);
        assert_eq!(config.screen_height, 50);
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("absent.cfg"))).unwrap();
        assert_eq!(config, GdiConfig::default());
        assert_eq!(load_config::<&Path>(None).unwrap(), GdiConfig::default());
    }
}
