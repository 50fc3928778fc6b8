//! Configuration of the simulated display stack.
//!
//! The layout is described in YAML. Every key is optional; missing keys take
//! the defaults of [`DummyConfig::default`]:
//!
//! ```yaml
//! sites: 1
//! partitions: 2
//! crtcs: 2
//! depth: 64            # 8, 16, 32, 64, -1 (f32), -2 (f64) or a name
//! sizes: { red: 1024, green: 2048, blue: 512 }
//! capabilities:
//!   real: true
//!   fake: true
//!   auto_restore: false
//!   site_restore: true
//!   partition_restore: true
//!   crtc_restore: true
//!   fields: [MACRO_EDID, MACRO_RAMP, ACTIVE]   # default: all
//! crtc:
//!   connector: DUMMY
//!   connector_type: VIRTUAL
//!   subpixel_order: HORIZONTAL_RGB
//!   active: true
//!   gamma_support: yes   # yes, no, maybe or a bool
//!   width_mm: 600
//!   height_mm: 340
//!   edid: "00ffffffffffff00..."   # hex; "" for none; omitted: generated
//! ```

use std::path::{Path, PathBuf};

use gamma_core::{ConnectorType, Depth, FieldMask, GammaSupport, RampSizes, SubpixelOrder};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "GAMMA_DUMMY_CONFIG";

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// A value that parses as YAML but means nothing here.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Key holding the value.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl ToString) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}

/// Properties shared by every simulated CRTC.
#[derive(Debug, Clone, PartialEq)]
pub struct CrtcTemplate {
    /// Connector name prefix; CRTCs are named `<prefix>-<partition>-<crtc>`.
    pub connector: String,
    /// Connector type.
    pub connector_type: ConnectorType,
    /// Subpixel order.
    pub subpixel_order: SubpixelOrder,
    /// Whether a monitor is attached.
    pub active: bool,
    /// Whether ramps can be written.
    pub gamma_support: GammaSupport,
    /// Viewport width in mm.
    pub width_mm: u32,
    /// Viewport height in mm.
    pub height_mm: u32,
    /// EDID served by every CRTC. `None` generates one from the viewport.
    pub edid: Option<Vec<u8>>,
    /// Serve no EDID at all.
    pub no_edid: bool,
}

impl Default for CrtcTemplate {
    fn default() -> Self {
        Self {
            connector: "DUMMY".to_string(),
            connector_type: ConnectorType::Virtual,
            subpixel_order: SubpixelOrder::Unknown,
            active: true,
            gamma_support: GammaSupport::Yes,
            width_mm: 600,
            height_mm: 340,
            edid: None,
            no_edid: false,
        }
    }
}

/// Validated configuration of the simulated display stack.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyConfig {
    /// Number of sites; identifiers are `"0"` to `sites - 1`.
    pub sites: usize,
    /// Partitions per site.
    pub partitions: usize,
    /// CRTCs per partition.
    pub crtcs: usize,
    /// Native ramp depth.
    pub depth: Depth,
    /// Ramp sizes of every CRTC.
    pub sizes: RampSizes,
    /// Information fields the method reports as supported.
    pub fields: FieldMask,
    /// Reported as a real backend.
    pub real: bool,
    /// Reported as a faked translation layer.
    pub fake: bool,
    /// Reported as reverting on disconnect.
    pub auto_restore: bool,
    /// Site-level restore is supported.
    pub site_restore: bool,
    /// Partition-level restore is supported.
    pub partition_restore: bool,
    /// CRTC-level restore is supported.
    pub crtc_restore: bool,
    /// Per-CRTC properties.
    pub crtc: CrtcTemplate,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            sites: 1,
            partitions: 2,
            crtcs: 2,
            depth: Depth::U64,
            sizes: RampSizes::new(1024, 2048, 512),
            fields: FieldMask::ALL,
            real: true,
            fake: true,
            auto_restore: false,
            site_restore: true,
            partition_restore: true,
            crtc_restore: true,
            crtc: CrtcTemplate::default(),
        }
    }
}

impl DummyConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "loading dummy configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Loads configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let raw: Option<RawConfig> = serde_yaml::from_str(yaml)?;
        Self::from_raw(raw.unwrap_or_default())
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults when unset.
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        let defaults = Self::default();
        let caps = raw.capabilities.unwrap_or_default();
        let crtc = raw.crtc.unwrap_or_default();
        let template = CrtcTemplate::default();

        let depth = match raw.depth {
            None => defaults.depth,
            Some(RawDepth::Tag(tag)) => {
                Depth::from_tag(tag).ok_or_else(|| ConfigError::invalid("depth", tag))?
            }
            Some(RawDepth::Name(name)) => name
                .parse()
                .map_err(|_| ConfigError::invalid("depth", &name))?,
        };

        let sizes = match raw.sizes {
            None => defaults.sizes,
            Some(RawSizes::Uniform(n)) => RampSizes::uniform(n),
            Some(RawSizes::Channels { red, green, blue }) => RampSizes::new(red, green, blue),
        };
        sizes
            .total()
            .ok_or_else(|| ConfigError::invalid("sizes", sizes))?;

        let fields = match caps.fields {
            None => defaults.fields,
            Some(names) => names.iter().try_fold(FieldMask::NONE, |acc, name| {
                FieldMask::from_name(name)
                    .map(|f| acc | f)
                    .ok_or_else(|| ConfigError::invalid("capabilities.fields", name))
            })?,
        };

        let (edid, no_edid) = match crtc.edid {
            None => (None, false),
            Some(text) if text.trim().is_empty() => (None, true),
            Some(text) => (Some(parse_hex(&text)?), false),
        };

        Ok(Self {
            sites: raw.sites.unwrap_or(defaults.sites),
            partitions: raw.partitions.unwrap_or(defaults.partitions),
            crtcs: raw.crtcs.unwrap_or(defaults.crtcs),
            depth,
            sizes,
            fields,
            real: caps.real.unwrap_or(defaults.real),
            fake: caps.fake.unwrap_or(defaults.fake),
            auto_restore: caps.auto_restore.unwrap_or(defaults.auto_restore),
            site_restore: caps.site_restore.unwrap_or(defaults.site_restore),
            partition_restore: caps.partition_restore.unwrap_or(defaults.partition_restore),
            crtc_restore: caps.crtc_restore.unwrap_or(defaults.crtc_restore),
            crtc: CrtcTemplate {
                connector: crtc.connector.unwrap_or(template.connector),
                connector_type: parse_named(
                    "crtc.connector_type",
                    crtc.connector_type,
                    template.connector_type,
                    ConnectorType::from_name,
                )?,
                subpixel_order: parse_named(
                    "crtc.subpixel_order",
                    crtc.subpixel_order,
                    template.subpixel_order,
                    SubpixelOrder::from_name,
                )?,
                active: crtc.active.unwrap_or(template.active),
                gamma_support: match crtc.gamma_support {
                    Some(RawSupport::Flag(true)) => GammaSupport::Yes,
                    Some(RawSupport::Flag(false)) => GammaSupport::No,
                    Some(RawSupport::Name(name)) => GammaSupport::from_name(&name)
                        .ok_or_else(|| ConfigError::invalid("crtc.gamma_support", name))?,
                    None => template.gamma_support,
                },
                width_mm: crtc.width_mm.unwrap_or(template.width_mm),
                height_mm: crtc.height_mm.unwrap_or(template.height_mm),
                edid,
                no_edid,
            },
        })
    }
}

fn parse_named<T>(
    key: &'static str,
    value: Option<String>,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> ConfigResult<T> {
    match value {
        None => Ok(default),
        Some(text) => parse(&text).ok_or_else(|| ConfigError::invalid(key, text)),
    }
}

/// Decodes hex text, ignoring whitespace and `:` separators.
fn parse_hex(text: &str) -> ConfigResult<Vec<u8>> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|err| ConfigError::invalid("crtc.edid", err))
}

// ============================================================================
// Raw YAML structures
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    sites: Option<usize>,
    partitions: Option<usize>,
    crtcs: Option<usize>,
    depth: Option<RawDepth>,
    sizes: Option<RawSizes>,
    capabilities: Option<RawCapabilities>,
    crtc: Option<RawCrtc>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDepth {
    Tag(i32),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSupport {
    Flag(bool),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSizes {
    Uniform(usize),
    Channels {
        red: usize,
        green: usize,
        blue: usize,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCapabilities {
    real: Option<bool>,
    fake: Option<bool>,
    auto_restore: Option<bool>,
    site_restore: Option<bool>,
    partition_restore: Option<bool>,
    crtc_restore: Option<bool>,
    fields: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCrtc {
    connector: Option<String>,
    connector_type: Option<String>,
    subpixel_order: Option<String>,
    active: Option<bool>,
    gamma_support: Option<RawSupport>,
    width_mm: Option<u32>,
    height_mm: Option<u32>,
    edid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(DummyConfig::from_yaml_str("").unwrap(), DummyConfig::default());
        assert_eq!(DummyConfig::from_yaml_str("{}").unwrap(), DummyConfig::default());
    }

    #[test]
    fn test_overrides() {
        let yaml = r#"
partitions: 1
crtcs: 3
depth: f32
sizes: 256
capabilities:
  fake: false
  fields: [MACRO_RAMP, active]
crtc:
  connector: HDMI
  connector_type: HDMIA
  gamma_support: maybe
  edid: "00 ff:ff ff"
"#;
        let config = DummyConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.partitions, 1);
        assert_eq!(config.crtcs, 3);
        assert_eq!(config.depth, Depth::F32);
        assert_eq!(config.sizes, RampSizes::uniform(256));
        assert!(!config.fake);
        assert_eq!(config.fields, FieldMask::MACRO_RAMP | FieldMask::ACTIVE);
        assert_eq!(config.crtc.connector, "HDMI");
        assert_eq!(config.crtc.connector_type, ConnectorType::HdmiA);
        assert_eq!(config.crtc.gamma_support, GammaSupport::Maybe);
        assert_eq!(config.crtc.edid, Some(vec![0x00, 0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn test_depth_tags() {
        let config = DummyConfig::from_yaml_str("depth: -2").unwrap();
        assert_eq!(config.depth, Depth::F64);
        let err = DummyConfig::from_yaml_str("depth: 24").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "depth", .. }));
    }

    #[test]
    fn test_invalid_values() {
        assert!(DummyConfig::from_yaml_str("capabilities: { fields: [BOGUS] }").is_err());
        assert!(DummyConfig::from_yaml_str("crtc: { connector_type: SCART }").is_err());
        assert!(DummyConfig::from_yaml_str("crtc: { edid: abc }").is_err());
        assert!(DummyConfig::from_yaml_str("unknown_key: 1").is_err());
    }

    #[test]
    fn test_edid_hex_errors() {
        let err = DummyConfig::from_yaml_str("crtc: { edid: '00 f' }").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "crtc.edid", .. }));
        let err = DummyConfig::from_yaml_str("crtc: { edid: 'zz' }").unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "crtc.edid");
                assert!(value.contains('z'), "{value}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_gamma_support_bool_or_name() {
        let support = |value: &str| {
            DummyConfig::from_yaml_str(&format!("crtc:\n  gamma_support: {value}\n"))
                .map(|config| config.crtc.gamma_support)
        };
        assert_eq!(support("true").unwrap(), GammaSupport::Yes);
        assert_eq!(support("false").unwrap(), GammaSupport::No);
        assert_eq!(support("maybe").unwrap(), GammaSupport::Maybe);
        assert_eq!(support("\"false\"").unwrap(), GammaSupport::No);
        assert!(matches!(
            support("sometimes"),
            Err(ConfigError::InvalidValue { key: "crtc.gamma_support", .. })
        ));
    }

    #[test]
    fn test_empty_edid_disables() {
        let config = DummyConfig::from_yaml_str("crtc: { edid: '' }").unwrap();
        assert!(config.crtc.no_edid);
        assert_eq!(config.crtc.edid, None);
    }

    #[test]
    fn test_missing_file() {
        let err = DummyConfig::from_file("/nonexistent/gamma-dummy.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }
}
