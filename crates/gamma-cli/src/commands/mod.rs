//! CLI command implementations

pub mod caps;
pub mod edid;
pub mod error;
pub mod get;
pub mod info;
pub mod list;
pub mod methods;
pub mod restore;
pub mod set_gamma;

use anyhow::{Context, Result, bail};
use gamma_core::Depth;
use gamma_device::{Crtc, MethodId, MethodRegistry, Site, detect};
use tracing::debug;

use crate::{CrtcArgs, SiteArgs};

/// Resolves a method by name, or picks the best available one.
pub fn resolve_method(registry: &MethodRegistry, name: Option<&str>) -> Result<MethodId> {
    match name {
        Some(name) => {
            let id: MethodId = name.parse()?;
            if !registry.contains(id) {
                bail!("Method '{}' is not available in this build", id);
            }
            Ok(id)
        }
        None => {
            let id = detect::select_method(registry).context("No adjustment method available")?;
            debug!(method = %id, "selected method");
            Ok(id)
        }
    }
}

/// Opens the site selected by `args`.
pub fn open_site(registry: &MethodRegistry, args: &SiteArgs) -> Result<Site> {
    let id = resolve_method(registry, args.method.as_deref())?;
    registry
        .open_site(id, args.site.as_deref())
        .with_context(|| match &args.site {
            Some(site) => format!("Failed to open site '{}' of {}", site, id),
            None => format!("Failed to open default site of {}", id),
        })
}

/// Opens the CRTC selected by `args` and runs `f` on it.
pub fn with_crtc<T>(
    registry: &MethodRegistry,
    args: &CrtcArgs,
    f: impl FnOnce(&mut Crtc<'_>) -> Result<T>,
) -> Result<T> {
    let site = open_site(registry, &args.site)?;
    let partition = site
        .partition(args.partition)
        .with_context(|| format!("Failed to open partition {}", args.partition))?;
    let mut crtc = partition
        .crtc(args.crtc)
        .with_context(|| format!("Failed to open CRTC {}.{}", args.partition, args.crtc))?;
    let out = f(&mut crtc)?;
    crtc.close()?;
    partition.close()?;
    site.close()?;
    Ok(out)
}

/// Parses a depth name or tag.
pub fn parse_depth(text: &str) -> Result<Depth> {
    text.parse::<Depth>()
        .with_context(|| format!("Invalid depth '{}'", text))
}

/// Formats a yes/no flag.
pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Formats bytes as lowercase hex, `per_line` bytes per line.
pub fn hex_lines(bytes: &[u8], per_line: usize) -> Vec<String> {
    bytes
        .chunks(per_line.max(1))
        .map(|chunk| chunk.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_depth() {
        assert_eq!(parse_depth("16").unwrap(), Depth::U16);
        assert_eq!(parse_depth("-2").unwrap(), Depth::F64);
        assert_eq!(parse_depth("f32").unwrap(), Depth::F32);
        assert!(parse_depth("24").is_err());
        assert!(parse_depth("half").is_err());
    }

    #[test]
    fn test_hex_lines() {
        let lines = hex_lines(&[0x00, 0xff, 0x10], 2);
        assert_eq!(lines, ["00 ff", "10"]);
        assert!(hex_lines(&[], 16).is_empty());
    }

    #[test]
    fn test_resolve_method() {
        let registry = MethodRegistry::with_builtin(Default::default());
        assert_eq!(resolve_method(&registry, Some("dummy")).unwrap(), MethodId::Dummy);
        assert_eq!(resolve_method(&registry, None).unwrap(), MethodId::Dummy);
        assert!(resolve_method(&registry, Some("randr")).is_err());
        assert!(resolve_method(&registry, Some("wayland")).is_err());
    }
}
