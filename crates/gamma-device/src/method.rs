//! Adjustment method identities.
//!
//! A method is one way of reaching the gamma ramps of a display stack.
//! Identifiers are stable integers; the names are used on the command line
//! and in configuration.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Identifier of an adjustment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodId {
    /// X RandR extension.
    XRandr,
    /// X VidMode extension.
    XVidMode,
    /// Linux kernel mode setting.
    LinuxDrm,
    /// Windows GDI.
    W32Gdi,
    /// macOS Quartz through CoreGraphics.
    QuartzCg,
    /// Simulated display stack.
    Dummy,
}

impl MethodId {
    /// Every method, in identifier order.
    pub const ALL: [MethodId; 6] = [
        MethodId::XRandr,
        MethodId::XVidMode,
        MethodId::LinuxDrm,
        MethodId::W32Gdi,
        MethodId::QuartzCg,
        MethodId::Dummy,
    ];

    /// Stable integer identifier.
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            Self::XRandr => 0,
            Self::XVidMode => 1,
            Self::LinuxDrm => 2,
            Self::W32Gdi => 3,
            Self::QuartzCg => 4,
            Self::Dummy => 5,
        }
    }

    /// Decodes a stable integer identifier.
    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.value() == value)
    }

    /// Short name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::XRandr => "randr",
            Self::XVidMode => "vidmode",
            Self::LinuxDrm => "drm",
            Self::W32Gdi => "gdi",
            Self::QuartzCg => "quartz",
            Self::Dummy => "dummy",
        }
    }

    /// Constant name of the method.
    pub const fn constant_name(self) -> &'static str {
        match self {
            Self::XRandr => "X_RANDR",
            Self::XVidMode => "X_VIDMODE",
            Self::LinuxDrm => "LINUX_DRM",
            Self::W32Gdi => "W32_GDI",
            Self::QuartzCg => "QUARTZ_CORE_GRAPHICS",
            Self::Dummy => "DUMMY",
        }
    }

    /// Human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::XRandr => "RandR X extension",
            Self::XVidMode => "VidMode X extension",
            Self::LinuxDrm => "Linux Direct Rendering Manager",
            Self::W32Gdi => "Windows GDI",
            Self::QuartzCg => "Quartz using CoreGraphics",
            Self::Dummy => "Simulated display stack",
        }
    }

    /// Environment variable naming the default site, if the method has one.
    pub const fn default_site_variable(self) -> Option<&'static str> {
        match self {
            Self::XRandr | Self::XVidMode => Some("DISPLAY"),
            _ => None,
        }
    }

    /// Default site from the environment.
    ///
    /// `None` when the method has no such variable or it is unset or empty.
    pub fn default_site(self) -> Option<String> {
        let var = self.default_site_variable()?;
        std::env::var(var).ok().filter(|v| !v.is_empty())
    }

    /// Whether an implementation is registered in the global registry.
    pub fn is_available(self) -> bool {
        crate::MethodRegistry::global().get(self).is_some()
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A method name or identifier that is not known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown adjustment method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for MethodId {
    type Err = UnknownMethod;

    /// Accepts the short name, the constant name or the integer identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| {
                m.name().eq_ignore_ascii_case(trimmed)
                    || m.constant_name().eq_ignore_ascii_case(trimmed)
            })
            .or_else(|| trimmed.parse().ok().and_then(Self::from_value))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_stable() {
        for (i, m) in MethodId::ALL.iter().enumerate() {
            assert_eq!(m.value(), i as i32);
            assert_eq!(MethodId::from_value(i as i32), Some(*m));
        }
        assert_eq!(MethodId::from_value(6), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("randr".parse::<MethodId>(), Ok(MethodId::XRandr));
        assert_eq!("LINUX_DRM".parse::<MethodId>(), Ok(MethodId::LinuxDrm));
        assert_eq!("5".parse::<MethodId>(), Ok(MethodId::Dummy));
        assert!("wayland".parse::<MethodId>().is_err());
    }

    #[test]
    fn test_default_site_variable() {
        assert_eq!(MethodId::XRandr.default_site_variable(), Some("DISPLAY"));
        assert_eq!(MethodId::XVidMode.default_site_variable(), Some("DISPLAY"));
        assert_eq!(MethodId::LinuxDrm.default_site_variable(), None);
        assert_eq!(MethodId::Dummy.default_site(), None);
    }
}
