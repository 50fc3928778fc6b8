//! Gamma ramp sample depth.
//!
//! [`Depth`] is the tag two components exchange when they must agree on the
//! representation of a ramp. It covers the four unsigned integer widths that
//! evenly divide 64 and the two IEEE floating point formats.
//!
//! # Raw tags
//!
//! Backends and configuration files describe depths with the integer tags
//! `8`, `16`, `32`, `64`, `-1` (single precision) and `-2` (double
//! precision). [`Depth::from_tag`] rejects every other value, so a width the
//! replication scheme cannot express exactly (e.g. 10 or 24 bits) never
//! reaches the translator.
//!
//! ```rust
//! use gamma_core::Depth;
//!
//! assert_eq!(Depth::from_tag(16), Some(Depth::U16));
//! assert_eq!(Depth::from_tag(-2), Some(Depth::F64));
//! assert_eq!(Depth::from_tag(10), None);
//! assert_eq!(Depth::U32.element_size(), 4);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Sample representation of a gamma ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Depth {
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    #[default]
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// Single precision float in [0, 1].
    F32,
    /// Double precision float in [0, 1].
    F64,
}

impl Depth {
    /// Raw tag for single precision floating point.
    pub const FLOAT_TAG: i32 = -1;
    /// Raw tag for double precision floating point.
    pub const DOUBLE_TAG: i32 = -2;

    /// All depths, integers first.
    pub const ALL: [Depth; 6] = [
        Depth::U8,
        Depth::U16,
        Depth::U32,
        Depth::U64,
        Depth::F32,
        Depth::F64,
    ];

    /// Raw integer tag of the depth.
    #[inline]
    pub const fn tag(self) -> i32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
            Self::F32 => Self::FLOAT_TAG,
            Self::F64 => Self::DOUBLE_TAG,
        }
    }

    /// Decodes a raw tag. Returns `None` for unsupported values.
    pub const fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            8 => Some(Self::U8),
            16 => Some(Self::U16),
            32 => Some(Self::U32),
            64 => Some(Self::U64),
            Self::FLOAT_TAG => Some(Self::F32),
            Self::DOUBLE_TAG => Some(Self::F64),
            _ => None,
        }
    }

    /// Bytes per sample.
    #[inline]
    pub const fn element_size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
            Self::U64 | Self::F64 => 8,
        }
    }

    /// Bits per sample.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.element_size() as u32 * 8
    }

    /// Whether samples are floating point.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Largest integer sample value. `None` for float depths.
    #[inline]
    pub const fn max_value(self) -> Option<u64> {
        match self {
            Self::U8 => Some(u8::MAX as u64),
            Self::U16 => Some(u16::MAX as u64),
            Self::U32 => Some(u32::MAX as u64),
            Self::U64 => Some(u64::MAX),
            Self::F32 | Self::F64 => None,
        }
    }

    /// Short lowercase name used in configuration and the CLI.
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A depth name or tag that does not denote a supported depth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported gamma ramp depth: {0}")]
pub struct UnknownDepth(pub String);

impl FromStr for Depth {
    type Err = UnknownDepth;

    /// Accepts a name (`"u16"`, `"float"`, `"double"`) or a raw tag (`"16"`, `"-1"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let depth = match lower.as_str() {
            "u8" => Some(Self::U8),
            "u16" => Some(Self::U16),
            "u32" => Some(Self::U32),
            "u64" => Some(Self::U64),
            "f32" | "float" => Some(Self::F32),
            "f64" | "double" => Some(Self::F64),
            other => other.parse::<i32>().ok().and_then(Self::from_tag),
        };
        depth.ok_or_else(|| UnknownDepth(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for depth in Depth::ALL {
            assert_eq!(Depth::from_tag(depth.tag()), Some(depth));
            assert_eq!(depth.name().parse::<Depth>().ok(), Some(depth));
            assert_eq!(depth.tag().to_string().parse::<Depth>().ok(), Some(depth));
        }
    }

    #[test]
    fn test_rejects_non_dividing_widths() {
        for tag in [0, 1, 10, 12, 24, 48, 128, -3] {
            assert_eq!(Depth::from_tag(tag), None, "tag {tag}");
        }
        assert!("u24".parse::<Depth>().is_err());
    }

    #[test]
    fn test_sizes() {
        assert_eq!(Depth::U8.element_size(), 1);
        assert_eq!(Depth::F32.bits(), 32);
        assert_eq!(Depth::F64.element_size(), 8);
        assert_eq!(Depth::U16.max_value(), Some(65535));
        assert_eq!(Depth::F32.max_value(), None);
        assert!(Depth::F64.is_float());
        assert!(!Depth::U64.is_float());
    }
}
