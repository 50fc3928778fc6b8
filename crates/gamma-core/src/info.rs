//! CRTC information: field mask, per-field results and the enums they carry.
//!
//! Information queries never fail as a whole. The caller names the fields
//! it wants with a [`FieldMask`]; every requested field ends up holding a
//! value, an error, or (for EDID data that failed its checksum) both. Fields
//! that were not requested stay empty and never report an error.
//!
//! # Field mask
//!
//! One bit per field, plus combinations such as [`FieldMask::MACRO_EDID`].
//! Unknown bits are ignored, with a warning, so callers built against a newer field list keep
//! working.
//!
//! ```rust
//! use gamma_core::FieldMask;
//!
//! let mask = FieldMask::GAMMA_SIZE | FieldMask::GAMMA_DEPTH;
//! assert_eq!(mask, FieldMask::MACRO_RAMP);
//! assert!(FieldMask::from_bits_truncate(u32::MAX).contains(FieldMask::EDID));
//! assert_eq!("EDID|ACTIVE".parse::<FieldMask>().unwrap(), FieldMask::EDID | FieldMask::ACTIVE);
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};
use std::str::FromStr;

use tracing::warn;

use crate::{Depth, Error, ErrorCode, RampSizes};

/// Current version of the information record layout.
///
/// Version 1 carries the thirteen original fields; version 2 adds
/// [`FieldMask::CHROMA`] and [`FieldMask::WHITE_POINT`].
pub const CRTC_INFORMATION_VERSION: u32 = 2;

/// Bitmask of CRTC information fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldMask(u32);

macro_rules! fields {
    ($( $(#[$meta:meta])* $name:ident = $bit:literal, $label:literal, $version:literal; )*) => {
        impl FieldMask {
            $( $(#[$meta])* pub const $name: FieldMask = FieldMask(1 << $bit); )*

            /// Every primitive field with its name and the record version that introduced it.
            pub const PRIMITIVES: &'static [(FieldMask, &'static str, u32)] = &[
                $( (FieldMask::$name, $label, $version), )*
            ];
        }
    };
}

fields! {
    /// Raw EDID bytes.
    EDID = 0, "EDID", 1;
    /// Viewport width in millimetres, as reported by the backend.
    WIDTH_MM = 1, "WIDTH_MM", 1;
    /// Viewport height in millimetres, as reported by the backend.
    HEIGHT_MM = 2, "HEIGHT_MM", 1;
    /// Viewport width in millimetres, from the EDID.
    WIDTH_MM_EDID = 3, "WIDTH_MM_EDID", 1;
    /// Viewport height in millimetres, from the EDID.
    HEIGHT_MM_EDID = 4, "HEIGHT_MM_EDID", 1;
    /// Per-channel ramp sizes.
    GAMMA_SIZE = 5, "GAMMA_SIZE", 1;
    /// Ramp depth.
    GAMMA_DEPTH = 6, "GAMMA_DEPTH", 1;
    /// Whether ramps can be adjusted.
    GAMMA_SUPPORT = 7, "GAMMA_SUPPORT", 1;
    /// Subpixel layout of the monitor.
    SUBPIXEL_ORDER = 8, "SUBPIXEL_ORDER", 1;
    /// Whether a monitor is attached and active.
    ACTIVE = 9, "ACTIVE", 1;
    /// Connector name.
    CONNECTOR_NAME = 10, "CONNECTOR_NAME", 1;
    /// Connector type.
    CONNECTOR_TYPE = 11, "CONNECTOR_TYPE", 1;
    /// Monitor gamma from the EDID.
    GAMMA = 12, "GAMMA", 1;
    /// Red, green and blue chromaticity from the EDID.
    CHROMA = 13, "CHROMA", 2;
    /// White point chromaticity from the EDID.
    WHITE_POINT = 14, "WHITE_POINT", 2;
}

impl FieldMask {
    /// No fields.
    pub const NONE: FieldMask = FieldMask(0);

    /// Every field derived from the EDID, including the EDID itself.
    pub const MACRO_EDID: FieldMask = FieldMask(
        Self::EDID.0
            | Self::WIDTH_MM_EDID.0
            | Self::HEIGHT_MM_EDID.0
            | Self::GAMMA.0
            | Self::CHROMA.0
            | Self::WHITE_POINT.0,
    );

    /// Fields decoded from the EDID bytes, excluding the bytes themselves.
    pub const EDID_DERIVED: FieldMask = FieldMask(Self::MACRO_EDID.0 & !Self::EDID.0);

    /// Both viewport dimensions reported by the backend.
    pub const MACRO_VIEWPORT: FieldMask = FieldMask(Self::WIDTH_MM.0 | Self::HEIGHT_MM.0);

    /// Ramp size and depth.
    pub const MACRO_RAMP: FieldMask = FieldMask(Self::GAMMA_SIZE.0 | Self::GAMMA_DEPTH.0);

    /// Connector name and type.
    pub const MACRO_CONNECTOR: FieldMask =
        FieldMask(Self::CONNECTOR_NAME.0 | Self::CONNECTOR_TYPE.0);

    /// Everything that requires an attached, active monitor.
    pub const MACRO_ACTIVE: FieldMask = FieldMask(
        Self::MACRO_EDID.0 | Self::MACRO_VIEWPORT.0 | Self::SUBPIXEL_ORDER.0 | Self::ACTIVE.0,
    );

    /// Every known field.
    pub const ALL: FieldMask = FieldMask((1 << 15) - 1);

    /// Builds a mask, dropping bits that do not name a field.
    pub fn from_bits_truncate(bits: u32) -> Self {
        let unknown = bits & !Self::ALL.0;
        if unknown != 0 {
            warn!(unknown = %format_args!("{:#x}", unknown), "ignoring unknown field mask bits");
        }
        FieldMask(bits & Self::ALL.0)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every field of `other` is set.
    #[inline]
    pub const fn contains(self, other: FieldMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any field of `other` is set.
    #[inline]
    pub const fn intersects(self, other: FieldMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no field is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Fields known to records of `version` and older.
    pub fn for_version(version: u32) -> FieldMask {
        Self::PRIMITIVES
            .iter()
            .filter(|(_, _, introduced)| *introduced <= version)
            .fold(Self::NONE, |acc, (field, _, _)| acc | *field)
    }

    /// Iterates over the primitive fields in the mask.
    pub fn iter(self) -> impl Iterator<Item = FieldMask> {
        Self::PRIMITIVES
            .iter()
            .map(|(field, _, _)| *field)
            .filter(move |field| self.contains(*field))
    }

    /// Name of a primitive field.
    pub fn name(self) -> Option<&'static str> {
        Self::PRIMITIVES
            .iter()
            .find(|(field, _, _)| *field == self)
            .map(|(_, name, _)| *name)
    }

    /// Looks a primitive or combined field up by name.
    pub fn from_name(name: &str) -> Option<FieldMask> {
        let upper = name.trim().to_ascii_uppercase();
        let combined = match upper.as_str() {
            "MACRO_EDID" => Some(Self::MACRO_EDID),
            "MACRO_VIEWPORT" => Some(Self::MACRO_VIEWPORT),
            "MACRO_RAMP" => Some(Self::MACRO_RAMP),
            "MACRO_CONNECTOR" => Some(Self::MACRO_CONNECTOR),
            "MACRO_ACTIVE" => Some(Self::MACRO_ACTIVE),
            "ALL" => Some(Self::ALL),
            _ => None,
        };
        combined.or_else(|| {
            Self::PRIMITIVES
                .iter()
                .find(|(_, label, _)| *label == upper)
                .map(|(field, _, _)| *field)
        })
    }
}

impl BitOr for FieldMask {
    type Output = FieldMask;

    #[inline]
    fn bitor(self, rhs: FieldMask) -> FieldMask {
        FieldMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for FieldMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: FieldMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FieldMask {
    type Output = FieldMask;

    #[inline]
    fn bitand(self, rhs: FieldMask) -> FieldMask {
        FieldMask(self.0 & rhs.0)
    }
}

impl Not for FieldMask {
    type Output = FieldMask;

    #[inline]
    fn not(self) -> FieldMask {
        FieldMask(!self.0 & Self::ALL.0)
    }
}

impl fmt::Debug for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldMask({self})")
    }
}

impl fmt::Display for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names: Vec<&str> = self.iter().filter_map(FieldMask::name).collect();
        f.write_str(&names.join("|"))
    }
}

/// A field name in a mask string that is not known.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown CRTC information field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FieldMask {
    type Err = UnknownField;

    /// Parses names separated by `|` or `,`, e.g. `"EDID|MACRO_RAMP"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(['|', ','])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .try_fold(FieldMask::NONE, |acc, part| {
                FieldMask::from_name(part)
                    .map(|field| acc | field)
                    .ok_or_else(|| UnknownField(part.to_string()))
            })
    }
}

/// One information field: a value, an error, or both.
///
/// Both are present when a value was decoded but is not trustworthy, e.g.
/// EDID data whose checksum does not match.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    value: Option<T>,
    error: Option<Error>,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
        }
    }
}

impl<T> Field<T> {
    /// A successfully retrieved value.
    pub fn ok(value: T) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// A failed field.
    pub fn err(error: impl Into<Error>) -> Self {
        Self {
            value: None,
            error: Some(error.into()),
        }
    }

    /// Builds a field from a result.
    pub fn from_result(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(error) => Self::err(error),
        }
    }

    /// The value, if one was retrieved.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The error, if the field failed or is flagged.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Error code of the field, `0` when clean.
    #[inline]
    pub fn code(&self) -> i32 {
        self.error.as_ref().map_or(0, Error::code)
    }

    /// Whether neither a value nor an error is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.error.is_none()
    }

    /// Value when clean, otherwise the error.
    ///
    /// Returns `None` for an empty field.
    pub fn as_result(&self) -> Option<Result<&T, &Error>> {
        match (&self.value, &self.error) {
            (_, Some(error)) => Some(Err(error)),
            (Some(value), None) => Some(Ok(value)),
            (None, None) => None,
        }
    }

    /// Stores a value, keeping any existing error.
    pub fn set_value(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Stores an error, keeping any existing value.
    pub fn set_error(&mut self, error: impl Into<Error>) {
        self.error = Some(error.into());
    }

    /// Replaces the content with an error and drops any value.
    pub fn fail(&mut self, error: impl Into<Error>) {
        self.value = None;
        self.error = Some(error.into());
    }

    /// Empties the field.
    pub fn clear(&mut self) {
        self.value = None;
        self.error = None;
    }
}

/// Whether a CRTC supports gamma ramp adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GammaSupport {
    /// Adjustment is not supported.
    No,
    /// Support cannot be determined until ramps are written.
    Maybe,
    /// Adjustment is supported.
    Yes,
}

impl GammaSupport {
    /// Name used in listings and configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Maybe => "maybe",
            Self::Yes => "yes",
        }
    }

    /// Parses a name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "no" | "false" => Some(Self::No),
            "maybe" => Some(Self::Maybe),
            "yes" | "true" => Some(Self::Yes),
            _ => None,
        }
    }
}

macro_rules! named_enum {
    (
        $(#[$emeta:meta])*
        $vis:vis enum $ty:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $name:literal, )*
        }
    ) => {
        $(#[$emeta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $ty {
            $( $(#[$vmeta])* $variant, )*
        }

        impl $ty {
            /// Every variant.
            pub const ALL: &'static [$ty] = &[ $( $ty::$variant, )* ];

            /// Constant name of the variant.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Looks a variant up by constant name, ignoring case.
            pub fn from_name(name: &str) -> Option<Self> {
                let upper = name.trim().to_ascii_uppercase();
                match upper.as_str() {
                    $( $name => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Subpixel layout of a monitor.
    pub enum SubpixelOrder {
        /// Unknown layout.
        Unknown => "UNKNOWN",
        /// Not a subpixel display.
        None => "NONE",
        /// Left to right red, green, blue.
        HorizontalRgb => "HORIZONTAL_RGB",
        /// Left to right blue, green, red.
        HorizontalBgr => "HORIZONTAL_BGR",
        /// Top to bottom red, green, blue.
        VerticalRgb => "VERTICAL_RGB",
        /// Top to bottom blue, green, red.
        VerticalBgr => "VERTICAL_BGR",
    }
}

named_enum! {
    /// Physical connector type.
    pub enum ConnectorType {
        /// Unknown type.
        Unknown => "UNKNOWN",
        /// VGA.
        Vga => "VGA",
        /// Unspecified DVI.
        Dvi => "DVI",
        /// DVI-I.
        DviI => "DVII",
        /// DVI-D.
        DviD => "DVID",
        /// DVI-A.
        DviA => "DVIA",
        /// Composite video.
        Composite => "COMPOSITE",
        /// S-Video.
        SVideo => "SVIDEO",
        /// LVDS panel.
        Lvds => "LVDS",
        /// Component video.
        Component => "COMPONENT",
        /// 9-pin DIN.
        NinePinDin => "NINE_PIN_DIN",
        /// DisplayPort.
        DisplayPort => "DISPLAYPORT",
        /// Unspecified HDMI.
        Hdmi => "HDMI",
        /// HDMI type A.
        HdmiA => "HDMIA",
        /// HDMI type B.
        HdmiB => "HDMIB",
        /// Television.
        Tv => "TV",
        /// Embedded DisplayPort.
        Edp => "EDP",
        /// Virtual connector.
        Virtual => "VIRTUAL",
        /// MIPI DSI.
        Dsi => "DSI",
        /// Local flat panel.
        Lfp => "LFP",
        /// Display pixel interface.
        Dpi => "DPI",
        /// Writeback connector.
        Writeback => "WRITEBACK",
        /// SPI.
        Spi => "SPI",
    }
}

/// CIE 1931 xy chromaticity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Chromaticity {
    /// x coordinate.
    pub x: f32,
    /// y coordinate.
    pub y: f32,
}

/// Chromaticities of the three primaries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Primaries {
    /// Red primary.
    pub red: Chromaticity,
    /// Green primary.
    pub green: Chromaticity,
    /// Blue primary.
    pub blue: Chromaticity,
}

/// Monitor gamma per channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelGamma {
    /// Red channel gamma.
    pub red: f32,
    /// Green channel gamma.
    pub green: f32,
    /// Blue channel gamma.
    pub blue: f32,
}

/// Information about one CRTC and the monitor behind it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrtcInformation {
    /// Layout version the record was filled for.
    pub struct_version: u32,
    /// Raw EDID bytes.
    pub edid: Field<Vec<u8>>,
    /// Viewport width reported by the backend, mm.
    pub width_mm: Field<u32>,
    /// Viewport height reported by the backend, mm.
    pub height_mm: Field<u32>,
    /// Viewport width from the EDID, mm (whole centimetres).
    pub width_mm_edid: Field<u32>,
    /// Viewport height from the EDID, mm (whole centimetres).
    pub height_mm_edid: Field<u32>,
    /// Ramp sizes.
    pub gamma_size: Field<RampSizes>,
    /// Ramp depth.
    pub gamma_depth: Field<Depth>,
    /// Whether ramps can be adjusted.
    pub gamma_support: Field<GammaSupport>,
    /// Subpixel order.
    pub subpixel_order: Field<SubpixelOrder>,
    /// Whether a monitor is attached and active.
    pub active: Field<bool>,
    /// Connector name.
    pub connector_name: Field<String>,
    /// Connector type.
    pub connector_type: Field<ConnectorType>,
    /// Monitor gamma from the EDID.
    pub gamma: Field<ChannelGamma>,
    /// Primary chromaticities from the EDID.
    pub chroma: Field<Primaries>,
    /// White point from the EDID.
    pub white_point: Field<Chromaticity>,
}

/// Applies `$body` to the field of `$info` selected by `$mask`.
macro_rules! with_field {
    ([$($borrow:tt)+] $info:expr, $mask:expr, $field:ident => $body:expr) => {
        match $mask {
            m if m == FieldMask::EDID => { let $field = $($borrow)+ $info.edid; $body }
            m if m == FieldMask::WIDTH_MM => { let $field = $($borrow)+ $info.width_mm; $body }
            m if m == FieldMask::HEIGHT_MM => { let $field = $($borrow)+ $info.height_mm; $body }
            m if m == FieldMask::WIDTH_MM_EDID => { let $field = $($borrow)+ $info.width_mm_edid; $body }
            m if m == FieldMask::HEIGHT_MM_EDID => { let $field = $($borrow)+ $info.height_mm_edid; $body }
            m if m == FieldMask::GAMMA_SIZE => { let $field = $($borrow)+ $info.gamma_size; $body }
            m if m == FieldMask::GAMMA_DEPTH => { let $field = $($borrow)+ $info.gamma_depth; $body }
            m if m == FieldMask::GAMMA_SUPPORT => { let $field = $($borrow)+ $info.gamma_support; $body }
            m if m == FieldMask::SUBPIXEL_ORDER => { let $field = $($borrow)+ $info.subpixel_order; $body }
            m if m == FieldMask::ACTIVE => { let $field = $($borrow)+ $info.active; $body }
            m if m == FieldMask::CONNECTOR_NAME => { let $field = $($borrow)+ $info.connector_name; $body }
            m if m == FieldMask::CONNECTOR_TYPE => { let $field = $($borrow)+ $info.connector_type; $body }
            m if m == FieldMask::GAMMA => { let $field = $($borrow)+ $info.gamma; $body }
            m if m == FieldMask::CHROMA => { let $field = $($borrow)+ $info.chroma; $body }
            m if m == FieldMask::WHITE_POINT => { let $field = $($borrow)+ $info.white_point; $body }
            _ => Default::default(),
        }
    };
}

impl CrtcInformation {
    /// Creates an empty record at the current version.
    pub fn new() -> Self {
        Self {
            struct_version: CRTC_INFORMATION_VERSION,
            ..Default::default()
        }
    }

    /// Error code of one primitive field, `0` when clean or empty.
    pub fn code_of(&self, field: FieldMask) -> i32 {
        with_field!([&] self, field, f => f.code())
    }

    /// Sets the error of every primitive field in `fields`, keeping values.
    pub fn set_error(&mut self, fields: FieldMask, error: &Error) {
        for field in fields.iter() {
            with_field!([&mut] self, field, f => f.set_error(error.clone()))
        }
    }

    /// Replaces every primitive field in `fields` with `error`.
    pub fn fail(&mut self, fields: FieldMask, error: &Error) {
        for field in fields.iter() {
            with_field!([&mut] self, field, f => f.fail(error.clone()))
        }
    }

    /// Marks `fields` as unsupported by the backend.
    pub fn mark_unsupported(&mut self, fields: FieldMask) {
        self.fail(fields, &Error::Library(ErrorCode::CrtcInfoNotSupported));
    }

    /// Empties every field outside `keep`.
    pub fn retain(&mut self, keep: FieldMask) {
        for field in (!keep).iter() {
            with_field!([&mut] self, field, f => f.clear())
        }
    }

    /// Fields among `requested` that carry an error.
    pub fn failures(&self, requested: FieldMask) -> FieldMask {
        requested
            .iter()
            .filter(|field| self.code_of(*field) != 0)
            .fold(FieldMask::NONE, |acc, field| acc | field)
    }

    /// Whether every field among `requested` is clean.
    pub fn is_ok(&self, requested: FieldMask) -> bool {
        self.failures(requested).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_bits() {
        assert_eq!(FieldMask::PRIMITIVES.len(), 15);
        let mut all = FieldMask::NONE;
        for (i, (field, name, _)) in FieldMask::PRIMITIVES.iter().enumerate() {
            assert_eq!(field.bits(), 1 << i);
            assert_eq!(FieldMask::from_name(name), Some(*field));
            assert_eq!(field.name(), Some(*name));
            all |= *field;
        }
        assert_eq!(all, FieldMask::ALL);
    }

    #[test]
    fn test_unknown_bits_ignored() {
        let mask = FieldMask::from_bits_truncate(0xFFFF_0000 | FieldMask::ACTIVE.bits());
        assert_eq!(mask, FieldMask::ACTIVE);
        assert_eq!((!FieldMask::ALL), FieldMask::NONE);
    }

    #[test]
    fn test_combinations() {
        assert!(FieldMask::MACRO_ACTIVE.contains(FieldMask::MACRO_EDID));
        assert!(FieldMask::MACRO_ACTIVE.contains(FieldMask::ACTIVE));
        assert!(!FieldMask::MACRO_ACTIVE.intersects(FieldMask::MACRO_RAMP));
        assert!(!FieldMask::EDID_DERIVED.contains(FieldMask::EDID));
        assert_eq!(FieldMask::MACRO_CONNECTOR.iter().count(), 2);
    }

    #[test]
    fn test_versions() {
        let v1 = FieldMask::for_version(1);
        assert_eq!(v1.iter().count(), 13);
        assert!(!v1.intersects(FieldMask::CHROMA | FieldMask::WHITE_POINT));
        assert_eq!(FieldMask::for_version(CRTC_INFORMATION_VERSION), FieldMask::ALL);
    }

    #[test]
    fn test_parse_mask() {
        let mask: FieldMask = "edid, macro_ramp | ACTIVE".parse().unwrap();
        assert_eq!(mask, FieldMask::EDID | FieldMask::MACRO_RAMP | FieldMask::ACTIVE);
        assert!("EDID|BOGUS".parse::<FieldMask>().is_err());
        assert_eq!(FieldMask::MACRO_RAMP.to_string(), "GAMMA_SIZE|GAMMA_DEPTH");
    }

    #[test]
    fn test_field_states() {
        let mut field = Field::ok(5u32);
        assert_eq!(field.as_result(), Some(Ok(&5)));
        field.set_error(ErrorCode::EdidChecksumError);
        assert_eq!(field.value(), Some(&5));
        assert_eq!(field.code(), -32);
        field.fail(ErrorCode::NoSuchCrtc);
        assert_eq!(field.value(), None);
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.as_result(), None);
    }

    #[test]
    fn test_failures_only_requested() {
        let mut info = CrtcInformation::new();
        info.active = Field::ok(true);
        info.mark_unsupported(FieldMask::CONNECTOR_NAME | FieldMask::GAMMA);
        let requested = FieldMask::ACTIVE | FieldMask::CONNECTOR_NAME;
        assert_eq!(info.failures(requested), FieldMask::CONNECTOR_NAME);
        assert!(!info.is_ok(requested));
        assert!(info.is_ok(FieldMask::ACTIVE));

        info.retain(requested);
        assert!(info.gamma.is_empty());
        assert!(info.connector_name.error().is_some_and(Error::is_not_supported));
    }

    #[test]
    fn test_enum_names() {
        for order in SubpixelOrder::ALL {
            assert_eq!(SubpixelOrder::from_name(order.name()), Some(*order));
        }
        for ty in ConnectorType::ALL {
            assert_eq!(ConnectorType::from_name(ty.name()), Some(*ty));
        }
        assert_eq!(ConnectorType::from_name("hdmia"), Some(ConnectorType::HdmiA));
        assert_eq!(GammaSupport::from_name("Maybe"), Some(GammaSupport::Maybe));
    }
}
