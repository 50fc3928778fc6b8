//! Error catalog and error type for gamma ramp operations.
//!
//! Two classes of failure exist throughout the workspace:
//!
//! - **Library errors**: the closed set of [`ErrorCode`]s. Each has a stable
//!   negative integer value, a constant name and a human description.
//!   Values are part of the public contract and are never renumbered.
//! - **System errors**: a positive OS error number captured at the time of
//!   failure, or [`ErrorCode::ErrnoSet`] when the caller should consult the
//!   OS error state directly.
//!
//! [`Error`] wraps both, plus two variants that carry extra context: the
//! group a device is restricted to, and the size of a failed allocation.
//!
//! # Usage
//!
//! ```rust
//! use gamma_core::{Error, ErrorCode};
//!
//! let err = Error::from(ErrorCode::NoSuchCrtc);
//! assert_eq!(err.code(), -5);
//! assert_eq!(ErrorCode::from_name("NO_SUCH_CRTC"), Some(ErrorCode::NoSuchCrtc));
//! assert_eq!(Error::from_code(-5), Some(err));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use std::fmt;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// OS error number reported for allocation failures.
///
/// `ENOMEM` is 12 on Linux, the BSDs, macOS and the Windows CRT.
pub const ENOMEM: i32 = 12;

/// OS error number reported when an operation is not supported.
///
/// Restore requests refused by a method's capabilities report it.
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub const ENOTSUP: i32 = 45;

/// OS error number reported when an operation is not supported.
///
/// Restore requests refused by a method's capabilities report it.
#[cfg(windows)]
pub const ENOTSUP: i32 = 129;

/// OS error number reported when an operation is not supported.
///
/// Restore requests refused by a method's capabilities report it.
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
    windows
)))]
pub const ENOTSUP: i32 = 95;

macro_rules! error_codes {
    ($( $(#[$meta:meta])* $variant:ident = $value:literal, $name:literal, $desc:literal; )*) => {
        /// Library error codes.
        ///
        /// The discriminant of each variant is its stable integer value.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum ErrorCode {
            $( $(#[$meta])* $variant = $value, )*
        }

        impl ErrorCode {
            /// Every code, ordered from `-1` downwards.
            pub const ALL: &'static [ErrorCode] = &[ $( ErrorCode::$variant, )* ];

            /// Returns the code with the given integer value.
            pub fn from_value(value: i32) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// Constant name of the code, e.g. `"NO_SUCH_CRTC"`.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Looks a code up by its constant name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(Self::$variant), )*
                    _ => None,
                }
            }

            /// Human readable description.
            pub const fn description(self) -> &'static str {
                match self {
                    $( Self::$variant => $desc, )*
                }
            }
        }
    };
}

error_codes! {
    /// The OS error state holds the actual cause.
    ErrnoSet = -1, "ERRNO_SET", "Error is described by the OS error number";
    /// Requested adjustment method is unknown or not compiled in.
    NoSuchAdjustmentMethod = -2, "NO_SUCH_ADJUSTMENT_METHOD", "The selected adjustment method does not exist or has been excluded at compile-time";
    /// Site does not exist.
    NoSuchSite = -3, "NO_SUCH_SITE", "The selected site does not exist";
    /// Partition does not exist.
    NoSuchPartition = -4, "NO_SUCH_PARTITION", "The selected partition does not exist";
    /// CRTC does not exist.
    NoSuchCrtc = -5, "NO_SUCH_CRTC", "The selected CRTC does not exist";
    /// Counter overflowed while counting sites, partitions or CRTCs.
    ImpossibleAmount = -6, "IMPOSSIBLE_AMOUNT", "Counter overflowed when counting the number of available items";
    /// Connector is disabled.
    ConnectorDisabled = -7, "CONNECTOR_DISABLED", "The selected connector is disabled, it has no CRTC";
    /// CRTC could not be opened.
    OpenCrtcFailed = -8, "OPEN_CRTC_FAILED", "The selected CRTC could not be opened, reason unknown";
    /// Information field is not supported by the adjustment method.
    CrtcInfoNotSupported = -9, "CRTC_INFO_NOT_SUPPORTED", "The CRTC information field is not supported by the adjustment method";
    /// Reading the gamma ramps failed.
    GammaRampReadFailed = -10, "GAMMA_RAMP_READ_FAILED", "Failed to read the current gamma ramps for the selected CRTC, reason unknown";
    /// Writing the gamma ramps failed.
    GammaRampWriteFailed = -11, "GAMMA_RAMP_WRITE_FAILED", "Failed to write the current gamma ramps for the selected CRTC, reason unknown";
    /// Ramp size changed between query and use.
    GammaRampSizeChanged = -12, "GAMMA_RAMP_SIZE_CHANGED", "The specified ramp sizes do not match the ramp sizes returned by the adjustment methods in response to the query/command";
    /// Channel sizes differ but the method requires identical sizes.
    MixedGammaRampSize = -13, "MIXED_GAMMA_RAMP_SIZE", "The specified ramp sizes are not identical which is required by the adjustment method";
    /// Ramp sizes do not match the CRTC.
    WrongGammaRampSize = -14, "WRONG_GAMMA_RAMP_SIZE", "The specified ramp sizes are not supported by the adjustment method";
    /// Ramps have only one stop.
    SingletonGammaRamp = -15, "SINGLETON_GAMMA_RAMP", "The adjustment method reported that the gamma ramps size is 1, or perhaps even zero or less";
    /// Listing CRTCs failed.
    ListCrtcsFailed = -16, "LIST_CRTCS_FAILED", "The adjustment method failed to list available CRTCs, reason unknown";
    /// Mode resources could not be acquired.
    AcquiringModeResourcesFailed = -17, "ACQUIRING_MODE_RESOURCES_FAILED", "Failed to acquire mode resources from the adjustment method";
    /// Negative partition count reported.
    NegativePartitionCount = -18, "NEGATIVE_PARTITION_COUNT", "The adjustment method reported that a negative number of partitions exists in the site";
    /// Negative CRTC count reported.
    NegativeCrtcCount = -19, "NEGATIVE_CRTC_COUNT", "The adjustment method reported that a negative number of CRTCs exists in the partition";
    /// Device access is restricted to the root user.
    DeviceRestricted = -20, "DEVICE_RESTRICTED", "Device cannot be accessed because of insufficient permissions";
    /// Device access failed, reason unknown.
    DeviceAccessFailed = -21, "DEVICE_ACCESS_FAILED", "Device cannot be accessed, reason unknown";
    /// Device access requires membership in a group.
    DeviceRequireGroup = -22, "DEVICE_REQUIRE_GROUP", "Device cannot be accessed, membership of a specific group is required";
    /// Graphics card disappeared.
    GraphicsCardRemoved = -23, "GRAPHICS_CARD_REMOVED", "The graphics card appears to have been removed";
    /// Unknown state.
    StateUnknown = -24, "STATE_UNKNOWN", "The state of the requested information is unknown";
    /// Connection status of the connector is unknown.
    ConnectorUnknown = -25, "CONNECTOR_UNKNOWN", "Failed to determine which connector the CRTC belongs to";
    /// Connector type is not recognised.
    ConnectorTypeNotRecognised = -26, "CONNECTOR_TYPE_NOT_RECOGNISED", "The detected connector type is not listed in this library and has to be updated";
    /// Subpixel order is not recognised.
    SubpixelOrderNotRecognised = -27, "SUBPIXEL_ORDER_NOT_RECOGNISED", "The detected subpixel order is not listed in this library and has to be updated";
    /// EDID is shorter than one block.
    EdidLengthUnsupported = -28, "EDID_LENGTH_UNSUPPORTED", "The length of the EDID does not match that of any supported EDID structure revision";
    /// EDID magic number mismatch.
    EdidWrongMagicNumber = -29, "EDID_WRONG_MAGIC_NUMBER", "The magic number in the EDID does not match that of any supported EDID structure revision";
    /// EDID structure revision is not supported.
    EdidRevisionUnsupported = -30, "EDID_REVISION_UNSUPPORTED", "The EDID structure revision used by the monitor is not supported";
    /// Monitor does not specify its gamma.
    GammaNotSpecified = -31, "GAMMA_NOT_SPECIFIED", "The gamma characteristics field in the EDID is left unspecified";
    /// EDID checksum mismatch.
    EdidChecksumError = -32, "EDID_CHECKSUM_ERROR", "The checksum in the EDID is incorrect, the requested information was decoded but cannot be trusted";
    /// Both [`ErrorCode::GammaNotSpecified`] and [`ErrorCode::EdidChecksumError`].
    GammaNotSpecifiedAndEdidChecksumError = -33, "GAMMA_NOT_SPECIFIED_AND_EDID_CHECKSUM_ERROR", "Both of the errors GAMMA_NOT_SPECIFIED and EDID_CHECKSUM_ERROR have occurred";
    /// Ramp size query failed.
    GammaRampsSizeQueryFailed = -34, "GAMMA_RAMPS_SIZE_QUERY_FAILED", "The adjustment method failed to determine the size of the gamma ramps, reason unknown";
    /// Partition could not be opened.
    OpenPartitionFailed = -35, "OPEN_PARTITION_FAILED", "The selected partition could not be opened, reason unknown";
    /// Site could not be opened.
    OpenSiteFailed = -36, "OPEN_SITE_FAILED", "The selected site could not be opened, reason unknown";
    /// Protocol version query failed.
    ProtocolVersionQueryFailed = -37, "PROTOCOL_VERSION_QUERY_FAILED", "Failed to query the adjustment method for its protocol version, reason unknown";
    /// Protocol version is not supported.
    ProtocolVersionNotSupported = -38, "PROTOCOL_VERSION_NOT_SUPPORTED", "The adjustment method's version of its protocol is not supported";
    /// Listing partitions failed.
    ListPartitionsFailed = -39, "LIST_PARTITIONS_FAILED", "The adjustment method failed to list available partitions, reason unknown";
    /// Partition exists by index but not by identity.
    NullPartition = -40, "NULL_PARTITION", "Partition exists by index, but the partition at that index does not exist";
    /// No monitor connected to the connector.
    NotConnected = -41, "NOT_CONNECTED", "There is no monitor connected to the connector of the selected CRTC";
    /// Reply value could not be extracted.
    ReplyValueExtractionFailed = -42, "REPLY_VALUE_EXTRACTION_FAILED", "Data extraction from a reply from the adjustment method failed, reason unknown";
    /// EDID property missing.
    EdidNotFound = -43, "EDID_NOT_FOUND", "No EDID property was found on the output";
    /// Listing properties failed.
    ListPropertiesFailed = -44, "LIST_PROPERTIES_FAILED", "Failed to list properties on the output, reason unknown";
    /// Property value query failed.
    PropertyValueQueryFailed = -45, "PROPERTY_VALUE_QUERY_FAILED", "Failed to query a property's value from the output, reason unknown";
    /// Output information query failed.
    OutputInformationQueryFailed = -46, "OUTPUT_INFORMATION_QUERY_FAILED", "A request for information on an output failed, reason unknown";
}

impl ErrorCode {
    /// Most negative code in the catalog.
    pub const MIN: i32 = -46;

    /// Integer value of the code.
    #[inline]
    pub const fn value(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Errors reported by every layer of the workspace.
///
/// The type is `Clone` so a single failure can be recorded in several
/// information fields at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A library error from the closed catalog.
    #[error("{0}")]
    Library(ErrorCode),

    /// A positive OS error number.
    #[error("{}", os_message(.0))]
    Os(i32),

    /// Device access requires membership in a group.
    ///
    /// Carries the group the caller must belong to, so the advisory travels
    /// with the error instead of living in shared state.
    #[error("device requires membership of group {}", group_label(.gid, .name))]
    RequireGroup {
        /// Group ID.
        gid: u32,
        /// Group name, when it could be resolved.
        name: Option<String>,
    },

    /// Memory allocation failed or the requested size overflowed.
    #[error("failed to allocate {requested} bytes")]
    AllocationFailed {
        /// Bytes requested, saturated at `usize::MAX` on overflow.
        requested: usize,
    },
}

fn os_message(errno: &i32) -> String {
    std::io::Error::from_raw_os_error(*errno).to_string()
}

fn group_label(gid: &u32, name: &Option<String>) -> String {
    match name {
        Some(name) => format!("{name} ({gid})"),
        None => gid.to_string(),
    }
}

impl Error {
    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize) -> Self {
        Self::AllocationFailed { requested }
    }

    /// Creates an [`Error::RequireGroup`] error.
    #[inline]
    pub fn require_group(gid: u32, name: Option<String>) -> Self {
        Self::RequireGroup { gid, name }
    }

    /// Captures the calling thread's last OS error.
    ///
    /// Falls back to [`ErrorCode::ErrnoSet`] when the platform does not
    /// report a number.
    pub fn last_os_error() -> Self {
        Self::from(std::io::Error::last_os_error())
    }

    /// Stable integer value of the error.
    ///
    /// Negative for library errors, positive for OS errors.
    pub fn code(&self) -> i32 {
        match self {
            Self::Library(code) => code.value(),
            Self::Os(errno) => *errno,
            Self::RequireGroup { .. } => ErrorCode::DeviceRequireGroup.value(),
            Self::AllocationFailed { .. } => ENOMEM,
        }
    }

    /// Reconstructs an error from its integer value.
    ///
    /// Returns `None` for `0` (success) and for negative values outside the
    /// catalog. Group context cannot be recovered from a bare integer, so
    /// `-22` yields [`Error::Library`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            c if c > 0 => Some(Self::Os(c)),
            c => ErrorCode::from_value(c).map(Self::Library),
        }
    }

    /// Returns the library code, if this is a library error.
    pub fn library_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Library(code) => Some(*code),
            Self::RequireGroup { .. } => Some(ErrorCode::DeviceRequireGroup),
            _ => None,
        }
    }

    /// Creates the error returned for operations a method does not support.
    #[inline]
    pub fn not_supported() -> Self {
        Self::Os(ENOTSUP)
    }

    /// Returns `true` if the error only says the field or operation is
    /// unsupported.
    ///
    /// Tools can skip such fields silently instead of reporting a fault.
    #[inline]
    pub fn is_not_supported(&self) -> bool {
        matches!(
            self,
            Self::Library(ErrorCode::CrtcInfoNotSupported) | Self::Os(ENOTSUP)
        )
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Writes the description into `buf` as a NUL-terminated byte string.
    ///
    /// Output that does not fit is truncated at a byte boundary, never
    /// rejected. Returns the number of bytes written, excluding the NUL.
    /// An empty buffer receives nothing.
    pub fn describe_into(&self, buf: &mut [u8]) -> usize {
        let Some(room) = buf.len().checked_sub(1) else {
            return 0;
        };
        let text = self.to_string();
        let n = text.len().min(room);
        buf[..n].copy_from_slice(&text.as_bytes()[..n]);
        buf[n] = 0;
        n
    }
}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Self::Library(code)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(errno) if errno > 0 => Self::Os(errno),
            _ => Self::Library(ErrorCode::ErrnoSet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_dense() {
        assert_eq!(ErrorCode::ALL.len(), 46);
        for (i, code) in ErrorCode::ALL.iter().enumerate() {
            assert_eq!(code.value(), -(i as i32) - 1);
        }
        assert_eq!(ErrorCode::ALL.last().map(|c| c.value()), Some(ErrorCode::MIN));
    }

    #[test]
    fn test_names_round_trip() {
        let mut seen = HashSet::new();
        for &code in ErrorCode::ALL {
            assert!(seen.insert(code.name()), "duplicate name {}", code.name());
            assert_eq!(ErrorCode::from_name(code.name()), Some(code));
            assert_eq!(ErrorCode::from_value(code.value()), Some(code));
            assert!(!code.description().is_empty());
        }
        assert_eq!(ErrorCode::from_name("NOT_A_CODE"), None);
        assert_eq!(ErrorCode::from_value(ErrorCode::MIN - 1), None);
        assert_eq!(ErrorCode::from_value(0), None);
    }

    #[test]
    fn test_code_round_trip() {
        for &code in ErrorCode::ALL {
            let err = Error::from(code);
            assert_eq!(Error::from_code(err.code()), Some(err));
        }
        assert_eq!(Error::from_code(0), None);
        assert_eq!(Error::from_code(13), Some(Error::Os(13)));
    }

    #[test]
    fn test_require_group_code() {
        let err = Error::require_group(44, Some("video".into()));
        assert_eq!(err.code(), -22);
        assert_eq!(err.library_code(), Some(ErrorCode::DeviceRequireGroup));
        assert!(err.to_string().contains("video (44)"));
    }

    #[test]
    fn test_allocation_code() {
        let err = Error::allocation_failed(usize::MAX);
        assert_eq!(err.code(), ENOMEM);
        assert!(err.is_allocation_error());
    }

    #[test]
    fn test_describe_into_truncates() {
        let err = Error::from(ErrorCode::NoSuchCrtc);
        let mut small = [0xAAu8; 8];
        let n = err.describe_into(&mut small);
        assert_eq!(n, 7);
        assert_eq!(&small[..7], b"The sel");
        assert_eq!(small[7], 0);

        let mut large = [0xAAu8; 128];
        let n = err.describe_into(&mut large);
        assert_eq!(&large[..n], ErrorCode::NoSuchCrtc.description().as_bytes());
        assert_eq!(large[n], 0);

        assert_eq!(err.describe_into(&mut []), 0);
    }

    #[test]
    fn test_io_error_conversion() {
        let err = Error::from(std::io::Error::from_raw_os_error(2));
        assert_eq!(err, Error::Os(2));
        let err = Error::from(std::io::Error::other("no number"));
        assert_eq!(err, Error::Library(ErrorCode::ErrnoSet));
    }

    #[test]
    fn test_os_not_supported_is_recognised() {
        let err = Error::from(std::io::Error::from_raw_os_error(ENOTSUP));
        assert!(err.is_not_supported());
        assert_eq!(err, Error::not_supported());
        assert!(!Error::from(std::io::Error::from_raw_os_error(2)).is_not_supported());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_enotsup_linux() {
        assert_eq!(ENOTSUP, 95);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_enotsup_macos() {
        assert_eq!(ENOTSUP, 45);
    }
}
