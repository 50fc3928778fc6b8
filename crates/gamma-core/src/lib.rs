//! # gamma-core
//!
//! Method-independent types for reading and adjusting display gamma ramps.
//!
//! - [`ErrorCode`], [`Error`] - Stable error catalog and the library error type
//! - [`Depth`] - Sample representation tag (8/16/32/64-bit integer, f32, f64)
//! - [`RampBuffer`], [`Ramps`] - Three-channel ramps in one contiguous allocation
//! - [`translate()`] - Depth translation through a canonical 64-bit form
//! - [`FieldMask`], [`CrtcInformation`] - Partial-failure CRTC information
//! - [`MethodCapabilities`] - Static backend capabilities and field routing
//!
//! ## Crate Structure
//!
//! ```text
//! gamma-core (this crate)
//!    ^
//!    |
//!    +-- gamma-edid (EDID decoding into CrtcInformation)
//!    +-- gamma-device (sites, partitions, CRTCs, backends)
//!            ^
//!            +-- gamma-cli (gammactl)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gamma_core::{translate, Depth, RampSizes, Ramps};
//!
//! let sizes = RampSizes::new(1024, 2048, 512);
//! let native = Ramps::linear(Depth::U64, sizes).unwrap();
//! let mut caller = Ramps::new(Depth::U16, sizes).unwrap();
//! translate(&native, &mut caller).unwrap();
//!
//! if let Ramps::U16(buf) = &caller {
//!     assert_eq!(buf.red()[0], 0);
//!     assert_eq!(buf.red()[1023], u16::MAX);
//! }
//! ```

#![warn(missing_docs)]

pub mod capability;
pub mod depth;
pub mod error;
pub mod info;
pub mod ramps;
pub mod translate;

pub use capability::{FieldRouting, MethodCapabilities};
pub use depth::{Depth, UnknownDepth};
pub use error::{Error, ErrorCode, Result};
pub use info::{
    ChannelGamma, Chromaticity, ConnectorType, CrtcInformation, Field, FieldMask, GammaSupport,
    Primaries, SubpixelOrder, UnknownField, CRTC_INFORMATION_VERSION,
};
pub use ramps::{RampBuffer, RampSizes, Ramps};
pub use translate::{translate, Sample};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::capability::MethodCapabilities;
    pub use crate::depth::Depth;
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::info::{CrtcInformation, FieldMask};
    pub use crate::ramps::{RampSizes, Ramps};
    pub use crate::translate::translate;
}
