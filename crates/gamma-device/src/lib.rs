//! # gamma-device
//!
//! Site → partition → CRTC handles over pluggable adjustment methods.
//!
//! - [`MethodId`] - Stable method identifiers and names
//! - [`backend`] - The traits a method implements to plug in
//! - [`MethodRegistry`] - Method identifier to implementation
//! - [`detect`] - Method listing levels and environment checks
//! - [`Site`], [`Partition`], [`Crtc`] - Front handles with capability
//!   gating, EDID decoding and depth bridging
//! - [`dummy`] - Simulated display stack, configured from YAML
//!
//! ## Example
//!
//! ```rust
//! use gamma_core::{Depth, FieldMask};
//! use gamma_device::{MethodId, MethodRegistry};
//!
//! let site = MethodRegistry::global().open_site(MethodId::Dummy, None).unwrap();
//! let partition = site.partition(0).unwrap();
//! let mut crtc = partition.crtc(0).unwrap();
//!
//! let info = crtc.information(FieldMask::MACRO_RAMP | FieldMask::GAMMA);
//! assert!(info.is_ok(FieldMask::MACRO_RAMP));
//!
//! crtc.set_ramps_with(&|x: f64| x.powf(1.0 / 2.2), &|x| x, &|x| x).unwrap();
//! let ramps = crtc.read_ramps(Depth::F64).unwrap();
//! assert_eq!(ramps.depth(), Depth::F64);
//! crtc.restore().unwrap();
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod detect;
pub mod dummy;
pub mod method;
pub mod registry;
pub mod site;

pub use backend::{CrtcBackend, Method, PartitionBackend, SiteBackend};
pub use detect::{list_methods, ListLevel};
pub use method::{MethodId, UnknownMethod};
pub use registry::MethodRegistry;
pub use site::{Crtc, Partition, Site};
