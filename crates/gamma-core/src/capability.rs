//! Static backend capabilities and information-field routing.
//!
//! Every adjustment method describes what it can do once, in a
//! [`MethodCapabilities`] value. Information queries are routed through
//! [`MethodCapabilities::route`]: fields outside the capability mask are
//! answered with "not supported" without reaching the backend, and fields
//! decoded from the EDID are turned into one EDID request.

use crate::FieldMask;
use crate::info::CRTC_INFORMATION_VERSION;

/// What an adjustment method supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodCapabilities {
    /// Layout version these capabilities describe.
    pub struct_version: u32,
    /// Information fields the method can supply.
    pub fields: FieldMask,
    /// The default site can be found without an identifier.
    pub default_site_known: bool,
    /// More than one site can exist.
    pub multiple_sites: bool,
    /// A site can have more than one partition.
    pub multiple_partitions: bool,
    /// A partition can have more than one CRTC.
    pub multiple_crtcs: bool,
    /// Each partition is one graphics card.
    pub partitions_are_graphics_cards: bool,
    /// Sites can be restored to system settings.
    pub site_restore: bool,
    /// Partitions can be restored to system settings.
    pub partition_restore: bool,
    /// CRTCs can be restored to system settings.
    pub crtc_restore: bool,
    /// The three channels always have the same ramp size.
    pub identical_gamma_sizes: bool,
    /// Ramp sizes never change.
    pub fixed_gamma_size: bool,
    /// Ramp depth never changes.
    pub fixed_gamma_depth: bool,
    /// The method talks to a real display stack.
    pub real: bool,
    /// The method emulates adjustment through another layer.
    pub fake: bool,
    /// Adjustments revert when the process disconnects.
    pub auto_restore: bool,
}

impl Default for MethodCapabilities {
    fn default() -> Self {
        Self {
            struct_version: CRTC_INFORMATION_VERSION,
            fields: FieldMask::NONE,
            default_site_known: false,
            multiple_sites: false,
            multiple_partitions: false,
            multiple_crtcs: false,
            partitions_are_graphics_cards: false,
            site_restore: false,
            partition_restore: false,
            crtc_restore: false,
            identical_gamma_sizes: false,
            fixed_gamma_size: false,
            fixed_gamma_depth: false,
            real: false,
            fake: false,
            auto_restore: false,
        }
    }
}

/// Where each requested information field comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldRouting {
    /// Fields to request from the backend.
    pub backend: FieldMask,
    /// Fields to decode from the EDID the backend returns.
    pub from_edid: FieldMask,
    /// Fields to mark as not supported.
    pub unsupported: FieldMask,
}

impl FieldRouting {
    /// Whether the backend must be called at all.
    #[inline]
    pub fn needs_backend(&self) -> bool {
        !self.backend.is_empty()
    }
}

impl MethodCapabilities {
    /// Capabilities as seen by a caller built for record `version`.
    ///
    /// Fields introduced after `version` are removed from the mask.
    pub fn for_version(&self, version: u32) -> Self {
        let version = version.min(CRTC_INFORMATION_VERSION);
        Self {
            struct_version: version,
            fields: self.fields & FieldMask::for_version(version),
            ..*self
        }
    }

    /// Whether the method can supply every field in `fields`.
    #[inline]
    pub fn supports(&self, fields: FieldMask) -> bool {
        self.fields.contains(fields)
    }

    /// Splits a request into backend, EDID-decoded and unsupported fields.
    ///
    /// EDID-derived fields are only routed to the EDID decoder when the
    /// method lists both the field and [`FieldMask::EDID`].
    pub fn route(&self, requested: FieldMask) -> FieldRouting {
        let requested = requested & FieldMask::ALL;
        let supported = requested & self.fields;
        let mut routing = FieldRouting {
            unsupported: requested & !self.fields,
            ..Default::default()
        };

        let derived = supported & FieldMask::EDID_DERIVED;
        if !derived.is_empty() {
            if self.fields.contains(FieldMask::EDID) {
                routing.from_edid = derived;
                routing.backend |= FieldMask::EDID;
            } else {
                routing.unsupported |= derived;
            }
        }
        routing.backend |= supported & !FieldMask::EDID_DERIVED;
        routing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(fields: FieldMask) -> MethodCapabilities {
        MethodCapabilities {
            fields,
            ..Default::default()
        }
    }

    #[test]
    fn test_route_unsupported_never_reaches_backend() {
        let c = caps(FieldMask::ACTIVE | FieldMask::GAMMA_SIZE);
        let routing = c.route(FieldMask::ACTIVE | FieldMask::CONNECTOR_NAME);
        assert_eq!(routing.backend, FieldMask::ACTIVE);
        assert_eq!(routing.unsupported, FieldMask::CONNECTOR_NAME);
        assert!(routing.from_edid.is_empty());
    }

    #[test]
    fn test_route_nothing_supported() {
        let routing = caps(FieldMask::NONE).route(FieldMask::ALL);
        assert!(!routing.needs_backend());
        assert_eq!(routing.unsupported, FieldMask::ALL);
    }

    #[test]
    fn test_route_edid_derived() {
        let c = caps(FieldMask::MACRO_EDID);
        let routing = c.route(FieldMask::GAMMA | FieldMask::WIDTH_MM_EDID);
        assert_eq!(routing.backend, FieldMask::EDID);
        assert_eq!(routing.from_edid, FieldMask::GAMMA | FieldMask::WIDTH_MM_EDID);
        assert!(routing.unsupported.is_empty());
    }

    #[test]
    fn test_route_derived_without_edid() {
        let c = caps(FieldMask::GAMMA);
        let routing = c.route(FieldMask::GAMMA);
        assert!(!routing.needs_backend());
        assert_eq!(routing.unsupported, FieldMask::GAMMA);
    }

    #[test]
    fn test_for_version() {
        let c = caps(FieldMask::ALL);
        let v1 = c.for_version(1);
        assert_eq!(v1.struct_version, 1);
        assert!(!v1.supports(FieldMask::CHROMA));
        assert!(v1.supports(FieldMask::GAMMA));
        assert_eq!(c.for_version(99).struct_version, CRTC_INFORMATION_VERSION);
    }
}
