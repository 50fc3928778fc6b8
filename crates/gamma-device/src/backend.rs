//! Contract between the device handles and an adjustment method.
//!
//! A method plugs in by implementing four traits, one per level of the
//! hierarchy. The front handles in [`crate::site`] own the trait objects,
//! enforce index bounds and lifetimes, gate requests on the method's
//! [`MethodCapabilities`] and translate ramps to and from the backend's
//! native depth. Backends therefore only ever see:
//!
//! - indices below the count they reported,
//! - ramps at their own native depth,
//! - information requests for fields their capabilities list, with the
//!   EDID-derived fields reduced to one [`FieldMask::EDID`] request.
//!
//! All handles are `Send` so independent handles can live on independent
//! threads; a single handle is never used concurrently.

use gamma_core::{CrtcInformation, Depth, FieldMask, MethodCapabilities, Ramps, Result};

use crate::MethodId;

/// An adjustment method: the entry point of one backend.
pub trait Method: Send + Sync {
    /// Identifier of the method.
    fn id(&self) -> MethodId;

    /// Static capabilities.
    fn capabilities(&self) -> MethodCapabilities;

    /// Whether the current environment looks suitable for this method.
    ///
    /// The default requires a virtual terminal for [`MethodId::LinuxDrm`].
    /// Other methods need a known default site, either through the
    /// capabilities or through the method's default-site variable.
    fn environment_suitable(&self) -> bool {
        match self.id() {
            MethodId::LinuxDrm => crate::detect::is_proper_vt(),
            id => self.capabilities().default_site_known || id.default_site().is_some(),
        }
    }

    /// Connects to a site. `None` selects the default site.
    fn open_site(&self, identifier: Option<&str>) -> Result<Box<dyn SiteBackend>>;
}

/// Backend half of an open site.
pub trait SiteBackend: Send {
    /// Number of partitions in the site.
    fn partitions_available(&self) -> usize;

    /// Restores every CRTC of the site to system settings.
    fn restore(&self) -> Result<()>;

    /// Opens partition `index`, which is below [`partitions_available`].
    ///
    /// [`partitions_available`]: SiteBackend::partitions_available
    fn open_partition(&self, index: usize) -> Result<Box<dyn PartitionBackend>>;

    /// Releases the site.
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Backend half of an open partition.
pub trait PartitionBackend: Send {
    /// Number of CRTCs in the partition.
    fn crtcs_available(&self) -> usize;

    /// Restores every CRTC of the partition to system settings.
    fn restore(&self) -> Result<()>;

    /// Opens CRTC `index`, which is below [`crtcs_available`].
    ///
    /// [`crtcs_available`]: PartitionBackend::crtcs_available
    fn open_crtc(&self, index: usize) -> Result<Box<dyn CrtcBackend>>;

    /// Releases the partition.
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Backend half of an open CRTC.
pub trait CrtcBackend: Send {
    /// Depth the backend reads and writes ramps in.
    fn native_depth(&self) -> Depth;

    /// Restores the CRTC's ramps to system settings.
    fn restore(&mut self) -> Result<()>;

    /// Reads the current ramps into `ramps`, which is at the native depth.
    fn get_ramps(&mut self, ramps: &mut Ramps) -> Result<()>;

    /// Applies `ramps`, which are at the native depth.
    fn set_ramps(&mut self, ramps: &Ramps) -> Result<()>;

    /// Fills the requested fields. Fields outside `fields` are ignored.
    fn information(&mut self, fields: FieldMask) -> CrtcInformation;

    /// Releases the CRTC.
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
