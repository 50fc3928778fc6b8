//! Site, partition and CRTC handles.
//!
//! The handles form a borrow hierarchy: a [`Partition`] borrows its
//! [`Site`] and a [`Crtc`] borrows its partition, so no handle can outlive
//! its parent. Closing consumes the handle; a handle that is dropped without
//! being closed is closed on drop and any teardown error is logged.
//!
//! Ramp reads and writes accept any [`Depth`]. When it differs from the
//! backend's native depth the ramps are translated through a temporary
//! native buffer that lives only for the duration of the call.

use gamma_core::{
    translate, CrtcInformation, Depth, Error, ErrorCode, FieldMask, MethodCapabilities,
    RampSizes, Ramps, Result, CRTC_INFORMATION_VERSION,
};
use tracing::{debug, trace, warn};

use crate::backend::{CrtcBackend, Method, PartitionBackend, SiteBackend};
use crate::MethodId;

/// A connection to one display server instance of a method.
pub struct Site {
    method: MethodId,
    identifier: Option<String>,
    capabilities: MethodCapabilities,
    partitions_available: usize,
    backend: Option<Box<dyn SiteBackend>>,
}

impl Site {
    /// Opens a site of `method`. `None` selects the default site.
    ///
    /// Errors from the backend are returned unchanged.
    pub fn open(method: &dyn Method, identifier: Option<&str>) -> Result<Self> {
        let id = method.id();
        let backend = method.open_site(identifier)?;
        let partitions_available = backend.partitions_available();
        debug!(
            method = %id,
            site = identifier.unwrap_or("<default>"),
            partitions = partitions_available,
            "opened site"
        );
        Ok(Self {
            method: id,
            identifier: identifier.map(str::to_string),
            capabilities: method.capabilities(),
            partitions_available,
            backend: Some(backend),
        })
    }

    /// Method the site belongs to.
    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Site identifier, `None` for the default site.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Capabilities of the site's method.
    pub fn capabilities(&self) -> &MethodCapabilities {
        &self.capabilities
    }

    /// Number of partitions in the site.
    pub fn partitions_available(&self) -> usize {
        self.partitions_available
    }

    fn backend(&self) -> Result<&dyn SiteBackend> {
        self.backend
            .as_deref()
            .ok_or_else(|| ErrorCode::StateUnknown.into())
    }

    /// Restores every CRTC of the site to system settings.
    pub fn restore(&self) -> Result<()> {
        if !self.capabilities.site_restore {
            return Err(Error::not_supported());
        }
        debug!(method = %self.method, "restoring site");
        self.backend()?.restore()
    }

    /// Opens partition `index`.
    pub fn partition(&self, index: usize) -> Result<Partition<'_>> {
        if index >= self.partitions_available {
            return Err(ErrorCode::NoSuchPartition.into());
        }
        let backend = self.backend()?.open_partition(index)?;
        let crtcs_available = backend.crtcs_available();
        debug!(method = %self.method, partition = index, crtcs = crtcs_available, "opened partition");
        Ok(Partition {
            site: self,
            index,
            crtcs_available,
            backend: Some(backend),
        })
    }

    /// Closes the site and releases the backend connection.
    pub fn close(mut self) -> Result<()> {
        debug!(method = %self.method, "closing site");
        match self.backend.take() {
            Some(backend) => backend.close(),
            None => Ok(()),
        }
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        if let Some(backend) = self.backend.take() {
            if let Err(err) = backend.close() {
                warn!(method = %self.method, error = %err, "failed to close site");
            }
        }
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("method", &self.method)
            .field("identifier", &self.identifier)
            .field("partitions_available", &self.partitions_available)
            .finish_non_exhaustive()
    }
}

/// A subdivision of a site: an X screen or a graphics card.
pub struct Partition<'s> {
    site: &'s Site,
    index: usize,
    crtcs_available: usize,
    backend: Option<Box<dyn PartitionBackend>>,
}

impl<'s> Partition<'s> {
    /// Site the partition belongs to.
    pub fn site(&self) -> &'s Site {
        self.site
    }

    /// Index within the site.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of CRTCs in the partition.
    pub fn crtcs_available(&self) -> usize {
        self.crtcs_available
    }

    fn backend(&self) -> Result<&dyn PartitionBackend> {
        self.backend
            .as_deref()
            .ok_or_else(|| ErrorCode::StateUnknown.into())
    }

    /// Restores every CRTC of the partition to system settings.
    pub fn restore(&self) -> Result<()> {
        if !self.site.capabilities.partition_restore {
            return Err(Error::not_supported());
        }
        debug!(partition = self.index, "restoring partition");
        self.backend()?.restore()
    }

    /// Opens CRTC `index`.
    pub fn crtc(&self, index: usize) -> Result<Crtc<'_>> {
        if index >= self.crtcs_available {
            return Err(ErrorCode::NoSuchCrtc.into());
        }
        let backend = self.backend()?.open_crtc(index)?;
        debug!(partition = self.index, crtc = index, depth = %backend.native_depth(), "opened CRTC");
        Ok(Crtc {
            partition: self,
            index,
            backend: Some(backend),
        })
    }

    /// Closes the partition.
    pub fn close(mut self) -> Result<()> {
        debug!(partition = self.index, "closing partition");
        match self.backend.take() {
            Some(backend) => backend.close(),
            None => Ok(()),
        }
    }
}

impl Drop for Partition<'_> {
    fn drop(&mut self) {
        if let Some(backend) = self.backend.take() {
            if let Err(err) = backend.close() {
                warn!(partition = self.index, error = %err, "failed to close partition");
            }
        }
    }
}

impl std::fmt::Debug for Partition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("method", &self.site.method)
            .field("index", &self.index)
            .field("crtcs_available", &self.crtcs_available)
            .finish_non_exhaustive()
    }
}

/// One gamma-ramp-controllable output unit.
pub struct Crtc<'p> {
    partition: &'p Partition<'p>,
    index: usize,
    backend: Option<Box<dyn CrtcBackend>>,
}

impl<'p> Crtc<'p> {
    /// Partition the CRTC belongs to.
    pub fn partition(&self) -> &'p Partition<'p> {
        self.partition
    }

    /// Index within the partition.
    pub fn index(&self) -> usize {
        self.index
    }

    fn capabilities(&self) -> &MethodCapabilities {
        &self.partition.site.capabilities
    }

    fn backend(&mut self) -> Result<&mut (dyn CrtcBackend + 'static)> {
        self.backend
            .as_deref_mut()
            .ok_or_else(|| ErrorCode::StateUnknown.into())
    }

    /// Depth the backend works in.
    pub fn native_depth(&self) -> Depth {
        self.backend
            .as_deref()
            .map_or(Depth::default(), |backend| backend.native_depth())
    }

    /// Restores the CRTC's ramps to system settings.
    pub fn restore(&mut self) -> Result<()> {
        if !self.capabilities().crtc_restore {
            return Err(Error::not_supported());
        }
        debug!(crtc = self.index, "restoring CRTC");
        self.backend()?.restore()
    }

    /// Reads the current ramps into `ramps`, at the depth of `ramps`.
    ///
    /// The channel sizes of `ramps` must match the CRTC's ramp sizes.
    pub fn get_ramps(&mut self, ramps: &mut Ramps) -> Result<()> {
        let native = self.native_depth();
        let backend = self.backend()?;
        if ramps.depth() == native {
            return backend.get_ramps(ramps);
        }
        trace!(from = %native, to = %ramps.depth(), "bridging ramp read");
        let mut buffer = Ramps::new(native, ramps.sizes())?;
        backend.get_ramps(&mut buffer)?;
        translate(&buffer, ramps)
    }

    /// Applies `ramps`, which may be at any depth.
    pub fn set_ramps(&mut self, ramps: &Ramps) -> Result<()> {
        let native = self.native_depth();
        let backend = self.backend()?;
        if ramps.depth() == native {
            return backend.set_ramps(ramps);
        }
        trace!(from = %ramps.depth(), to = %native, "bridging ramp write");
        let buffer = ramps.convert(native)?;
        backend.set_ramps(&buffer)
    }

    /// Ramp sizes reported by the backend.
    pub fn ramp_sizes(&mut self) -> Result<RampSizes> {
        let info = self.information(FieldMask::GAMMA_SIZE);
        match info.gamma_size.as_result() {
            Some(Ok(sizes)) => Ok(*sizes),
            Some(Err(err)) => Err(err.clone()),
            None => Err(ErrorCode::GammaRampsSizeQueryFailed.into()),
        }
    }

    /// Allocates ramps of `depth` at the CRTC's size and reads them.
    pub fn read_ramps(&mut self, depth: Depth) -> Result<Ramps> {
        let mut ramps = Ramps::new(depth, self.ramp_sizes()?)?;
        self.get_ramps(&mut ramps)?;
        Ok(ramps)
    }

    /// Builds ramps from one curve per channel and applies them.
    ///
    /// Each curve maps [0, 1] to [0, 1]. The ramps are built at the native
    /// depth and the CRTC's reported sizes.
    pub fn set_ramps_with(
        &mut self,
        red: &dyn Fn(f64) -> f64,
        green: &dyn Fn(f64) -> f64,
        blue: &dyn Fn(f64) -> f64,
    ) -> Result<()> {
        let mut ramps = Ramps::new(self.native_depth(), self.ramp_sizes()?)?;
        ramps.fill_with(red, green, blue);
        self.set_ramps(&ramps)
    }

    /// Queries information fields at the current record version.
    pub fn information(&mut self, fields: FieldMask) -> CrtcInformation {
        self.information_versioned(fields, CRTC_INFORMATION_VERSION)
    }

    /// Queries information fields for a caller built against record `version`.
    ///
    /// Fields introduced after `version` are never filled. Fields the
    /// method cannot supply are marked not supported without asking the
    /// backend. EDID-derived fields are decoded from the EDID the backend
    /// returns. Every requested field ends up with a value or an error;
    /// every other field is empty.
    pub fn information_versioned(&mut self, fields: FieldMask, version: u32) -> CrtcInformation {
        let version = version.clamp(1, CRTC_INFORMATION_VERSION);
        let requested = fields & FieldMask::for_version(version);
        let dropped = fields & !FieldMask::for_version(version);
        if !dropped.is_empty() {
            warn!(crtc = self.index, version, %dropped, "ignoring fields newer than the record version");
        }
        let routing = self.capabilities().route(requested);
        trace!(
            crtc = self.index,
            %requested,
            backend = %routing.backend,
            unsupported = %routing.unsupported,
            "routing information request"
        );

        let mut info = match (routing.needs_backend(), self.backend()) {
            (true, Ok(backend)) => backend.information(routing.backend),
            (true, Err(err)) => {
                let mut info = CrtcInformation::new();
                info.fail(routing.backend | routing.from_edid, &err);
                info
            }
            (false, _) => CrtcInformation::new(),
        };
        info.struct_version = version;
        info.mark_unsupported(routing.unsupported);

        if !routing.from_edid.is_empty() {
            let targets = routing.from_edid | (requested & FieldMask::EDID);
            match info.edid.value().cloned() {
                Some(bytes) => {
                    gamma_edid::apply_edid_fields(&bytes, targets, &mut info);
                }
                None => {
                    let err = info
                        .edid
                        .error()
                        .cloned()
                        .unwrap_or_else(|| ErrorCode::EdidNotFound.into());
                    info.fail(routing.from_edid, &err);
                }
            }
        }

        info.retain(requested);
        info
    }

    /// Closes the CRTC.
    pub fn close(mut self) -> Result<()> {
        debug!(crtc = self.index, "closing CRTC");
        match self.backend.take() {
            Some(backend) => backend.close(),
            None => Ok(()),
        }
    }
}

impl Drop for Crtc<'_> {
    fn drop(&mut self) {
        if let Some(backend) = self.backend.take() {
            if let Err(err) = backend.close() {
                warn!(crtc = self.index, error = %err, "failed to close CRTC");
            }
        }
    }
}

impl std::fmt::Debug for Crtc<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crtc")
            .field("partition", &self.partition.index)
            .field("index", &self.index)
            .field("native_depth", &self.native_depth())
            .finish_non_exhaustive()
    }
}
