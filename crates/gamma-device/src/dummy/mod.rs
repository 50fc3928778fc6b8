//! Simulated display stack.
//!
//! The dummy method implements the backend contract entirely in memory. Each
//! opened site owns its own state: every CRTC starts with linear ramps at the
//! configured native depth, writes persist until the site is closed (also
//! across reopening a CRTC), and restore at any level resets the affected
//! CRTCs to linear ramps.
//!
//! ```rust
//! use gamma_core::{Depth, FieldMask, Ramps, RampSizes};
//! use gamma_device::dummy::DummyMethod;
//! use gamma_device::Site;
//!
//! let method = DummyMethod::default();
//! let site = Site::open(&method, None).unwrap();
//! let partition = site.partition(0).unwrap();
//! let mut crtc = partition.crtc(1).unwrap();
//!
//! let mut ramps = Ramps::new(Depth::U16, RampSizes::new(1024, 2048, 512)).unwrap();
//! crtc.get_ramps(&mut ramps).unwrap();
//! if let Ramps::U16(buf) = &ramps {
//!     assert_eq!(buf.blue()[511], u16::MAX);
//! }
//!
//! let info = crtc.information(FieldMask::CONNECTOR_NAME);
//! assert_eq!(info.connector_name.value().map(String::as_str), Some("DUMMY-0-1"));
//! ```

mod config;

pub use config::{ConfigError, ConfigResult, CrtcTemplate, DummyConfig, CONFIG_ENV};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gamma_core::{
    CrtcInformation, Depth, ErrorCode, Field, FieldMask, GammaSupport, MethodCapabilities, Ramps,
    Result,
};
use tracing::{debug, trace};

use crate::backend::{CrtcBackend, Method, PartitionBackend, SiteBackend};
use crate::MethodId;

/// The simulated adjustment method.
#[derive(Debug, Clone, Default)]
pub struct DummyMethod {
    config: Arc<DummyConfig>,
}

impl DummyMethod {
    /// Creates the method from a validated configuration.
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }
}

impl Method for DummyMethod {
    fn id(&self) -> MethodId {
        MethodId::Dummy
    }

    fn capabilities(&self) -> MethodCapabilities {
        let c = &self.config;
        MethodCapabilities {
            fields: c.fields,
            default_site_known: true,
            multiple_sites: c.sites > 1,
            multiple_partitions: c.partitions > 1,
            multiple_crtcs: c.crtcs > 1,
            partitions_are_graphics_cards: true,
            site_restore: c.site_restore,
            partition_restore: c.partition_restore,
            crtc_restore: c.crtc_restore,
            identical_gamma_sizes: c.sizes.is_uniform(),
            fixed_gamma_size: true,
            fixed_gamma_depth: true,
            real: c.real,
            fake: c.fake,
            auto_restore: c.auto_restore,
            ..Default::default()
        }
    }

    fn open_site(&self, identifier: Option<&str>) -> Result<Box<dyn SiteBackend>> {
        let index = match identifier {
            None => 0,
            Some(id) => id
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|i| *i < self.config.sites)
                .ok_or(ErrorCode::NoSuchSite)?,
        };
        if index >= self.config.sites {
            return Err(ErrorCode::NoSuchSite.into());
        }
        debug!(site = index, "opening dummy site");

        let linear = Ramps::linear(self.config.depth, self.config.sizes)?;
        let partitions = (0..self.config.partitions)
            .map(|_| vec![linear.clone(); self.config.crtcs])
            .collect();
        let edid = match (&self.config.crtc.edid, self.config.crtc.no_edid) {
            (_, true) => None,
            (Some(bytes), false) => Some(bytes.clone()),
            (None, false) => Some(synthesize_edid(&self.config)),
        };

        Ok(Box::new(DummySite {
            shared: Arc::new(Shared {
                config: Arc::clone(&self.config),
                linear,
                edid,
                ramps: Mutex::new(partitions),
            }),
        }))
    }
}

/// State of one open site, shared by its partitions and CRTCs.
struct Shared {
    config: Arc<DummyConfig>,
    linear: Ramps,
    edid: Option<Vec<u8>>,
    /// Current ramps, indexed by partition then CRTC.
    ramps: Mutex<Vec<Vec<Ramps>>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Vec<Vec<Ramps>>> {
        self.ramps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset(&self, partition: Option<usize>, crtc: Option<usize>) {
        let mut ramps = self.lock();
        for (p, crtcs) in ramps.iter_mut().enumerate() {
            if partition.is_some_and(|want| want != p) {
                continue;
            }
            for (c, slot) in crtcs.iter_mut().enumerate() {
                if crtc.is_none_or(|want| want == c) {
                    slot.clone_from(&self.linear);
                }
            }
        }
    }
}

struct DummySite {
    shared: Arc<Shared>,
}

impl SiteBackend for DummySite {
    fn partitions_available(&self) -> usize {
        self.shared.config.partitions
    }

    fn restore(&self) -> Result<()> {
        self.shared.reset(None, None);
        Ok(())
    }

    fn open_partition(&self, index: usize) -> Result<Box<dyn PartitionBackend>> {
        if index >= self.shared.config.partitions {
            return Err(ErrorCode::NoSuchPartition.into());
        }
        Ok(Box::new(DummyPartition {
            shared: Arc::clone(&self.shared),
            index,
        }))
    }
}

struct DummyPartition {
    shared: Arc<Shared>,
    index: usize,
}

impl PartitionBackend for DummyPartition {
    fn crtcs_available(&self) -> usize {
        self.shared.config.crtcs
    }

    fn restore(&self) -> Result<()> {
        self.shared.reset(Some(self.index), None);
        Ok(())
    }

    fn open_crtc(&self, index: usize) -> Result<Box<dyn CrtcBackend>> {
        if index >= self.shared.config.crtcs {
            return Err(ErrorCode::NoSuchCrtc.into());
        }
        Ok(Box::new(DummyCrtc {
            shared: Arc::clone(&self.shared),
            partition: self.index,
            index,
        }))
    }
}

struct DummyCrtc {
    shared: Arc<Shared>,
    partition: usize,
    index: usize,
}

impl DummyCrtc {
    fn connector_name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.shared.config.crtc.connector, self.partition, self.index
        )
    }
}

impl CrtcBackend for DummyCrtc {
    fn native_depth(&self) -> Depth {
        self.shared.config.depth
    }

    fn restore(&mut self) -> Result<()> {
        self.shared.reset(Some(self.partition), Some(self.index));
        Ok(())
    }

    fn get_ramps(&mut self, ramps: &mut Ramps) -> Result<()> {
        ramps.check_sizes(self.shared.config.sizes)?;
        let state = self.shared.lock();
        ramps.clone_from(&state[self.partition][self.index]);
        Ok(())
    }

    fn set_ramps(&mut self, ramps: &Ramps) -> Result<()> {
        ramps.check_sizes(self.shared.config.sizes)?;
        if self.shared.config.crtc.gamma_support == GammaSupport::No {
            return Err(ErrorCode::GammaRampWriteFailed.into());
        }
        trace!(partition = self.partition, crtc = self.index, "storing ramps");
        let mut state = self.shared.lock();
        state[self.partition][self.index].clone_from(ramps);
        Ok(())
    }

    fn information(&mut self, fields: FieldMask) -> CrtcInformation {
        let config = &self.shared.config;
        let template = &config.crtc;
        let mut info = CrtcInformation::new();

        for field in fields.iter() {
            if field == FieldMask::ACTIVE {
                info.active = Field::ok(template.active);
            } else if !template.active && FieldMask::MACRO_ACTIVE.contains(field) {
                info.fail(field, &ErrorCode::NotConnected.into());
            } else if field == FieldMask::EDID {
                info.edid = match &self.shared.edid {
                    Some(bytes) => Field::ok(bytes.clone()),
                    None => Field::err(ErrorCode::EdidNotFound),
                };
            } else if field == FieldMask::WIDTH_MM {
                info.width_mm = Field::ok(template.width_mm);
            } else if field == FieldMask::HEIGHT_MM {
                info.height_mm = Field::ok(template.height_mm);
            } else if field == FieldMask::GAMMA_SIZE {
                info.gamma_size = Field::ok(config.sizes);
            } else if field == FieldMask::GAMMA_DEPTH {
                info.gamma_depth = Field::ok(config.depth);
            } else if field == FieldMask::GAMMA_SUPPORT {
                info.gamma_support = Field::ok(template.gamma_support);
            } else if field == FieldMask::SUBPIXEL_ORDER {
                info.subpixel_order = Field::ok(template.subpixel_order);
            } else if field == FieldMask::CONNECTOR_NAME {
                info.connector_name = Field::ok(self.connector_name());
            } else if field == FieldMask::CONNECTOR_TYPE {
                info.connector_type = Field::ok(template.connector_type);
            }
        }
        info
    }
}

/// Builds a revision 1.4 EDID for the configured viewport: sRGB primaries,
/// D65 white, gamma 2.2, the connector prefix as monitor name.
fn synthesize_edid(config: &DummyConfig) -> Vec<u8> {
    const COORDS: [f32; 8] = [0.640, 0.330, 0.300, 0.600, 0.150, 0.060, 0.3127, 0.3290];

    let mut block = [0u8; gamma_edid::BLOCK_LEN];
    block[..8].copy_from_slice(&gamma_edid::HEADER);
    block[18] = 1;
    block[19] = 4;
    block[20] = 0x80;
    block[21] = (config.crtc.width_mm / 10).min(255) as u8;
    block[22] = (config.crtc.height_mm / 10).min(255) as u8;
    block[23] = 120;
    for (i, v) in COORDS.iter().enumerate() {
        let c = (v * 1024.0).round() as u16;
        block[27 + i] = (c >> 2) as u8;
        block[25 + i / 4] |= ((c & 0b11) as u8) << (6 - 2 * (i % 4));
    }

    let name = &mut block[54..72];
    name[3] = 0xFC;
    let text = config.crtc.connector.as_bytes();
    let n = text.len().min(13);
    name[5..5 + n].copy_from_slice(&text[..n]);
    if n < 13 {
        name[5 + n] = 0x0A;
        name[6 + n..].fill(b' ');
    }

    block[127] = gamma_edid::checksum_byte(&block);
    block.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamma_edid::Edid;

    #[test]
    fn test_capabilities_default() {
        let caps = DummyMethod::default().capabilities();
        assert_eq!(caps.fields, FieldMask::ALL);
        assert!(caps.real && caps.fake);
        assert!(caps.site_restore && caps.partition_restore && caps.crtc_restore);
        assert!(caps.multiple_partitions && caps.multiple_crtcs);
        assert!(!caps.multiple_sites);
        assert!(!caps.identical_gamma_sizes);
    }

    #[test]
    fn test_site_identifiers() {
        let method = DummyMethod::new(DummyConfig {
            sites: 2,
            ..Default::default()
        });
        assert!(method.open_site(None).is_ok());
        assert!(method.open_site(Some("1")).is_ok());
        for bad in ["2", "x", ""] {
            let err = method.open_site(Some(bad)).err().map(|e| e.code());
            assert_eq!(err, Some(ErrorCode::NoSuchSite.value()), "{bad:?}");
        }
    }

    #[test]
    fn test_synthesized_edid_parses() {
        let config = DummyConfig::default();
        let edid = Edid::parse(&synthesize_edid(&config)).unwrap();
        assert!(edid.checksum_ok);
        assert_eq!(edid.width_mm, 600);
        assert_eq!(edid.height_mm, 340);
        assert_eq!(edid.monitor_name.as_deref(), Some("DUMMY"));
        assert!((edid.gamma.unwrap() - 2.2).abs() < 1e-6);
    }

    #[test]
    fn test_inactive_crtc() {
        let mut config = DummyConfig::default();
        config.crtc.active = false;
        let method = DummyMethod::new(config);
        let site = method.open_site(None).unwrap();
        let partition = site.open_partition(0).unwrap();
        let mut crtc = partition.open_crtc(0).unwrap();
        let info = crtc.information(FieldMask::ACTIVE | FieldMask::EDID | FieldMask::GAMMA_SIZE);
        assert_eq!(info.active.value(), Some(&false));
        assert_eq!(info.edid.code(), ErrorCode::NotConnected.value());
        assert!(info.gamma_size.value().is_some());
    }
}
