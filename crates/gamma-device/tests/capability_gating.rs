//! Capability gating and depth bridging against an instrumented backend.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gamma_core::{
    CrtcInformation, Depth, ErrorCode, Field, FieldMask, MethodCapabilities, RampBuffer, RampSizes,
    Ramps, Result,
};
use gamma_device::{
    CrtcBackend, Method, MethodId, MethodRegistry, PartitionBackend, Site, SiteBackend,
};

const SIZES: RampSizes = RampSizes::uniform(4);

/// Records every call that reaches the backend.
#[derive(Default)]
struct Calls {
    information: AtomicUsize,
    last_mask: AtomicU32,
    restore: AtomicUsize,
    closed: AtomicUsize,
    written: Mutex<Option<Ramps>>,
}

struct Instrumented {
    fields: FieldMask,
    depth: Depth,
    calls: Arc<Calls>,
}

impl Method for Instrumented {
    fn id(&self) -> MethodId {
        MethodId::QuartzCg
    }

    fn capabilities(&self) -> MethodCapabilities {
        MethodCapabilities {
            fields: self.fields,
            default_site_known: true,
            real: true,
            ..Default::default()
        }
    }

    fn open_site(&self, identifier: Option<&str>) -> Result<Box<dyn SiteBackend>> {
        if identifier.is_some() {
            return Err(ErrorCode::OpenSiteFailed.into());
        }
        Ok(Box::new(InstrumentedNode {
            depth: self.depth,
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct InstrumentedNode {
    depth: Depth,
    calls: Arc<Calls>,
}

impl InstrumentedNode {
    fn child(&self) -> Box<InstrumentedNode> {
        Box::new(InstrumentedNode {
            depth: self.depth,
            calls: Arc::clone(&self.calls),
        })
    }
}

impl SiteBackend for InstrumentedNode {
    fn partitions_available(&self) -> usize {
        1
    }

    fn restore(&self) -> Result<()> {
        self.calls.restore.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_partition(&self, _index: usize) -> Result<Box<dyn PartitionBackend>> {
        Ok(self.child())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.calls.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl PartitionBackend for InstrumentedNode {
    fn crtcs_available(&self) -> usize {
        1
    }

    fn restore(&self) -> Result<()> {
        self.calls.restore.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_crtc(&self, _index: usize) -> Result<Box<dyn CrtcBackend>> {
        Ok(self.child())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.calls.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl CrtcBackend for InstrumentedNode {
    fn native_depth(&self) -> Depth {
        self.depth
    }

    fn restore(&mut self) -> Result<()> {
        self.calls.restore.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get_ramps(&mut self, ramps: &mut Ramps) -> Result<()> {
        assert_eq!(ramps.depth(), self.depth);
        ramps.fill_linear();
        Ok(())
    }

    fn set_ramps(&mut self, ramps: &Ramps) -> Result<()> {
        assert_eq!(ramps.depth(), self.depth);
        *self.calls.written.lock().unwrap() = Some(ramps.clone());
        Ok(())
    }

    fn information(&mut self, fields: FieldMask) -> CrtcInformation {
        self.calls.information.fetch_add(1, Ordering::SeqCst);
        self.calls.last_mask.store(fields.bits(), Ordering::SeqCst);
        let mut info = CrtcInformation::new();
        for field in fields.iter() {
            if field == FieldMask::ACTIVE {
                info.active = Field::ok(true);
            } else if field == FieldMask::GAMMA_SIZE {
                info.gamma_size = Field::ok(SIZES);
            } else {
                info.fail(field, &ErrorCode::StateUnknown.into());
            }
        }
        info
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.calls.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn instrumented(fields: FieldMask, depth: Depth) -> (Instrumented, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let method = Instrumented {
        fields,
        depth,
        calls: Arc::clone(&calls),
    };
    (method, calls)
}

#[test]
fn test_unsupported_fields_skip_backend() {
    let (method, calls) = instrumented(FieldMask::ACTIVE, Depth::U16);
    let site = Site::open(&method, None).unwrap();
    let partition = site.partition(0).unwrap();
    let mut crtc = partition.crtc(0).unwrap();

    let info = crtc.information(FieldMask::CONNECTOR_NAME | FieldMask::MACRO_EDID);
    assert_eq!(calls.information.load(Ordering::SeqCst), 0);
    assert!(info.connector_name.error().is_some_and(|e| e.is_not_supported()));
    for field in FieldMask::MACRO_EDID.iter() {
        assert_eq!(info.code_of(field), ErrorCode::CrtcInfoNotSupported.value(), "{field}");
    }
}

#[test]
fn test_backend_sees_supported_fields_only() {
    let (method, calls) = instrumented(FieldMask::ACTIVE | FieldMask::GAMMA_SIZE, Depth::U16);
    let site = Site::open(&method, None).unwrap();
    let partition = site.partition(0).unwrap();
    let mut crtc = partition.crtc(0).unwrap();

    let requested = FieldMask::ACTIVE | FieldMask::SUBPIXEL_ORDER;
    let info = crtc.information(requested);
    assert_eq!(calls.information.load(Ordering::SeqCst), 1);
    assert_eq!(calls.last_mask.load(Ordering::SeqCst), FieldMask::ACTIVE.bits());
    assert_eq!(info.failures(requested), FieldMask::SUBPIXEL_ORDER);
    assert!(info.gamma_size.is_empty());
}

#[test]
fn test_backend_failure_distinct_from_unsupported() {
    let fields = FieldMask::ACTIVE | FieldMask::CONNECTOR_TYPE;
    let (method, _calls) = instrumented(fields, Depth::U16);
    let site = Site::open(&method, None).unwrap();
    let partition = site.partition(0).unwrap();
    let mut crtc = partition.crtc(0).unwrap();

    let info = crtc.information(fields | FieldMask::GAMMA_DEPTH);
    let connector = info.connector_type.error().unwrap();
    assert!(!connector.is_not_supported());
    assert_eq!(connector.library_code(), Some(ErrorCode::StateUnknown));
    assert!(info.gamma_depth.error().unwrap().is_not_supported());
}

#[test]
fn test_restore_gated_without_backend_call() {
    let (method, calls) = instrumented(FieldMask::NONE, Depth::U16);
    let site = Site::open(&method, None).unwrap();
    let partition = site.partition(0).unwrap();
    let mut crtc = partition.crtc(0).unwrap();

    assert!(site.restore().unwrap_err().is_not_supported());
    assert!(partition.restore().unwrap_err().is_not_supported());
    assert!(crtc.restore().unwrap_err().is_not_supported());
    assert_eq!(calls.restore.load(Ordering::SeqCst), 0);
}

#[test]
fn test_bridging_reaches_native_depth() {
    let (method, calls) = instrumented(FieldMask::GAMMA_SIZE, Depth::U8);
    let site = Site::open(&method, None).unwrap();
    let partition = site.partition(0).unwrap();
    let mut crtc = partition.crtc(0).unwrap();

    let mut caller = Ramps::new(Depth::U16, SIZES).unwrap();
    crtc.get_ramps(&mut caller).unwrap();
    let Ramps::U16(buf) = &caller else {
        panic!("expected 16-bit ramps");
    };
    assert_eq!(buf.red(), &[0, 0x5555, 0xAAAA, 0xFFFF]);

    let buf = RampBuffer::<u16>::from_channels(&[0, 0x5555, 0xAAAA, 0xFFFF], &[0xFFFF; 4], &[0; 4])
        .unwrap();
    crtc.set_ramps(&Ramps::from(buf)).unwrap();
    let written = calls.written.lock().unwrap().clone().unwrap();
    let Ramps::U8(buf) = written else {
        panic!("expected 8-bit ramps");
    };
    assert_eq!(buf.red(), &[0, 0x55, 0xAA, 0xFF]);
    assert_eq!(buf.green(), &[0xFF; 4]);
    assert_eq!(buf.blue(), &[0; 4]);
}

#[test]
fn test_handles_close_once() {
    let (method, calls) = instrumented(FieldMask::NONE, Depth::U16);
    {
        let site = Site::open(&method, None).unwrap();
        let partition = site.partition(0).unwrap();
        let crtc = partition.crtc(0).unwrap();
        crtc.close().unwrap();
        partition.close().unwrap();
        site.close().unwrap();
    }
    assert_eq!(calls.closed.load(Ordering::SeqCst), 3);

    {
        let site = Site::open(&method, None).unwrap();
        let partition = site.partition(0).unwrap();
        let _crtc = partition.crtc(0).unwrap();
    }
    assert_eq!(calls.closed.load(Ordering::SeqCst), 6);
}

#[test]
fn test_registered_method() {
    let (method, _calls) = instrumented(FieldMask::ALL, Depth::F32);
    let mut registry = MethodRegistry::new();
    registry.register(Arc::new(method));
    assert!(registry.open_site(MethodId::QuartzCg, None).is_ok());
    let err = registry.open_site(MethodId::QuartzCg, Some("remote")).unwrap_err();
    assert_eq!(err.library_code(), Some(ErrorCode::OpenSiteFailed));
    assert!(registry.open_site(MethodId::W32Gdi, None).is_err());
}
