//! Requests that name fields a record cannot hold are logged, not silently trimmed.

use std::io;
use std::sync::{Arc, Mutex};

use gamma_core::FieldMask;
use gamma_device::Site;
use gamma_device::dummy::DummyMethod;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_warnings(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_max_level(Level::WARN)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    captured.text()
}

#[test]
fn test_unknown_mask_bits_warn() {
    let logs = capture_warnings(|| {
        let mask = FieldMask::from_bits_truncate((1 << 20) | FieldMask::ACTIVE.bits());
        assert_eq!(mask, FieldMask::ACTIVE);
    });
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("unknown field mask bits"), "{logs}");
    assert!(logs.contains("0x100000"), "{logs}");
}

#[test]
fn test_known_mask_bits_quiet() {
    let logs = capture_warnings(|| {
        FieldMask::from_bits_truncate(FieldMask::ALL.bits());
    });
    assert!(logs.is_empty(), "{logs}");
}

#[test]
fn test_fields_newer_than_version_warn() {
    let method = DummyMethod::default();
    let site = Site::open(&method, None).unwrap();
    let partition = site.partition(0).unwrap();
    let mut crtc = partition.crtc(0).unwrap();

    let logs = capture_warnings(|| {
        let info = crtc.information_versioned(FieldMask::CHROMA | FieldMask::GAMMA, 1);
        assert!(info.chroma.is_empty());
        assert!(info.gamma.value().is_some());
    });
    assert!(logs.contains("ignoring fields newer than the record version"), "{logs}");
    assert!(logs.contains("CHROMA"), "{logs}");

    let logs = capture_warnings(|| {
        crtc.information_versioned(FieldMask::CHROMA | FieldMask::GAMMA, 2);
    });
    assert!(logs.is_empty(), "{logs}");
}
