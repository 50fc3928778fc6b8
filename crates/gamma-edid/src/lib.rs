//! # gamma-edid
//!
//! Decoding of the 128-byte EDID base block into the monitor fields used by
//! gamma ramp tools.
//!
//! Only the subset a colour tool needs is decoded:
//!
//! - Physical viewport size (whole centimetres, reported in millimetres)
//! - Display gamma, or "not specified"
//! - Red, green, blue and white CIE xy chromaticities (10-bit precision)
//! - Vendor identification: manufacturer ID, product code, serial number
//!   and the monitor name / serial string descriptors
//!
//! [`Edid::parse`] validates length, header and revision, and records the
//! checksum result instead of failing on it. [`apply_edid`] writes the
//! decoded values into a [`CrtcInformation`] record with per-field errors.
//!
//! ## Example
//!
//! ```rust
//! use gamma_edid::Edid;
//!
//! let mut block = [0u8; 128];
//! block[..8].copy_from_slice(&gamma_edid::HEADER);
//! block[18] = 1;
//! block[19] = 3;
//! block[21] = 60;
//! block[22] = 34;
//! block[23] = 0x78;
//! block[127] = gamma_edid::checksum_byte(&block);
//!
//! let edid = Edid::parse(&block).unwrap();
//! assert_eq!(edid.width_mm, 600);
//! assert!(edid.checksum_ok);
//! assert!((edid.gamma.unwrap() - 2.2).abs() < 0.01);
//! ```

#![warn(missing_docs)]

use gamma_core::{
    ChannelGamma, Chromaticity, CrtcInformation, Error, ErrorCode, FieldMask, Primaries, Result,
};
use tracing::trace;

/// Size of the EDID base block.
pub const BLOCK_LEN: usize = 128;

/// Fixed header at the start of every EDID.
pub const HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// Offset of the EDID version byte.
const VERSION: usize = 18;
/// Offset of the EDID revision byte.
const REVISION: usize = 19;
/// Offset of the maximum horizontal image size in cm.
const WIDTH_CM: usize = 21;
/// Offset of the maximum vertical image size in cm.
const HEIGHT_CM: usize = 22;
/// Offset of the display transfer characteristic.
const GAMMA: usize = 23;
/// Gamma byte meaning "defined elsewhere".
const GAMMA_UNSPECIFIED: u8 = 0xFF;
/// Offset of the red/green chromaticity low bits.
const CHROMA_LOW_RG: usize = 25;
/// Offset of the blue/white chromaticity low bits.
const CHROMA_LOW_BW: usize = 26;
/// Offset of the first chromaticity high byte.
const CHROMA_HIGH: usize = 27;
/// First 18-byte descriptor slot.
const DESCRIPTORS: usize = 54;
/// Length of one descriptor.
const DESCRIPTOR_LEN: usize = 18;

/// Decoded subset of an EDID base block.
#[derive(Debug, Clone, PartialEq)]
pub struct Edid {
    /// EDID version, always 1 for accepted blocks.
    pub version: u8,
    /// EDID revision, 1 to 4.
    pub revision: u8,
    /// Three-letter PNP manufacturer ID, when it decodes to letters.
    pub manufacturer: Option<String>,
    /// Manufacturer product code.
    pub product_code: u16,
    /// Numeric serial number, `0` when unused.
    pub serial_number: u32,
    /// Maximum image width in mm, a multiple of 10. `0` when undefined.
    pub width_mm: u32,
    /// Maximum image height in mm, a multiple of 10. `0` when undefined.
    pub height_mm: u32,
    /// Display gamma, `None` when not specified in the base block.
    pub gamma: Option<f32>,
    /// Primary chromaticities.
    pub primaries: Primaries,
    /// White point chromaticity.
    pub white_point: Chromaticity,
    /// Monitor name descriptor (`0xFC`).
    pub monitor_name: Option<String>,
    /// Serial string descriptor (`0xFF`).
    pub serial_text: Option<String>,
    /// Whether the 128 bytes sum to zero modulo 256.
    pub checksum_ok: bool,
}

impl Edid {
    /// Validates and decodes an EDID base block.
    ///
    /// Extension blocks after the first 128 bytes are ignored. A checksum
    /// mismatch is not an error here; it is reported in
    /// [`Edid::checksum_ok`].
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::EdidLengthUnsupported`] for fewer than 128 bytes
    /// - [`ErrorCode::EdidWrongMagicNumber`] for a bad header
    /// - [`ErrorCode::EdidRevisionUnsupported`] unless the version is 1.1 to 1.4
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let block = validate(bytes)?;

        let gamma = match block[GAMMA] {
            GAMMA_UNSPECIFIED => None,
            raw => Some((raw as f32 + 100.0) / 100.0),
        };
        let (primaries, white_point) = chromaticities(block);
        let (monitor_name, serial_text) = descriptor_strings(block);

        let edid = Edid {
            version: block[VERSION],
            revision: block[REVISION],
            manufacturer: manufacturer(block),
            product_code: u16::from_le_bytes([block[10], block[11]]),
            serial_number: u32::from_le_bytes([block[12], block[13], block[14], block[15]]),
            width_mm: block[WIDTH_CM] as u32 * 10,
            height_mm: block[HEIGHT_CM] as u32 * 10,
            gamma,
            primaries,
            white_point,
            monitor_name,
            serial_text,
            checksum_ok: checksum_byte(block) == block[BLOCK_LEN - 1],
        };
        trace!(
            version = edid.version,
            revision = edid.revision,
            width_mm = edid.width_mm,
            height_mm = edid.height_mm,
            gamma = ?edid.gamma,
            checksum_ok = edid.checksum_ok,
            "decoded EDID"
        );
        Ok(edid)
    }

    /// Gamma replicated into the three channels.
    pub fn channel_gamma(&self) -> Option<ChannelGamma> {
        self.gamma.map(|g| ChannelGamma {
            red: g,
            green: g,
            blue: g,
        })
    }
}

fn validate(bytes: &[u8]) -> Result<&[u8; BLOCK_LEN]> {
    let block = bytes
        .first_chunk::<BLOCK_LEN>()
        .ok_or(ErrorCode::EdidLengthUnsupported)?;
    if block[..HEADER.len()] != HEADER {
        return Err(ErrorCode::EdidWrongMagicNumber.into());
    }
    if block[VERSION] != 1 || !(1..=4).contains(&block[REVISION]) {
        return Err(ErrorCode::EdidRevisionUnsupported.into());
    }
    Ok(block)
}

/// Value byte 127 must hold for the first 127 bytes of `block` to checksum.
pub fn checksum_byte(block: &[u8; BLOCK_LEN]) -> u8 {
    let sum = block[..BLOCK_LEN - 1]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    sum.wrapping_neg()
}

fn manufacturer(block: &[u8]) -> Option<String> {
    let id = u16::from_be_bytes([block[8], block[9]]);
    let letters: String = [10u16, 5, 0]
        .iter()
        .map(|shift| (((id >> shift) & 0x1F) as u8 + b'@') as char)
        .collect();
    letters
        .chars()
        .all(|c| c.is_ascii_uppercase())
        .then_some(letters)
}

/// Decodes the eight 10-bit chromaticity coordinates.
fn chromaticities(block: &[u8]) -> (Primaries, Chromaticity) {
    let low = [block[CHROMA_LOW_RG], block[CHROMA_LOW_BW]];
    let coord = |i: usize| -> f32 {
        let high = block[CHROMA_HIGH + i] as u16;
        let shift = 6 - 2 * (i % 4);
        let lo = (low[i / 4] >> shift) as u16 & 0b11;
        ((high << 2) | lo) as f32 / 1024.0
    };
    let point = |i: usize| Chromaticity {
        x: coord(i),
        y: coord(i + 1),
    };
    let primaries = Primaries {
        red: point(0),
        green: point(2),
        blue: point(4),
    };
    (primaries, point(6))
}

/// Monitor name (`0xFC`) and serial string (`0xFF`) descriptors.
fn descriptor_strings(block: &[u8]) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut serial = None;
    for desc in block[DESCRIPTORS..BLOCK_LEN - 2].chunks_exact(DESCRIPTOR_LEN) {
        if desc[0] != 0 || desc[1] != 0 {
            continue;
        }
        let slot = match desc[3] {
            0xFC => &mut name,
            0xFF => &mut serial,
            _ => continue,
        };
        let text = descriptor_text(&desc[5..]);
        if !text.is_empty() {
            *slot = Some(text);
        }
    }
    (name, serial)
}

fn descriptor_text(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .position(|b| *b == 0x0A || *b == 0x00)
        .unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

/// Decodes `bytes` into every EDID-derived field of `info`.
///
/// Shorthand for [`apply_edid_fields`] with [`FieldMask::MACRO_EDID`],
/// minus the EDID bytes themselves.
pub fn apply_edid(bytes: &[u8], info: &mut CrtcInformation) -> i32 {
    apply_edid_fields(bytes, FieldMask::EDID_DERIVED, info)
}

/// Decodes `bytes` into the EDID-derived fields of `info` selected by `fields`.
///
/// If [`FieldMask::EDID`] is in `fields`, only its error is touched: it is
/// flagged on checksum mismatch and its bytes are left as they are. Fields
/// outside `fields` are not touched at all.
///
/// Returns the bitwise OR of every error code written, `0` when clean.
pub fn apply_edid_fields(bytes: &[u8], fields: FieldMask, info: &mut CrtcInformation) -> i32 {
    let derived = fields & FieldMask::EDID_DERIVED;
    let edid = match Edid::parse(bytes) {
        Ok(edid) => edid,
        Err(err) => {
            trace!(error = %err, fields = %derived, "EDID rejected");
            info.fail(derived, &err);
            return if derived.is_empty() { 0 } else { err.code() };
        }
    };

    let checksum = Error::from(ErrorCode::EdidChecksumError);
    let mut codes = 0;
    let mut flag = |code: i32| codes |= code;

    if fields.contains(FieldMask::EDID) && !edid.checksum_ok {
        info.edid.set_error(checksum.clone());
        flag(checksum.code());
    }
    if fields.contains(FieldMask::WIDTH_MM_EDID) {
        info.width_mm_edid.set_value(edid.width_mm);
    }
    if fields.contains(FieldMask::HEIGHT_MM_EDID) {
        info.height_mm_edid.set_value(edid.height_mm);
    }
    if fields.contains(FieldMask::GAMMA) {
        match (edid.channel_gamma(), edid.checksum_ok) {
            (Some(gamma), _) => info.gamma.set_value(gamma),
            (None, true) => {
                info.gamma.fail(ErrorCode::GammaNotSpecified);
                flag(ErrorCode::GammaNotSpecified.value());
            }
            (None, false) => {
                info.gamma.fail(ErrorCode::GammaNotSpecifiedAndEdidChecksumError);
                flag(ErrorCode::GammaNotSpecifiedAndEdidChecksumError.value());
            }
        }
    }
    if fields.contains(FieldMask::CHROMA) {
        info.chroma.set_value(edid.primaries);
    }
    if fields.contains(FieldMask::WHITE_POINT) {
        info.white_point.set_value(edid.white_point);
    }

    if !edid.checksum_ok {
        let flagged = derived
            & (FieldMask::WIDTH_MM_EDID
                | FieldMask::HEIGHT_MM_EDID
                | FieldMask::CHROMA
                | FieldMask::WHITE_POINT);
        info.set_error(flagged, &checksum);
        if !flagged.is_empty() {
            flag(checksum.code());
        }
        if derived.contains(FieldMask::GAMMA) && edid.gamma.is_some() {
            info.gamma.set_error(checksum.clone());
            flag(checksum.code());
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> [u8; 128] {
        let mut b = [0u8; 128];
        b[..8].copy_from_slice(&HEADER);
        b[VERSION] = 1;
        b[REVISION] = 4;
        b[127] = checksum_byte(&b);
        b
    }

    #[test]
    fn test_checksum_byte() {
        let b = block();
        let sum = b.iter().fold(0u8, |acc, x| acc.wrapping_add(*x));
        assert_eq!(sum, 0);
    }

    #[test]
    fn test_checksum_byte_of_extended_edid() {
        let mut long = block().to_vec();
        long.extend_from_slice(&[0x55; 128]);
        let base = long.first_chunk::<BLOCK_LEN>().unwrap();
        assert_eq!(checksum_byte(base), block()[127]);
        assert!(Edid::parse(&long).unwrap().checksum_ok);
    }

    #[test]
    fn test_length() {
        let b = block();
        let err = Edid::parse(&b[..127]).unwrap_err();
        assert_eq!(err.library_code(), Some(ErrorCode::EdidLengthUnsupported));
        // Extension blocks are ignored.
        let mut long = b.to_vec();
        long.extend_from_slice(&[0xAA; 128]);
        assert!(Edid::parse(&long).unwrap().checksum_ok);
    }

    #[test]
    fn test_magic() {
        let mut b = block();
        b[7] = 0xFF;
        let err = Edid::parse(&b).unwrap_err();
        assert_eq!(err.library_code(), Some(ErrorCode::EdidWrongMagicNumber));
    }

    #[test]
    fn test_revisions() {
        for (version, revision, ok) in [(1, 0, false), (1, 1, true), (1, 4, true), (1, 5, false), (2, 0, false)] {
            let mut b = block();
            b[VERSION] = version;
            b[REVISION] = revision;
            assert_eq!(Edid::parse(&b).is_ok(), ok, "{version}.{revision}");
        }
    }

    #[test]
    fn test_manufacturer() {
        let mut b = block();
        // "DEL": D=4, E=5, L=12
        let id: u16 = (4 << 10) | (5 << 5) | 12;
        b[8..10].copy_from_slice(&id.to_be_bytes());
        assert_eq!(Edid::parse(&b).unwrap().manufacturer.as_deref(), Some("DEL"));
        assert_eq!(Edid::parse(&block()).unwrap().manufacturer, None);
    }

    #[test]
    fn test_descriptor_text() {
        let mut b = block();
        let desc = &mut b[DESCRIPTORS..DESCRIPTORS + DESCRIPTOR_LEN];
        desc[3] = 0xFC;
        desc[5..5 + 8].copy_from_slice(b"Panel 1\n");
        let edid = Edid::parse(&b).unwrap();
        assert_eq!(edid.monitor_name.as_deref(), Some("Panel 1"));
        assert_eq!(edid.serial_text, None);
    }

    #[test]
    fn test_chroma_bits() {
        let mut b = block();
        // Red x: high 0xA3, low bits 0b11 -> 655.
        b[CHROMA_HIGH] = 0xA3;
        b[CHROMA_LOW_RG] = 0b1100_0000;
        // White y: high 0x54, low bits 0b01 -> 337.
        b[CHROMA_HIGH + 7] = 0x54;
        b[CHROMA_LOW_BW] = 0b0000_0001;
        let edid = Edid::parse(&b).unwrap();
        assert_eq!(edid.primaries.red.x, 655.0 / 1024.0);
        assert_eq!(edid.primaries.red.y, 0.0);
        assert_eq!(edid.white_point.y, 337.0 / 1024.0);
    }

    #[test]
    fn test_failure_propagates_to_requested_only() {
        let mut info = CrtcInformation::new();
        let code = apply_edid_fields(&[0u8; 10], FieldMask::GAMMA | FieldMask::CHROMA, &mut info);
        assert_eq!(code, ErrorCode::EdidLengthUnsupported.value());
        assert_eq!(info.gamma.code(), -28);
        assert_eq!(info.chroma.code(), -28);
        assert!(info.white_point.is_empty());
        assert!(info.width_mm_edid.is_empty());
    }

    #[test]
    fn test_unspecified_gamma() {
        let mut b = block();
        b[GAMMA] = GAMMA_UNSPECIFIED;
        b[127] = checksum_byte(&b);
        let mut info = CrtcInformation::new();
        let code = apply_edid(&b, &mut info);
        assert_eq!(code, ErrorCode::GammaNotSpecified.value());
        assert_eq!(info.gamma.value(), None);
        assert_eq!(info.width_mm_edid.value(), Some(&0));
    }
}
