//! CRTC information command.
//!
//! Prints one line per requested field: the value, the error, or both when
//! a value was decoded from an EDID whose checksum does not match.

use crate::InfoArgs;
use anyhow::{Context, Result};
use gamma_core::{
    Chromaticity, CrtcInformation, Field, FieldMask, CRTC_INFORMATION_VERSION,
};
use gamma_device::MethodRegistry;

/// Queries and prints information about one CRTC.
pub fn run(args: InfoArgs, registry: &MethodRegistry, verbose: bool) -> Result<()> {
    let fields: FieldMask = args
        .fields
        .parse()
        .with_context(|| format!("Invalid field list '{}'", args.fields))?;
    let version = args.layout_version.unwrap_or(CRTC_INFORMATION_VERSION);

    let info = super::with_crtc(registry, &args.target, |crtc| {
        Ok(crtc.information_versioned(fields, version))
    })?;

    println!("crtc {}.{}", args.target.partition, args.target.crtc);
    for field in (fields & FieldMask::for_version(info.struct_version)).iter() {
        if let Some(line) = describe(&info, field, verbose) {
            println!("  {:<15} {}", field.name().unwrap_or("?"), line);
        }
    }

    let failed = info.failures(fields);
    if verbose && !failed.is_empty() {
        println!("  failed: {}", failed);
    }
    Ok(())
}

fn chroma(c: &Chromaticity) -> String {
    format!("({:.4}, {:.4})", c.x, c.y)
}

/// Formats one field, `None` when it is empty.
fn describe(info: &CrtcInformation, field: FieldMask, verbose: bool) -> Option<String> {
    fn show<T>(field: &Field<T>, fmt: impl Fn(&T) -> String) -> Option<String> {
        match (field.value(), field.error()) {
            (Some(v), None) => Some(fmt(v)),
            (Some(v), Some(e)) => Some(format!("{} [{}]", fmt(v), e)),
            (None, Some(e)) => Some(format!("error {}: {}", e.code(), e)),
            (None, None) => None,
        }
    }

    let mm = |v: &u32| format!("{} mm", v);
    match field {
        f if f == FieldMask::EDID => show(&info.edid, |bytes| {
            if verbose {
                let lines = super::hex_lines(bytes, 16);
                format!("{} bytes\n    {}", bytes.len(), lines.join("\n    "))
            } else {
                format!("{} bytes", bytes.len())
            }
        }),
        f if f == FieldMask::WIDTH_MM => show(&info.width_mm, mm),
        f if f == FieldMask::HEIGHT_MM => show(&info.height_mm, mm),
        f if f == FieldMask::WIDTH_MM_EDID => show(&info.width_mm_edid, mm),
        f if f == FieldMask::HEIGHT_MM_EDID => show(&info.height_mm_edid, mm),
        f if f == FieldMask::GAMMA_SIZE => show(&info.gamma_size, |s| s.to_string()),
        f if f == FieldMask::GAMMA_DEPTH => show(&info.gamma_depth, |d| d.to_string()),
        f if f == FieldMask::GAMMA_SUPPORT => show(&info.gamma_support, |s| s.name().to_string()),
        f if f == FieldMask::SUBPIXEL_ORDER => show(&info.subpixel_order, |s| s.to_string()),
        f if f == FieldMask::ACTIVE => show(&info.active, |a| super::yes_no(*a).to_string()),
        f if f == FieldMask::CONNECTOR_NAME => show(&info.connector_name, |n| n.clone()),
        f if f == FieldMask::CONNECTOR_TYPE => show(&info.connector_type, |t| t.to_string()),
        f if f == FieldMask::GAMMA => show(&info.gamma, |g| {
            format!("{:.2} {:.2} {:.2}", g.red, g.green, g.blue)
        }),
        f if f == FieldMask::CHROMA => show(&info.chroma, |p| {
            format!("R {} G {} B {}", chroma(&p.red), chroma(&p.green), chroma(&p.blue))
        }),
        f if f == FieldMask::WHITE_POINT => show(&info.white_point, chroma),
        _ => None,
    }
}
