//! EDID decoding command.

use crate::EdidArgs;
use anyhow::{Context, Result, bail};
use gamma_core::CrtcInformation;
use gamma_edid::{Edid, apply_edid};
use std::fs;
use std::path::Path;

/// Decodes an EDID base block and prints what it yields.
pub fn run(args: EdidArgs, verbose: bool) -> Result<()> {
    let bytes = load(&args.input)?;
    let edid = Edid::parse(&bytes).context("Failed to decode EDID")?;

    println!("EDID {}.{} ({} bytes)", edid.version, edid.revision, bytes.len());
    println!("  Manufacturer: {}", edid.manufacturer.as_deref().unwrap_or("?"));
    println!("  Product code: {:#06x}", edid.product_code);
    if edid.serial_number != 0 {
        println!("  Serial:       {}", edid.serial_number);
    }
    if let Some(name) = &edid.monitor_name {
        println!("  Name:         {}", name);
    }
    if let Some(serial) = &edid.serial_text {
        println!("  Serial text:  {}", serial);
    }
    println!("  Size:         {} x {} mm", edid.width_mm, edid.height_mm);
    match edid.gamma {
        Some(gamma) => println!("  Gamma:        {:.2}", gamma),
        None => println!("  Gamma:        not specified"),
    }
    let p = &edid.primaries;
    println!(
        "  Primaries:    R ({:.4}, {:.4}) G ({:.4}, {:.4}) B ({:.4}, {:.4})",
        p.red.x, p.red.y, p.green.x, p.green.y, p.blue.x, p.blue.y
    );
    println!("  White point:  ({:.4}, {:.4})", edid.white_point.x, edid.white_point.y);
    println!("  Checksum:     {}", if edid.checksum_ok { "ok" } else { "MISMATCH" });

    if verbose {
        let mut info = CrtcInformation::new();
        let code = apply_edid(&bytes, &mut info);
        println!("  Populate:     code {}", code);
        for line in super::hex_lines(&bytes, 16) {
            println!("    {}", line);
        }
    }
    Ok(())
}

/// Reads EDID bytes from a file (raw or hex text) or from hex text.
fn load(input: &str) -> Result<Vec<u8>> {
    let path = Path::new(input);
    if path.is_file() {
        let data = fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        if let Ok(text) = std::str::from_utf8(&data) {
            if let Ok(bytes) = parse_hex(text) {
                return Ok(bytes);
            }
        }
        return Ok(data);
    }
    parse_hex(input).with_context(|| format!("'{}' is neither a file nor hex text", input))
}

/// Decodes hex text, ignoring whitespace, `:` separators and a `0x` prefix.
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    let digits: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();
    if digits.is_empty() {
        bail!("Expected hex digits");
    }
    hex::decode(&digits).with_context(|| format!("Invalid hex text '{}'", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("00 ff\n10:20").unwrap(), [0x00, 0xff, 0x10, 0x20]);
        assert_eq!(parse_hex("0xABcd").unwrap(), [0xab, 0xcd]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("").is_err());
    }
}
