//! Site hierarchy listing.

use crate::ListArgs;
use anyhow::{Context, Result};
use gamma_core::FieldMask;
use gamma_device::MethodRegistry;

/// Prints every partition and CRTC of a site, one CRTC per line.
pub fn run(args: ListArgs, registry: &MethodRegistry, verbose: bool) -> Result<()> {
    let site = super::open_site(registry, &args.site)?;
    println!(
        "{} site {}: {} partition(s)",
        site.method(),
        site.identifier().unwrap_or("(default)"),
        site.partitions_available()
    );

    let mut fields = FieldMask::CONNECTOR_NAME | FieldMask::ACTIVE;
    if verbose {
        fields |= FieldMask::MACRO_RAMP | FieldMask::GAMMA_SUPPORT;
    }

    for p in 0..site.partitions_available() {
        let partition = site
            .partition(p)
            .with_context(|| format!("Failed to open partition {}", p))?;
        println!("  partition {}: {} CRTC(s)", p, partition.crtcs_available());
        for c in 0..partition.crtcs_available() {
            let mut crtc = partition
                .crtc(c)
                .with_context(|| format!("Failed to open CRTC {}.{}", p, c))?;
            let info = crtc.information(fields);
            let name = info.connector_name.value().map_or("?", String::as_str);
            let state = match info.active.value() {
                Some(true) => "active",
                Some(false) => "inactive",
                None => "unknown",
            };
            print!("    crtc {}.{}: {:<12} {}", p, c, name, state);
            if verbose {
                if let Some(sizes) = info.gamma_size.value() {
                    print!("  size {}", sizes);
                }
                if let Some(depth) = info.gamma_depth.value() {
                    print!("  depth {}", depth);
                }
                if let Some(support) = info.gamma_support.value() {
                    print!("  adjustable {}", support.name());
                }
            }
            println!();
        }
    }
    site.close()?;
    Ok(())
}
