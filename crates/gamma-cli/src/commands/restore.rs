//! Ramp restore command.

use crate::RestoreArgs;
use anyhow::{Context, Result};
use gamma_device::MethodRegistry;

/// Restores a whole site, one partition or one CRTC.
pub fn run(args: RestoreArgs, registry: &MethodRegistry, verbose: bool) -> Result<()> {
    let site = super::open_site(registry, &args.site)?;

    match (args.partition, args.crtc) {
        (None, _) => {
            site.restore().context("Site restore failed")?;
            if verbose {
                println!("restored site of {}", site.method());
            }
        }
        (Some(p), None) => {
            let partition = site
                .partition(p)
                .with_context(|| format!("Failed to open partition {}", p))?;
            partition
                .restore()
                .with_context(|| format!("Restore of partition {} failed", p))?;
            partition.close()?;
            if verbose {
                println!("restored partition {}", p);
            }
        }
        (Some(p), Some(c)) => {
            let partition = site
                .partition(p)
                .with_context(|| format!("Failed to open partition {}", p))?;
            let mut crtc = partition
                .crtc(c)
                .with_context(|| format!("Failed to open CRTC {}.{}", p, c))?;
            crtc.restore()
                .with_context(|| format!("Restore of CRTC {}.{} failed", p, c))?;
            crtc.close()?;
            partition.close()?;
            if verbose {
                println!("restored crtc {}.{}", p, c);
            }
        }
    }

    site.close()?;
    Ok(())
}
