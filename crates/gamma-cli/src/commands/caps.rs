//! Method capabilities command.

use crate::CapsArgs;
use anyhow::{Context, Result};
use gamma_core::MethodCapabilities;
use gamma_device::MethodRegistry;

use super::yes_no;

/// Prints the capabilities of one method.
pub fn run(args: CapsArgs, registry: &MethodRegistry, verbose: bool) -> Result<()> {
    let id = super::resolve_method(registry, args.method.as_deref())?;
    let method = registry.get(id).context("Method vanished from the registry")?;
    let mut caps = method.capabilities();
    if let Some(version) = args.layout_version {
        caps = caps.for_version(version);
    }

    println!("{} ({})", id, id.description());
    print_caps(&caps);

    if verbose {
        println!("  Identifier:           {} ({})", id.value(), id.constant_name());
        match id.default_site_variable() {
            Some(var) => println!(
                "  Default site:         ${} = {}",
                var,
                id.default_site().as_deref().unwrap_or("(unset)")
            ),
            None => println!("  Default site:         (none)"),
        }
        println!("  Environment suitable: {}", yes_no(method.environment_suitable()));
    }
    Ok(())
}

fn print_caps(caps: &MethodCapabilities) {
    println!("  Layout version:       {}", caps.struct_version);
    println!("  Fields:               {}", caps.fields);
    println!("  Default site known:   {}", yes_no(caps.default_site_known));
    println!("  Multiple sites:       {}", yes_no(caps.multiple_sites));
    println!("  Multiple partitions:  {}", yes_no(caps.multiple_partitions));
    println!("  Multiple CRTCs:       {}", yes_no(caps.multiple_crtcs));
    println!("  Partitions are GPUs:  {}", yes_no(caps.partitions_are_graphics_cards));
    println!(
        "  Restore:              site {}, partition {}, crtc {}",
        yes_no(caps.site_restore),
        yes_no(caps.partition_restore),
        yes_no(caps.crtc_restore)
    );
    println!("  Identical ramp sizes: {}", yes_no(caps.identical_gamma_sizes));
    println!("  Fixed ramp size:      {}", yes_no(caps.fixed_gamma_size));
    println!("  Fixed ramp depth:     {}", yes_no(caps.fixed_gamma_depth));
    println!("  Real:                 {}", yes_no(caps.real));
    println!("  Fake:                 {}", yes_no(caps.fake));
    println!("  Auto restore:         {}", yes_no(caps.auto_restore));
}
