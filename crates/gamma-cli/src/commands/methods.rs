//! Method listing command.

use crate::MethodsArgs;
use anyhow::{Context, Result};
use gamma_device::detect::{self, ListLevel};
use gamma_device::MethodRegistry;

/// Lists methods at a level, or describes every registered method.
pub fn run(args: MethodsArgs, registry: &MethodRegistry, verbose: bool) -> Result<()> {
    let Some(value) = args.level else {
        print!("{}", detect::describe_methods(registry));
        if verbose {
            let compiled: Vec<String> = gamma_device::MethodId::ALL
                .into_iter()
                .filter(|id| !registry.contains(*id))
                .map(|id| id.to_string())
                .collect();
            if !compiled.is_empty() {
                println!("Not available: {}", compiled.join(", "));
            }
        }
        return Ok(());
    };

    let level = ListLevel::from_value(value)
        .with_context(|| format!("Listing level must be 0 to 4, got {}", value))?;
    for id in detect::list_methods_in(registry, level) {
        if verbose {
            println!("{:<8} {:>2}  {}", id.name(), id.value(), id.description());
        } else {
            println!("{}", id);
        }
    }
    Ok(())
}
