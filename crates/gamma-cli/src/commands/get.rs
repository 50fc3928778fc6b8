//! Ramp reading command.

use crate::GetArgs;
use anyhow::Result;
use gamma_core::{Ramps, Sample};
use gamma_device::MethodRegistry;

/// Reads the ramps of one CRTC and prints evenly spaced stops.
pub fn run(args: GetArgs, registry: &MethodRegistry, verbose: bool) -> Result<()> {
    let depth = args.depth.as_deref().map(super::parse_depth).transpose()?;

    let ramps = super::with_crtc(registry, &args.target, |crtc| {
        let depth = depth.unwrap_or(crtc.native_depth());
        if verbose {
            println!("native depth {}, reading at {}", crtc.native_depth(), depth);
        }
        Ok(crtc.read_ramps(depth)?)
    })?;

    println!("{} ramps, sizes {}", ramps.depth(), ramps.sizes());
    match &ramps {
        Ramps::U8(buf) => print_channels([buf.red(), buf.green(), buf.blue()], args.samples),
        Ramps::U16(buf) => print_channels([buf.red(), buf.green(), buf.blue()], args.samples),
        Ramps::U32(buf) => print_channels([buf.red(), buf.green(), buf.blue()], args.samples),
        Ramps::U64(buf) => print_channels([buf.red(), buf.green(), buf.blue()], args.samples),
        Ramps::F32(buf) => print_channels([buf.red(), buf.green(), buf.blue()], args.samples),
        Ramps::F64(buf) => print_channels([buf.red(), buf.green(), buf.blue()], args.samples),
    }
    Ok(())
}

fn print_channels<T: Sample + std::fmt::Display>(channels: [&[T]; 3], samples: usize) {
    for (name, values) in ["red", "green", "blue"].into_iter().zip(channels) {
        let stops = sample_indices(values.len(), samples);
        let text: Vec<String> = stops.iter().map(|&i| format!("{}", values[i])).collect();
        println!("  {:<5} {}", name, text.join(" "));
    }
}

/// Indices of `samples` evenly spaced stops, first and last included.
///
/// `0` selects every stop.
fn sample_indices(len: usize, samples: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    if samples == 0 || samples >= len {
        return (0..len).collect();
    }
    if samples == 1 {
        return vec![0];
    }
    (0..samples).map(|k| k * (len - 1) / (samples - 1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(1024, 5), [0, 255, 511, 767, 1023]);
        assert_eq!(sample_indices(4, 0), [0, 1, 2, 3]);
        assert_eq!(sample_indices(4, 10), [0, 1, 2, 3]);
        assert_eq!(sample_indices(4, 1), [0]);
        assert!(sample_indices(0, 8).is_empty());
    }
}
