//! Power-curve ramp writing.

use crate::SetGammaArgs;
use anyhow::{Result, ensure};
use gamma_core::Depth;
use gamma_device::MethodRegistry;
use tracing::info;

/// Writes `brightness * x^(1/gamma)` ramps to one CRTC.
pub fn run(args: SetGammaArgs, registry: &MethodRegistry, verbose: bool) -> Result<()> {
    let red = args.red.unwrap_or(args.gamma);
    let green = args.green.unwrap_or(args.gamma);
    let blue = args.blue.unwrap_or(args.gamma);
    for (name, gamma) in [("red", red), ("green", green), ("blue", blue)] {
        ensure!(gamma.is_finite() && gamma > 0.0, "Invalid {} gamma: {}", name, gamma);
    }
    ensure!(
        (0.0..=1.0).contains(&args.brightness),
        "Brightness must be in [0, 1], got {}",
        args.brightness
    );

    let brightness = args.brightness;
    let r = curve(red, brightness);
    let g = curve(green, brightness);
    let b = curve(blue, brightness);

    super::with_crtc(registry, &args.target, |crtc| {
        crtc.set_ramps_with(&r, &g, &b)?;
        info!(red, green, blue, brightness, "ramps written");
        if verbose {
            let ramps = crtc.read_ramps(Depth::F64)?;
            println!("wrote {} ramps of sizes {}", crtc.native_depth(), ramps.sizes());
        }
        Ok(())
    })
}

fn curve(gamma: f64, brightness: f64) -> impl Fn(f64) -> f64 {
    move |x| brightness * x.powf(1.0 / gamma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_endpoints() {
        let f = curve(2.2, 1.0);
        assert_eq!(f(0.0), 0.0);
        assert_eq!(f(1.0), 1.0);
        assert!(f(0.5) > 0.5);

        let dim = curve(1.0, 0.5);
        assert_eq!(dim(1.0), 0.5);
        assert_eq!(dim(0.5), 0.25);
    }
}
