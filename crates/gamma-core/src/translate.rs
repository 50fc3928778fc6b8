//! Depth translation through a canonical 64-bit form.
//!
//! Every sample, whatever its depth, is first widened to a `u64` spanning the
//! full `0..=u64::MAX` range ("to-64"); every destination sample is then
//! produced from that canonical value ("from-64").
//!
//! # Integer depths
//!
//! For a width `d` that divides 64, widening multiplies by the repunit
//! `R_d` (the `d`-bit value `1` repeated `64 / d` times), which replicates
//! the bit pattern: `0xAB` becomes `0xABABABABABABABAB`. Narrowing divides by
//! `R_d`. Both are exact: 0 maps to 0, the maximum maps to `u64::MAX`, and
//! narrowing undoes widening for every value.
//!
//! # Float depths
//!
//! Floats live in [0, 1]. Widening computes `round(v * (2^64 - 1))` in
//! double precision and converts through `i128`, which holds both negative
//! results and `2^64`, so out-of-range products clamp to the correct end
//! instead of wrapping. Narrowing divides by `2^64 - 1`.
//!
//! ```rust
//! use gamma_core::translate::Sample;
//!
//! assert_eq!(0xABu8.to_canonical(), 0xABAB_ABAB_ABAB_ABAB);
//! assert_eq!(u8::from_canonical(u64::MAX), 0xFF);
//! assert_eq!(1.0f32.to_canonical(), u64::MAX);
//! assert_eq!(0.0f64.to_canonical(), 0);
//! ```

use std::fmt::Debug;

use tracing::trace;

use crate::ramps::{byte_size, try_alloc, with_buffer};
use crate::{Depth, ErrorCode, RampBuffer, Ramps, Result};

/// `u64::MAX` as a double: exactly `2^64`.
const CANONICAL_MAX_F64: f64 = u64::MAX as f64;

/// Repunit for 8-bit samples.
pub const R8: u64 = 0x0101_0101_0101_0101;
/// Repunit for 16-bit samples.
pub const R16: u64 = 0x0001_0001_0001_0001;
/// Repunit for 32-bit samples.
pub const R32: u64 = 0x0000_0001_0000_0001;

/// A ramp sample type with an exact mapping to the canonical `u64` form.
pub trait Sample: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Depth tag of the type.
    const DEPTH: Depth;

    /// Widens to the canonical form.
    fn to_canonical(self) -> u64;

    /// Narrows from the canonical form.
    fn from_canonical(value: u64) -> Self;
}

macro_rules! impl_integer_sample {
    ($($ty:ty => $depth:ident, $repunit:expr;)*) => {
        $(
            impl Sample for $ty {
                const DEPTH: Depth = Depth::$depth;

                #[inline]
                fn to_canonical(self) -> u64 {
                    self as u64 * $repunit
                }

                #[inline]
                fn from_canonical(value: u64) -> Self {
                    (value / $repunit) as $ty
                }
            }
        )*
    };
}

impl_integer_sample! {
    u8 => U8, R8;
    u16 => U16, R16;
    u32 => U32, R32;
}

impl Sample for u64 {
    const DEPTH: Depth = Depth::U64;

    #[inline]
    fn to_canonical(self) -> u64 {
        self
    }

    #[inline]
    fn from_canonical(value: u64) -> Self {
        value
    }
}

impl Sample for f64 {
    const DEPTH: Depth = Depth::F64;

    #[inline]
    fn to_canonical(self) -> u64 {
        float_to_canonical(self)
    }

    #[inline]
    fn from_canonical(value: u64) -> Self {
        value as f64 / CANONICAL_MAX_F64
    }
}

impl Sample for f32 {
    const DEPTH: Depth = Depth::F32;

    #[inline]
    fn to_canonical(self) -> u64 {
        float_to_canonical(self as f64)
    }

    #[inline]
    fn from_canonical(value: u64) -> Self {
        (value as f64 / CANONICAL_MAX_F64) as f32
    }
}

/// Widens a [0, 1] float.
///
/// Products below zero clamp to 0 and products at or above `2^64` clamp to
/// `u64::MAX`. NaN maps to 0.
#[inline]
pub fn float_to_canonical(value: f64) -> u64 {
    let scaled = (value * CANONICAL_MAX_F64).round() as i128;
    scaled.clamp(0, u64::MAX as i128) as u64
}

/// Canonical value of stop `i` in a linear ramp of `len` stops.
#[inline]
fn linear_stop(i: usize, len: usize) -> u64 {
    if len < 2 {
        return 0;
    }
    ((i as u128 * u64::MAX as u128) / (len - 1) as u128) as u64
}

pub(crate) fn fill_linear<T: Sample>(channel: &mut [T]) {
    let len = channel.len();
    for (i, sample) in channel.iter_mut().enumerate() {
        *sample = T::from_canonical(linear_stop(i, len));
    }
}

pub(crate) fn fill_curve<T: Sample>(channel: &mut [T], curve: &dyn Fn(f64) -> f64) {
    let len = channel.len();
    let last = len.saturating_sub(1).max(1) as f64;
    for (i, sample) in channel.iter_mut().enumerate() {
        let y = curve(i as f64 / last).clamp(0.0, 1.0);
        *sample = T::from_canonical(float_to_canonical(y));
    }
}

impl Ramps {
    /// Widens every sample into `out`, red then green then blue.
    ///
    /// `out` must hold exactly [`Ramps::len`] values.
    pub fn to_canonical(&self, out: &mut [u64]) {
        debug_assert_eq!(out.len(), self.len());
        with_buffer!(self, buf => {
            for (dst, src) in out.iter_mut().zip(buf.as_slice()) {
                *dst = src.to_canonical();
            }
        })
    }

    /// Narrows every sample from `values`, red then green then blue.
    pub fn fill_from_canonical(&mut self, values: &[u64]) {
        debug_assert_eq!(values.len(), self.len());
        with_buffer!(self, buf => fill_from(buf, values))
    }

    /// Returns a copy of these ramps at another depth.
    pub fn convert(&self, depth: Depth) -> Result<Ramps> {
        let mut out = Ramps::new(depth, self.sizes())?;
        translate(self, &mut out)?;
        Ok(out)
    }
}

fn fill_from<T: Sample>(buf: &mut RampBuffer<T>, values: &[u64]) {
    for (dst, src) in buf.as_mut_slice().iter_mut().zip(values) {
        *dst = T::from_canonical(*src);
    }
}

/// Translates `src` into `dst`, which may have a different depth.
///
/// Both must have the same channel sizes, otherwise
/// [`ErrorCode::WrongGammaRampSize`] is returned and `dst` is untouched.
/// The temporary canonical buffer is released before returning.
pub fn translate(src: &Ramps, dst: &mut Ramps) -> Result<()> {
    let sizes = src.sizes();
    if dst.sizes() != sizes {
        return Err(ErrorCode::WrongGammaRampSize.into());
    }

    if !copy_same_depth(src, dst) {
        trace!(from = %src.depth(), to = %dst.depth(), %sizes, "translating ramps");
        let (total, bytes) = byte_size(sizes, std::mem::size_of::<u64>())?;
        let mut canonical: Vec<u64> = try_alloc(total, bytes)?;
        src.to_canonical(&mut canonical);
        dst.fill_from_canonical(&canonical);
    }
    Ok(())
}

/// Copies samples when both sides share a depth. Returns `false` otherwise.
fn copy_same_depth(src: &Ramps, dst: &mut Ramps) -> bool {
    match (src, dst) {
        (Ramps::U8(a), Ramps::U8(b)) => b.as_mut_slice().copy_from_slice(a.as_slice()),
        (Ramps::U16(a), Ramps::U16(b)) => b.as_mut_slice().copy_from_slice(a.as_slice()),
        (Ramps::U32(a), Ramps::U32(b)) => b.as_mut_slice().copy_from_slice(a.as_slice()),
        (Ramps::U64(a), Ramps::U64(b)) => b.as_mut_slice().copy_from_slice(a.as_slice()),
        (Ramps::F32(a), Ramps::F32(b)) => b.as_mut_slice().copy_from_slice(a.as_slice()),
        (Ramps::F64(a), Ramps::F64(b)) => b.as_mut_slice().copy_from_slice(a.as_slice()),
        _ => return false,
    }
    true
}

/// Translates a single sample between depths given as raw values.
///
/// Mostly useful for tests and diagnostics.
pub fn translate_sample<S: Sample, D: Sample>(value: S) -> D {
    D::from_canonical(value.to_canonical())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, RampSizes};
    use approx::assert_relative_eq;

    #[test]
    fn test_repunits() {
        assert_eq!(u8::MAX as u64 * R8, u64::MAX);
        assert_eq!(u16::MAX as u64 * R16, u64::MAX);
        assert_eq!(u32::MAX as u64 * R32, u64::MAX);
        assert_eq!(0x1234u16.to_canonical(), 0x1234_1234_1234_1234);
    }

    #[test]
    fn test_round_trip_u8_u16() {
        for v in 0..=u8::MAX {
            assert_eq!(u8::from_canonical(v.to_canonical()), v);
        }
        for v in 0..=u16::MAX {
            assert_eq!(u16::from_canonical(v.to_canonical()), v);
        }
    }

    #[test]
    fn test_round_trip_u32() {
        let mut v: u32 = 0;
        loop {
            assert_eq!(u32::from_canonical(v.to_canonical()), v);
            match v.checked_add(65_521) {
                Some(next) => v = next,
                None => break,
            }
        }
        assert_eq!(u32::from_canonical(u32::MAX.to_canonical()), u32::MAX);
    }

    #[test]
    fn test_narrowing_max() {
        assert_eq!(u8::from_canonical(u64::MAX), u8::MAX);
        assert_eq!(u16::from_canonical(u64::MAX), u16::MAX);
        assert_eq!(u32::from_canonical(u64::MAX), u32::MAX);
        assert_eq!(u8::from_canonical(0), 0);
    }

    #[test]
    fn test_float_boundaries() {
        assert_eq!(0.0f32.to_canonical(), 0);
        assert_eq!(1.0f32.to_canonical(), u64::MAX);
        assert_eq!(0.0f64.to_canonical(), 0);
        assert_eq!(1.0f64.to_canonical(), u64::MAX);
        assert_eq!(f64::from_canonical(u64::MAX), 1.0);
        assert_eq!(f32::from_canonical(u64::MAX), 1.0);
        assert_eq!(f64::from_canonical(0), 0.0);
    }

    #[test]
    fn test_float_near_boundaries() {
        assert_eq!(f64::MIN_POSITIVE.to_canonical(), 0);
        assert_eq!((-1e-300f64).to_canonical(), 0);
        assert_eq!((-0.5f64).to_canonical(), 0);
        assert_eq!(1.5f64.to_canonical(), u64::MAX);
        assert_eq!(f64::NAN.to_canonical(), 0);
        assert!((1.0f64 - 1e-9).to_canonical() > u64::MAX / 2);
    }

    #[test]
    fn test_float_monotonic() {
        let mut prev = 0u64;
        for i in 0..=10_000 {
            let v = (i as f64 / 10_000.0).to_canonical();
            assert!(v >= prev, "not monotonic at {i}");
            prev = v;
        }
        let mut prev = 0u64;
        for i in 0..=10_000 {
            let v = (i as f32 / 10_000.0).to_canonical();
            assert!(v >= prev, "not monotonic at {i}");
            prev = v;
        }
    }

    #[test]
    fn test_float_midpoint() {
        assert_relative_eq!(f64::from_canonical(0.5f64.to_canonical()), 0.5, epsilon = 1e-12);
        assert_eq!(translate_sample::<f64, u8>(0.5), 127);
        assert_eq!(translate_sample::<u8, u16>(0x80), 0x8080);
        assert_relative_eq!(translate_sample::<u16, f32>(u16::MAX), 1.0);
    }

    #[test]
    fn test_translate_integer_depths() {
        let sizes = RampSizes::new(256, 256, 256);
        let linear = Ramps::linear(Depth::U8, sizes).unwrap();
        for depth in [Depth::U8, Depth::U16, Depth::U32, Depth::U64] {
            let wide = linear.convert(depth).unwrap();
            assert_eq!(wide.depth(), depth);
            let back = wide.convert(Depth::U8).unwrap();
            assert_eq!(back, linear, "round trip through {depth}");
        }
    }

    #[test]
    fn test_translate_through_float() {
        // Truncating narrowing may land one step low after float rounding.
        let sizes = RampSizes::new(256, 256, 256);
        let linear = Ramps::linear(Depth::U8, sizes).unwrap();
        for depth in [Depth::F32, Depth::F64] {
            let back = linear.convert(depth).unwrap().convert(Depth::U8).unwrap();
            let (Ramps::U8(a), Ramps::U8(b)) = (&linear, &back) else {
                panic!("wrong variant");
            };
            for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
                assert!(x.abs_diff(*y) <= 1, "{x} vs {y} through {depth}");
            }
            assert_eq!(b.red()[0], 0);
            assert_eq!(b.red()[255], 255);
        }
    }

    #[test]
    fn test_translate_float_to_int() {
        let sizes = RampSizes::uniform(3);
        let mut src = Ramps::new(Depth::F32, sizes).unwrap();
        if let Ramps::F32(buf) = &mut src {
            buf.as_mut_slice().copy_from_slice(&[0.0, 0.5, 1.0, 0.0, 0.5, 1.0, 1.0, 0.0, 0.25]);
        }
        let out = src.convert(Depth::U16).unwrap();
        let Ramps::U16(buf) = out else {
            panic!("wrong variant");
        };
        assert_eq!(buf.red(), &[0, 32767, 65535]);
        assert_eq!(buf.blue()[0], 65535);
        assert_eq!(buf.blue()[1], 0);
    }

    #[test]
    fn test_translate_size_mismatch() {
        let src = Ramps::new(Depth::U8, RampSizes::uniform(4)).unwrap();
        let mut dst = Ramps::new(Depth::U16, RampSizes::uniform(5)).unwrap();
        assert_eq!(
            translate(&src, &mut dst),
            Err(Error::Library(ErrorCode::WrongGammaRampSize))
        );
    }

    #[test]
    fn test_fill_with_curve() {
        let mut ramps = Ramps::new(Depth::F64, RampSizes::uniform(5)).unwrap();
        ramps.fill_with(&|x| x, &|x| x * x, &|_| 2.0);
        let Ramps::F64(buf) = ramps else {
            panic!("wrong variant");
        };
        assert_relative_eq!(buf.red()[2], 0.5, epsilon = 1e-12);
        assert_relative_eq!(buf.green()[2], 0.25, epsilon = 1e-12);
        assert_eq!(buf.blue(), &[1.0; 5]);
    }
}
