//! Three-channel gamma ramp containers.
//!
//! A [`RampBuffer<T>`] holds the red, green and blue ramps of one CRTC in a
//! single contiguous allocation: green starts where red ends and blue starts
//! where green ends. The buffer hands out the three channels as
//! non-overlapping slices, so the layout is enforced by construction.
//!
//! [`Ramps`] is the depth-erased form: one variant per [`Depth`], each
//! carrying a `RampBuffer` of the matching element type. Code that has to
//! agree on a representation matches on it exhaustively.
//!
//! # Example
//!
//! ```rust
//! use gamma_core::{Depth, RampBuffer, RampSizes, Ramps};
//!
//! let mut buf = RampBuffer::<u16>::new(RampSizes::new(4, 4, 2)).unwrap();
//! let (red, _green, blue) = buf.channels_mut();
//! red[3] = 0xFFFF;
//! blue[1] = 0x8000;
//! assert_eq!(buf.red(), &[0, 0, 0, 0xFFFF]);
//!
//! let ramps = Ramps::new(Depth::F32, RampSizes::uniform(256)).unwrap();
//! assert_eq!(ramps.depth(), Depth::F32);
//! ```

use std::fmt;

use crate::translate::Sample;
use crate::{Depth, Error, ErrorCode, Result};

/// Number of stops in each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RampSizes {
    /// Red channel size.
    pub red: usize,
    /// Green channel size.
    pub green: usize,
    /// Blue channel size.
    pub blue: usize,
}

impl RampSizes {
    /// Creates sizes from the three channel lengths.
    #[inline]
    pub const fn new(red: usize, green: usize, blue: usize) -> Self {
        Self { red, green, blue }
    }

    /// Same size for every channel.
    #[inline]
    pub const fn uniform(size: usize) -> Self {
        Self::new(size, size, size)
    }

    /// Sum of the three sizes, `None` on overflow.
    #[inline]
    pub fn total(&self) -> Option<usize> {
        self.red.checked_add(self.green)?.checked_add(self.blue)
    }

    /// Whether all three channels have the same size.
    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.red == self.green && self.green == self.blue
    }
}

impl fmt::Display for RampSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.red, self.green, self.blue)
    }
}

/// Byte size of `sizes` at `element_size` bytes per sample.
///
/// Fails when the sample count or the byte count overflows, or when the
/// byte count exceeds what a single allocation may span.
pub(crate) fn byte_size(sizes: RampSizes, element_size: usize) -> Result<(usize, usize)> {
    let total = sizes.total().ok_or(Error::allocation_failed(usize::MAX))?;
    let bytes = total
        .checked_mul(element_size)
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(Error::allocation_failed(usize::MAX))?;
    Ok((total, bytes))
}

/// Allocates a zeroed vector of `len` elements without aborting on failure.
pub(crate) fn try_alloc<T: Copy + Default>(len: usize, bytes: usize) -> Result<Vec<T>> {
    let mut data = Vec::new();
    if len > 0 {
        data.try_reserve_exact(len)
            .map_err(|_| Error::allocation_failed(bytes))?;
        data.resize(len, T::default());
    }
    Ok(data)
}

/// Red, green and blue ramps sharing one backing allocation.
#[derive(Clone, PartialEq)]
pub struct RampBuffer<T> {
    data: Vec<T>,
    red: usize,
    green: usize,
}

impl<T: Sample> RampBuffer<T> {
    /// Allocates zeroed ramps for the given sizes.
    ///
    /// A zero total is valid and allocates nothing. Sizes whose sample or
    /// byte count would overflow return [`Error::AllocationFailed`] instead
    /// of wrapping.
    pub fn new(sizes: RampSizes) -> Result<Self> {
        let (total, bytes) = byte_size(sizes, std::mem::size_of::<T>())?;
        Ok(Self {
            data: try_alloc(total, bytes)?,
            red: sizes.red,
            green: sizes.green,
        })
    }

    /// Copies three channel slices into a new buffer.
    pub fn from_channels(red: &[T], green: &[T], blue: &[T]) -> Result<Self> {
        let mut buf = Self::new(RampSizes::new(red.len(), green.len(), blue.len()))?;
        let (r, g, b) = buf.channels_mut();
        r.copy_from_slice(red);
        g.copy_from_slice(green);
        b.copy_from_slice(blue);
        Ok(buf)
    }

    /// Depth of the samples.
    #[inline]
    pub fn depth(&self) -> Depth {
        T::DEPTH
    }
}

impl<T> RampBuffer<T> {
    /// Channel sizes.
    #[inline]
    pub fn sizes(&self) -> RampSizes {
        RampSizes::new(self.red, self.green, self.data.len() - self.red - self.green)
    }

    /// Red channel.
    #[inline]
    pub fn red(&self) -> &[T] {
        &self.data[..self.red]
    }

    /// Green channel.
    #[inline]
    pub fn green(&self) -> &[T] {
        &self.data[self.red..self.red + self.green]
    }

    /// Blue channel.
    #[inline]
    pub fn blue(&self) -> &[T] {
        &self.data[self.red + self.green..]
    }

    /// The three channels as disjoint mutable slices.
    pub fn channels_mut(&mut self) -> (&mut [T], &mut [T], &mut [T]) {
        let (red, rest) = self.data.split_at_mut(self.red);
        let (green, blue) = rest.split_at_mut(self.green);
        (red, green, blue)
    }

    /// All samples, red then green then blue.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All samples, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Total sample count.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for RampBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RampBuffer")
            .field("red", &self.red())
            .field("green", &self.green())
            .field("blue", &self.blue())
            .finish()
    }
}

/// Gamma ramps of any supported depth.
#[derive(Debug, Clone, PartialEq)]
pub enum Ramps {
    /// 8-bit unsigned samples.
    U8(RampBuffer<u8>),
    /// 16-bit unsigned samples.
    U16(RampBuffer<u16>),
    /// 32-bit unsigned samples.
    U32(RampBuffer<u32>),
    /// 64-bit unsigned samples.
    U64(RampBuffer<u64>),
    /// Single precision samples.
    F32(RampBuffer<f32>),
    /// Double precision samples.
    F64(RampBuffer<f64>),
}

/// Applies `$body` to the buffer inside any [`Ramps`] variant.
macro_rules! with_buffer {
    ($ramps:expr, $buf:ident => $body:expr) => {
        match $ramps {
            Ramps::U8($buf) => $body,
            Ramps::U16($buf) => $body,
            Ramps::U32($buf) => $body,
            Ramps::U64($buf) => $body,
            Ramps::F32($buf) => $body,
            Ramps::F64($buf) => $body,
        }
    };
}
pub(crate) use with_buffer;

impl Ramps {
    /// Allocates zeroed ramps of `depth`.
    pub fn new(depth: Depth, sizes: RampSizes) -> Result<Self> {
        Ok(match depth {
            Depth::U8 => Self::U8(RampBuffer::new(sizes)?),
            Depth::U16 => Self::U16(RampBuffer::new(sizes)?),
            Depth::U32 => Self::U32(RampBuffer::new(sizes)?),
            Depth::U64 => Self::U64(RampBuffer::new(sizes)?),
            Depth::F32 => Self::F32(RampBuffer::new(sizes)?),
            Depth::F64 => Self::F64(RampBuffer::new(sizes)?),
        })
    }

    /// Allocates identity ramps: each channel rises linearly from 0 to the
    /// depth's maximum.
    pub fn linear(depth: Depth, sizes: RampSizes) -> Result<Self> {
        let mut ramps = Self::new(depth, sizes)?;
        ramps.fill_linear();
        Ok(ramps)
    }

    /// Sample depth.
    pub fn depth(&self) -> Depth {
        match self {
            Self::U8(_) => Depth::U8,
            Self::U16(_) => Depth::U16,
            Self::U32(_) => Depth::U32,
            Self::U64(_) => Depth::U64,
            Self::F32(_) => Depth::F32,
            Self::F64(_) => Depth::F64,
        }
    }

    /// Channel sizes.
    pub fn sizes(&self) -> RampSizes {
        with_buffer!(self, buf => buf.sizes())
    }

    /// Total sample count.
    pub fn len(&self) -> usize {
        with_buffer!(self, buf => buf.len())
    }

    /// Whether the ramps hold no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with [`ErrorCode::WrongGammaRampSize`] unless the sizes match.
    pub fn check_sizes(&self, expected: RampSizes) -> Result<()> {
        if self.sizes() == expected {
            Ok(())
        } else {
            Err(ErrorCode::WrongGammaRampSize.into())
        }
    }

    /// Overwrites every channel with a linear ramp.
    pub fn fill_linear(&mut self) {
        with_buffer!(self, buf => {
            let (r, g, b) = buf.channels_mut();
            for channel in [r, g, b] {
                crate::translate::fill_linear(channel);
            }
        })
    }

    /// Fills each channel from a curve over [0, 1].
    ///
    /// Stop `i` of an `n`-stop channel receives `f(i / (n - 1))`, clamped to
    /// [0, 1] and encoded at the ramps' depth.
    pub fn fill_with(
        &mut self,
        red: &dyn Fn(f64) -> f64,
        green: &dyn Fn(f64) -> f64,
        blue: &dyn Fn(f64) -> f64,
    ) {
        with_buffer!(self, buf => {
            let (r, g, b) = buf.channels_mut();
            crate::translate::fill_curve(r, red);
            crate::translate::fill_curve(g, green);
            crate::translate::fill_curve(b, blue);
        })
    }
}

macro_rules! impl_from_buffer {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl From<RampBuffer<$ty>> for Ramps {
                fn from(buf: RampBuffer<$ty>) -> Self {
                    Self::$variant(buf)
                }
            }
        )*
    };
}

impl_from_buffer!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, f32 => F32, f64 => F64);
