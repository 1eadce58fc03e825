use serde::{Deserialize, Serialize};
use std::{fmt, mem::size_of, ops::Add};

/// Lower and upper bound, in bytes, of the memory a component needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryRange {
    pub min: usize,
    pub max: usize,
}

impl MemoryRange {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(bytes: usize) -> Self {
        Self {
            min: bytes,
            max: bytes,
        }
    }

    pub fn of_range(min: usize, max: usize) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn add(self, other: MemoryRange) -> Self {
        Self {
            min: self.min.saturating_add(other.min),
            max: self.max.saturating_add(other.max),
        }
    }

    pub fn times(self, factor: usize) -> Self {
        Self {
            min: self.min.saturating_mul(factor),
            max: self.max.saturating_mul(factor),
        }
    }
}

impl Add for MemoryRange {
    type Output = MemoryRange;

    fn add(self, rhs: Self) -> Self::Output {
        MemoryRange::add(self, rhs)
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{} Bytes", self.min)
        } else {
            write!(f, "[{} Bytes ... {} Bytes]", self.min, self.max)
        }
    }
}

/// Bytes held by a boxed slice of `len` elements of `T`, including its header.
pub fn size_of_slice<T>(len: usize) -> usize {
    size_of::<Box<[T]>>() + len.saturating_mul(size_of::<T>())
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let r = MemoryRange::of(10) + MemoryRange::of_range(1, 5);
        assert_eq!(r, MemoryRange::of_range(11, 15));
        assert_eq!(r.times(2), MemoryRange::of_range(22, 30));
        assert_eq!(MemoryRange::of_range(5, 1), MemoryRange::of_range(1, 5));
    }

    #[test]
    fn slice_size() {
        assert_eq!(size_of_slice::<u64>(4), 16 + 32);
        assert_eq!(format!("{}", MemoryRange::of(3)), "3 Bytes");
    }
}
