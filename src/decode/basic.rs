//! Endian-aware primitive reads shared by the stream reader.
//!
//! Only explicit big-endian requires a byteswap on numeric reads; the
//! little-endian case (implicit or explicit) is the common path. Endian
//! awareness is centralized here rather than sprinkled through each VR's
//! decoding routine.

use byteordered::{ByteOrdered, Endianness};
use std::io::Read;

/// Read a `u16` from `source` using `endianness`.
pub fn read_u16<R: Read>(source: R, endianness: Endianness) -> std::io::Result<u16> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_u16(),
        Endianness::Big => ByteOrdered::be(source).read_u16(),
    }
}

/// Read a `u32` from `source` using `endianness`.
pub fn read_u32<R: Read>(source: R, endianness: Endianness) -> std::io::Result<u32> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_u32(),
        Endianness::Big => ByteOrdered::be(source).read_u32(),
    }
}

/// Fill `target` with `u16` values read from `source` using `endianness`.
pub fn read_u16_into<R: Read>(source: R, endianness: Endianness, target: &mut [u16]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_u16_into(target),
        Endianness::Big => ByteOrdered::be(source).read_u16_into(target),
    }
}

/// Fill `target` with `i16` values read from `source` using `endianness`.
pub fn read_i16_into<R: Read>(source: R, endianness: Endianness, target: &mut [i16]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_i16_into(target),
        Endianness::Big => ByteOrdered::be(source).read_i16_into(target),
    }
}

/// Fill `target` with `u32` values read from `source` using `endianness`.
pub fn read_u32_into<R: Read>(source: R, endianness: Endianness, target: &mut [u32]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_u32_into(target),
        Endianness::Big => ByteOrdered::be(source).read_u32_into(target),
    }
}

/// Fill `target` with `i32` values read from `source` using `endianness`.
pub fn read_i32_into<R: Read>(source: R, endianness: Endianness, target: &mut [i32]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_i32_into(target),
        Endianness::Big => ByteOrdered::be(source).read_i32_into(target),
    }
}

/// Fill `target` with `u64` values read from `source` using `endianness`.
pub fn read_u64_into<R: Read>(source: R, endianness: Endianness, target: &mut [u64]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_u64_into(target),
        Endianness::Big => ByteOrdered::be(source).read_u64_into(target),
    }
}

/// Fill `target` with `i64` values read from `source` using `endianness`.
pub fn read_i64_into<R: Read>(source: R, endianness: Endianness, target: &mut [i64]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_i64_into(target),
        Endianness::Big => ByteOrdered::be(source).read_i64_into(target),
    }
}

/// Fill `target` with `f32` values read from `source` using `endianness`.
pub fn read_f32_into<R: Read>(source: R, endianness: Endianness, target: &mut [f32]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_f32_into(target),
        Endianness::Big => ByteOrdered::be(source).read_f32_into(target),
    }
}

/// Fill `target` with `f64` values read from `source` using `endianness`.
pub fn read_f64_into<R: Read>(source: R, endianness: Endianness, target: &mut [f64]) -> std::io::Result<()> {
    match endianness {
        Endianness::Little => ByteOrdered::le(source).read_f64_into(target),
        Endianness::Big => ByteOrdered::be(source).read_f64_into(target),
    }
}
