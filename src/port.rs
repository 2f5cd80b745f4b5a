//! Raw port I/O primitives for driver collaborators.
//!
//! Thin wrappers over the x86 `in`/`out` instruction family. The allocator
//! itself never touches ports; the keyboard and screen drivers built on this
//! crate do.

use x86_64::instructions::port::Port;

/// Reads a byte from `port`.
///
/// # Safety
/// The caller must ensure that reading from `port` has no unintended side
/// effects on the device behind it.
pub unsafe fn byte_in(port: u16) -> u8 {
    let mut port: Port<u8> = Port::new(port);
    unsafe { port.read() }
}

/// Writes a byte to `port`.
///
/// # Safety
/// The caller must ensure that `data` is valid for the device behind `port`.
pub unsafe fn byte_out(port: u16, data: u8) {
    let mut port: Port<u8> = Port::new(port);
    unsafe { port.write(data) }
}

/// Reads a 16-bit word from `port`.
///
/// # Safety
/// The caller must ensure that reading from `port` has no unintended side
/// effects on the device behind it.
pub unsafe fn word_in(port: u16) -> u16 {
    let mut port: Port<u16> = Port::new(port);
    unsafe { port.read() }
}

/// Writes a 16-bit word to `port`.
///
/// # Safety
/// The caller must ensure that `data` is valid for the device behind `port`.
pub unsafe fn word_out(port: u16, data: u16) {
    let mut port: Port<u16> = Port::new(port);
    unsafe { port.write(data) }
}
