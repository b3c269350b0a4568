#![no_std]
#[cfg(feature = "std")]
extern crate std;

use zeroize::Zeroize;

/// Maximum packets per batch. Shared with C callers as `PKTGEN_BATCH_CAPACITY`.
pub const BATCH_CAPACITY: usize = 8;
/// Maximum bytes per packet. Shared with C callers as `PKTGEN_PACKET_CAPACITY`.
pub const PACKET_CAPACITY: usize = 1500;

/// One generated packet. Bytes past `len` are don't-care.
#[derive(Clone, Zeroize)]
#[repr(C)]
pub struct Packet {
    pub len: u16,
    pub data: [u8; PACKET_CAPACITY],
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            len: 0,
            data: [0u8; PACKET_CAPACITY],
        }
    }
}

impl Packet {
    /// The used prefix of `data`.
    pub fn payload(&self) -> &[u8] {
        let len = core::cmp::min(self.len as usize, PACKET_CAPACITY);
        &self.data[..len]
    }
}

impl core::fmt::Debug for Packet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Packet").field("len", &self.len).finish_non_exhaustive()
    }
}

/// Caller-owned output buffer for a fetch. Only the first `count` packets are meaningful.
///
/// The layout is plain data so C callers can zero-initialise it (`{0}`).
#[derive(Clone, Debug, Zeroize)]
#[repr(C)]
pub struct Batch {
    pub count: u8,
    pub packets: [Packet; BATCH_CAPACITY],
}

impl Default for Batch {
    fn default() -> Self {
        Self {
            count: 0,
            packets: core::array::from_fn(|_| Packet::default()),
        }
    }
}

impl Batch {
    /// Packets written by the last fetch.
    pub fn packets(&self) -> &[Packet] {
        let count = core::cmp::min(self.count as usize, BATCH_CAPACITY);
        &self.packets[..count]
    }

    /// Wipe every slot, meaningful or not.
    pub fn clear(&mut self) {
        self.zeroize();
    }
}

/// Result code returned across the C boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Status {
    Success = 0,
    InvalidHandle = 1,
}

impl Status {
    pub const fn code(self) -> u64 {
        self as u64
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Status::Success),
            1 => Some(Status::InvalidHandle),
            _ => None,
        }
    }

    pub fn into_result(self) -> PktgenResult<()> {
        match self {
            Status::Success => Ok(()),
            Status::InvalidHandle => Err(PktgenError::InvalidHandle),
        }
    }
}

pub type PktgenResult<T> = Result<T, PktgenError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PktgenError {
    AllocFailure,
    InvalidHandle,
    /// A status code this build does not know about.
    Status(u64),
}

impl PktgenError {
    /// Interpret a raw status code from the C boundary.
    pub fn check(code: u64) -> PktgenResult<()> {
        match Status::from_code(code) {
            Some(status) => status.into_result(),
            None => Err(PktgenError::Status(code)),
        }
    }
}

impl core::fmt::Display for PktgenError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PktgenError::AllocFailure => write!(f, "context allocation failed"),
            PktgenError::InvalidHandle => write!(f, "null context or batch handle"),
            PktgenError::Status(code) => write!(f, "unknown status code {}", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PktgenError {}
