#![forbid(unsafe_code)]

use pktgen_core::{Packet, PACKET_CAPACITY};
use rand::Rng;
use rand_core::RngCore;

/// Overwrites `pkt` with filler: a length drawn from `[0, PACKET_CAPACITY)`
/// and that many random bytes. Bytes past the new length are left alone.
pub fn random_packet<R: RngCore>(pkt: &mut Packet, rng: &mut R) {
    let len = rng.gen_range(0..PACKET_CAPACITY);
    rng.fill_bytes(&mut pkt.data[..len]);
    pkt.len = len as u16;
}
