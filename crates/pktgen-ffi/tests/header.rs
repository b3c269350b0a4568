use pktgen::abi::{c_header, latest_version, rust_bindings, struct_layout, FUNCTIONS};
use pktgen::pktgen_batch;
use pktgen_core::Packet;
use std::mem::{align_of, offset_of, size_of};

const CHECKED_IN: &str = include_str!("../include/pktgen.h");

#[test]
fn test_checked_in_header_is_current() {
    assert_eq!(c_header(), CHECKED_IN, "run `pktgen-driver --emit c` to regenerate");
}

#[test]
fn test_symbols_listed() {
    let symbols: Vec<String> = FUNCTIONS.iter().map(|f| f.symbol()).collect();
    assert_eq!(
        symbols,
        ["pktgen_new_v1", "pktgen_new_v2", "pktgen_fetch_batch_v1", "pktgen_delete_v1"]
    );
}

#[test]
fn test_versions_unique() {
    let mut symbols: Vec<String> = FUNCTIONS.iter().map(|f| f.symbol()).collect();
    let total = symbols.len();
    symbols.sort();
    symbols.dedup();
    assert_eq!(symbols.len(), total);
}

#[test]
fn test_aliases_point_at_latest() {
    assert_eq!(latest_version("pktgen_new"), Some(2));
    assert_eq!(latest_version("pktgen_fetch_batch"), Some(1));
    assert_eq!(latest_version("pktgen_bogus"), None);

    let header = c_header();
    assert!(header.contains("#define pktgen_new pktgen_new_v2\n"));
    assert!(!header.contains("#define pktgen_new pktgen_new_v1\n"));
    // Older versions keep their prototypes for stale binaries.
    assert!(header.contains("pktgen_ctx_t* pktgen_new_v1(void);\n"));
}

#[test]
fn test_layout_constants_match() {
    let header = c_header();
    let batch = format!("#define PKTGEN_BATCH_CAPACITY {}\n", pktgen::BATCH_CAPACITY);
    let packet = format!("#define PKTGEN_PACKET_CAPACITY {}\n", pktgen::PACKET_CAPACITY);
    assert!(header.contains(&batch));
    assert!(header.contains(&packet));
    assert!(header.contains(&format!("#define PKTGEN_SUCCESS {}\n", pktgen::PKTGEN_SUCCESS)));
}

fn check(rendered: &str, expected: &str) {
    assert_eq!(rendered, expected.to_string() + "\n");
}

#[test]
fn test_rust_bindings() {
    let expected = "\
pub const PKTGEN_BATCH_CAPACITY: usize = 8;
pub const PKTGEN_PACKET_CAPACITY: usize = 1500;

pub const PKTGEN_SUCCESS: u64 = 0;
pub const PKTGEN_INVALID_HANDLE: u64 = 1;

#[repr(C)]
pub struct pktgen_ctx {
    _opaque_data: [u8; 0],
}

#[repr(C)]
pub struct pktgen_packet {
    pub len: u16,
    pub data: [u8; PKTGEN_PACKET_CAPACITY],
}

#[repr(C)]
pub struct pktgen_batch {
    pub count: u8,
    pub packets: [pktgen_packet; PKTGEN_BATCH_CAPACITY],
}

extern \"C\" {
    pub fn pktgen_new_v1() -> *mut pktgen_ctx;
    pub fn pktgen_new_v2(n: u8) -> *mut pktgen_ctx;
    pub fn pktgen_fetch_batch_v1(ctx: *mut pktgen_ctx, batch: *mut pktgen_batch) -> u64;
    pub fn pktgen_delete_v1(ctx: *mut pktgen_ctx);
}

pub use self::pktgen_new_v2 as pktgen_new;
pub use self::pktgen_fetch_batch_v1 as pktgen_fetch_batch;
pub use self::pktgen_delete_v1 as pktgen_delete;";
    check(&rust_bindings(), expected);
}

#[test]
fn test_packet_layout_matches_rust() {
    let layout = struct_layout("pktgen_packet").unwrap();
    assert_eq!(layout.size, size_of::<Packet>());
    assert_eq!(layout.align, align_of::<Packet>());
    assert_eq!(layout.offsets, vec![offset_of!(Packet, len), offset_of!(Packet, data)]);
}

#[test]
fn test_batch_layout_matches_rust() {
    let layout = struct_layout("pktgen_batch").unwrap();
    assert_eq!(layout.size, size_of::<pktgen_batch>());
    assert_eq!(layout.align, align_of::<pktgen_batch>());
    assert_eq!(
        layout.offsets,
        vec![offset_of!(pktgen_batch, count), offset_of!(pktgen_batch, packets)]
    );
    // u8 count, one byte of padding, then 8 x (u16 + 1500 bytes).
    assert_eq!(layout.offsets[1], 2);
    assert_eq!(layout.size, 2 + 8 * 1502);
}

#[test]
fn test_unknown_struct_has_no_layout() {
    assert_eq!(struct_layout("pktgen_ctx"), None);
}
