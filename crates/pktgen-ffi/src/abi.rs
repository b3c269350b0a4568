//! Declarative description of the C boundary. The C header and the Rust
//! bindings are both rendered from these tables.

use std::fmt::{self, Write};
use std::mem::{align_of, size_of};

use pktgen_core::{Status, BATCH_CAPACITY, PACKET_CAPACITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CType {
    Void,
    U8,
    U16,
    U64,
    /// A typedef'd struct, by its base name (`pktgen_batch` -> `pktgen_batch_t`).
    Struct(&'static str),
    Ptr(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: CType,
    /// Array length, as a `#define` name.
    pub len: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct AbiStruct {
    pub name: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, Copy)]
pub struct AbiFn {
    pub name: &'static str,
    pub version: u32,
    pub ret: CType,
    pub args: &'static [Field],
}

impl AbiFn {
    pub fn symbol(&self) -> String {
        format!("{}_v{}", self.name, self.version)
    }
}

const fn scalar(name: &'static str, ty: CType) -> Field {
    Field { name, ty, len: None }
}

pub const OPAQUE: &[&str] = &["pktgen_ctx"];

pub const CONSTANTS: &[(&str, u64)] = &[
    ("PKTGEN_BATCH_CAPACITY", BATCH_CAPACITY as u64),
    ("PKTGEN_PACKET_CAPACITY", PACKET_CAPACITY as u64),
];

pub const STATUSES: &[(&str, Status)] = &[
    ("PKTGEN_SUCCESS", Status::Success),
    ("PKTGEN_INVALID_HANDLE", Status::InvalidHandle),
];

/// Must lay out like `pktgen_core::{Packet, Batch}`; see `struct_layout`.
pub const STRUCTS: &[AbiStruct] = &[
    AbiStruct {
        name: "pktgen_packet",
        fields: &[
            scalar("len", CType::U16),
            Field {
                name: "data",
                ty: CType::U8,
                len: Some("PKTGEN_PACKET_CAPACITY"),
            },
        ],
    },
    AbiStruct {
        name: "pktgen_batch",
        fields: &[
            scalar("count", CType::U8),
            Field {
                name: "packets",
                ty: CType::Struct("pktgen_packet"),
                len: Some("PKTGEN_BATCH_CAPACITY"),
            },
        ],
    },
];

/// Every symbol ever shipped. Rows are appended, never edited or removed.
pub const FUNCTIONS: &[AbiFn] = &[
    AbiFn {
        name: "pktgen_new",
        version: 1,
        ret: CType::Ptr("pktgen_ctx"),
        args: &[],
    },
    AbiFn {
        name: "pktgen_new",
        version: 2,
        ret: CType::Ptr("pktgen_ctx"),
        args: &[scalar("n", CType::U8)],
    },
    AbiFn {
        name: "pktgen_fetch_batch",
        version: 1,
        ret: CType::U64,
        args: &[
            scalar("ctx", CType::Ptr("pktgen_ctx")),
            scalar("batch", CType::Ptr("pktgen_batch")),
        ],
    },
    AbiFn {
        name: "pktgen_delete",
        version: 1,
        ret: CType::Void,
        args: &[scalar("ctx", CType::Ptr("pktgen_ctx"))],
    },
];

/// Highest shipped version of `name`, if it exists at all.
pub fn latest_version(name: &str) -> Option<u32> {
    FUNCTIONS.iter().filter(|f| f.name == name).map(|f| f.version).max()
}

/// Each function name once, in table order, with its highest version.
fn latest_symbols() -> Vec<(&'static str, u32)> {
    let mut out: Vec<(&'static str, u32)> = Vec::new();
    for decl in FUNCTIONS {
        match out.iter_mut().find(|(name, _)| *name == decl.name) {
            Some(entry) => entry.1 = entry.1.max(decl.version),
            None => out.push((decl.name, decl.version)),
        }
    }
    out
}

fn constant(name: &str) -> Option<u64> {
    CONSTANTS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Size, alignment and field offsets of a table struct under C's natural alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CLayout {
    pub size: usize,
    pub align: usize,
    pub offsets: Vec<usize>,
}

fn type_layout(ty: CType) -> Option<(usize, usize)> {
    match ty {
        CType::Void => None,
        CType::U8 => Some((1, 1)),
        CType::U16 => Some((2, 2)),
        CType::U64 => Some((8, 8)),
        CType::Ptr(_) => Some((size_of::<usize>(), align_of::<usize>())),
        CType::Struct(name) => struct_layout(name).map(|l| (l.size, l.align)),
    }
}

fn round_up(n: usize, align: usize) -> usize {
    n.div_ceil(align) * align
}

/// Layout of the `STRUCTS` entry called `name`, as a C compiler would lay it out.
pub fn struct_layout(name: &str) -> Option<CLayout> {
    let decl = STRUCTS.iter().find(|s| s.name == name)?;
    let mut offset = 0;
    let mut align = 1;
    let mut offsets = Vec::with_capacity(decl.fields.len());
    for f in decl.fields {
        let (size, field_align) = type_layout(f.ty)?;
        let count = match f.len {
            Some(len) => constant(len)? as usize,
            None => 1,
        };
        offset = round_up(offset, field_align);
        offsets.push(offset);
        offset += size * count;
        align = align.max(field_align);
    }
    Some(CLayout {
        size: round_up(offset, align),
        align,
        offsets,
    })
}

fn c_type_str(ty: CType) -> String {
    match ty {
        CType::Void => "void".to_string(),
        CType::U8 => "uint8_t".to_string(),
        CType::U16 => "uint16_t".to_string(),
        CType::U64 => "uint64_t".to_string(),
        CType::Struct(name) => format!("{}_t", name),
        CType::Ptr(name) => format!("{}_t*", name),
    }
}

fn c_field_str(f: &Field) -> String {
    match f.len {
        Some(len) => format!("{} {}[{}]", c_type_str(f.ty), f.name, len),
        None => format!("{} {}", c_type_str(f.ty), f.name),
    }
}

fn c_fn(out: &mut impl Write, decl: &AbiFn) -> fmt::Result {
    let args = if decl.args.is_empty() {
        "void".to_string()
    } else {
        decl.args.iter().map(c_field_str).collect::<Vec<_>>().join(", ")
    };
    writeln!(out, "{} {}({});", c_type_str(decl.ret), decl.symbol(), args)
}

fn c_struct(out: &mut impl Write, decl: &AbiStruct) -> fmt::Result {
    writeln!(out, "typedef struct {} {}_t;", decl.name, decl.name)?;
    writeln!(out, "struct {} {{", decl.name)?;
    for f in decl.fields {
        writeln!(out, "  {};", c_field_str(f))?;
    }
    writeln!(out, "}};")
}

pub fn write_header(out: &mut impl Write) -> fmt::Result {
    writeln!(out, "#pragma once")?;
    writeln!(out, "#include <stdint.h>")?;
    writeln!(out)?;

    for (name, value) in CONSTANTS {
        writeln!(out, "#define {} {}", name, value)?;
    }
    writeln!(out)?;
    for (name, status) in STATUSES {
        writeln!(out, "#define {} {}", name, status.code())?;
    }
    writeln!(out)?;

    for name in OPAQUE {
        writeln!(out, "typedef struct {} {}_t;", name, name)?;
    }
    writeln!(out)?;

    for decl in STRUCTS {
        c_struct(out, decl)?;
        writeln!(out)?;
    }

    for decl in FUNCTIONS {
        c_fn(out, decl)?;
    }
    writeln!(out)?;

    // Unversioned names bind new code to the latest symbol.
    for (name, version) in latest_symbols() {
        writeln!(out, "#define {} {}_v{}", name, name, version)?;
    }
    Ok(())
}

pub fn c_header() -> String {
    let mut out = String::new();
    write_header(&mut out).unwrap();
    out
}

fn rust_type_str(ty: CType) -> String {
    match ty {
        CType::Void => "()".to_string(),
        CType::U8 => "u8".to_string(),
        CType::U16 => "u16".to_string(),
        CType::U64 => "u64".to_string(),
        CType::Struct(name) => name.to_string(),
        CType::Ptr(name) => format!("*mut {}", name),
    }
}

fn rust_field_str(f: &Field) -> String {
    match f.len {
        Some(len) => format!("{}: [{}; {}]", f.name, rust_type_str(f.ty), len),
        None => format!("{}: {}", f.name, rust_type_str(f.ty)),
    }
}

fn rust_fn(out: &mut impl Write, decl: &AbiFn) -> fmt::Result {
    let args = decl.args.iter().map(rust_field_str).collect::<Vec<_>>().join(", ");
    let ret = match decl.ret {
        CType::Void => String::new(),
        ty => format!(" -> {}", rust_type_str(ty)),
    };
    writeln!(out, "    pub fn {}({}){};", decl.symbol(), args, ret)
}

fn rust_struct(out: &mut impl Write, decl: &AbiStruct) -> fmt::Result {
    writeln!(out, "#[repr(C)]")?;
    writeln!(out, "pub struct {} {{", decl.name)?;
    for f in decl.fields {
        writeln!(out, "    pub {},", rust_field_str(f))?;
    }
    writeln!(out, "}}")
}

pub fn write_rust_bindings(out: &mut impl Write) -> fmt::Result {
    for (name, value) in CONSTANTS {
        writeln!(out, "pub const {}: usize = {};", name, value)?;
    }
    writeln!(out)?;
    for (name, status) in STATUSES {
        writeln!(out, "pub const {}: u64 = {};", name, status.code())?;
    }
    writeln!(out)?;

    for name in OPAQUE {
        writeln!(out, "#[repr(C)]")?;
        writeln!(out, "pub struct {} {{", name)?;
        writeln!(out, "    _opaque_data: [u8; 0],")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
    }

    for decl in STRUCTS {
        rust_struct(out, decl)?;
        writeln!(out)?;
    }

    writeln!(out, "extern \"C\" {{")?;
    for decl in FUNCTIONS {
        rust_fn(out, decl)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    for (name, version) in latest_symbols() {
        writeln!(out, "pub use self::{}_v{} as {};", name, version, name)?;
    }
    Ok(())
}

pub fn rust_bindings() -> String {
    let mut out = String::new();
    write_rust_bindings(&mut out).unwrap();
    out
}
