//! # Architectures
//!
//! Target architecture descriptors.
//!
//! An [`Architecture`] is the long-lived owner of synthetic types: it knows
//! its byte order and address width, and it carries the architecture-scoped
//! [`TypeArena`] that lives as long as the architecture itself. Types that are
//! not tied to any particular module (a `uint24_t` for a register view, say)
//! are allocated there.
//!
//! Machine identification reuses [`object::Architecture`] so that the address
//! width comes from the same table the binary readers use.

use std::fmt;
use std::rc::Rc;

use object::Architecture as Machine;

use crate::arena::{ArenaScope, TypeArena};

/// Byte order of an architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder
{
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
    /// The architecture did not report a usable byte order.
    Unknown,
}

impl ByteOrder
{
    /// Map onto gimli's runtime endianness, if the byte order is known.
    #[must_use]
    pub fn to_runtime_endian(self) -> Option<gimli::RunTimeEndian>
    {
        match self {
            ByteOrder::Little => Some(gimli::RunTimeEndian::Little),
            ByteOrder::Big => Some(gimli::RunTimeEndian::Big),
            ByteOrder::Unknown => None,
        }
    }
}

impl fmt::Display for ByteOrder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
            ByteOrder::Unknown => "unknown",
        };
        f.pad(label)
    }
}

/// Architectures the session can instantiate by name.
///
/// The first column is the canonical name; `x86` is accepted as an alias of
/// `i386` because that is what `std::env::consts::ARCH` reports.
pub const KNOWN_ARCHITECTURES: &[(&str, Machine, ByteOrder)] = &[
    ("i386", Machine::I386, ByteOrder::Little),
    ("x86_64", Machine::X86_64, ByteOrder::Little),
    ("aarch64", Machine::Aarch64, ByteOrder::Little),
    ("arm", Machine::Arm, ByteOrder::Little),
    ("riscv32", Machine::Riscv32, ByteOrder::Little),
    ("riscv64", Machine::Riscv64, ByteOrder::Little),
    ("loongarch64", Machine::LoongArch64, ByteOrder::Little),
    ("powerpc", Machine::PowerPc, ByteOrder::Big),
    ("powerpc64", Machine::PowerPc64, ByteOrder::Big),
    ("s390x", Machine::S390x, ByteOrder::Big),
    ("mips", Machine::Mips, ByteOrder::Big),
    ("mips64", Machine::Mips64, ByteOrder::Big),
    ("sparc64", Machine::Sparc64, ByteOrder::Big),
];

/// A target architecture and its type arena.
///
/// ## Example
///
/// ```rust
/// use symforge_core::arch::{Architecture, ByteOrder};
///
/// let arch = Architecture::by_name("x86_64", None).unwrap();
/// assert_eq!(arch.byte_order(), ByteOrder::Little);
/// assert_eq!(arch.address_bits(), 64);
/// ```
pub struct Architecture
{
    name: String,
    machine: Machine,
    byte_order: ByteOrder,
    address_bits: u32,
    arena: Rc<TypeArena>,
}

impl Architecture
{
    /// Create an architecture descriptor with a fresh arena.
    ///
    /// `arena_limit` caps the number of bytes the architecture's arena will
    /// hand out; `None` means unlimited.
    pub fn new(name: impl Into<String>, machine: Machine, byte_order: ByteOrder, arena_limit: Option<usize>) -> Rc<Self>
    {
        let name = name.into();
        let address_bits = machine.address_size().map_or(0, |size| u32::from(size.bytes()) * 8);
        let arena = TypeArena::new(ArenaScope::Architecture(name.clone()), arena_limit);
        Rc::new(Self {
            name,
            machine,
            byte_order,
            address_bits,
            arena,
        })
    }

    /// Instantiate one of the [`KNOWN_ARCHITECTURES`] by name.
    ///
    /// Returns `None` for names not in the table.
    pub fn by_name(name: &str, arena_limit: Option<usize>) -> Option<Rc<Self>>
    {
        let canonical = canonical_name(name);
        KNOWN_ARCHITECTURES
            .iter()
            .find(|(known, _, _)| *known == canonical)
            .map(|(known, machine, byte_order)| Self::new(*known, *machine, *byte_order, arena_limit))
    }

    /// Name of the architecture the debugger itself was compiled for.
    pub fn host_name() -> &'static str
    {
        canonical_name(std::env::consts::ARCH)
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn machine(&self) -> Machine
    {
        self.machine
    }

    pub fn byte_order(&self) -> ByteOrder
    {
        self.byte_order
    }

    /// Width of an address in bits (0 if the machine does not say).
    pub fn address_bits(&self) -> u32
    {
        self.address_bits
    }

    /// The architecture-scoped arena.
    pub fn arena(&self) -> &Rc<TypeArena>
    {
        &self.arena
    }
}

impl fmt::Debug for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Architecture")
            .field("name", &self.name)
            .field("machine", &self.machine)
            .field("byte_order", &self.byte_order)
            .field("address_bits", &self.address_bits)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name)
    }
}

fn canonical_name(name: &str) -> &str
{
    match name {
        "x86" => "i386",
        "arm64" => "aarch64",
        other => other,
    }
}
