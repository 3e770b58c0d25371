//! Composable 64 KiB address space.
//!
//! Memory is built at load time by appending blocks in order (ROM, then RAM,
//! and so on); each block starts where the previous one ended. Once the real
//! storage is in place, a link can mirror a range of it over the rest of the
//! space, which seals it.
//!
//! Every access goes through the same steps:
//!
//! 1. the address is ANDed with the address mask,
//! 2. a custom mapper covering the address gets first say,
//! 3. a mirrored address is folded back onto its source range,
//! 4. the backing byte is read or written.
//!
//! Writes then notify every write observer, whether or not a mapper took the
//! write. Addresses past the populated space read as `0xFF` (open bus) and
//! swallow writes.

use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::error::MemoryError;
use crate::observer::{ObserverId, Observers};

/// Size of the logical address space for all three ISAs.
pub const ADDRESS_SPACE: usize = 0x1_0000;

/// Value returned for reads that hit nothing.
pub const OPEN_BUS: u8 = 0xFF;

/// What a write mapper did with a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperAccess {
    /// The mapper consumed the write; backing storage is untouched.
    Handled,
    /// Fall through to the backing storage.
    Passthrough,
}

/// Notified after every write.
pub trait WriteObserver {
    fn memory_changed(&mut self, address: u16, value: u8);
}

impl<F: FnMut(u16, u8)> WriteObserver for F {
    fn memory_changed(&mut self, address: u16, value: u8) {
        self(address, value);
    }
}

type ReadFn = Box<dyn FnMut(u16) -> Option<u8>>;
type WriteFn = Box<dyn FnMut(u16, u8) -> MapperAccess>;

struct Mapper<F: ?Sized> {
    range: RangeInclusive<u16>,
    handler: Box<F>,
}

/// Addresses from `start` to the top of the space repeat `[source, source + len)`.
#[derive(Debug, Clone, Copy)]
struct Mirror {
    start: usize,
    source: usize,
    len: usize,
}

pub struct Memory {
    storage: Vec<u8>,
    mirror: Option<Mirror>,
    mask: u16,
    read_mappers: Vec<Mapper<dyn FnMut(u16) -> Option<u8>>>,
    write_mappers: Vec<Mapper<dyn FnMut(u16, u8) -> MapperAccess>>,
    observers: Observers<dyn WriteObserver>,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            mirror: None,
            mask: 0xFFFF,
            read_mappers: Vec::new(),
            write_mappers: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Append a block directly after the current end of the space.
    pub fn add(&mut self, block: &[u8]) -> Result<(), MemoryError> {
        if self.mirror.is_some() {
            return Err(MemoryError::Frozen);
        }
        if self.storage.len() + block.len() > ADDRESS_SPACE {
            return Err(MemoryError::Overflow {
                size: self.storage.len(),
                added: block.len(),
            });
        }
        debug!(
            start = self.storage.len(),
            len = block.len(),
            "memory block appended"
        );
        self.storage.extend_from_slice(block);
        Ok(())
    }

    /// Mirror `[from, to)` over everything from the current end of the space
    /// up to the 64 KiB top, repeating it as often as it fits (the last copy
    /// may be partial). The space is frozen afterwards.
    pub fn add_link(&mut self, from: usize, to: usize) -> Result<(), MemoryError> {
        let size = self.storage.len();
        if self.mirror.is_some() {
            return Err(MemoryError::Frozen);
        }
        if from >= to || to > size || size >= ADDRESS_SPACE {
            return Err(MemoryError::InvalidLink { from, to, size });
        }
        debug!(from, to, start = size, "memory mirror installed");
        self.mirror = Some(Mirror {
            start: size,
            source: from,
            len: to - from,
        });
        Ok(())
    }

    /// AND every subsequent address with `mask` before any other step.
    pub fn add_address_mask(&mut self, mask: u16) {
        debug!(mask = format_args!("{mask:#06x}"), "address mask set");
        self.mask &= mask;
    }

    /// Intercept reads in `range`. Returning `None` falls through to storage.
    pub fn attach_memory_mapper_for_read(
        &mut self,
        range: RangeInclusive<u16>,
        mapper: impl FnMut(u16) -> Option<u8> + 'static,
    ) -> Result<(), MemoryError> {
        check_range(&range, self.read_mappers.iter().map(|m| &m.range))?;
        debug!(?range, "read mapper attached");
        let handler: ReadFn = Box::new(mapper);
        self.read_mappers.push(Mapper { range, handler });
        Ok(())
    }

    /// Intercept writes in `range`.
    pub fn attach_memory_mapper_for_write(
        &mut self,
        range: RangeInclusive<u16>,
        mapper: impl FnMut(u16, u8) -> MapperAccess + 'static,
    ) -> Result<(), MemoryError> {
        check_range(&range, self.write_mappers.iter().map(|m| &m.range))?;
        debug!(?range, "write mapper attached");
        let handler: WriteFn = Box::new(mapper);
        self.write_mappers.push(Mapper { range, handler });
        Ok(())
    }

    pub fn add_write_observer(&mut self, observer: impl WriteObserver + 'static) -> ObserverId {
        self.observers.add(Box::new(observer))
    }

    pub fn remove_write_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    /// Logical size of the space, mirrors included.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.mirror.is_some() {
            ADDRESS_SPACE
        } else {
            self.storage.len()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a byte as the CPU sees it.
    pub fn read(&mut self, address: u16) -> u8 {
        let address = address & self.mask;
        if let Some(mapper) = self
            .read_mappers
            .iter_mut()
            .find(|m| m.range.contains(&address))
            && let Some(value) = (mapper.handler)(address)
        {
            return value;
        }
        match self.resolve(address) {
            Some(index) => self.storage[index],
            None => {
                warn!(address = format_args!("{address:#06x}"), "read outside populated memory");
                OPEN_BUS
            }
        }
    }

    /// Write a byte as the CPU does, then notify observers.
    pub fn write(&mut self, address: u16, value: u8) {
        let address = address & self.mask;
        let access = self
            .write_mappers
            .iter_mut()
            .find(|m| m.range.contains(&address))
            .map_or(MapperAccess::Passthrough, |m| (m.handler)(address, value));

        if access == MapperAccess::Passthrough {
            match self.resolve(address) {
                Some(index) => self.storage[index] = value,
                None => {
                    warn!(address = format_args!("{address:#06x}"), "write outside populated memory");
                }
            }
        }

        for observer in self.observers.iter_mut() {
            observer.memory_changed(address, value);
        }
    }

    /// Read a byte without consulting mappers. Used by debuggers and
    /// disassemblers, which must not trigger side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.resolve(address & self.mask)
            .map_or(OPEN_BUS, |index| self.storage[index])
    }

    /// Copy `[from, to)` out of the space. Mirrors resolve; mappers do not.
    #[must_use]
    pub fn slice(&self, from: usize, to: usize) -> Vec<u8> {
        let to = to.min(self.len());
        (from..to).map(|address| self.peek(address as u16)).collect()
    }

    fn resolve(&self, address: u16) -> Option<usize> {
        let mut index = usize::from(address);
        if let Some(mirror) = self.mirror
            && index >= mirror.start
        {
            index = mirror.source + (index - mirror.start) % mirror.len;
        }
        (index < self.storage.len()).then_some(index)
    }
}

fn check_range<'a>(
    range: &RangeInclusive<u16>,
    mut existing: impl Iterator<Item = &'a RangeInclusive<u16>>,
) -> Result<(), MemoryError> {
    if range.is_empty() {
        return Err(MemoryError::EmptyRange);
    }
    if existing.any(|r| r.start() <= range.end() && range.start() <= r.end()) {
        return Err(MemoryError::OverlappingMapper {
            start: *range.start(),
            end: *range.end(),
        });
    }
    Ok(())
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for Memory {
    /// A flat space holding exactly `bytes`, truncated to 64 KiB.
    fn from(mut bytes: Vec<u8>) -> Self {
        bytes.truncate(ADDRESS_SPACE);
        Self {
            storage: bytes,
            ..Self::new()
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("len", &self.len())
            .field("storage", &self.storage.len())
            .field("mirror", &self.mirror)
            .field("mask", &format_args!("{:#06x}", self.mask))
            .field("read_mappers", &self.read_mappers.len())
            .field("write_mappers", &self.write_mappers.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
