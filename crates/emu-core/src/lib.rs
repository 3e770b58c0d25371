//! Shared building blocks for instruction-stepped 8-bit CPU cores.
//!
//! Each CPU crate owns a [`Memory`] and, for the 8080 and Z80, a [`PortIo`].
//! Drivers step a core through the [`Cpu`] trait, one instruction at a time,
//! and pace it against a frame budget with [`FrameRunner`].

pub mod bits;
mod clock;
mod cpu;
mod error;
mod frame;
mod io;
mod memory;
mod observable;
mod observer;
mod ticks;

pub use bits::FlagRegister;
pub use clock::MasterClock;
pub use cpu::{Cpu, InterruptRequest};
pub use error::{DecodeError, MemoryError};
pub use frame::{FrameConfig, FrameOutcome, FramePhase, FrameRunner};
pub use io::{InObserver, OutObserver, PortIo};
pub use memory::{ADDRESS_SPACE, MapperAccess, Memory, OPEN_BUS, WriteObserver};
pub use observable::{Observable, Value};
pub use observer::{ObserverId, Observers};
pub use ticks::Ticks;
