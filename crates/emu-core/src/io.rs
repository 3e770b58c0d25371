//! The 256-port I/O space used by `IN`/`OUT` on the 8080 and Z80.
//!
//! Ports are decoupled from memory: each direction has its own table of 256
//! latched bytes. Peripherals hook in as observers. An `IN` asks every in
//! observer first, so a peripheral can latch a fresh value for the port
//! within the same call; an `OUT` stores the byte and then tells every out
//! observer about it.

use crate::observer::{ObserverId, Observers};

/// Notified before an `IN` instruction consumes a port.
pub trait InObserver {
    /// Return `Some(value)` to latch a new value for `port` before it is read.
    fn in_requested(&mut self, port: u8) -> Option<u8>;
}

/// Notified after an `OUT` instruction has stored a byte.
pub trait OutObserver {
    fn out_changed(&mut self, port: u8, value: u8);
}

impl<F: FnMut(u8) -> Option<u8>> InObserver for F {
    fn in_requested(&mut self, port: u8) -> Option<u8> {
        self(port)
    }
}

impl<F: FnMut(u8, u8)> OutObserver for F {
    fn out_changed(&mut self, port: u8, value: u8) {
        self(port, value);
    }
}

/// Port tables plus their observers.
#[derive(Debug)]
pub struct PortIo {
    inputs: [u8; 256],
    outputs: [u8; 256],
    in_observers: Observers<dyn InObserver>,
    out_observers: Observers<dyn OutObserver>,
}

impl PortIo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inputs: [0; 256],
            outputs: [0; 256],
            in_observers: Observers::new(),
            out_observers: Observers::new(),
        }
    }

    /// Latch a value that the next `IN` from `port` will read.
    pub fn input(&mut self, port: u8, value: u8) {
        self.inputs[usize::from(port)] = value;
    }

    /// The last byte written to `port` by an `OUT`.
    #[must_use]
    pub fn output(&self, port: u8) -> u8 {
        self.outputs[usize::from(port)]
    }

    /// Perform an `IN`: notify observers, then read the latch.
    pub fn read(&mut self, port: u8) -> u8 {
        for observer in self.in_observers.iter_mut() {
            if let Some(value) = observer.in_requested(port) {
                self.inputs[usize::from(port)] = value;
            }
        }
        self.inputs[usize::from(port)]
    }

    /// Perform an `OUT`: store the byte, then notify observers.
    pub fn write(&mut self, port: u8, value: u8) {
        self.outputs[usize::from(port)] = value;
        for observer in self.out_observers.iter_mut() {
            observer.out_changed(port, value);
        }
    }

    pub fn add_in_observer(&mut self, observer: impl InObserver + 'static) -> ObserverId {
        self.in_observers.add(Box::new(observer))
    }

    pub fn remove_in_observer(&mut self, id: ObserverId) -> bool {
        self.in_observers.remove(id).is_some()
    }

    pub fn add_out_observer(&mut self, observer: impl OutObserver + 'static) -> ObserverId {
        self.out_observers.add(Box::new(observer))
    }

    pub fn remove_out_observer(&mut self, id: ObserverId) -> bool {
        self.out_observers.remove(id).is_some()
    }

    /// Zero both port tables. Observers stay registered.
    pub fn clear(&mut self) {
        self.inputs.fill(0);
        self.outputs.fill(0);
    }
}

impl Default for PortIo {
    fn default() -> Self {
        Self::new()
    }
}
