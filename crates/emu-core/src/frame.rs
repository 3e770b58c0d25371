//! Two-phase frame driver.
//!
//! Arcade boards of this era assert one interrupt when the beam reaches the
//! middle of the screen and another at VBLANK. A frame is therefore run as
//! two halves of its cycle budget:
//!
//! 1. run the first phase,
//! 2. let peripherals catch up (draw the top half, poll input),
//! 3. inject the mid-frame interrupt if the CPU accepts interrupts,
//! 4. run the rest of the budget,
//! 5. let peripherals catch up again and inject the end-of-frame interrupt.
//!
//! Each phase runs until its budget is reached or exceeded; the overshoot is
//! not carried into the next phase.
//!
//! A breakpoint suspends the frame. The next `run_frame` call resumes it in
//! the same phase with the rest of that phase's budget, so the interrupts
//! land where they would have without the stop.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{Cpu, DecodeError, InterruptRequest, MasterClock, Ticks};

/// Where in the frame a peripheral callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    MidFrame,
    EndOfFrame,
}

/// Frame timing for a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameConfig {
    pub clock: MasterClock,
    pub frames_per_second: u64,
    /// Cycles run before the mid-frame point. `None` splits the frame in half.
    pub first_phase_cycles: Option<u64>,
    pub mid_frame_interrupt: Option<InterruptRequest>,
    pub end_of_frame_interrupt: Option<InterruptRequest>,
}

impl FrameConfig {
    /// A 60 Hz frame split in half with no interrupts.
    #[must_use]
    pub const fn new(clock: MasterClock) -> Self {
        Self {
            clock,
            frames_per_second: 60,
            first_phase_cycles: None,
            mid_frame_interrupt: None,
            end_of_frame_interrupt: None,
        }
    }

    #[must_use]
    pub const fn cycles_per_frame(&self) -> Ticks {
        self.clock.cycles_per_frame(self.frames_per_second)
    }

    #[must_use]
    pub const fn first_phase(&self) -> Ticks {
        match self.first_phase_cycles {
            Some(cycles) => Ticks::new(cycles),
            None => Ticks::new(self.cycles_per_frame().get() / 2),
        }
    }

    #[must_use]
    pub fn second_phase(&self) -> Ticks {
        self.cycles_per_frame() - self.first_phase()
    }
}

/// How a frame ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameOutcome {
    /// The whole budget ran.
    Completed { cycles: Ticks },
    /// Execution reached a breakpoint. The instruction at `pc` has not run
    /// and the frame is suspended until the next `run_frame`.
    Breakpoint { pc: u16, cycles: Ticks },
    /// The CPU can no longer run (stopped, or the PC left memory).
    Stopped { cycles: Ticks },
}

enum PhaseEnd {
    Budget,
    Breakpoint(u16),
    Stopped,
}

/// Where a suspended frame picks up again.
#[derive(Debug, Clone, Copy, Default)]
struct Suspended {
    phase: usize,
    spent_in_phase: Ticks,
    total: Ticks,
}

/// Runs frames against a CPU, honouring breakpoints.
#[derive(Debug, Clone)]
pub struct FrameRunner {
    config: FrameConfig,
    breakpoints: BTreeSet<u16>,
    suspended: Option<Suspended>,
}

impl FrameRunner {
    #[must_use]
    pub fn new(config: FrameConfig) -> Self {
        Self {
            config,
            breakpoints: BTreeSet::new(),
            suspended: None,
        }
    }

    /// True while a frame stopped at a breakpoint is waiting to resume.
    #[must_use]
    pub fn is_mid_frame(&self) -> bool {
        self.suspended.is_some()
    }

    /// Drop a suspended frame so the next `run_frame` starts from the top.
    pub fn restart_frame(&mut self) {
        self.suspended = None;
    }

    #[must_use]
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn add_breakpoint(&mut self, pc: u16) {
        self.breakpoints.insert(pc);
    }

    pub fn remove_breakpoint(&mut self, pc: u16) -> bool {
        self.breakpoints.remove(&pc)
    }

    #[must_use]
    pub fn has_breakpoint(&self, pc: u16) -> bool {
        self.breakpoints.contains(&pc)
    }

    /// Run one frame, or the rest of a suspended one. `peripherals` is
    /// called at the mid-frame point and at the end of the frame, before the
    /// corresponding interrupt is injected. Reported cycles count from the
    /// start of the frame.
    pub fn run_frame<C: Cpu>(
        &mut self,
        cpu: &mut C,
        mut peripherals: impl FnMut(&mut C, FramePhase),
    ) -> Result<FrameOutcome, DecodeError> {
        let resume = self.suspended.take().unwrap_or_default();
        let mut total = resume.total;

        let phases = [
            (
                self.config.first_phase(),
                FramePhase::MidFrame,
                self.config.mid_frame_interrupt,
            ),
            (
                self.config.second_phase(),
                FramePhase::EndOfFrame,
                self.config.end_of_frame_interrupt,
            ),
        ];
        for (index, (budget, phase, request)) in phases.into_iter().enumerate().skip(resume.phase) {
            let spent = if index == resume.phase {
                resume.spent_in_phase
            } else {
                Ticks::ZERO
            };
            let (cycles, end) = self.run_phase(cpu, budget - spent)?;
            total = total + cycles;
            match end {
                PhaseEnd::Budget => {}
                PhaseEnd::Breakpoint(pc) => {
                    debug!(pc = format_args!("{pc:#06x}"), ?phase, "breakpoint hit");
                    self.suspended = Some(Suspended {
                        phase: index,
                        spent_in_phase: spent + cycles,
                        total,
                    });
                    return Ok(FrameOutcome::Breakpoint { pc, cycles: total });
                }
                PhaseEnd::Stopped => return Ok(FrameOutcome::Stopped { cycles: total }),
            }

            peripherals(cpu, phase);
            if let Some(request) = request
                && cpu.is_interrupt_enabled()
            {
                cpu.interrupt(request);
            }
        }

        Ok(FrameOutcome::Completed { cycles: total })
    }

    fn run_phase<C: Cpu>(&self, cpu: &mut C, budget: Ticks) -> Result<(Ticks, PhaseEnd), DecodeError> {
        let mut cycles = Ticks::ZERO;
        while cycles < budget {
            if !cpu.can_run_next_instruction() {
                return Ok((cycles, PhaseEnd::Stopped));
            }
            cycles += cpu.next_instruction()?;
            if self.has_breakpoint(cpu.pc()) {
                return Ok((cycles, PhaseEnd::Breakpoint(cpu.pc())));
            }
        }
        Ok((cycles, PhaseEnd::Budget))
    }
}
