use std::collections::VecDeque;
use std::fmt::Write as _;

use emu101_core::Bus;

use crate::alu::{self, Operands};
use crate::encoding::{AddrMode, BRK, Compute, Dest, Fields, HLT, Io, Source};

/// The three-phase instruction cycle. A tagged enum with a `match` per tick
/// rather than a handler-per-phase table — see DESIGN NOTES in spec.md §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fetch,
    Decode,
    Execute,
}

/// The EMU101 CPU: registers, the 2-deep fetch pipeline, and the phase FSM.
///
/// `tick` advances exactly one phase and returns `false` once the CPU has
/// halted (on `HLT` or `BRK`); after that, further calls are no-ops.
pub struct Cpu {
    // Address registers.
    ip: u16,
    sp: u16,
    dp: u16,
    // Data registers.
    d0: u16,
    d1: u16,
    d2: u16,
    // Internal registers.
    instruction: u16,
    immediate: u16,
    data_in: u16,
    alu_out: u16,
    flags: u16,
    pipeline: VecDeque<u16>,

    phase: Phase,
    fields: Option<Fields>,
    halted: bool,
    broke: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ip: 0xF000,
            sp: 0x01FF,
            dp: 0x0200,
            d0: 0,
            d1: 0,
            d2: 0,
            instruction: 0,
            immediate: 0,
            data_in: 0,
            alu_out: 0,
            flags: 0,
            pipeline: VecDeque::with_capacity(2),
            phase: Phase::Fetch,
            fields: None,
            halted: false,
            broke: false,
        }
    }

    #[must_use]
    pub fn ip(&self) -> u16 {
        self.ip
    }
    #[must_use]
    pub fn sp(&self) -> u16 {
        self.sp
    }
    #[must_use]
    pub fn dp(&self) -> u16 {
        self.dp
    }
    #[must_use]
    pub fn d0(&self) -> u16 {
        self.d0
    }
    #[must_use]
    pub fn d1(&self) -> u16 {
        self.d1
    }
    #[must_use]
    pub fn d2(&self) -> u16 {
        self.d2
    }
    #[must_use]
    pub fn flags(&self) -> u16 {
        self.flags
    }
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.broke
    }
    #[must_use]
    pub fn pipeline_len(&self) -> usize {
        self.pipeline.len()
    }

    /// Advance exactly one phase. Returns `false` iff the CPU is halted
    /// (having just executed `HLT` or `BRK`, or already halted before this
    /// call).
    pub fn tick(&mut self, bus: &mut impl Bus) -> bool {
        if self.halted {
            return false;
        }
        match self.phase {
            Phase::Fetch => self.fetch(bus),
            Phase::Decode => self.decode(),
            Phase::Execute => self.execute(bus),
        }
        !self.halted
    }

    fn fetch(&mut self, bus: &mut impl Bus) {
        let word = bus.read(self.ip);
        self.ip = self.ip.wrapping_add(1);
        self.pipeline.push_back(word);
        match self.pipeline.len() {
            2 => self.phase = Phase::Decode,
            len if len > 2 => self.fatal("pipeline overflow"),
            _ => {}
        }
    }

    fn decode(&mut self) {
        let word = self.pipeline.pop_front().unwrap_or_else(|| self.fatal("decode with empty pipeline"));
        self.instruction = word;
        match word {
            HLT => self.halted = true,
            BRK => {
                self.broke = true;
                self.halted = true;
            }
            _ => {
                self.fields = Some(Fields::decode(word));
                self.phase = Phase::Execute;
            }
        }
    }

    fn execute(&mut self, bus: &mut impl Bus) {
        let fields = self.fields.expect("execute without decoded fields");
        self.execute_alu(fields.compute);
        self.execute_io(bus, fields.io, fields.addr_mode, fields.cond);
        self.execute_writeback(fields.source, fields.dest, fields.cond);
        self.phase = Phase::Fetch;
    }

    fn execute_alu(&mut self, compute: Compute) {
        let operands = Operands { d0: self.d0, d1: self.d1, d2: self.d2, ip: self.ip, sp: self.sp, dp: self.dp };
        let result = alu::compute(compute, operands);
        self.flags = alu::flags_for(result);
        self.alu_out = result;
    }

    fn execute_io(&mut self, bus: &mut impl Bus, io: Io, addr_mode: AddrMode, cond: u16) {
        match io {
            Io::Read => {
                let addr = self.address_for_read(addr_mode);
                self.data_in = bus.read(addr);
            }
            Io::Write if self.condition_met(cond) => {
                let addr = self.address_for_write(addr_mode);
                bus.write(addr, self.alu_out);
            }
            Io::Write => {}
        }
    }

    fn execute_writeback(&mut self, source: Source, dest: Dest, cond: u16) {
        let value = match source {
            Source::Zero => 0,
            Source::Alu => self.alu_out,
            Source::Data => self.data_in,
            // The immediate is structurally part of the instruction: it is
            // always popped, whether or not the condition fires.
            Source::Immediate => {
                let word = self.pipeline.pop_front().unwrap_or_else(|| self.fatal("missing immediate word"));
                self.immediate = word;
                word
            }
        };

        if !self.condition_met(cond) {
            return;
        }

        match dest {
            Dest::D0 => self.d0 = value,
            Dest::D1 => self.d1 = value,
            Dest::D2 => self.d2 = value,
            Dest::Ip => {
                self.ip = value;
                self.pipeline.clear();
            }
            Dest::Sp => self.sp = value,
            Dest::Dp => self.dp = value,
            Dest::N1 | Dest::N2 => {}
        }
    }

    fn condition_met(&self, cond: u16) -> bool {
        (self.flags & cond) != 0
    }

    fn address_for_read(&mut self, mode: AddrMode) -> u16 {
        match mode {
            AddrMode::Dp => self.dp,
            AddrMode::Sp => {
                let addr = self.sp;
                self.sp = self.sp.wrapping_add(1);
                addr
            }
            AddrMode::DpD0 => self.dp.wrapping_add(self.d0),
            AddrMode::SpD0 => self.sp.wrapping_add(self.d0),
        }
    }

    fn address_for_write(&mut self, mode: AddrMode) -> u16 {
        match mode {
            AddrMode::Dp => self.dp,
            AddrMode::Sp => {
                self.sp = self.sp.wrapping_sub(1);
                self.sp
            }
            AddrMode::DpD0 => self.dp.wrapping_add(self.d0),
            AddrMode::SpD0 => self.sp.wrapping_add(self.d0),
        }
    }

    /// A register dump in the style of the original's `core_dump`: hex and
    /// binary for each register, plus the pipeline contents.
    #[must_use]
    pub fn core_dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "EMU101 Core Dump -------------------");
        let _ = writeln!(out, "phase: {:?}", self.phase);
        let _ = writeln!(out);
        let _ = writeln!(out, "ip: {:04x} ({:016b})", self.ip, self.ip);
        let _ = writeln!(out, "sp: {:04x} ({:016b})", self.sp, self.sp);
        let _ = writeln!(out, "dp: {:04x} ({:016b})", self.dp, self.dp);
        let _ = writeln!(out, "d0: {:04x} ({:016b})", self.d0, self.d0);
        let _ = writeln!(out, "d1: {:04x} ({:016b})", self.d1, self.d1);
        let _ = writeln!(out, "d2: {:04x} ({:016b})", self.d2, self.d2);
        let _ = writeln!(out);
        let _ = writeln!(out, "instruction: {:016b}", self.instruction);
        let _ = writeln!(out, "immediate:   {:04x}", self.immediate);
        let pipeline: Vec<String> = self.pipeline.iter().map(|w| format!("{w:04x}")).collect();
        let _ = writeln!(out, "pipeline:   [{}]", pipeline.join(", "));
        let _ = writeln!(out);
        let _ = writeln!(out, "data_in: {:04x}", self.data_in);
        let _ = writeln!(out, "alu_out: {:04x}", self.alu_out);
        let _ = writeln!(out, "flags:   {:03b}", self.flags);
        out
    }

    /// An internal invariant was violated (pipeline overflow, decode with an
    /// empty pipeline, ...). This is a bug in the CPU itself, not a
    /// reachable program or user error, so it panics — after printing a
    /// register dump, per spec §7's error taxonomy.
    fn fatal(&self, message: &str) -> ! {
        eprintln!("{}", self.core_dump());
        panic!("internal invariant violation: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu101_core::Ram;

    fn run_program(words: &[u16]) -> (Cpu, Ram) {
        let mut ram = Ram::new(0x10000);
        for (i, &w) in words.iter().enumerate() {
            ram.write(0xF000_u16.wrapping_add(i as u16), w);
        }
        let mut cpu = Cpu::new();
        while cpu.tick(&mut ram) {}
        (cpu, ram)
    }

    #[test]
    fn ldp_immediate_scenario_a() {
        let (cpu, _ram) = run_program(&[0x00F7, 0xABCD, HLT]);
        assert_eq!(cpu.dp(), 0xABCD);
    }

    #[test]
    fn memory_write_at_dp_scenario_b() {
        let (_cpu, mut ram) = run_program(&[0x00F7, 0xABCD, 0x00C7, 0xBEEF, 0x833F, HLT]);
        assert_eq!(ram.read(0xABCD), 0xBEEF);
    }

    #[test]
    fn memory_read_at_dp_scenario_c() {
        let mut ram = Ram::new(0x10000);
        ram.write(0xABCD, 0xBEEF);
        for (i, &w) in [0x00F7u16, 0xABCD, 0x0087, HLT].iter().enumerate() {
            ram.write(0xF000_u16.wrapping_add(i as u16), w);
        }
        let mut cpu = Cpu::new();
        while cpu.tick(&mut ram) {}
        assert_eq!(cpu.d0(), 0xBEEF);
    }

    #[test]
    fn jmp_to_immediate_flushes_pipeline_scenario_d() {
        let mut ram = Ram::new(0x10000);
        ram.write(0x0000, HLT);
        for (i, &w) in [0x00E7u16, 0x0000, HLT].iter().enumerate() {
            ram.write(0xF000_u16.wrapping_add(i as u16), w);
        }
        let mut cpu = Cpu::new();
        while cpu.tick(&mut ram) {}
        assert_eq!(cpu.ip(), 0x0002);
    }

    #[test]
    fn hlt_alone_halts_with_valid_pipeline_scenario_g() {
        let (cpu, _ram) = run_program(&[HLT]);
        assert!(cpu.is_halted());
        assert!(cpu.pipeline_len() <= 2);
    }

    #[test]
    fn pipeline_length_always_in_range() {
        let mut ram = Ram::new(0x10000);
        for (i, &w) in [0x00F7u16, 0x0001, 0x00F7, 0x0002, HLT].iter().enumerate() {
            ram.write(0xF000_u16.wrapping_add(i as u16), w);
        }
        let mut cpu = Cpu::new();
        loop {
            assert!(cpu.pipeline_len() <= 2);
            if !cpu.tick(&mut ram) {
                break;
            }
        }
    }
}
