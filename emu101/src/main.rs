//! EMU101 emulator CLI: `emu101 PROG` loads a flat binary of big-endian
//! 16-bit words at ROM base and runs it to a halt.

use std::process;

use emu101_core::{Device, MappedBus, Ram, Rom};
use emu101_cpu::Cpu;

/// `0x0000..=0xEFFE` per the fixed memory map.
const RAM_SIZE: u16 = 0xEFFF;
/// `0xF000..=0xFFFF`.
const ROM_BASE: u16 = 0xF000;
const ROM_SIZE: u16 = 0x1000;

const ROM_DEVICE: usize = 1;

fn parse_args() -> Result<String, &'static str> {
    let args: Vec<String> = std::env::args().collect();
    match args.as_slice() {
        [_, prog] => Ok(prog.clone()),
        _ => Err("usage: emu101 PROG"),
    }
}

fn build_machine() -> MappedBus {
    MappedBus::new(vec![
        (0x0000, RAM_SIZE, Device::Ram(Ram::new(RAM_SIZE as usize))),
        (ROM_BASE, ROM_SIZE, Device::Rom(Rom::new(ROM_SIZE as usize))),
    ])
    .expect("RAM and ROM ranges do not overlap")
}

/// Ticks the CPU to a halt. Returns `Err` if an internal invariant
/// violation panicked mid-run — caught here so `main` can map it to a
/// nonzero exit after the CPU has already printed its register dump.
fn run(cpu: &mut Cpu, bus: &mut MappedBus) -> Result<(), String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        while cpu.tick(bus) {}
    }))
    .map_err(|_| "internal invariant violation".to_string())
}

fn main() {
    let prog_path = match parse_args() {
        Ok(path) => path,
        Err(usage) => {
            eprintln!("{usage}");
            process::exit(2);
        }
    };

    let prog = match std::fs::read(&prog_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let mut bus = build_machine();
    bus.load(ROM_DEVICE, &prog, 0);

    let mut cpu = Cpu::new();
    if run(&mut cpu, &mut bus).is_err() {
        process::exit(1);
    }
    if cpu.is_broken() {
        eprintln!("{}", cpu.core_dump());
    }
}
