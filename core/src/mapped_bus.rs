use std::fmt;

use crate::{Bus, Ram, Rom};

/// The two device kinds EMU101 maps onto its bus.
///
/// A tagged enum rather than a trait-object registry — per the design
/// notes, there are exactly two device kinds (no peripherals), so a flat
/// variant is simpler than a capability interface or a class hierarchy.
pub enum Device {
    Rom(Rom),
    Ram(Ram),
}

impl Device {
    fn read(&mut self, addr: u16) -> u16 {
        match self {
            Device::Rom(rom) => rom.read(addr),
            Device::Ram(ram) => ram.read(addr),
        }
    }

    fn write(&mut self, addr: u16, value: u16) {
        match self {
            Device::Rom(rom) => rom.write(addr, value),
            Device::Ram(ram) => ram.write(addr, value),
        }
    }

    fn load(&mut self, bytes: &[u8], at: u16) {
        match self {
            Device::Rom(rom) => rom.load(bytes, at),
            Device::Ram(ram) => ram.load(bytes, at),
        }
    }
}

/// Construction-time failure: two device ranges overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError {
    pub address: u16,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlapping device ranges at address {:#06x}", self.address)
    }
}

impl std::error::Error for BusError {}

/// Dispatches 16-bit bus addresses to one of a fixed set of devices.
///
/// Built from a list of `(start, length, device)` ranges. Address lookup is
/// O(1): a 64Ki-entry table computed once at construction maps every
/// address directly to a device index, mirroring the original's flat
/// `_map` array (see `original_source/emu101/bus.py`). Ranges are assumed
/// non-overlapping by the caller; construction rejects an overlap it
/// actually detects rather than silently letting the later range win.
pub struct MappedBus {
    devices: Vec<Device>,
    bases: Vec<u16>,
    map: Box<[Option<u8>; 0x1_0000]>,
}

impl MappedBus {
    /// Build a bus from non-overlapping `(start, length, device)` ranges.
    pub fn new(ranges: Vec<(u16, u16, Device)>) -> Result<Self, BusError> {
        let mut map: Box<[Option<u8>; 0x1_0000]> =
            vec![None; 0x1_0000].into_boxed_slice().try_into().expect("fixed-size allocation");
        let mut devices = Vec::with_capacity(ranges.len());
        let mut bases = Vec::with_capacity(ranges.len());

        for (index, (start, len, device)) in ranges.into_iter().enumerate() {
            let index = u8::try_from(index).expect("more than 256 bus devices");
            let mut addr = start;
            for _ in 0..len {
                let slot = &mut map[addr as usize];
                if slot.is_some() {
                    return Err(BusError { address: addr });
                }
                *slot = Some(index);
                addr = addr.wrapping_add(1);
            }
            bases.push(start);
            devices.push(device);
        }

        Ok(Self { devices, bases, map })
    }

    /// Load a byte stream directly into the device at `device_index`,
    /// bypassing the ordinary (possibly read-only) write path. This is the
    /// only way to populate ROM — it is a host-side operation, not
    /// something a running program can trigger.
    pub fn load(&mut self, device_index: usize, bytes: &[u8], at: u16) {
        self.devices[device_index].load(bytes, at);
    }
}

impl Bus for MappedBus {
    fn read(&mut self, addr: u16) -> u16 {
        match self.map[addr as usize] {
            Some(index) => {
                let base = self.bases[index as usize];
                self.devices[index as usize].read(addr.wrapping_sub(base))
            }
            None => 0,
        }
    }

    fn write(&mut self, addr: u16, value: u16) {
        if let Some(index) = self.map[addr as usize] {
            let base = self.bases[index as usize];
            self.devices[index as usize].write(addr.wrapping_sub(base), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bus() -> MappedBus {
        MappedBus::new(vec![
            (0x0000, 5, Device::Ram(Ram::new(5))),
            (0x0005, 5, Device::Ram(Ram::new(5))),
        ])
        .unwrap()
    }

    #[test]
    fn reads_and_writes_route_to_the_right_device_with_rebased_address() {
        let mut bus = test_bus();
        bus.write(0x0007, 0x1234);
        assert_eq!(bus.read(0x0007), 0x1234);
        // second device's address 2 (0x0007 - base 0x0005), not first device's.
        bus.write(0x0002, 0xBEEF);
        assert_eq!(bus.read(0x0002), 0xBEEF);
        assert_eq!(bus.read(0x0007), 0x1234);
    }

    #[test]
    fn unmapped_reads_are_zero_and_writes_are_dropped() {
        let mut bus = test_bus();
        bus.write(0x00FF, 0xDEAD);
        assert_eq!(bus.read(0x00FF), 0);
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let err = MappedBus::new(vec![
            (0x0000, 5, Device::Ram(Ram::new(5))),
            (0x0003, 5, Device::Ram(Ram::new(5))),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn rom_write_through_the_mapped_bus_is_a_no_op_but_load_is_not() {
        let mut bus = MappedBus::new(vec![(0x0000, 4, Device::Rom(Rom::new(4)))]).unwrap();
        bus.write(0x0000, 0xFFFF);
        assert_eq!(bus.read(0x0000), 0);
        bus.load(0, &[0xAB, 0xCD], 0);
        assert_eq!(bus.read(0x0000), 0xABCD);
    }
}
