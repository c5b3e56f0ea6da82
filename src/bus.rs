//! Memory bus: the 16-bit address space and everything mapped into it.
//! Drops the boot ROM overlay entirely and fixes a DMA source-address bug
//! present in earlier drafts of this module (the source address is
//! `source << 8`, not `source << 2`).

use log::{debug, trace};

use crate::cartridge::Cartridge;
use crate::interrupts::Interrupt;
use crate::joypad::{ButtonState, Joypad};
use crate::memory_map::*;
use crate::ppu::Ppu;
use crate::sound::PassiveRegisters;

pub struct Bus {
    cartridge: Cartridge,
    pub ppu: Ppu,
    joypad: Joypad,
    passive: PassiveRegisters,

    work_ram: [u8; WORK_RAM_LENGTH as usize],
    high_ram: [u8; HIGH_RAM_LENGTH as usize],

    interrupt_flag: u8,
    interrupt_enable: u8,
}

impl Bus {
    pub fn new(cartridge: Cartridge) -> Self {
        Bus {
            cartridge,
            ppu: Ppu::new(),
            joypad: Joypad::new(),
            passive: PassiveRegisters::new(),
            work_ram: [0; WORK_RAM_LENGTH as usize],
            high_ram: [0; HIGH_RAM_LENGTH as usize],
            interrupt_flag: 0,
            interrupt_enable: 0,
        }
    }

    pub fn set_buttons(&mut self, buttons: ButtonState) {
        if self.joypad.set_buttons(buttons) {
            self.request_interrupt(Interrupt::Joypad);
        }
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cartridge
    }

    /// Drives the display pipeline for the T-cycles an instruction just took,
    /// requesting VBlank/STAT interrupts as the PPU reports them.
    pub fn step_ppu(&mut self, t_cycles: u32) {
        let events = self.ppu.step(t_cycles);
        if events.vblank {
            self.request_interrupt(Interrupt::VBlank);
        }
        if events.stat {
            self.request_interrupt(Interrupt::LcdStat);
        }
    }

    pub fn pending_interrupt(&self) -> Option<Interrupt> {
        crate::interrupts::highest_priority_pending(self.interrupt_enable, self.interrupt_flag)
    }

    pub fn clear_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupt_flag &= !(1 << interrupt.bit());
    }

    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupt_flag |= 1 << interrupt.bit();
    }

    pub fn interrupt_flag(&self) -> u8 {
        self.interrupt_flag
    }

    pub fn interrupt_enable(&self) -> u8 {
        self.interrupt_enable
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        if let Some(value) = self.cartridge.read(address) {
            return value;
        }
        match address {
            VRAM_START..=0x9FFF => self.ppu.read_vram(address),
            WORK_RAM_START..=0xDFFF => self.work_ram[(address - WORK_RAM_START) as usize],
            ECHO_RAM_START..=0xFDFF => self.work_ram[(address - ECHO_RAM_START) as usize],
            OAM_START..=0xFE9F => self.ppu.read_oam(address),
            UNUSABLE_START..=0xFEFF => 0xFF,
            IO_PORTS_START..=0xFF7F => self.io_read(address),
            HIGH_RAM_START..=0xFFFE => self.high_ram[(address - HIGH_RAM_START) as usize],
            IE_REGISTER => self.interrupt_enable,
            _ => 0xFF,
        }
    }

    pub fn write_byte(&mut self, address: u16, value: u8) {
        if self.cartridge.write(address, value) {
            return;
        }
        match address {
            VRAM_START..=0x9FFF => self.ppu.write_vram(address, value),
            WORK_RAM_START..=0xDFFF => self.work_ram[(address - WORK_RAM_START) as usize] = value,
            ECHO_RAM_START..=0xFDFF => self.work_ram[(address - ECHO_RAM_START) as usize] = value,
            OAM_START..=0xFE9F => self.ppu.write_oam(address, value),
            UNUSABLE_START..=0xFEFF => trace!("write to unusable region 0x{address:04x}"),
            IO_PORTS_START..=0xFF7F => self.io_write(address, value),
            HIGH_RAM_START..=0xFFFE => self.high_ram[(address - HIGH_RAM_START) as usize] = value,
            IE_REGISTER => self.interrupt_enable = value,
            _ => {}
        }
    }

    pub fn read_word(&self, address: u16) -> u16 {
        let lo = self.read_byte(address) as u16;
        let hi = self.read_byte(address.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub fn write_word(&mut self, address: u16, value: u16) {
        self.write_byte(address, value as u8);
        self.write_byte(address.wrapping_add(1), (value >> 8) as u8);
    }

    fn io_read(&self, address: u16) -> u8 {
        match address {
            JOYPAD_REG => self.joypad.read(address).unwrap_or(0xFF),
            IF_REGISTER => self.interrupt_flag,
            DMA_REG => 0xFF,
            _ => {
                if let Some(value) = self.ppu.read(address) {
                    return value;
                }
                if let Some(value) = self.passive.read(address) {
                    return value;
                }
                trace!("read from unknown I/O port 0x{address:04x}");
                0xFF
            }
        }
    }

    fn io_write(&mut self, address: u16, value: u8) {
        match address {
            JOYPAD_REG => {
                self.joypad.write(address, value);
            }
            IF_REGISTER => self.interrupt_flag = value,
            DMA_REG => self.run_dma(value),
            SERIAL_SB | SERIAL_SC => {
                self.passive.write(address, value);
            }
            _ => {
                if self.ppu.write(address, value) {
                    return;
                }
                if self.passive.write(address, value) {
                    return;
                }
                trace!("write to unknown I/O port 0x{address:04x} = 0x{value:02x}");
            }
        }
    }

    /// OAM DMA: copies 160 bytes from `(source << 8)..+0xA0` into OAM,
    /// synchronously.
    fn run_dma(&mut self, source: u8) {
        let base = (source as u16) << 8;
        debug!("DMA transfer from 0x{base:04x}");
        for offset in 0..OAM_LENGTH {
            let value = self.read_byte(base + offset);
            self.ppu.write_oam(OAM_START + offset, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with_rom(banks: usize) -> Bus {
        Bus::new(Cartridge::new(vec![0u8; banks * ROM_BANK_SIZE]))
    }

    #[test]
    fn work_ram_round_trips() {
        let mut bus = bus_with_rom(2);
        bus.write_byte(0xC010, 0x42);
        assert_eq!(bus.read_byte(0xC010), 0x42);
    }

    #[test]
    fn echo_ram_aliases_work_ram() {
        let mut bus = bus_with_rom(2);
        bus.write_byte(0xC010, 0x7E);
        assert_eq!(bus.read_byte(0xE010), 0x7E);
    }

    #[test]
    fn unusable_region_reads_ff() {
        let bus = bus_with_rom(2);
        assert_eq!(bus.read_byte(0xFEB0), 0xFF);
    }

    #[test]
    fn dma_copies_160_bytes_from_shifted_source() {
        let mut bus = bus_with_rom(2);
        for i in 0..0xA0u16 {
            bus.write_byte(0xC000 + i, i as u8);
        }
        bus.write_byte(DMA_REG, 0xC0);
        for i in 0..0xA0u16 {
            assert_eq!(bus.read_byte(OAM_START + i), i as u8);
        }
    }

    #[test]
    fn ie_register_round_trips() {
        let mut bus = bus_with_rom(2);
        bus.write_byte(IE_REGISTER, 0x1F);
        assert_eq!(bus.read_byte(IE_REGISTER), 0x1F);
    }
}
