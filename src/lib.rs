//! Cycle-stepped core for an 8-bit handheld console: CPU, MBC1 memory bus,
//! and scanline display pipeline. Narrowed to the Host Seam: windowing,
//! audio output, and gamepad polling are a collaborator's job, not this
//! crate's.

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod error;
pub mod framebuffer;
pub mod interrupts;
pub mod joypad;
pub mod memory_map;
pub mod opcodes;
pub mod ppu;
pub mod registers;
pub mod sound;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use bus::Bus;
use cartridge::Cartridge;
use cpu::Cpu;
use error::{GameboyError, Result};
use framebuffer::Framebuffer;
use joypad::ButtonState;

/// T-cycles per frame: 154 scanlines * 456 cycles.
pub const CYCLES_PER_FRAME: u32 = 154 * 456;

/// The Host Seam: the entire surface a windowing/audio/input collaborator
/// needs to drive this core.
pub struct Gameboy {
    cpu: Cpu,
    bus: Bus,
    save_path: Option<PathBuf>,
}

impl Gameboy {
    /// `Initialise`: loads a ROM (and its sidecar `.sav`, if present) and
    /// brings the core up to the documented boot state.
    pub fn initialise(rom_path: impl AsRef<Path>) -> Result<Self> {
        let rom_path = rom_path.as_ref();
        let rom = fs::read(rom_path).map_err(|source| GameboyError::RomUnreadable {
            path: rom_path.to_path_buf(),
            source,
        })?;

        let mut cartridge = Cartridge::new(rom);
        let save_path = rom_path.with_extension("sav");
        if save_path.exists() {
            let data = fs::read(&save_path).map_err(|source| GameboyError::SaveUnreadable {
                path: save_path.clone(),
                source,
            })?;
            info!("restoring cartridge RAM from {}", save_path.display());
            cartridge.load_ram(&data);
        }

        Ok(Gameboy {
            cpu: Cpu::new(),
            bus: Bus::new(cartridge),
            save_path: Some(save_path),
        })
    }

    /// `Step`: runs instructions until one full frame (`CYCLES_PER_FRAME`
    /// T-cycles) of display pipeline time has elapsed.
    pub fn step(&mut self) {
        let mut elapsed = 0u32;
        while elapsed < CYCLES_PER_FRAME {
            let cycles = self.cpu.step(&mut self.bus);
            self.bus.step_ppu(cycles);
            elapsed += cycles.max(1);
        }
    }

    /// `SetInput`: replaces the held button state wholesale.
    pub fn set_input(&mut self, buttons: ButtonState) {
        self.bus.set_buttons(buttons);
    }

    /// `ReadFramebuffer`: the 160x144 grayscale pixel grid produced by the
    /// most recently completed scanlines.
    pub fn read_framebuffer(&self) -> &Framebuffer {
        self.bus.ppu.framebuffer()
    }

    /// Persists cartridge RAM to the sidecar `.sav` path derived from the ROM
    /// path, if the cartridge has any battery-backed RAM at all.
    pub fn save_ram(&mut self) -> Result<()> {
        let Some(path) = &self.save_path else {
            return Ok(());
        };
        let snapshot = self.bus.cartridge_mut().ram_snapshot().to_vec();
        if snapshot.is_empty() {
            return Ok(());
        }
        fs::write(path, snapshot).map_err(|source| GameboyError::SaveUnreadable {
            path: path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_title(title: &str) -> Vec<u8> {
        let mut rom = vec![0u8; memory_map::ROM_BANK_SIZE * 2];
        for (i, byte) in title.bytes().enumerate() {
            rom[0x0134 + i] = byte;
        }
        rom
    }

    #[test]
    fn step_advances_by_one_frame_worth_of_cycles() {
        let mut gb = Gameboy {
            cpu: Cpu::new(),
            bus: Bus::new(Cartridge::new(rom_with_title("TEST"))),
            save_path: None,
        };
        gb.step();
        // A frame boundary always leaves LY back at 0.
        assert_eq!(gb.bus.ppu.read(0xFF44), Some(0));
    }

    #[test]
    fn set_input_reaches_the_joypad_register() {
        let mut gb = Gameboy {
            cpu: Cpu::new(),
            bus: Bus::new(Cartridge::new(rom_with_title("TEST"))),
            save_path: None,
        };
        gb.set_input(ButtonState {
            a: true,
            ..Default::default()
        });
        gb.bus.write_byte(0xFF00, 0x10); // select buttons
        assert_eq!(gb.bus.read_byte(0xFF00) & 0x01, 0x00);
    }
}
