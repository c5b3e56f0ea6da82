//! Address-space region boundaries for the 16-bit bus.

pub const ROM_BANK0_START: u16 = 0x0000;
pub const ROM_BANK0_END: u16 = 0x4000;

pub const SWITCH_ROM_BANK_START: u16 = 0x4000;
pub const SWITCH_ROM_BANK_END: u16 = 0x8000;
pub const SWITCH_ROM_BANK_LENGTH: u16 = SWITCH_ROM_BANK_END - SWITCH_ROM_BANK_START;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0xA000;
pub const VRAM_LENGTH: u16 = VRAM_END - VRAM_START;

pub const CART_RAM_START: u16 = 0xA000;
pub const CART_RAM_END: u16 = 0xC000;
pub const CART_RAM_BANK_LENGTH: u16 = CART_RAM_END - CART_RAM_START;

pub const WORK_RAM_START: u16 = 0xC000;
pub const WORK_RAM_END: u16 = 0xE000;
pub const WORK_RAM_LENGTH: u16 = WORK_RAM_END - WORK_RAM_START;
pub const WORK_RAM_BANK_LENGTH: u16 = 0x1000;

/// 0xE000-0xFDFF aliases 0xC000-0xDDFF (work RAM).
pub const ECHO_RAM_START: u16 = 0xE000;
pub const ECHO_RAM_END: u16 = 0xFE00;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFEA0;
pub const OAM_LENGTH: u16 = OAM_END - OAM_START;

pub const UNUSABLE_START: u16 = 0xFEA0;
pub const UNUSABLE_END: u16 = 0xFF00;

pub const IO_PORTS_START: u16 = 0xFF00;
pub const IO_PORTS_END: u16 = 0xFF80;

pub const HIGH_RAM_START: u16 = 0xFF80;
pub const HIGH_RAM_END: u16 = 0xFFFF;
pub const HIGH_RAM_LENGTH: u16 = HIGH_RAM_END - HIGH_RAM_START;

pub const IE_REGISTER: u16 = 0xFFFF;

pub const JOYPAD_REG: u16 = 0xFF00;
pub const SERIAL_SB: u16 = 0xFF01;
pub const SERIAL_SC: u16 = 0xFF02;
pub const IF_REGISTER: u16 = 0xFF0F;
pub const DMA_REG: u16 = 0xFF46;

/// MBC1 control-register write windows.
pub const MBC1_RAM_ENABLE_START: u16 = 0x0000;
pub const MBC1_RAM_ENABLE_END: u16 = 0x2000;
pub const MBC1_ROM_BANK_START: u16 = 0x2000;
pub const MBC1_ROM_BANK_END: u16 = 0x4000;
pub const MBC1_RAM_BANK_START: u16 = 0x4000;
pub const MBC1_RAM_BANK_END: u16 = 0x6000;
pub const MBC1_MODE_START: u16 = 0x6000;
pub const MBC1_MODE_END: u16 = 0x8000;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const CART_RAM_BANK_SIZE: usize = 0x2000;
