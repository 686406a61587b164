//! GPIO function select and level access.
//!
//! Each `GPFSELn` register holds the 3-bit function of ten pins; set, clear
//! and level registers hold one bit per pin across two 32-bit words.

use crate::constants::{GPIO_OFFSET, GPIO_PIN_COUNT};
use crate::error::{Error, Result};
use crate::regs::{Field, RegisterIo};

const GPFSEL0: usize = GPIO_OFFSET;
const GPSET0: usize = GPIO_OFFSET + 0x1C;
const GPCLR0: usize = GPIO_OFFSET + 0x28;
const GPLEV0: usize = GPIO_OFFSET + 0x34;

/// Pin function. The alternate functions are not numbered in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Input = 0b000,
    Output = 0b001,
    Alt0 = 0b100,
    Alt1 = 0b101,
    Alt2 = 0b110,
    Alt3 = 0b111,
    Alt4 = 0b011,
    Alt5 = 0b010,
}

fn check(pin: u8) -> Result<()> {
    if pin < GPIO_PIN_COUNT {
        Ok(())
    } else {
        Err(Error::InvalidPin { pin })
    }
}

/// Register offset and bit mask of `pin` in a two-word bank.
fn bank(base: usize, pin: u8) -> (usize, u32) {
    (base + 4 * usize::from(pin / 32), 1 << (pin % 32))
}

/// Select the function of `pin`.
pub fn configure<R: RegisterIo>(regs: &mut R, pin: u8, function: Function) -> Result<()> {
    check(pin)?;
    let offset = GPFSEL0 + 4 * usize::from(pin / 10);
    let field = Field::new(3 * u32::from(pin % 10), 3);
    regs.modify(offset, |v| field.set(v, function as u32));
    Ok(())
}

/// Drive output `pin` high.
pub fn set<R: RegisterIo>(regs: &mut R, pin: u8) -> Result<()> {
    check(pin)?;
    let (offset, mask) = bank(GPSET0, pin);
    regs.write(offset, mask);
    Ok(())
}

/// Drive output `pin` low.
pub fn clear<R: RegisterIo>(regs: &mut R, pin: u8) -> Result<()> {
    check(pin)?;
    let (offset, mask) = bank(GPCLR0, pin);
    regs.write(offset, mask);
    Ok(())
}

/// Whether `pin` is driven high.
pub fn read<R: RegisterIo>(regs: &mut R, pin: u8) -> Result<bool> {
    check(pin)?;
    let (offset, mask) = bank(GPLEV0, pin);
    Ok(regs.read(offset) & mask != 0)
}
