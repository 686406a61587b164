//! PCM block driven as an externally clocked 8-bit shift register.
//!
//! The PCM/I2S peripheral has no SPI-slave mode, but with one 8-bit channel
//! in each direction and both the bit clock and frame sync taken from the
//! pins it shifts one byte per eight master clocks. Frame sync is ignored
//! (tie CS low); the Pi must be the only slave on the bus.
//!
//! Wiring on connector P5 (Rev. 2 boards, the default [`PcmPins::P5`]):
//!
//! ```text
//! ┌───────────────────────┐
//! │ +5V   SCLK  MOSI  GND │
//! │ +3.3V  CS   MISO  GND │
//! └───────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::debug;

use super::registers::*;
use crate::error::Result;
use crate::gpio::{self, Function};
use crate::regs::RegisterIo;
use crate::timer::{wait_while, SystemTimer, Timeout};

/// Which header the PCM signals are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcmPins {
    /// GPIO 28–31 on Alt2 (P5 connector).
    #[default]
    P5,
    /// GPIO 18–21 on Alt0 (P1 header).
    P1,
}

impl PcmPins {
    /// CLK, FS, DIN, DOUT.
    pub const fn numbers(self) -> [u8; 4] {
        match self {
            PcmPins::P5 => [28, 29, 30, 31],
            PcmPins::P1 => [18, 19, 20, 21],
        }
    }

    pub const fn function(self) -> Function {
        match self {
            PcmPins::P5 => Function::Alt2,
            PcmPins::P1 => Function::Alt0,
        }
    }
}

/// Settings for [`PcmSlave::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmSlaveConfig {
    pub pins: PcmPins,
    /// Clock-manager source for the PCM clock while in master mode.
    pub clock_source: ClockSource,
    /// Integer clock divisor.
    pub divisor: u32,
    /// MASH filter stages.
    pub mash: u32,
    /// Wait after disabling the block, in microseconds.
    pub settle_us: u32,
    /// How long [`PcmSlave::slip_bit`] gates the clock, in microseconds.
    pub slip_hold_us: u32,
    /// Applies to every FIFO and sync-flag wait.
    pub timeout: Timeout,
}

impl Default for PcmSlaveConfig {
    fn default() -> Self {
        PcmSlaveConfig {
            pins: PcmPins::P5,
            clock_source: ClockSource::Oscillator,
            divisor: 250,
            mash: 1,
            settle_us: 1000,
            slip_hold_us: 1,
            timeout: Timeout::Never,
        }
    }
}

/// 8-bit frame: length and frame-sync length both 8 clocks.
const FRAME: u32 = mode::FLEN.val(7) | mode::FSLEN.val(7);

/// Clock and frame sync generated internally.
const MODE_MASTER: u32 = FRAME | mode::CLK_DIS.val(1);

/// Clock and frame sync taken from the pins.
const MODE_SLAVE: u32 =
    FRAME | mode::CLKM.val(1) | mode::FSM.val(1) | mode::FSI.val(1) | mode::CLK_DIS.val(1);

/// Clear both FIFOs and error flags, start both directions, request a sync.
const CS_START: u32 = cs::TXCLR.val(1)
    | cs::RXCLR.val(1)
    | cs::TXERR.val(1)
    | cs::RXERR.val(1)
    | cs::TXON.val(1)
    | cs::RXON.val(1)
    | cs::SYNC.val(1)
    | cs::STBY.val(1)
    | cs::EN.val(1);

/// Channel 1 only, 8 bits wide, at the start of the frame.
const CHANNEL_8BIT: u32 = chan::CH1EN.val(1);

/// SPI-slave byte pipe over the PCM block.
///
/// # Example
///
/// ```ignore
/// let regs = unsafe { Mmio::take(peripheral_base)? };
/// let mut slave = PcmSlave::new(regs, PcmSlaveConfig::default());
/// slave.init()?;
/// ByteSynchronizer::new(SyncConfig::default()).run(&mut slave)?;
/// let command = slave.read()?;
/// ```
pub struct PcmSlave<R> {
    regs: R,
    config: PcmSlaveConfig,
}

impl<R: RegisterIo> PcmSlave<R> {
    /// Wrap a register handle. Nothing is touched until [`init`](Self::init).
    pub fn new(regs: R, config: PcmSlaveConfig) -> Self {
        PcmSlave { regs, config }
    }

    pub fn config(&self) -> &PcmSlaveConfig {
        &self.config
    }

    /// Release the register handle.
    pub fn release(self) -> R {
        self.regs
    }

    /// Reconfigure the PCM block as SPI slave.
    ///
    /// The block is detached from its pins, reset, run once in master mode
    /// so it latches the frame length, then switched to slave timing and
    /// reattached.
    pub fn init(&mut self) -> Result<()> {
        let pins = self.config.pins;
        debug!("spisl: init on {:?} pins {:?}", pins, pins.numbers());

        for pin in pins.numbers() {
            gpio::configure(&mut self.regs, pin, Function::Input)?;
        }
        self.regs.barrier();

        self.drain();

        self.regs.modify(PCM_CS, |v| cs::EN.set(v, 0));
        self.regs.barrier();
        SystemTimer::new(&mut self.regs).delay_us(self.config.settle_us);
        self.regs.barrier();

        self.regs.write(PCM_RXC, 0);
        self.regs.write(PCM_TXC, 0);
        self.regs.write(PCM_INTEN, 0);
        self.regs.write(PCM_INTSTC, INT_ALL);
        self.regs.write(PCM_GRAY, 0);
        self.regs.write(PCM_RXC, CHANNEL_8BIT);
        self.regs.write(PCM_TXC, CHANNEL_8BIT);
        self.regs.barrier();

        let passwd = cm::PASSWD.val(CM_PASSWD);
        self.regs.write(cm_div(CM_PCM), passwd | cm::DIVI.val(self.config.divisor));
        self.regs.write(
            cm_ctl(CM_PCM),
            passwd
                | cm::SRC.val(self.config.clock_source as u32)
                | cm::MASH.val(self.config.mash)
                | cm::ENAB.val(1),
        );
        self.regs.barrier();

        self.regs.write(PCM_MODE, MODE_MASTER);
        self.regs.modify(PCM_MODE, |v| mode::CLK_DIS.set(v, 0));
        self.regs.write(PCM_CS, CS_START);

        let timeout = self.config.timeout;
        wait_while(&mut self.regs, timeout, |r| !cs::SYNC.is_set(r.read(PCM_CS)))?;
        self.regs.modify(PCM_CS, |v| cs::SYNC.set(v, 0));
        wait_while(&mut self.regs, timeout, |r| cs::SYNC.is_set(r.read(PCM_CS)))?;
        debug!("spisl: frame length latched");

        self.regs.modify(PCM_MODE, |v| mode::CLK_DIS.set(v, 1));
        self.regs.write(PCM_MODE, MODE_SLAVE);

        self.regs.barrier();
        for pin in pins.numbers() {
            gpio::configure(&mut self.regs, pin, pins.function())?;
        }
        self.regs.barrier();

        self.regs.modify(PCM_MODE, |v| mode::CLK_DIS.set(v, 0));
        self.regs.barrier();

        debug!("spisl: slave mode active");
        Ok(())
    }

    /// Read and discard whatever sits in the receive FIFO.
    fn drain(&mut self) {
        while cs::RXD.is_set(self.regs.read(PCM_CS)) {
            self.regs.read(PCM_FIFO);
        }
    }

    /// Whether `count` bytes can be read without blocking.
    ///
    /// The FIFO only reports "not empty", so any `count` above one is
    /// answered as if it were one.
    pub fn poll(&mut self, count: usize) -> bool {
        count == 0 || cs::RXD.is_set(self.regs.read(PCM_CS))
    }

    /// Block until a byte arrives and return it.
    pub fn read(&mut self) -> Result<u8> {
        wait_while(&mut self.regs, self.config.timeout, |r| {
            !cs::RXD.is_set(r.read(PCM_CS))
        })?;
        Ok(self.regs.read(PCM_FIFO) as u8)
    }

    /// Queue `byte` for transmission.
    ///
    /// A slave only transmits while the master clocks, so the byte leaves on
    /// the master's next transfer. The byte received alongside is discarded.
    pub fn write(&mut self, byte: u8) -> Result<()> {
        wait_while(&mut self.regs, self.config.timeout, |r| {
            !cs::TXD.is_set(r.read(PCM_CS))
        })?;
        self.regs.write(PCM_FIFO, u32::from(byte));
        self.drain();
        Ok(())
    }

    /// Block until the transmit FIFO is empty.
    pub fn flush(&mut self) -> Result<()> {
        wait_while(&mut self.regs, self.config.timeout, |r| {
            !cs::TXE.is_set(r.read(PCM_CS))
        })
    }

    /// Gate the bit clock briefly so the shift register loses one bit.
    pub fn slip_bit(&mut self) {
        self.regs.modify(PCM_MODE, |v| mode::CLK_DIS.set(v, 1));
        self.regs.barrier();
        SystemTimer::new(&mut self.regs).delay_us(self.config.slip_hold_us);
        self.regs.barrier();
        self.regs.modify(PCM_MODE, |v| mode::CLK_DIS.set(v, 0));
    }
}
