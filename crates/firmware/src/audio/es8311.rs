//! ES8311 codec speaker output
//!
//! Drives the output half of the ES8311 (DAC mute and volume over I²C) and
//! the external power-amplifier enable pin. Input (ADC/microphone) handling
//! belongs to the audio service and is not touched here.
//!
//! # I²C Address
//!
//! | CE pin | Address |
//! |--------|---------|
//! | GND    | `0x18`  |
//! | VDD    | `0x19`  |

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use super::amp::AmpDriver;
use crate::config::AudioConfig;

/// 7-bit I²C address with CE low.
pub const ES8311_I2C_ADDR: u8 = 0x18;

/// DAC control register; bits 6:5 mute the DAC.
pub const REG_DAC_MUTE: u8 = 0x31;
/// DAC digital volume (0x00 = -95.5 dB, 0xBF = 0 dB, 0.5 dB steps).
pub const REG_DAC_VOLUME: u8 = 0x32;

/// `REG_DAC_MUTE` value with both mute bits set.
pub const DAC_MUTED: u8 = 0x60;
/// `REG_DAC_MUTE` value with the DAC running.
pub const DAC_UNMUTED: u8 = 0x00;
/// `REG_DAC_VOLUME` value for 0 dB.
pub const VOLUME_0DB: u8 = 0xBF;

/// Errors from [`Es8311Output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Es8311Error<E, P> {
    /// I²C write to the codec failed.
    I2c(E),
    /// Driving the PA enable pin failed.
    Pin(P),
}

impl<E, P> core::fmt::Display for Es8311Error<E, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c(_) => write!(f, "ES8311 I2C write failed"),
            Self::Pin(_) => write!(f, "PA enable pin error"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug, P: core::fmt::Debug> std::error::Error for Es8311Error<E, P> {}

/// ES8311 DAC plus external power amplifier.
pub struct Es8311Output<I, PA> {
    i2c: I,
    address: u8,
    pa: Option<PA>,
    volume: u8,
    enabled: bool,
}

impl<I: I2c, PA: OutputPin> Es8311Output<I, PA> {
    /// Create the output driver.
    ///
    /// Drives the PA pin low immediately so the speaker starts silent.
    pub fn new(
        i2c: I,
        address: u8,
        mut pa: Option<PA>,
        volume: u8,
    ) -> Result<Self, Es8311Error<I::Error, PA::Error>> {
        if let Some(pin) = pa.as_mut() {
            if let Err(e) = pin.set_low() {
                warn!("ES8311: PA pin could not be driven low");
                return Err(Es8311Error::Pin(e));
            }
        }
        Ok(Self {
            i2c,
            address,
            pa,
            volume: volume.min(100),
            enabled: false,
        })
    }

    /// Create the output driver at the configured codec address and volume.
    pub fn from_config(
        i2c: I,
        pa: Option<PA>,
        config: &AudioConfig,
    ) -> Result<Self, Es8311Error<I::Error, PA::Error>> {
        Self::new(i2c, config.codec_address, pa, config.output_volume)
    }

    /// Codec I²C address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Output volume (0–100) applied on enable.
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Change the volume; written to the codec right away if enabled.
    pub fn set_volume(&mut self, volume: u8) -> Result<(), Es8311Error<I::Error, PA::Error>> {
        self.volume = volume.min(100);
        if self.enabled {
            self.write_reg(REG_DAC_VOLUME, Self::volume_to_reg(self.volume))?;
        }
        Ok(())
    }

    /// Release the bus and pin.
    pub fn release(self) -> (I, Option<PA>) {
        (self.i2c, self.pa)
    }

    /// Map volume 0–100 onto `0x00..=VOLUME_0DB`.
    #[allow(clippy::arithmetic_side_effects)] // bounded: 100 * 0xBF fits in u16
    fn volume_to_reg(volume: u8) -> u8 {
        let scaled = u16::from(volume.min(100)) * u16::from(VOLUME_0DB) / 100;
        u8::try_from(scaled).unwrap_or(VOLUME_0DB)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Es8311Error<I::Error, PA::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Es8311Error::I2c)
    }
}

impl<I: I2c, PA: OutputPin> AmpDriver for Es8311Output<I, PA> {
    type Error = Es8311Error<I::Error, PA::Error>;

    /// Set volume, unmute the DAC, then switch the PA on.
    fn enable(&mut self) -> Result<(), Self::Error> {
        self.write_reg(REG_DAC_VOLUME, Self::volume_to_reg(self.volume))?;
        self.write_reg(REG_DAC_MUTE, DAC_UNMUTED)?;
        if let Some(pin) = self.pa.as_mut() {
            pin.set_high().map_err(Es8311Error::Pin)?;
        }
        self.enabled = true;
        Ok(())
    }

    /// Switch the PA off, then mute the DAC.
    fn disable(&mut self) -> Result<(), Self::Error> {
        if let Some(pin) = self.pa.as_mut() {
            pin.set_low().map_err(Es8311Error::Pin)?;
        }
        self.write_reg(REG_DAC_MUTE, DAC_MUTED)?;
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use embedded_hal_mock::eh1::MockError;

    #[test]
    fn test_volume_mapping() {
        type Drv = Es8311Output<I2cMock, PinMock>;
        assert_eq!(Drv::volume_to_reg(0), 0x00);
        assert_eq!(Drv::volume_to_reg(100), VOLUME_0DB);
        assert_eq!(Drv::volume_to_reg(200), VOLUME_0DB);
        assert_eq!(Drv::volume_to_reg(50), 0x5F);
    }

    #[test]
    fn test_enable_unmutes_then_raises_pa() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ES8311_I2C_ADDR, vec![REG_DAC_VOLUME, VOLUME_0DB]),
            I2cTransaction::write(ES8311_I2C_ADDR, vec![REG_DAC_MUTE, DAC_UNMUTED]),
        ]);
        let mut pa = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut out =
            Es8311Output::new(i2c.clone(), ES8311_I2C_ADDR, Some(pa.clone()), 100).unwrap();
        out.enable().unwrap();
        assert!(out.is_enabled());
        i2c.done();
        pa.done();
    }

    #[test]
    fn test_disable_lowers_pa_then_mutes() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ES8311_I2C_ADDR, vec![REG_DAC_VOLUME, 0x00]),
            I2cTransaction::write(ES8311_I2C_ADDR, vec![REG_DAC_MUTE, DAC_UNMUTED]),
            I2cTransaction::write(ES8311_I2C_ADDR, vec![REG_DAC_MUTE, DAC_MUTED]),
        ]);
        let mut pa = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut out = Es8311Output::new(i2c.clone(), ES8311_I2C_ADDR, Some(pa.clone()), 0).unwrap();
        out.enable().unwrap();
        out.disable().unwrap();
        assert!(!out.is_enabled());
        i2c.done();
        pa.done();
    }

    #[test]
    fn test_set_volume_only_writes_when_enabled() {
        let mut i2c = I2cMock::new(&[]);
        let mut out: Es8311Output<_, PinMock> =
            Es8311Output::new(i2c.clone(), ES8311_I2C_ADDR, None, 70).unwrap();
        out.set_volume(40).unwrap();
        assert_eq!(out.volume(), 40);
        i2c.done();
    }

    #[test]
    fn test_broken_pa_pin_fails_construction() {
        let mut i2c = I2cMock::new(&[]);
        let mut pa = PinMock::new(&[PinTransaction::set(PinState::Low)
            .with_error(MockError::Io(std::io::ErrorKind::NotConnected))]);
        let result = Es8311Output::new(i2c.clone(), ES8311_I2C_ADDR, Some(pa.clone()), 70);
        assert!(matches!(result, Err(Es8311Error::Pin(_))));
        i2c.done();
        pa.done();
    }

    #[test]
    fn test_from_config_uses_codec_address_and_volume() {
        let audio = crate::config::BoardConfig::esp32_p4_function_ev().audio;
        let mut i2c = I2cMock::new(&[]);
        let out: Es8311Output<_, PinMock> =
            Es8311Output::from_config(i2c.clone(), None, &audio).unwrap();
        assert_eq!(out.address(), audio.codec_address);
        assert_eq!(out.volume(), audio.output_volume);
        i2c.done();
    }
}
