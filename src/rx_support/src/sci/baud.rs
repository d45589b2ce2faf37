//! Bit rate generator settings
/// The largest clock select value (PCLK / 64).
const MAX_CKS: u8 = 3;

/// Register settings of the SCI bit rate generator, as computed by
/// [`BaudConfig::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudConfig {
    /// Clock select (`SMR.CKS`): the bit rate generator is fed with
    /// PCLK / 4<sup>cks</sup>.
    pub cks: u8,
    /// Bit rate register value (`BRR`)
    pub brr: u8,
    /// Bit rate modulation duty (`MDDR`), or `None` to leave modulation
    /// (`SEMR.BRME`) off
    pub mddr: Option<u8>,
    /// Base clock select (`SEMR.ABCS`): `true` for 8 base clock cycles per
    /// bit period, `false` for 16
    pub abcs: bool,
}

/// Error type for [`BaudConfig::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaudRateError {
    /// The requested bit rate is zero.
    Zero,
    /// The bit rate is too high for the peripheral clock.
    TooFast,
    /// The bit rate is too low even with the slowest clock source.
    TooSlow,
}

impl BaudConfig {
    /// Find the generator settings producing `baud` bits per second from the
    /// peripheral clock frequency `pclk`.
    pub fn compute(pclk: u32, baud: u32) -> Result<Self, BaudRateError> {
        if baud == 0 {
            return Err(BaudRateError::Zero);
        }

        // `BRR + 1` for an 8-cycle base clock, in 8.8 fixed point
        let mut fixed = u64::from(pclk) * 16 / u64::from(baud);

        let mut cks = 0u8;
        while fixed > 512 << 8 {
            fixed >>= 2;
            cks += 1;
        }

        if cks > MAX_CKS {
            return Err(BaudRateError::TooSlow);
        }
        if fixed < 256 {
            return Err(BaudRateError::TooFast);
        }

        let abcs = fixed <= 256 << 8;
        if !abcs {
            fixed /= 2;
        }

        let int = fixed >> 8;
        let mddr = if fixed & 0xff != 0 {
            // `256 * int / (fixed / 256)`, which is in `128..256`
            Some(((int << 16) / fixed) as u8)
        } else {
            None
        };

        Ok(Self {
            cks,
            brr: (int - 1) as u8,
            mddr,
            abcs,
        })
    }

    /// Get the bit rate these settings produce from the peripheral clock
    /// frequency `pclk`.
    pub fn actual_baud(&self, pclk: u32) -> u32 {
        let cycles: u64 = if self.abcs { 16 } else { 32 };
        let divisor = (cycles << (2 * self.cks)) * (u64::from(self.brr) + 1);
        let duty = self.mddr.map_or(256, u64::from);
        (u64::from(pclk) * duty / (divisor * 256)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    /// Compare the generated rate against `baud` without rounding.
    fn within_one_percent(config: &BaudConfig, pclk: u32, baud: u32) -> bool {
        let cycles: u128 = if config.abcs { 16 } else { 32 };
        let divisor = (cycles << (2 * config.cks)) * (u128::from(config.brr) + 1) * 256;
        let generated = u128::from(pclk) * config.mddr.map_or(256, u128::from);
        let requested = u128::from(baud) * divisor;
        generated.abs_diff(requested) * 100 < requested
    }

    #[test]
    fn rate_115200_at_60mhz() {
        let config = BaudConfig::compute(60_000_000, 115_200).unwrap();
        assert_eq!(config.cks, 0);
        assert_eq!(config.brr, 31);
        assert!(config.abcs);
        assert_eq!(config.mddr, Some(251));

        assert!(within_one_percent(&config, 60_000_000, 115_200));
        assert_eq!(config.actual_baud(60_000_000), 114_898);
    }

    #[test]
    fn exact_divisor_disables_modulation() {
        // 60 MHz / (16 * 125) = 30000
        let config = BaudConfig::compute(60_000_000, 30_000).unwrap();
        assert_eq!(
            config,
            BaudConfig {
                cks: 0,
                brr: 124,
                mddr: None,
                abcs: true,
            }
        );
        assert_eq!(config.actual_baud(60_000_000), 30_000);
    }

    #[test]
    fn slow_rates_use_prescaler() {
        let config = BaudConfig::compute(60_000_000, 300).unwrap();
        assert_eq!(config.cks, 3);
        assert_eq!(config.brr, 194);
        assert!(config.abcs);
        assert!(within_one_percent(&config, 60_000_000, 300));
    }

    #[test]
    fn out_of_range() {
        assert_eq!(
            BaudConfig::compute(60_000_000, 0),
            Err(BaudRateError::Zero)
        );
        assert_eq!(
            BaudConfig::compute(60_000_000, 60_000_000 / 16 + 1),
            Err(BaudRateError::TooFast)
        );
        assert_eq!(
            BaudConfig::compute(60_000_000, 1),
            Err(BaudRateError::TooSlow)
        );
        assert!(BaudConfig::compute(60_000_000, 60_000_000 / 16).is_ok());
    }

    #[quickcheck]
    fn relative_error_below_one_percent(pclk: u32, baud: u32) -> bool {
        // Realistic peripheral clocks are at least 1 MHz
        let pclk = pclk % 200_000_000 + 1_000_000;
        let baud = baud % (pclk / 16) + 1;
        match BaudConfig::compute(pclk, baud) {
            Ok(config) => {
                log::trace!("{pclk} / {baud}: {config:?}");
                within_one_percent(&config, pclk, baud)
            }
            Err(e) => e == BaudRateError::TooSlow,
        }
    }
}
