//! NTC 10K thermistor sensor
//!
//! Ambient-range thermistor used for the window temperature reading.
//! Uses a lookup table for integer-only temperature calculation.

use curtain_core::traits::{SensorError, TemperatureSensor};

/// NTC 10K thermistor temperature lookup table
///
/// Table format: (resistance_ohms, temperature_x10)
/// Generated using beta equation with:
/// - R0 = 10,000 ohms at T0 = 25°C
/// - Beta = 3950K
///
/// Temperature range: -20°C to 80°C
const TEMP_TABLE: &[(u32, i16)] = &[
    (105_385, -200),
    (58_246, -100),
    (33_621, 0),
    (20_175, 100),
    (12_535, 200),
    (10_000, 250), // R0
    (8_037, 300),
    (5_301, 400),
    (3_588, 500),
    (2_486, 600),
    (1_760, 700),
    (1_270, 800),
];

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// NTC 10K thermistor with B=3950
///
/// Circuit: VCC -- pullup -- ADC_PIN -- NTC -- GND
pub struct Ntc10kSensor<ADC> {
    adc: ADC,
    /// Pull-up resistor value in ohms
    pullup_ohms: u32,
    /// ADC full scale (4096 for 12-bit)
    adc_max: u16,
}

impl<ADC> Ntc10kSensor<ADC> {
    /// Create a sensor on a 12-bit ADC channel
    pub fn new(adc: ADC, pullup_ohms: u32) -> Self {
        Self {
            adc,
            pullup_ohms,
            adc_max: 4096,
        }
    }

    /// Mutable access to the ADC channel
    pub fn adc_mut(&mut self) -> &mut ADC {
        &mut self.adc
    }

    /// Convert ADC reading to thermistor resistance
    pub fn adc_to_resistance(&self, adc_value: u16) -> Result<u32, SensorError> {
        if adc_value >= self.adc_max - 10 {
            return Err(SensorError::OpenCircuit);
        }
        if adc_value < 10 {
            return Err(SensorError::ShortCircuit);
        }

        let numerator = self.pullup_ohms as u64 * adc_value as u64;
        let denominator = (self.adc_max - adc_value) as u64;
        Ok((numerator / denominator) as u32)
    }

    /// Temperature in 0.1°C from resistance, interpolated between table rows
    pub fn resistance_to_temp_x10(resistance: u32) -> Result<i16, SensorError> {
        let first = TEMP_TABLE[0].0;
        let last = TEMP_TABLE[TEMP_TABLE.len() - 1].0;
        if resistance > first || resistance < last {
            return Err(SensorError::OutOfRange);
        }

        // Sorted by decreasing resistance (increasing temperature)
        for pair in TEMP_TABLE.windows(2) {
            let (r_high, t_low) = pair[0];
            let (r_low, t_high) = pair[1];

            if resistance <= r_high && resistance >= r_low {
                let r_range = (r_high - r_low) as i32;
                let t_range = (t_high - t_low) as i32;
                let r_offset = (r_high - resistance) as i32;
                return Ok(t_low + (t_range * r_offset / r_range) as i16);
            }
        }

        Err(SensorError::OutOfRange)
    }
}

impl<ADC: AdcReader> TemperatureSensor for Ntc10kSensor<ADC> {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        let adc_value = self.adc.read().map_err(|_| SensorError::ConversionError)?;
        let resistance = self.adc_to_resistance(adc_value)?;
        Self::resistance_to_temp_x10(resistance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dummy ADC returning a fixed value
    struct DummyAdc(u16);

    impl AdcReader for DummyAdc {
        fn read(&mut self) -> Result<u16, ()> {
            Ok(self.0)
        }
    }

    struct FailingAdc;

    impl AdcReader for FailingAdc {
        fn read(&mut self) -> Result<u16, ()> {
            Err(())
        }
    }

    #[test]
    fn test_table_sorted() {
        for pair in TEMP_TABLE.windows(2) {
            assert!(pair[0].0 > pair[1].0);
            assert!(pair[0].1 < pair[1].1);
        }
    }

    #[test]
    fn test_resistance_to_temp() {
        let temp = Ntc10kSensor::<DummyAdc>::resistance_to_temp_x10(10_000).unwrap();
        assert_eq!(temp, 250);

        let temp = Ntc10kSensor::<DummyAdc>::resistance_to_temp_x10(5_301).unwrap();
        assert_eq!(temp, 400);

        // Between rows
        let temp = Ntc10kSensor::<DummyAdc>::resistance_to_temp_x10(9_000).unwrap();
        assert!(temp > 250 && temp < 300);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            Ntc10kSensor::<DummyAdc>::resistance_to_temp_x10(200_000),
            Err(SensorError::OutOfRange)
        );
        assert_eq!(
            Ntc10kSensor::<DummyAdc>::resistance_to_temp_x10(500),
            Err(SensorError::OutOfRange)
        );
    }

    #[test]
    fn test_room_temperature_reading() {
        // Equal pullup and NTC: ADC sits at mid-scale
        let mut sensor = Ntc10kSensor::new(DummyAdc(2048), 10_000);
        assert_eq!(sensor.read_celsius_x10(), Ok(250));
        assert_eq!(sensor.read_celsius(), Ok(25));
    }

    #[test]
    fn test_open_and_short_circuit() {
        let sensor = Ntc10kSensor::new(DummyAdc(0), 10_000);
        assert_eq!(sensor.adc_to_resistance(4095), Err(SensorError::OpenCircuit));
        assert_eq!(sensor.adc_to_resistance(3), Err(SensorError::ShortCircuit));
    }

    #[test]
    fn test_adc_failure() {
        let mut sensor = Ntc10kSensor::new(FailingAdc, 10_000);
        assert_eq!(sensor.read_celsius_x10(), Err(SensorError::ConversionError));
    }
}
