//! Light and temperature sampling task
//!
//! Reads the LDR divider and the NTC thermistor every 100ms and publishes
//! the results for the curtain task.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Ticker};

use curtain_core::traits::TemperatureSensor;
use curtain_drivers::sensor::{AdcReader, Ntc10kSensor};

use crate::channels::{LIGHT_READING, TEMP_READING};

/// Sampling interval
const SAMPLE_INTERVAL_MS: u64 = 100;

/// Sensor task configuration
#[derive(Clone, Copy)]
pub struct SensorConfig {
    /// Thermistor divider pull-up in ohms
    pub pullup_ohms: u32,
}

/// Last conversion from the async ADC, read back by the NTC driver
struct SampledAdc {
    value: Option<u16>,
}

impl AdcReader for SampledAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.value.take().ok_or(())
    }
}

/// Sensor sampling task
#[embassy_executor::task]
pub async fn sensor_task(
    mut adc: Adc<'static, Async>,
    mut light_channel: Channel<'static>,
    mut therm_channel: Channel<'static>,
    config: SensorConfig,
) {
    info!("Sensor task started");

    let mut thermistor = Ntc10kSensor::new(SampledAdc { value: None }, config.pullup_ohms);
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));
    let mut sensor_fault = false;

    loop {
        match adc.read(&mut light_channel).await {
            // Thresholds are calibrated for a 10-bit reading
            Ok(raw) => LIGHT_READING.signal(raw >> 2),
            Err(e) => warn!("Light sensor ADC error: {:?}", e),
        }

        let temperature = match adc.read(&mut therm_channel).await {
            Ok(raw) => {
                thermistor.adc_mut().value = Some(raw);
                thermistor.read_celsius()
            }
            Err(e) => {
                warn!("Thermistor ADC error: {:?}", e);
                thermistor.adc_mut().value = None;
                thermistor.read_celsius()
            }
        };

        match temperature {
            Ok(celsius) => {
                if sensor_fault {
                    info!("Temperature sensor recovered: {}°C", celsius);
                    sensor_fault = false;
                }
                trace!("Temperature: {}°C", celsius);
                TEMP_READING.signal(Some(celsius));
            }
            Err(e) => {
                if !sensor_fault {
                    warn!("Temperature sensor fault: {:?}", e);
                    sensor_fault = true;
                }
                TEMP_READING.signal(None);
            }
        }

        ticker.next().await;
    }
}
