pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// One tick of display data: the two raw sensor scalars plus the two derived
/// scalars the pipeline produces. `running` mirrors whether elapsed time is
/// still advancing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    /// Instantaneous raw ADC sample.
    pub raw: i32,
    /// Instantaneous averaged units reading (grams).
    pub units: f32,
    /// Stable filtered weight, quantized to display resolution.
    pub stable_g: f32,
    /// Brew timer elapsed seconds.
    pub elapsed_s: f32,
    /// True while the brew timer is accumulating.
    pub running: bool,
}

pub trait LoadCell {
    /// Non-blocking readiness poll; when false the caller proceeds with
    /// stale values for this tick.
    fn is_ready(&mut self) -> bool;

    fn read_raw(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;

    /// Averaged reading in display units (grams), `samples` raw reads deep.
    fn read_units(&mut self, samples: u8)
    -> Result<f32, Box<dyn std::error::Error + Send + Sync>>;

    /// Re-zero the sensor's internal offset so the current load reads 0.
    fn tare(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait DisplaySink {
    /// Boot splash; failure here is fatal for the device.
    fn splash(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn render(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait Buzzer {
    fn beep_ms(&mut self, ms: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: LoadCell + ?Sized> LoadCell for Box<T> {
    fn is_ready(&mut self) -> bool {
        (**self).is_ready()
    }
    fn read_raw(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_raw()
    }
    fn read_units(
        &mut self,
        samples: u8,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_units(samples)
    }
    fn tare(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).tare()
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn splash(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).splash()
    }
    fn render(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).render(frame)
    }
}

impl<T: Buzzer + ?Sized> Buzzer for Box<T> {
    fn beep_ms(&mut self, ms: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).beep_ms(ms)
    }
}
