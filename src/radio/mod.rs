//! Sub-GHz receiver and signal sampling.

pub mod cc1101;

/// A sub-GHz receiver that can report the current signal strength.
pub trait Receiver {
    type Error;

    /// Enter continuous receive mode.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Leave receive mode.
    fn stop(&mut self);

    /// Current received signal strength (dBm).
    fn rssi(&mut self) -> Result<f64, Self::Error>;
}

/// Sample the receiver once.
///
/// A failed or non-finite reading keeps `last`, so the screen always
/// shows the last good value.
pub fn sample<R: Receiver + ?Sized>(receiver: &mut R, last: f64) -> f64 {
    match receiver.rssi() {
        Ok(rssi) if rssi.is_finite() => rssi,
        Ok(_) => {
            warn!("RSSI reading not finite, keeping {}", last);
            last
        }
        Err(_) => {
            warn!("RSSI read failed, keeping {}", last);
            last
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        readings: Vec<Result<f64, ()>>,
    }

    impl Receiver for Scripted {
        type Error = ();

        fn start(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn stop(&mut self) {}

        fn rssi(&mut self) -> Result<f64, ()> {
            self.readings.remove(0)
        }
    }

    #[test]
    fn sample_returns_fresh_reading() {
        let mut rx = Scripted {
            readings: vec![Ok(-88.5)],
        };
        assert_eq!(sample(&mut rx, 0.0), -88.5);
    }

    #[test]
    fn sample_keeps_last_value_on_failure() {
        let mut rx = Scripted {
            readings: vec![Ok(-70.0), Err(()), Ok(f64::NAN), Ok(f64::NEG_INFINITY), Ok(-65.0)],
        };
        let mut value = 0.0;
        let mut seen = Vec::new();
        for _ in 0..5 {
            value = sample(&mut rx, value);
            seen.push(value);
        }
        assert_eq!(seen, [-70.0, -70.0, -70.0, -70.0, -65.0]);
    }
}
