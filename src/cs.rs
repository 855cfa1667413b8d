//! Chip-select line control with guard delays.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Drives the active-low chip-select line.
///
/// Every transition is preceded and followed by a guard interval so the
/// chip's CS setup and hold times are met regardless of how fast the
/// surrounding code runs. The interval is a tunable lower bound, not a
/// protocol constant: any value at or above the datasheet minimum is
/// correct.
pub struct ChipSelect<PIN> {
    pin: PIN,
    guard_ns: u32,
}

impl<PIN> ChipSelect<PIN>
where
    PIN: OutputPin,
{
    pub fn new(pin: PIN, guard_ns: u32) -> Self {
        Self { pin, guard_ns }
    }

    /// Drives the line active (low).
    pub fn select<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PIN::Error> {
        delay.delay_ns(self.guard_ns);
        self.pin.set_low()?;
        delay.delay_ns(self.guard_ns);
        Ok(())
    }

    /// Drives the line inactive (high).
    pub fn deselect<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PIN::Error> {
        delay.delay_ns(self.guard_ns);
        self.pin.set_high()?;
        delay.delay_ns(self.guard_ns);
        Ok(())
    }

    /// Releases the underlying pin.
    pub fn free(self) -> PIN {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Default)]
    struct Trace {
        events: Vec<Event>,
    }

    #[derive(Debug, PartialEq)]
    enum Event {
        Delay(u32),
        Low,
        High,
    }

    struct TracePin(Rc<RefCell<Trace>>);
    struct TraceDelay(Rc<RefCell<Trace>>);

    impl embedded_hal::digital::ErrorType for TracePin {
        type Error = Infallible;
    }
    impl OutputPin for TracePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().events.push(Event::Low);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().events.push(Event::High);
            Ok(())
        }
    }
    impl DelayNs for TraceDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().events.push(Event::Delay(ns));
        }
    }

    #[test]
    fn transitions_are_guarded_on_both_sides() {
        let trace = Rc::new(RefCell::new(Trace::default()));
        let mut cs = ChipSelect::new(TracePin(trace.clone()), 100);
        let mut delay = TraceDelay(trace.clone());

        cs.select(&mut delay).unwrap();
        cs.deselect(&mut delay).unwrap();

        assert_eq!(
            trace.borrow().events,
            [
                Event::Delay(100),
                Event::Low,
                Event::Delay(100),
                Event::Delay(100),
                Event::High,
                Event::Delay(100),
            ]
        );
    }
}
