#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimestampMs(pub i64);

pub trait Clock {
    fn now(&self) -> TimestampMs;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> TimestampMs {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerObservation {
    Baseline { is_on: bool },
    Unchanged { is_on: bool },
    Transitioned { is_on: bool, at: TimestampMs },
    Suppressed { stable_on: bool, observed_on: bool },
}

impl PowerObservation {
    pub fn stable_on(&self) -> bool {
        match *self {
            Self::Baseline { is_on }
            | Self::Unchanged { is_on }
            | Self::Transitioned { is_on, .. } => is_on,
            Self::Suppressed { stable_on, .. } => stable_on,
        }
    }
}

/// A flip is accepted only when `debounce_ms` elapsed since the last accepted
/// flip. Rejected flips leave that timestamp untouched; a clock stepping back
/// behind it restarts the window from the new reading.
#[derive(Debug, Clone)]
pub struct PowerStateMachine {
    debounce_ms: i64,
    stable_on: Option<bool>,
    last_transition_at: Option<TimestampMs>,
}

impl PowerStateMachine {
    pub fn new(debounce_ms: i64, stable_on: Option<bool>) -> Self {
        Self {
            debounce_ms: debounce_ms.max(0),
            stable_on,
            last_transition_at: None,
        }
    }

    pub fn observe(&mut self, observed_on: bool, now: TimestampMs) -> PowerObservation {
        self.reanchor_if_clock_stepped_back(now);
        match self.stable_on {
            None => {
                self.stable_on = Some(observed_on);
                PowerObservation::Baseline { is_on: observed_on }
            }
            Some(stable) if stable == observed_on => PowerObservation::Unchanged { is_on: stable },
            Some(stable) => {
                if !self.window_elapsed(now) {
                    return PowerObservation::Suppressed {
                        stable_on: stable,
                        observed_on,
                    };
                }

                self.stable_on = Some(observed_on);
                self.last_transition_at = Some(now);
                PowerObservation::Transitioned {
                    is_on: observed_on,
                    at: now,
                }
            }
        }
    }

    pub fn stable_on(&self) -> Option<bool> {
        self.stable_on
    }

    pub fn last_transition_at(&self) -> Option<TimestampMs> {
        self.last_transition_at
    }

    fn reanchor_if_clock_stepped_back(&mut self, now: TimestampMs) {
        if let Some(last) = self.last_transition_at
            && now < last
        {
            tracing::warn!(
                last_transition_ms = last.0,
                now_ms = now.0,
                "clock moved backwards, restarting debounce window"
            );
            self.last_transition_at = Some(now);
        }
    }

    fn window_elapsed(&self, now: TimestampMs) -> bool {
        match self.last_transition_at {
            None => true,
            Some(last) => now.0 - last.0 >= self.debounce_ms,
        }
    }
}
