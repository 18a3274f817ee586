//! Ratchet trailing stop — ATR stop pair with a LONG/SHORT direction flag.
//!
//! Candidates: mid -/+ mult * ATR with mid = (high + low) / 2.
//!
//! Ratchet: the committed long stop only rises while the previous bar's low
//! stayed above it; a breach resets it to the raw candidate. The short stop
//! mirrors this with highs and `min`.
//!
//! Flip: LONG -> SHORT when the current low touches the previous long stop,
//! SHORT -> LONG when the current high touches the previous short stop. A
//! zero-width stop (ATR == 0) cannot be breached.
//!
//! Undefined until ATR is (atr_length bars). The first defined bar seeds both
//! stops with the raw candidates and the direction with the configured seed.
//!
//! Inherently sequential: `RatchetStopState::update` is the only step function;
//! `Indicator::compute` folds it over the history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::{require_length, require_positive, SignalError};

use super::atr::AtrState;
use super::Indicator;

/// Direction flag of the stop state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopDirection {
    #[default]
    Long,
    Short,
}

impl StopDirection {
    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// Move a stop only in the favorable direction: up for longs, down for shorts.
    pub fn tighten(self, committed: f64, proposed: f64) -> f64 {
        match self {
            Self::Long => committed.max(proposed),
            Self::Short => committed.min(proposed),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

impl fmt::Display for StopDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Committed stop values for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopLevels {
    pub long_stop: f64,
    pub short_stop: f64,
    pub direction: StopDirection,
    pub atr: f64,
}

impl StopLevels {
    /// The stop guarding the current direction.
    pub fn active_stop(&self) -> f64 {
        match self.direction {
            StopDirection::Long => self.long_stop,
            StopDirection::Short => self.short_stop,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatchetStop {
    atr_length: usize,
    multiplier: f64,
    use_wicks: bool,
    initial_direction: StopDirection,
    name: String,
}

impl RatchetStop {
    pub fn new(
        atr_length: usize,
        multiplier: f64,
        use_wicks: bool,
        initial_direction: StopDirection,
    ) -> Result<Self, SignalError> {
        require_length("stop_atr_length", atr_length)?;
        require_positive("stop_atr_multiplier", multiplier)?;
        Ok(Self {
            atr_length,
            multiplier,
            use_wicks,
            initial_direction,
            name: format!("ratchet_stop_{atr_length}_{multiplier}"),
        })
    }

    pub fn atr_length(&self) -> usize {
        self.atr_length
    }

    pub fn state(&self) -> RatchetStopState {
        RatchetStopState {
            atr: AtrState::new(self.atr_length),
            multiplier: self.multiplier,
            use_wicks: self.use_wicks,
            initial_direction: self.initial_direction,
            prev: None,
        }
    }

    pub fn compute_levels(&self, bars: &[Bar]) -> Vec<Option<StopLevels>> {
        let mut state = self.state();
        bars.iter().map(|bar| state.update(bar)).collect()
    }
}

/// Previous committed levels plus the reference prices of that bar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Committed {
    levels: StopLevels,
    high: f64,
    low: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatchetStopState {
    atr: AtrState,
    multiplier: f64,
    use_wicks: bool,
    initial_direction: StopDirection,
    prev: Option<Committed>,
}

impl RatchetStopState {
    pub fn update(&mut self, bar: &Bar) -> Option<StopLevels> {
        let atr = self.atr.update(bar)?;
        if !atr.is_finite() {
            return self.levels();
        }

        let mid = bar.hl2();
        let raw_long = mid - atr * self.multiplier;
        let raw_short = mid + atr * self.multiplier;
        let (high, low) = if self.use_wicks {
            (bar.high, bar.low)
        } else {
            (bar.close, bar.close)
        };

        let levels = match self.prev {
            None => StopLevels {
                long_stop: raw_long,
                short_stop: raw_short,
                direction: self.initial_direction,
                atr,
            },
            Some(prev) => {
                let p = prev.levels;
                let long_stop = if prev.low > p.long_stop {
                    StopDirection::Long.tighten(p.long_stop, raw_long)
                } else {
                    raw_long
                };
                let short_stop = if prev.high < p.short_stop {
                    StopDirection::Short.tighten(p.short_stop, raw_short)
                } else {
                    raw_short
                };
                let breachable = atr > 0.0;
                let direction = match p.direction {
                    StopDirection::Long if breachable && low <= p.long_stop => StopDirection::Short,
                    StopDirection::Short if breachable && high >= p.short_stop => StopDirection::Long,
                    unchanged => unchanged,
                };
                StopLevels {
                    long_stop,
                    short_stop,
                    direction,
                    atr,
                }
            }
        };

        self.prev = Some(Committed { levels, high, low });
        Some(levels)
    }

    /// Last committed levels, if the stop has been seeded.
    pub fn levels(&self) -> Option<StopLevels> {
        self.prev.map(|c| c.levels)
    }

    pub fn reset(&mut self) {
        self.atr.reset();
        self.prev = None;
    }
}

impl Indicator for RatchetStop {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.atr_length - 1
    }

    /// Active stop: long stop while LONG, short stop while SHORT.
    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.compute_levels(bars)
            .into_iter()
            .map(|levels| levels.map_or(f64::NAN, |l| l.active_stop()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    fn stop(atr_length: usize, mult: f64) -> RatchetStop {
        RatchetStop::new(atr_length, mult, true, StopDirection::Long).unwrap()
    }

    fn trend_bars(n: usize, start: f64, step: f64) -> Vec<(f64, f64, f64, f64)> {
        (0..n)
            .map(|i| {
                let c = start + step * i as f64;
                (c - step, c + 0.5, c - 0.5, c)
            })
            .collect()
    }

    #[test]
    fn undefined_until_atr_window_fills() {
        let bars = make_ohlc_bars(&trend_bars(5, 100.0, 1.0));
        let levels = stop(3, 2.0).compute_levels(&bars);
        assert!(levels[0].is_none());
        assert!(levels[1].is_none());
        assert!(levels[2].is_some());
        assert_eq!(stop(3, 2.0).lookback(), 2);
    }

    #[test]
    fn seed_uses_raw_candidates_and_initial_direction() {
        let bars = make_ohlc_bars(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 11.0, 9.0, 10.0),
        ]);
        let seeded = RatchetStop::new(2, 1.5, true, StopDirection::Short)
            .unwrap()
            .compute_levels(&bars)[1]
            .unwrap();
        // ATR = 2, mid = 10.
        assert_approx(seeded.long_stop, 7.0, DEFAULT_EPSILON);
        assert_approx(seeded.short_stop, 13.0, DEFAULT_EPSILON);
        assert_eq!(seeded.direction, StopDirection::Short);
    }

    #[test]
    fn constant_price_never_flips() {
        let bars = make_ohlc_bars(&vec![(50.0, 50.0, 50.0, 50.0); 40]);
        let levels: Vec<_> = stop(22, 3.0)
            .compute_levels(&bars)
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(levels.len(), 40 - 21);
        for l in &levels {
            assert_eq!(l.direction, StopDirection::Long);
            assert_approx(l.atr, 0.0, DEFAULT_EPSILON);
            assert_approx(l.long_stop, 50.0, DEFAULT_EPSILON);
            assert_approx(l.short_stop, 50.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn long_stop_ratchets_up_in_uptrend() {
        let bars = make_ohlc_bars(&trend_bars(60, 100.0, 0.1));
        let levels: Vec<_> = stop(22, 3.0)
            .compute_levels(&bars)
            .into_iter()
            .flatten()
            .collect();
        for pair in levels.windows(2) {
            assert_eq!(pair[1].direction, StopDirection::Long);
            assert!(pair[1].long_stop >= pair[0].long_stop);
        }
    }

    #[test]
    fn flips_short_on_breach_then_back_long() {
        let mut data = trend_bars(10, 100.0, 1.0);
        // Crash through the long stop.
        data.push((109.0, 109.0, 90.0, 91.0));
        data.push((91.0, 91.5, 89.0, 90.0));
        // Rip through the short stop.
        data.push((90.0, 130.0, 90.0, 129.0));
        let bars = make_ohlc_bars(&data);
        let levels = stop(3, 1.0).compute_levels(&bars);

        assert_eq!(levels[9].unwrap().direction, StopDirection::Long);
        assert_eq!(levels[10].unwrap().direction, StopDirection::Short);
        assert_eq!(levels[11].unwrap().direction, StopDirection::Short);
        assert_eq!(levels[12].unwrap().direction, StopDirection::Long);
    }

    #[test]
    fn breach_resets_long_stop_to_raw_candidate() {
        let mut data = trend_bars(10, 100.0, 1.0);
        data.push((109.0, 109.0, 90.0, 91.0));
        data.push((91.0, 92.0, 90.0, 91.0));
        let bars = make_ohlc_bars(&data);
        let levels = stop(3, 1.0).compute_levels(&bars);

        let after = levels[11].unwrap();
        // Bar 10's low breached its long stop, so bar 11 takes the raw candidate.
        assert_approx(after.long_stop, 91.0 - after.atr, DEFAULT_EPSILON);
    }

    #[test]
    fn closes_replace_wicks_when_disabled() {
        let mut data = trend_bars(10, 100.0, 1.0);
        // Long lower wick that closes back above the stop.
        data.push((109.0, 110.0, 95.0, 109.5));
        let bars = make_ohlc_bars(&data);

        let wicks = stop(3, 1.0).compute_levels(&bars);
        let closes = RatchetStop::new(3, 1.0, false, StopDirection::Long)
            .unwrap()
            .compute_levels(&bars);
        assert_eq!(wicks[10].unwrap().direction, StopDirection::Short);
        assert_eq!(closes[10].unwrap().direction, StopDirection::Long);
    }

    #[test]
    fn reset_forgets_history() {
        let bars = make_ohlc_bars(&trend_bars(10, 100.0, 1.0));
        let rs = stop(3, 2.0);
        let mut state = rs.state();
        for bar in &bars {
            state.update(bar);
        }
        state.reset();
        assert!(state.levels().is_none());
        assert!(state.update(&bars[0]).is_none());
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(RatchetStop::new(0, 3.0, true, StopDirection::Long).is_err());
        assert!(RatchetStop::new(22, 0.0, true, StopDirection::Long).is_err());
        assert!(RatchetStop::new(22, f64::NAN, true, StopDirection::Long).is_err());
    }

    #[test]
    fn tighten_moves_one_way() {
        assert_eq!(StopDirection::Long.tighten(95.0, 100.0), 100.0);
        assert_eq!(StopDirection::Long.tighten(100.0, 90.0), 100.0);
        assert_eq!(StopDirection::Short.tighten(105.0, 100.0), 100.0);
        assert_eq!(StopDirection::Short.tighten(100.0, 110.0), 100.0);
    }
}
