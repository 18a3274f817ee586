//! Carried recurrence state for every indicator of one instrument.

use crate::domain::Bar;
use crate::error::SignalError;
use crate::indicators::{
    MomentumDensity, MomentumDensityState, QuantumChannel, QuantumChannelState, QuantumMa,
    QuantumMaState, RatchetStop, RatchetStopState, T3Pair, T3PairState, WavePulse, WavePulseState,
};
use crate::params::StrategyParams;

use super::frame::IndicatorFrame;

/// One state per indicator, advanced together in a fixed order.
///
/// Owned by a single strategy instance; `reset` on a new instrument or a
/// walk-forward restart.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorState {
    baseline: QuantumMaState,
    wave: WavePulseState,
    channel: QuantumChannelState,
    density: MomentumDensityState,
    stop: RatchetStopState,
    t3: T3PairState,
    bars_seen: usize,
}

impl IndicatorState {
    pub fn new(params: &StrategyParams) -> Result<Self, SignalError> {
        let baseline = QuantumMa::new(
            params.baseline_adx_length,
            params.baseline_weight,
            params.baseline_ma_length,
        )?;
        let wave = WavePulse::new(params.wave_smooth_period, params.wave_constant_factor)?;
        let channel = QuantumChannel::new(
            params.channel_source,
            params.channel_poles,
            params.channel_period,
            params.channel_multiplier,
        )?;
        let density = MomentumDensity::new(
            params.density_ma_length,
            params.density_calc_length,
            params.density_smooth_length,
        )?;
        let stop = RatchetStop::new(
            params.stop_atr_length,
            params.stop_atr_multiplier,
            params.stop_use_wicks,
            params.stop_initial_direction,
        )?;
        let t3 = T3Pair::new(params.t3_fast_length, params.t3_slow_length, params.t3_factor)?;

        Ok(Self {
            baseline: baseline.state(),
            wave: wave.state(),
            channel: channel.state(),
            density: density.state(),
            stop: stop.state(),
            t3: t3.state(),
            bars_seen: 0,
        })
    }

    /// Advance every indicator by one bar.
    pub fn update(&mut self, bar: &Bar) -> IndicatorFrame {
        let frame = IndicatorFrame {
            index: self.bars_seen,
            timestamp: bar.timestamp,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            baseline: self.baseline.update(bar),
            wave: self.wave.update(bar),
            channel: self.channel.update(bar),
            density: self.density.update(bar),
            stop: self.stop.update(bar),
            t3: self.t3.update(bar),
        };
        self.bars_seen += 1;
        frame
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    pub fn reset(&mut self) {
        self.baseline.reset();
        self.wave.reset();
        self.channel.reset();
        self.density.reset();
        self.stop.reset();
        self.t3.reset();
        self.bars_seen = 0;
    }
}
