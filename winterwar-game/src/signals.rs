//! Presentation signals emitted alongside committed transitions.
//!
//! Signals are fire-and-forget cues for sound and animation layers. The
//! simulation never reads them back.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signal {
    AttackHit,
    AttackMiss,
    Critical,
    Fumble,
    EnemyHit,
    EnemyMiss,
    Victory,
    Defeat,
    Captured,
    Released,
    Purchase,
    Sale,
    InsufficientFunds,
    Recruited,
    Equipped,
    Unequipped,
    TravelStart,
    TravelArrive,
    Ambush,
    WarHorn,
    ArenaWin,
    ArenaLoss,
}

/// Receiver for presentation signals.
pub trait SignalSink {
    fn emit(&mut self, signal: Signal);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SignalSink for NullSink {
    fn emit(&mut self, _signal: Signal) {}
}

impl SignalSink for Vec<Signal> {
    fn emit(&mut self, signal: Signal) {
        self.push(signal);
    }
}

impl<S: SignalSink + ?Sized> SignalSink for &mut S {
    fn emit(&mut self, signal: Signal) {
        (**self).emit(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<Signal> = Vec::new();
        sink.emit(Signal::WarHorn);
        sink.emit(Signal::AttackHit);
        assert_eq!(sink, vec![Signal::WarHorn, Signal::AttackHit]);
    }

    #[test]
    fn signals_serialize_kebab_case() {
        let json = serde_json::to_string(&Signal::InsufficientFunds).unwrap();
        assert_eq!(json, "\"insufficient-funds\"");
    }
}
