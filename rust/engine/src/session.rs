use serde::{Deserialize, Serialize};

use crate::cards::Suit;
use crate::codec::{save_state, KeyValueStore};
use crate::deck::Deck;
use crate::errors::CodecError;
use crate::events::{EventSink, GameEvent};
use crate::hand::{HandRanker, StandardRanker};
use crate::rules::Gate;
use crate::state::{BuyAmount, GameState};

pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 500;

/// Everything a player can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Deal,
    IncrementHandSize,
    BuySlot {
        slot: usize,
        amount: Option<BuyAmount>,
    },
    BuySuit {
        suit: Suit,
        amount: Option<BuyAmount>,
    },
    BuyGate {
        gate: Gate,
    },
    DecreaseDealerInterval,
    DecreaseAnimDuration,
    SetBuyAmount {
        amount: BuyAmount,
    },
    Prestige,
    Ascend,
}

/// Single-threaded driver around one [`GameState`].
///
/// Time is a caller-supplied monotonic millisecond clock. The session owns
/// the manual-deal rate limit, the dealer automation deadline and the
/// debounced save deadline; it never sleeps or spawns anything itself.
///
/// # Examples
///
/// ```
/// use chipdeck_engine::codec::MemoryStore;
/// use chipdeck_engine::session::{Action, Session};
/// use chipdeck_engine::state::GameState;
///
/// let mut session = Session::new(GameState::new(), 42);
/// session.apply(Action::IncrementHandSize, 0);
/// assert!(session.apply(Action::Deal, 1_000).is_some());
/// // a second deal inside the animation window is ignored
/// assert!(session.apply(Action::Deal, 1_010).is_none());
///
/// let mut store = MemoryStore::new();
/// assert!(!session.flush_if_due(1_100, &mut store).unwrap());
/// assert!(session.flush_if_due(1_500, &mut store).unwrap());
/// ```
pub struct Session<R: HandRanker = StandardRanker> {
    state: GameState,
    deck: Deck,
    ranker: R,
    last_manual_deal_ms: Option<u64>,
    next_dealer_ms: Option<u64>,
    save_due_ms: Option<u64>,
    autosave_debounce_ms: u64,
    sink: Option<Box<dyn EventSink>>,
}

impl Session<StandardRanker> {
    pub fn new(state: GameState, seed: u64) -> Self {
        Self::with_ranker(state, seed, StandardRanker)
    }
}

impl<R: HandRanker> Session<R> {
    pub fn with_ranker(state: GameState, seed: u64, ranker: R) -> Self {
        Self {
            state,
            deck: Deck::new_with_seed(seed),
            ranker,
            last_manual_deal_ms: None,
            next_dealer_ms: None,
            save_due_ms: None,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            sink: None,
        }
    }

    pub fn with_autosave_debounce(mut self, ms: u64) -> Self {
        self.autosave_debounce_ms = ms;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// When the dealer will next deal on its own, if armed.
    pub fn next_dealer_ms(&self) -> Option<u64> {
        self.next_dealer_ms
    }

    pub fn save_pending(&self) -> bool {
        self.save_due_ms.is_some()
    }

    /// Earliest instant at which [`Session::poll`] or
    /// [`Session::flush_if_due`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.next_dealer_ms, self.save_due_ms) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn dealer_interval(&self) -> u64 {
        self.state.dealer_interval_ms.round() as u64
    }

    /// Runs one player action. Returns the resulting event, or `None` when a
    /// guard (funds, gates, rate limit, ...) turned it into a no-op.
    pub fn apply(&mut self, action: Action, now_ms: u64) -> Option<GameEvent> {
        let event = match action {
            Action::Deal => {
                if let Some(last) = self.last_manual_deal_ms {
                    let delay = self.state.deal_delay_ms();
                    if now_ms.saturating_sub(last) < delay {
                        tracing::trace!(now_ms, last, delay, "manual deal rate limited");
                        return None;
                    }
                }
                let ev = self.state.deal(&mut self.deck, &self.ranker);
                if ev.is_some() {
                    self.last_manual_deal_ms = Some(now_ms);
                }
                ev
            }
            Action::IncrementHandSize => self.state.increment_hand_size(),
            Action::BuySlot { slot, amount } => self.state.buy_slot_upgrade(slot, amount),
            Action::BuySuit { suit, amount } => self.state.buy_suit_upgrade(suit, amount),
            Action::BuyGate { gate } => {
                let ev = self.state.buy_gate(gate);
                if ev.is_some() && gate == Gate::Right {
                    self.next_dealer_ms = Some(now_ms + self.dealer_interval());
                }
                ev
            }
            Action::DecreaseDealerInterval => {
                let ev = self.state.decrease_dealer_interval();
                if ev.is_some() {
                    self.next_dealer_ms = Some(now_ms + self.dealer_interval());
                }
                ev
            }
            Action::DecreaseAnimDuration => self.state.decrease_anim_duration(),
            Action::SetBuyAmount { amount } => self.state.set_buy_amount(amount),
            Action::Prestige => {
                let ev = self.state.prestige();
                if ev.is_some() {
                    self.after_reset();
                }
                ev
            }
            Action::Ascend => {
                let ev = self.state.ascend(&mut self.deck);
                if ev.is_some() {
                    self.after_reset();
                }
                ev
            }
        }?;
        self.record(&event, now_ms);
        Some(event)
    }

    fn after_reset(&mut self) {
        self.next_dealer_ms = None;
        self.last_manual_deal_ms = None;
    }

    fn record(&mut self, event: &GameEvent, now_ms: u64) {
        self.save_due_ms = Some(now_ms + self.autosave_debounce_ms);
        if let Some(sink) = self.sink.as_mut() {
            sink.notify(&self.state, event);
        }
    }

    /// Runs dealer automation. A session resumed with an armed dealer first
    /// schedules its deadline; a due deadline deals once, unthrottled, and
    /// schedules the next one a full interval after `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.state.dealer_armed {
            self.next_dealer_ms = None;
            return events;
        }
        match self.next_dealer_ms {
            None => self.next_dealer_ms = Some(now_ms + self.dealer_interval()),
            Some(due) if now_ms >= due => {
                self.next_dealer_ms = Some(now_ms + self.dealer_interval());
                if let Some(ev) = self.state.deal(&mut self.deck, &self.ranker) {
                    tracing::debug!(now_ms, "dealer dealt");
                    self.record(&ev, now_ms);
                    events.push(ev);
                }
            }
            Some(_) => {}
        }
        events
    }

    /// Writes a snapshot if the debounce deadline has passed. Returns whether
    /// anything was written.
    pub fn flush_if_due(&mut self, now_ms: u64, store: &mut dyn KeyValueStore) -> Result<bool, CodecError> {
        match self.save_due_ms {
            Some(due) if now_ms >= due => {
                self.flush(store)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Writes a snapshot now and clears any pending deadline.
    pub fn flush(&mut self, store: &mut dyn KeyValueStore) -> Result<(), CodecError> {
        save_state(&self.state, store)?;
        self.save_due_ms = None;
        tracing::debug!(chips = %self.state.total_chips, "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use crate::codec::{load_state, MemoryStore};
    use crate::hand::RankName;
    use crate::number::BigNumber;
    use std::sync::{Arc, Mutex};

    fn high_card(_: &[Card]) -> RankName {
        RankName::HighCard
    }

    fn session_with(chips: f64) -> Session<fn(&[Card]) -> RankName> {
        let mut state = GameState::new();
        state.total_chips = BigNumber::from(chips);
        Session::with_ranker(state, 7, high_card as fn(&[Card]) -> RankName)
    }

    #[test]
    fn manual_deals_are_rate_limited() {
        let mut s = session_with(10.0);
        s.apply(Action::IncrementHandSize, 0).unwrap();
        let delay = s.state().deal_delay_ms();
        assert_eq!(delay, 350);
        assert!(s.apply(Action::Deal, 1_000).is_some());
        assert!(s.apply(Action::Deal, 1_000 + delay - 1).is_none());
        assert!(s.apply(Action::Deal, 1_000 + delay).is_some());
    }

    #[test]
    fn deal_with_empty_hand_does_not_start_the_window() {
        let mut s = session_with(10.0);
        assert!(s.apply(Action::Deal, 0).is_none());
        assert!(!s.save_pending());
        s.apply(Action::IncrementHandSize, 1).unwrap();
        assert!(s.apply(Action::Deal, 2).is_some());
    }

    #[test]
    fn right_gate_arms_the_dealer() {
        let mut s = session_with(6e10);
        s.apply(Action::IncrementHandSize, 0).unwrap();
        assert!(s.poll(100).is_empty());
        assert_eq!(s.next_dealer_ms(), None);

        s.apply(Action::BuyGate { gate: Gate::Right }, 1_000).unwrap();
        assert_eq!(s.next_dealer_ms(), Some(16_000));
        assert!(s.poll(15_999).is_empty());
        let events = s.poll(16_000);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::Dealt { .. }));
        assert_eq!(s.next_dealer_ms(), Some(31_000));
    }

    #[test]
    fn automation_catches_up_one_tick_per_poll() {
        let mut s = session_with(6e10);
        s.apply(Action::IncrementHandSize, 0).unwrap();
        s.apply(Action::BuyGate { gate: Gate::Right }, 0).unwrap();
        assert_eq!(s.poll(100_000).len(), 1);
        assert_eq!(s.next_dealer_ms(), Some(115_000));
    }

    #[test]
    fn dealer_speedup_restarts_the_deadline() {
        let mut s = session_with(1e11);
        s.apply(Action::BuyGate { gate: Gate::Right }, 0).unwrap();
        s.apply(Action::DecreaseDealerInterval, 5_000).unwrap();
        assert_eq!(s.next_dealer_ms(), Some(5_000 + 14_250));
    }

    #[test]
    fn resumed_armed_session_schedules_before_dealing() {
        let mut state = GameState::new();
        state.dealer_armed = true;
        state.right_upgrades_bought = true;
        let mut s = Session::new(state, 1);
        assert!(s.poll(50).is_empty());
        assert_eq!(s.next_dealer_ms(), Some(15_050));
    }

    #[test]
    fn resets_clear_the_dealer() {
        let mut s = session_with(1e11);
        s.apply(Action::BuyGate { gate: Gate::Right }, 0).unwrap();
        let mut state = s.state().clone();
        state.total_chips_generated = BigNumber::from(1e12);
        let mut s = Session::with_ranker(state, 3, high_card as fn(&[Card]) -> RankName);
        s.poll(0);
        assert!(s.next_dealer_ms().is_some());
        s.apply(Action::Prestige, 10).unwrap();
        assert_eq!(s.next_dealer_ms(), None);
        assert!(s.poll(1_000_000).is_empty());
        assert_eq!(s.state().global_bonus_multiplier, BigNumber::from(2u64));
    }

    #[test]
    fn save_is_debounced_and_superseded() {
        let mut s = session_with(1e6).with_autosave_debounce(500);
        let mut store = MemoryStore::new();
        s.apply(Action::IncrementHandSize, 0).unwrap();
        s.apply(Action::IncrementHandSize, 300).unwrap();
        assert_eq!(s.next_deadline(), Some(800));
        assert!(!s.flush_if_due(500, &mut store).unwrap());
        assert!(store.is_empty());
        assert!(s.flush_if_due(800, &mut store).unwrap());
        assert!(!s.save_pending());
        assert_eq!(load_state(&store).hand_size(), 2);
        assert!(!s.flush_if_due(5_000, &mut store).unwrap());
    }

    #[test]
    fn no_op_actions_do_not_schedule_saves() {
        let mut s = session_with(0.0);
        assert!(s.apply(Action::IncrementHandSize, 0).is_none());
        assert!(s.apply(Action::Prestige, 0).is_none());
        assert!(s.apply(Action::BuySlot { slot: 0, amount: None }, 0).is_none());
        assert_eq!(s.next_deadline(), None);
    }

    struct Shared(Arc<Mutex<Vec<(String, GameEvent)>>>);

    impl EventSink for Shared {
        fn notify(&mut self, state: &GameState, event: &GameEvent) {
            self.0
                .lock()
                .unwrap()
                .push((state.total_chips.to_string(), event.clone()));
        }
    }

    #[test]
    fn sink_sees_state_after_each_event() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut s = session_with(10.0).with_sink(Box::new(Shared(seen.clone())));
        s.apply(Action::IncrementHandSize, 0).unwrap();
        s.apply(
            Action::SetBuyAmount {
                amount: BuyAmount::Max,
            },
            1,
        )
        .unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "0");
        assert!(matches!(seen[1].1, GameEvent::BuyAmountChanged { .. }));
    }

    #[test]
    fn actions_serialize_as_tagged_objects() {
        let a = Action::BuySuit {
            suit: Suit::Hearts,
            amount: Some(BuyAmount::Max),
        };
        let json = serde_json::to_value(a).unwrap();
        assert_eq!(json["action"], "buy_suit");
        assert_eq!(json["suit"], "hearts");
        assert_eq!(json["amount"], -1);
    }
}
