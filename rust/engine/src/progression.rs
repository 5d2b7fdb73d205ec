//! Player-driven mutations of [`GameState`].
//!
//! Every operation checks its guards first and returns `None` without
//! touching the state when one fails (unaffordable, gate not bought, hand
//! full, ...). On success it applies the whole change and returns the
//! matching [`GameEvent`].

use crate::cards::Suit;
use crate::cost::{cost_after_n, cost_for_n, max_buyable};
use crate::deck::Deck;
use crate::events::GameEvent;
use crate::hand::HandRanker;
use crate::number::BigNumber;
use crate::rules::{self, can_afford, Gate};
use crate::state::{BuyAmount, GameState, HandSlot};

/// Resolves a purchase of levels from a geometric curve starting at `base`:
/// `Some((levels, price))` when affordable as a whole.
fn quote(base: BigNumber, amount: BuyAmount, chips: BigNumber) -> Option<(u64, BigNumber)> {
    let levels = match amount {
        BuyAmount::Levels(0) => return None,
        BuyAmount::Levels(n) => n,
        BuyAmount::Max => {
            if !can_afford(chips, cost_for_n(base, 1)) {
                return None;
            }
            max_buyable(base, chips)
        }
    };
    let price = cost_for_n(base, levels);
    can_afford(chips, price).then_some((levels, price))
}

impl GameState {
    fn spend(&mut self, price: BigNumber) {
        self.total_chips -= price;
        // mantissa rounding can leave a hair below zero
        if self.total_chips < BigNumber::ZERO {
            self.total_chips = BigNumber::ZERO;
        }
        self.refresh_reveals();
    }

    /// Buys one more slot for `increment_hand_size_cost`; the next slot costs
    /// ten times as much.
    pub fn increment_hand_size(&mut self) -> Option<GameEvent> {
        if self.hand.len() >= rules::MAX_HAND_SIZE {
            return None;
        }
        let price = self.increment_hand_size_cost;
        if !can_afford(self.total_chips, price) {
            return None;
        }
        self.spend(price);
        self.hand.push(HandSlot::face_down(price));
        self.increment_hand_size_cost = price * BigNumber::from(rules::HAND_SIZE_COST_FACTOR);
        tracing::debug!(hand_size = self.hand.len(), cost = %price, "hand size increased");
        Some(GameEvent::HandSizeIncreased {
            hand_size: self.hand.len(),
            cost: price,
        })
    }

    /// Adds levels to a slot's multiplier. `None` for `amount` uses the
    /// selected [`GameState::buy_amount`].
    pub fn buy_slot_upgrade(&mut self, slot: usize, amount: Option<BuyAmount>) -> Option<GameEvent> {
        let base = self.hand.get(slot)?.upgrade_cost;
        let amount = amount.unwrap_or(self.buy_amount);
        let (levels, price) = quote(base, amount, self.total_chips)?;
        self.spend(price);
        let s = &mut self.hand[slot];
        s.multiplier += BigNumber::from(levels);
        s.upgrade_cost = cost_after_n(base, levels);
        tracing::debug!(slot, levels, cost = %price, "slot upgraded");
        Some(GameEvent::SlotUpgraded {
            slot,
            levels,
            cost: price,
        })
    }

    pub fn buy_suit_upgrade(&mut self, suit: Suit, amount: Option<BuyAmount>) -> Option<GameEvent> {
        let base = self.suit(suit).cost;
        let amount = amount.unwrap_or(self.buy_amount);
        let (levels, price) = quote(base, amount, self.total_chips)?;
        self.spend(price);
        let up = self.suit_mut(suit);
        up.multiplier += BigNumber::from(levels);
        up.cost = cost_after_n(base, levels);
        tracing::debug!(%suit, levels, cost = %price, "suit upgraded");
        Some(GameEvent::SuitUpgraded {
            suit,
            levels,
            cost: price,
        })
    }

    /// One-time gate purchase. The right gate also restores the base dealer
    /// interval and arms the dealer.
    pub fn buy_gate(&mut self, gate: Gate) -> Option<GameEvent> {
        if self.gate_bought(gate) {
            return None;
        }
        let price = gate.price();
        if !can_afford(self.total_chips, price) {
            return None;
        }
        self.spend(price);
        match gate {
            Gate::Left => self.left_upgrades_bought = true,
            Gate::Right => {
                self.right_upgrades_bought = true;
                self.dealer_armed = true;
                self.dealer_interval_ms = rules::BASE_DEALER_INTERVAL_MS;
            }
        }
        tracing::info!(%gate, cost = %price, "gate unlocked");
        Some(GameEvent::GateUnlocked { gate, cost: price })
    }

    pub fn decrease_dealer_interval(&mut self) -> Option<GameEvent> {
        if !self.right_upgrades_bought || self.dealer_interval_ms <= rules::MIN_DEALER_INTERVAL_MS {
            return None;
        }
        let price = self.dealer_decrease_cost;
        if !can_afford(self.total_chips, price) {
            return None;
        }
        self.spend(price);
        self.dealer_interval_ms = (self.dealer_interval_ms * rules::SPEED_UPGRADE_FACTOR)
            .max(rules::MIN_DEALER_INTERVAL_MS);
        self.dealer_decrease_cost = price * BigNumber::from(rules::SPEED_COST_FACTOR);
        tracing::debug!(interval_ms = self.dealer_interval_ms, cost = %price, "dealer sped up");
        Some(GameEvent::DealerSpedUp {
            interval_ms: self.dealer_interval_ms,
            cost: price,
        })
    }

    pub fn decrease_anim_duration(&mut self) -> Option<GameEvent> {
        if !self.right_upgrades_bought || self.anim_duration_ms <= rules::MIN_ANIM_DURATION_MS {
            return None;
        }
        let price = self.anim_decrease_cost;
        if !can_afford(self.total_chips, price) {
            return None;
        }
        self.spend(price);
        self.anim_duration_ms =
            (self.anim_duration_ms * rules::SPEED_UPGRADE_FACTOR).max(rules::MIN_ANIM_DURATION_MS);
        self.anim_decrease_cost = price * BigNumber::from(rules::SPEED_COST_FACTOR);
        tracing::debug!(duration_ms = self.anim_duration_ms, cost = %price, "animation sped up");
        Some(GameEvent::AnimationSpedUp {
            duration_ms: self.anim_duration_ms,
            cost: price,
        })
    }

    /// Selects the default purchase size. Zero levels is rejected.
    pub fn set_buy_amount(&mut self, amount: BuyAmount) -> Option<GameEvent> {
        if amount == BuyAmount::Levels(0) || amount == self.buy_amount {
            return None;
        }
        self.buy_amount = amount;
        Some(GameEvent::BuyAmountChanged { amount })
    }

    /// Deals a fresh hand into every slot and banks its score. An empty
    /// hand deals nothing.
    pub fn deal(&mut self, deck: &mut Deck, ranker: &impl HandRanker) -> Option<GameEvent> {
        if self.hand.is_empty() {
            return None;
        }
        let cards = deck.deal(self.hand.len());
        let results: Vec<BigNumber> = cards
            .iter()
            .enumerate()
            .map(|(i, &card)| self.slot_result(i, card))
            .collect();
        let rank = ranker.rank(&cards);
        let subtotal: BigNumber = results.iter().copied().sum();
        let total = (subtotal * rank.multiplier() * self.global_bonus_multiplier).round();

        for ((slot, &card), result) in self.hand.iter_mut().zip(&cards).zip(results) {
            slot.card = Some(card);
            slot.last_result = result;
        }
        self.total_chips += total;
        self.total_chips_generated += total;
        self.refresh_reveals();
        tracing::debug!(hand_size = cards.len(), %rank, %total, "dealt");
        Some(GameEvent::Dealt { cards, rank, total })
    }

    /// Minimum spacing between manual deals at the current hand size and
    /// animation speed.
    pub fn deal_delay_ms(&self) -> u64 {
        rules::deal_delay_ms(self.anim_duration_ms, self.hand.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use crate::hand::RankName;

    fn chips(v: f64) -> BigNumber {
        BigNumber::from(v)
    }

    fn rich(v: f64) -> GameState {
        let mut s = GameState::new();
        s.total_chips = chips(v);
        s
    }

    #[test]
    fn increment_hand_size_appends_and_scales_cost() {
        let mut s = GameState::new();
        let ev = s.increment_hand_size();
        assert_eq!(
            ev,
            Some(GameEvent::HandSizeIncreased {
                hand_size: 1,
                cost: chips(10.0)
            })
        );
        assert_eq!(s.total_chips, BigNumber::ZERO);
        assert_eq!(s.hand[0], HandSlot::face_down(chips(10.0)));
        assert_eq!(s.increment_hand_size_cost, chips(100.0));
        // broke now
        let before = s.clone();
        assert_eq!(s.increment_hand_size(), None);
        assert_eq!(s, before);
    }

    #[test]
    fn hand_size_caps_at_52() {
        let mut s = rich(1e80);
        for _ in 0..60 {
            s.increment_hand_size();
        }
        assert_eq!(s.hand_size(), 52);
    }

    #[test]
    fn slot_upgrade_applies_cost_curve() {
        let mut s = rich(1000.0);
        s.hand.push(HandSlot::face_down(chips(10.0)));
        let ev = s.buy_slot_upgrade(0, Some(BuyAmount::Levels(2))).unwrap();
        match ev {
            GameEvent::SlotUpgraded { slot, levels, cost } => {
                assert_eq!((slot, levels), (0, 2));
                assert!(cost.approx_eq(&chips(20.8), 1e-12));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(s.hand[0].multiplier, chips(3.0));
        assert!(s.hand[0].upgrade_cost.approx_eq(&chips(11.664), 1e-12));
        assert!(s.total_chips.approx_eq(&chips(979.2), 1e-12));
    }

    #[test]
    fn unaffordable_amount_changes_nothing() {
        let mut s = rich(25.0);
        s.hand.push(HandSlot::face_down(chips(10.0)));
        let before = s.clone();
        assert_eq!(s.buy_slot_upgrade(0, Some(BuyAmount::Levels(10))), None);
        assert_eq!(s.buy_slot_upgrade(5, Some(BuyAmount::Levels(1))), None);
        assert_eq!(s, before);
    }

    #[test]
    fn max_requires_one_affordable_level() {
        let mut s = rich(5.0);
        s.hand.push(HandSlot::face_down(chips(10.0)));
        let before = s.clone();
        assert_eq!(s.buy_slot_upgrade(0, Some(BuyAmount::Max)), None);
        assert_eq!(s, before);

        s.total_chips = chips(32.5);
        let ev = s.buy_slot_upgrade(0, Some(BuyAmount::Max)).unwrap();
        assert!(matches!(ev, GameEvent::SlotUpgraded { levels: 3, .. }));
    }

    #[test]
    fn slot_upgrade_uses_selected_buy_amount() {
        let mut s = rich(1e6);
        s.hand.push(HandSlot::face_down(chips(10.0)));
        s.set_buy_amount(BuyAmount::Levels(10));
        let ev = s.buy_slot_upgrade(0, None).unwrap();
        assert!(matches!(ev, GameEvent::SlotUpgraded { levels: 10, .. }));
        assert_eq!(s.hand[0].multiplier, chips(11.0));
    }

    #[test]
    fn suit_upgrade_is_symmetric() {
        let mut s = rich(1e5);
        s.buy_suit_upgrade(Suit::Spades, Some(BuyAmount::Levels(1))).unwrap();
        assert_eq!(s.suit(Suit::Spades).multiplier, chips(2.0));
        assert!(s.suit(Suit::Spades).cost.approx_eq(&chips(108_000.0), 1e-12));
        assert_eq!(s.total_chips, BigNumber::ZERO);
        assert_eq!(s.suit(Suit::Hearts).multiplier, BigNumber::ONE);
    }

    #[test]
    fn gates_are_one_time() {
        let mut s = rich(1e11);
        assert!(s.buy_gate(Gate::Right).is_some());
        assert!(s.dealer_armed);
        assert_eq!(s.dealer_interval_ms, rules::BASE_DEALER_INTERVAL_MS);
        assert!(s.buy_gate(Gate::Right).is_none());
        assert!(s.buy_gate(Gate::Left).is_some());
        assert!(s.left_upgrades_bought);
    }

    #[test]
    fn speed_upgrades_need_right_gate_and_respect_floor() {
        let mut s = rich(1e30);
        assert!(s.decrease_dealer_interval().is_none());
        assert!(s.decrease_anim_duration().is_none());
        s.buy_gate(Gate::Right).unwrap();

        s.decrease_dealer_interval().unwrap();
        assert_eq!(s.dealer_interval_ms, 14_250.0);
        assert_eq!(s.dealer_decrease_cost, chips(500_000.0));

        for _ in 0..100 {
            s.decrease_dealer_interval();
            s.decrease_anim_duration();
        }
        assert_eq!(s.dealer_interval_ms, rules::MIN_DEALER_INTERVAL_MS);
        assert_eq!(s.anim_duration_ms, rules::MIN_ANIM_DURATION_MS);
        assert!(s.decrease_dealer_interval().is_none());
    }

    #[test]
    fn deal_on_empty_hand_is_noop() {
        let mut s = GameState::new();
        let mut deck = Deck::new_with_seed(1);
        let before = s.clone();
        assert_eq!(s.deal(&mut deck, &crate::hand::StandardRanker), None);
        assert_eq!(s, before);
    }

    #[test]
    fn deal_scores_with_injected_ranker() {
        let mut s = GameState::new();
        s.increment_hand_size().unwrap();
        s.global_bonus_multiplier = chips(2.0);
        let mut deck = Deck::new_with_seed(42);
        let pair = |_: &[Card]| RankName::Pair;
        let ev = s.deal(&mut deck, &pair).unwrap();
        let GameEvent::Dealt { cards, rank, total } = ev else {
            panic!("expected a deal");
        };
        assert_eq!(rank, RankName::Pair);
        let card = cards[0];
        let expected = BigNumber::from(card.rank.value() as u64 * 20);
        assert_eq!(total, expected);
        assert_eq!(s.hand[0].card, Some(card));
        assert_eq!(s.total_chips, expected);
        assert_eq!(s.total_chips_generated, expected);
    }

    #[test]
    fn purchases_latch_gate_reveals() {
        let mut s = GameState::new();
        s.total_chips = chips(1e11);
        assert!(!s.gate_revealed(Gate::Right));
        s.increment_hand_size().unwrap();
        assert!(s.gate_revealed(Gate::Left));
        assert!(s.gate_revealed(Gate::Right));
    }

    #[test]
    fn spending_keeps_lifetime_counter() {
        let mut s = GameState::new();
        s.total_chips_generated = chips(500.0);
        s.total_chips = chips(500.0);
        s.increment_hand_size().unwrap();
        assert_eq!(s.total_chips_generated, chips(500.0));
        assert!(s.total_chips.approx_eq(&chips(490.0), 1e-12));
    }

    #[test]
    fn buy_amount_change_reports_only_changes() {
        let mut s = GameState::new();
        assert!(s.set_buy_amount(BuyAmount::Levels(1)).is_none());
        assert!(s.set_buy_amount(BuyAmount::Levels(0)).is_none());
        assert!(s.set_buy_amount(BuyAmount::Max).is_some());
        assert_eq!(s.buy_amount, BuyAmount::Max);
    }
}
