//! Prestige and ascension: the two meta-resets.
//!
//! Both build a complete replacement [`GameState`] and swap it in at once, so
//! a reset is never observed half-applied.

use crate::deck::Deck;
use crate::events::GameEvent;
use crate::number::BigNumber;
use crate::rules::MAX_HAND_SIZE;
use crate::state::GameState;

impl GameState {
    /// Fresh progression that keeps what outlives a reset: the ascended set,
    /// the purchase-size selection and the gate reveal flags.
    fn soft_reset(&self, global_bonus_multiplier: BigNumber) -> GameState {
        GameState {
            global_bonus_multiplier,
            ascended: self.ascended.clone(),
            buy_amount: self.buy_amount,
            left_gate_revealed: self.left_gate_revealed,
            right_gate_revealed: self.right_gate_revealed,
            ..GameState::new()
        }
    }

    pub fn can_prestige(&self) -> bool {
        self.prestige_multiplier() >= BigNumber::ONE
    }

    pub fn can_ascend(&self) -> bool {
        self.hand.len() >= MAX_HAND_SIZE && self.ascended.len() < MAX_HAND_SIZE
    }

    /// Converts lifetime production into permanent global bonus, then starts
    /// over. No-op while the prestige multiplier is below one.
    pub fn prestige(&mut self) -> Option<GameEvent> {
        if !self.can_prestige() {
            return None;
        }
        let gained = self.prestige_multiplier();
        let bonus = self.global_bonus_multiplier + gained;
        *self = self.soft_reset(bonus);
        tracing::info!(%gained, global_bonus = %bonus, "prestiged");
        Some(GameEvent::Prestiged {
            gained,
            global_bonus: bonus,
        })
    }

    /// Promotes one uniformly chosen card that is not yet ascended, then
    /// starts over with the global bonus back at one. Needs a full hand.
    pub fn ascend(&mut self, deck: &mut Deck) -> Option<GameEvent> {
        if !self.can_ascend() {
            return None;
        }
        let card = deck.pick(&self.ascended.remaining())?;
        let mut next = self.soft_reset(BigNumber::ONE);
        next.ascended.insert(card);
        *self = next;
        tracing::info!(%card, ascended_count = self.ascended.len(), "ascended");
        Some(GameEvent::Ascended {
            card,
            ascended_count: self.ascended.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Gate;
    use crate::state::{BuyAmount, HandSlot};

    fn full_hand(s: &mut GameState) {
        s.hand = (0..MAX_HAND_SIZE)
            .map(|_| HandSlot::face_down(BigNumber::from(10u64)))
            .collect();
    }

    #[test]
    fn prestige_on_fresh_state_is_noop() {
        let mut s = GameState::new();
        let before = s.clone();
        assert_eq!(s.prestige(), None);
        assert_eq!(s, before);
    }

    #[test]
    fn prestige_banks_multiplier_and_resets() {
        let mut s = GameState::new();
        s.total_chips_generated = BigNumber::from(2.5e12);
        s.total_chips = BigNumber::from(1e12);
        s.increment_hand_size().unwrap();
        s.buy_gate(Gate::Right).unwrap();
        s.buy_amount = BuyAmount::Max;
        s.ascended.insert("Kd".parse().unwrap());

        let ev = s.prestige().unwrap();
        assert_eq!(
            ev,
            GameEvent::Prestiged {
                gained: BigNumber::from(2u64),
                global_bonus: BigNumber::from(3u64),
            }
        );
        assert_eq!(s.global_bonus_multiplier, BigNumber::from(3u64));
        assert_eq!(s.total_chips, BigNumber::from(10u64));
        assert_eq!(s.total_chips_generated, BigNumber::ZERO);
        assert_eq!(s.prestige_multiplier(), BigNumber::ZERO);
        assert!(s.hand.is_empty());
        assert!(!s.right_upgrades_bought);
        assert!(!s.dealer_armed);
        assert_eq!(s.buy_amount, BuyAmount::Max);
        assert_eq!(s.ascended_count(), 1);
    }

    #[test]
    fn ascension_needs_full_hand() {
        let mut s = GameState::new();
        s.hand = (0..51)
            .map(|_| HandSlot::face_down(BigNumber::from(10u64)))
            .collect();
        let mut deck = Deck::new_with_seed(5);
        let before = s.clone();
        assert_eq!(s.ascend(&mut deck), None);
        assert_eq!(s, before);
    }

    #[test]
    fn ascension_marks_one_new_card_and_resets_bonus() {
        let mut s = GameState::new();
        full_hand(&mut s);
        s.global_bonus_multiplier = BigNumber::from(40u64);
        let mut deck = Deck::new_with_seed(5);
        let ev = s.ascend(&mut deck).unwrap();
        let GameEvent::Ascended {
            card,
            ascended_count,
        } = ev
        else {
            panic!("expected ascension");
        };
        assert_eq!(ascended_count, 1);
        assert!(s.ascended.contains(&card));
        assert_eq!(s.global_bonus_multiplier, BigNumber::ONE);
        assert!(s.hand.is_empty());
        assert_eq!(s.total_chips, BigNumber::from(10u64));
    }

    #[test]
    fn ascension_never_repeats_and_stops_at_52() {
        let mut s = GameState::new();
        let mut deck = Deck::new_with_seed(11);
        for i in 1..=52 {
            full_hand(&mut s);
            s.ascend(&mut deck).unwrap();
            assert_eq!(s.ascended_count(), i);
        }
        full_hand(&mut s);
        assert_eq!(s.ascend(&mut deck), None);
        assert!(s.ascended.remaining().is_empty());
    }
}
