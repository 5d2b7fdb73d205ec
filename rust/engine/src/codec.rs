//! Flat key-value persistence of [`GameState`].
//!
//! Each field lives under its own string key as a JSON document: numbers and
//! booleans as themselves, [`BigNumber`]s as their canonical object, the
//! hand as parallel arrays. Loading is total: a key that is absent or fails
//! to decode falls back to the value of a fresh game, independently of every
//! other key.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cards::{full_deck, Card, Suit};
use crate::errors::CodecError;
use crate::number::BigNumber;
use crate::rules::{self, MAX_HAND_SIZE};
use crate::state::{AscendedCards, GameState, HandSlot};

/// Storage key names.
pub mod keys {
    pub const HAND_CODES: &str = "hand-codes";
    pub const HAND_MULT: &str = "hand-mult";
    pub const HAND_RES: &str = "hand-res";
    pub const HAND_COSTS: &str = "hand-costs";
    pub const TOTAL_CHIPS: &str = "total-chips";
    pub const TOTAL_CHIPS_GENERATED: &str = "total-chips-generated";
    pub const INCREMENT_HAND_COST: &str = "increment-hand-cost";
    pub const IS_LEFT_BOUGHT: &str = "is-left-bought";
    pub const IS_RIGHT_BOUGHT: &str = "is-right-bought";
    pub const HEARTS_MULTIP: &str = "hearts-multip";
    pub const HEARTS_COST: &str = "hearts-cost";
    pub const CLUBS_MULTIP: &str = "clubs-multip";
    pub const CLUBS_COST: &str = "clubs-cost";
    pub const DIAMONDS_MULTIP: &str = "diamonds-multip";
    pub const DIAMONDS_COST: &str = "diamonds-cost";
    pub const SPADES_MULTIP: &str = "spades-multip";
    pub const SPADES_COST: &str = "spades-cost";
    pub const HAS_DEALER: &str = "has-dealer";
    pub const DEALER_INTERVAL: &str = "dealer-interval";
    pub const DEALER_DECREASE_COST: &str = "dealer-decrease-time-cost";
    pub const ANIM_DURATION: &str = "anim-duration";
    pub const ANIM_DECREASE_COST: &str = "decrease-anim-duration-cost";
    pub const PRESTIGE_MULTIP: &str = "prestige-multip";
    pub const GLOBAL_BONUS_MULTIP: &str = "global-bonus-multip";
    pub const ASCENDED_DICT: &str = "ascended-dict";
    pub const ASCENDED_COUNT: &str = "ascended-cards-count";
    pub const BUY_AMOUNT: &str = "buy-amount";
    pub const LEFT_REVEALED: &str = "left-revealed";
    pub const RIGHT_REVEALED: &str = "right-revealed";
}

/// Code stored in `hand-codes` for a slot that has not been dealt yet.
pub const FACE_DOWN: &str = "back";

/// The persistence medium: an opaque string-keyed store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store for tests and embedders without a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

fn suit_keys(suit: Suit) -> (&'static str, &'static str) {
    match suit {
        Suit::Hearts => (keys::HEARTS_MULTIP, keys::HEARTS_COST),
        Suit::Clubs => (keys::CLUBS_MULTIP, keys::CLUBS_COST),
        Suit::Diamonds => (keys::DIAMONDS_MULTIP, keys::DIAMONDS_COST),
        Suit::Spades => (keys::SPADES_MULTIP, keys::SPADES_COST),
    }
}

fn put<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &'static str,
    value: &T,
) -> Result<(), CodecError> {
    let json = serde_json::to_string(value).map_err(|source| CodecError::Encode { key, source })?;
    store.set(key, json);
    Ok(())
}

/// Writes every key of `state`, including the derived `prestige-multip` and
/// `ascended-cards-count` that loading recomputes.
pub fn save_state(state: &GameState, store: &mut dyn KeyValueStore) -> Result<(), CodecError> {
    let codes: Vec<String> = state
        .hand
        .iter()
        .map(|s| s.card.map_or_else(|| FACE_DOWN.to_string(), |c| c.code()))
        .collect();
    let mults: Vec<BigNumber> = state.hand.iter().map(|s| s.multiplier).collect();
    let results: Vec<BigNumber> = state.hand.iter().map(|s| s.last_result).collect();
    let costs: Vec<BigNumber> = state.hand.iter().map(|s| s.upgrade_cost).collect();
    put(store, keys::HAND_CODES, &codes)?;
    put(store, keys::HAND_MULT, &mults)?;
    put(store, keys::HAND_RES, &results)?;
    put(store, keys::HAND_COSTS, &costs)?;

    put(store, keys::TOTAL_CHIPS, &state.total_chips)?;
    put(store, keys::TOTAL_CHIPS_GENERATED, &state.total_chips_generated)?;
    put(store, keys::INCREMENT_HAND_COST, &state.increment_hand_size_cost)?;
    put(store, keys::IS_LEFT_BOUGHT, &state.left_upgrades_bought)?;
    put(store, keys::IS_RIGHT_BOUGHT, &state.right_upgrades_bought)?;

    for up in &state.suits {
        let (multip_key, cost_key) = suit_keys(up.suit);
        put(store, multip_key, &up.multiplier)?;
        put(store, cost_key, &up.cost)?;
    }

    put(store, keys::HAS_DEALER, &state.dealer_armed)?;
    put(store, keys::DEALER_INTERVAL, &state.dealer_interval_ms)?;
    put(store, keys::DEALER_DECREASE_COST, &state.dealer_decrease_cost)?;
    put(store, keys::ANIM_DURATION, &state.anim_duration_ms)?;
    put(store, keys::ANIM_DECREASE_COST, &state.anim_decrease_cost)?;
    put(store, keys::PRESTIGE_MULTIP, &state.prestige_multiplier())?;
    put(store, keys::GLOBAL_BONUS_MULTIP, &state.global_bonus_multiplier)?;

    let dict: BTreeMap<String, bool> = full_deck()
        .into_iter()
        .map(|c| (c.code(), state.ascended.contains(&c)))
        .collect();
    put(store, keys::ASCENDED_DICT, &dict)?;
    put(store, keys::ASCENDED_COUNT, &state.ascended_count())?;

    put(store, keys::BUY_AMOUNT, &state.buy_amount)?;
    put(store, keys::LEFT_REVEALED, &state.left_gate_revealed)?;
    put(store, keys::RIGHT_REVEALED, &state.right_gate_revealed)?;
    Ok(())
}

fn decode<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &'static str) -> Result<T, CodecError> {
    let raw = store.get(key).ok_or(CodecError::Missing { key })?;
    serde_json::from_str(&raw).map_err(|source| CodecError::Malformed { key, source })
}

/// Decodes `key`, requiring `check` to accept the value; any failure yields
/// `default`.
fn decode_checked<T, F>(store: &dyn KeyValueStore, key: &'static str, default: T, check: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce(&T) -> Result<(), String>,
{
    let result = decode(store, key).and_then(|v: T| match check(&v) {
        Ok(()) => Ok(v),
        Err(reason) => Err(CodecError::Invalid { key, reason }),
    });
    match result {
        Ok(v) => v,
        Err(err) => {
            log_fallback(&err);
            default
        }
    }
}

fn decode_or<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &'static str, default: T) -> T {
    decode_checked(store, key, default, |_| Ok(()))
}

fn log_fallback(err: &CodecError) {
    match err {
        CodecError::Missing { key } => tracing::debug!(key, "key absent, using default"),
        other => tracing::warn!(error = %other, "discarding persisted value, using default"),
    }
}

fn non_negative(v: &BigNumber) -> Result<(), String> {
    if *v < BigNumber::ZERO {
        return Err(format!("{v} is negative"));
    }
    Ok(())
}

fn positive(v: &BigNumber) -> Result<(), String> {
    if *v <= BigNumber::ZERO {
        return Err(format!("{v} is not positive"));
    }
    Ok(())
}

fn at_least_one(v: &BigNumber) -> Result<(), String> {
    if *v < BigNumber::ONE {
        return Err(format!("{v} is below 1"));
    }
    Ok(())
}

fn duration(v: &f64) -> Result<(), String> {
    if !v.is_finite() || *v <= 0.0 {
        return Err(format!("{v} is not a positive duration"));
    }
    Ok(())
}

/// Entries of an array key, or an empty list when the key is unusable.
fn array_or_empty(store: &dyn KeyValueStore, key: &'static str) -> Vec<Option<BigNumber>> {
    decode_or::<Vec<Option<BigNumber>>>(store, key, Vec::new())
}

fn load_hand(store: &dyn KeyValueStore) -> Vec<HandSlot> {
    let mut codes: Vec<String> = decode_or(store, keys::HAND_CODES, Vec::new());
    if codes.len() > MAX_HAND_SIZE {
        tracing::warn!(len = codes.len(), "hand longer than the deck, truncating");
        codes.truncate(MAX_HAND_SIZE);
    }
    let mults = array_or_empty(store, keys::HAND_MULT);
    let results = array_or_empty(store, keys::HAND_RES);
    let costs = array_or_empty(store, keys::HAND_COSTS);

    let mut price = BigNumber::from(rules::BASE_INCREMENT_HAND_SIZE_COST);
    let factor = BigNumber::from(rules::HAND_SIZE_COST_FACTOR);
    let mut hand = Vec::with_capacity(codes.len());
    for (i, code) in codes.iter().enumerate() {
        let card = if code == FACE_DOWN {
            None
        } else {
            match code.parse::<Card>() {
                Ok(c) => Some(c),
                Err(err) => {
                    tracing::warn!(slot = i, error = %err, "unreadable card code, slot face down");
                    None
                }
            }
        };
        let pick = |v: &[Option<BigNumber>], ok: fn(&BigNumber) -> Result<(), String>| {
            v.get(i).copied().flatten().filter(|n| ok(n).is_ok())
        };
        hand.push(HandSlot {
            card,
            multiplier: pick(&mults, at_least_one).unwrap_or(BigNumber::ONE),
            last_result: pick(&results, non_negative).unwrap_or(BigNumber::ZERO),
            upgrade_cost: pick(&costs, positive).unwrap_or(price),
        });
        price *= factor;
    }
    hand
}

fn load_ascended(store: &dyn KeyValueStore) -> AscendedCards {
    let dict: BTreeMap<String, bool> = decode_or(store, keys::ASCENDED_DICT, BTreeMap::new());
    dict.into_iter()
        .filter(|(_, ascended)| *ascended)
        .filter_map(|(code, _)| match code.parse::<Card>() {
            Ok(card) => Some(card),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unknown ascended card");
                None
            }
        })
        .collect()
}

/// Rebuilds a [`GameState`] from `store`. Never fails.
pub fn load_state(store: &dyn KeyValueStore) -> GameState {
    let fresh = GameState::new();
    let mut state = GameState {
        hand: load_hand(store),
        suits: fresh.suits.clone(),
        total_chips: decode_checked(store, keys::TOTAL_CHIPS, fresh.total_chips, non_negative),
        total_chips_generated: decode_checked(
            store,
            keys::TOTAL_CHIPS_GENERATED,
            fresh.total_chips_generated,
            non_negative,
        ),
        increment_hand_size_cost: decode_checked(
            store,
            keys::INCREMENT_HAND_COST,
            fresh.increment_hand_size_cost,
            positive,
        ),
        left_upgrades_bought: decode_or(store, keys::IS_LEFT_BOUGHT, fresh.left_upgrades_bought),
        right_upgrades_bought: decode_or(store, keys::IS_RIGHT_BOUGHT, fresh.right_upgrades_bought),
        dealer_armed: decode_or(store, keys::HAS_DEALER, fresh.dealer_armed),
        dealer_interval_ms: decode_checked(
            store,
            keys::DEALER_INTERVAL,
            fresh.dealer_interval_ms,
            duration,
        )
        .max(rules::MIN_DEALER_INTERVAL_MS),
        dealer_decrease_cost: decode_checked(
            store,
            keys::DEALER_DECREASE_COST,
            fresh.dealer_decrease_cost,
            positive,
        ),
        anim_duration_ms: decode_checked(store, keys::ANIM_DURATION, fresh.anim_duration_ms, duration)
            .max(rules::MIN_ANIM_DURATION_MS),
        anim_decrease_cost: decode_checked(
            store,
            keys::ANIM_DECREASE_COST,
            fresh.anim_decrease_cost,
            positive,
        ),
        global_bonus_multiplier: decode_checked(
            store,
            keys::GLOBAL_BONUS_MULTIP,
            fresh.global_bonus_multiplier,
            at_least_one,
        ),
        ascended: load_ascended(store),
        buy_amount: decode_or(store, keys::BUY_AMOUNT, fresh.buy_amount),
        left_gate_revealed: decode_or(store, keys::LEFT_REVEALED, fresh.left_gate_revealed),
        right_gate_revealed: decode_or(store, keys::RIGHT_REVEALED, fresh.right_gate_revealed),
    };
    for up in state.suits.iter_mut() {
        let (multip_key, cost_key) = suit_keys(up.suit);
        up.multiplier = decode_checked(store, multip_key, up.multiplier, at_least_one);
        up.cost = decode_checked(store, cost_key, up.cost, positive);
    }
    // a hand-edited balance may already be past a gate's threshold
    state.refresh_reveals();
    tracing::debug!(
        hand_size = state.hand.len(),
        chips = %state.total_chips,
        ascended = state.ascended.len(),
        "state loaded"
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Deck;
    use crate::hand::StandardRanker;
    use crate::rules::Gate;
    use crate::state::BuyAmount;

    fn played_state() -> GameState {
        let mut s = GameState::new();
        s.total_chips = BigNumber::from(1e12);
        for _ in 0..5 {
            s.increment_hand_size().unwrap();
        }
        s.buy_slot_upgrade(2, Some(BuyAmount::Levels(7))).unwrap();
        s.buy_suit_upgrade(Suit::Diamonds, Some(BuyAmount::Levels(3))).unwrap();
        s.buy_gate(Gate::Left).unwrap();
        s.buy_gate(Gate::Right).unwrap();
        s.decrease_dealer_interval().unwrap();
        s.decrease_anim_duration().unwrap();
        let mut deck = Deck::new_with_seed(99);
        s.deal(&mut deck, &StandardRanker).unwrap();
        s.ascended.insert("7h".parse().unwrap());
        s.ascended.insert("10c".parse().unwrap());
        s.buy_amount = BuyAmount::Levels(100);
        s
    }

    #[test]
    fn round_trip_is_field_for_field() {
        let s = played_state();
        let mut store = MemoryStore::new();
        save_state(&s, &mut store).unwrap();
        assert_eq!(load_state(&store), s);
    }

    #[test]
    fn empty_store_loads_fresh_state() {
        assert_eq!(load_state(&MemoryStore::new()), GameState::new());
    }

    #[test]
    fn deleted_keys_fall_back_independently() {
        let s = played_state();
        let mut store = MemoryStore::new();
        save_state(&s, &mut store).unwrap();
        store.remove(keys::TOTAL_CHIPS);
        store.remove(keys::SPADES_COST);
        store.remove(keys::HAND_RES);

        let loaded = load_state(&store);
        let fresh = GameState::new();
        assert_eq!(loaded.total_chips, fresh.total_chips);
        assert_eq!(loaded.suit(Suit::Spades).cost, fresh.suit(Suit::Spades).cost);
        assert!(loaded.hand.iter().all(|h| h.last_result == BigNumber::ZERO));

        assert_eq!(loaded.total_chips_generated, s.total_chips_generated);
        assert_eq!(loaded.suit(Suit::Diamonds), s.suit(Suit::Diamonds));
        assert_eq!(loaded.hand.len(), 5);
        assert_eq!(loaded.hand[2].multiplier, s.hand[2].multiplier);
        assert_eq!(loaded.ascended, s.ascended);
    }

    #[test]
    fn corrupt_values_default_without_aborting() {
        let s = played_state();
        let mut store = MemoryStore::new();
        save_state(&s, &mut store).unwrap();
        store.set(keys::GLOBAL_BONUS_MULTIP, "{not json".to_string());
        store.set(keys::DEALER_INTERVAL, "\"fast\"".to_string());
        store.set(
            keys::TOTAL_CHIPS,
            r#"{"sign":-1,"mantissa":5.0,"exponent":3}"#.to_string(),
        );
        store.set(keys::BUY_AMOUNT, "0".to_string());

        let loaded = load_state(&store);
        assert_eq!(loaded.global_bonus_multiplier, BigNumber::ONE);
        assert_eq!(loaded.dealer_interval_ms, rules::BASE_DEALER_INTERVAL_MS);
        assert_eq!(loaded.total_chips, BigNumber::from(10u64));
        assert_eq!(loaded.buy_amount, BuyAmount::Levels(1));
        assert_eq!(loaded.hand, s.hand);
    }

    #[test]
    fn out_of_range_exponents_default() {
        let s = played_state();
        let mut store = MemoryStore::new();
        save_state(&s, &mut store).unwrap();
        store.set(
            keys::TOTAL_CHIPS,
            r#"{"sign":1,"mantissa":50.0,"exponent":9223372036854775807}"#.to_string(),
        );
        store.set(
            keys::HAND_MULT,
            r#"[{"sign":1,"mantissa":2.0,"exponent":-9223372036854775808}]"#.to_string(),
        );

        let loaded = load_state(&store);
        assert_eq!(loaded.total_chips, BigNumber::from(10u64));
        assert!(loaded.hand.iter().all(|h| h.multiplier == BigNumber::ONE));
        assert_eq!(loaded.total_chips_generated, s.total_chips_generated);
    }

    #[test]
    fn edited_balance_reveals_gates_on_load() {
        let mut store = MemoryStore::new();
        save_state(&GameState::new(), &mut store).unwrap();
        store.set(
            keys::TOTAL_CHIPS,
            r#"{"sign":1,"mantissa":4.5,"exponent":7}"#.to_string(),
        );
        let loaded = load_state(&store);
        assert!(loaded.gate_revealed(Gate::Left));
        assert!(!loaded.gate_revealed(Gate::Right));
    }

    #[test]
    fn missing_slot_entries_use_slot_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::HAND_CODES, r#"["back","Ah","zz"]"#.to_string());
        store.set(
            keys::HAND_MULT,
            r#"[{"sign":1,"mantissa":4.0,"exponent":0}]"#.to_string(),
        );
        let loaded = load_state(&store);
        assert_eq!(loaded.hand.len(), 3);
        assert_eq!(loaded.hand[0].card, None);
        assert_eq!(loaded.hand[1].card, Some("Ah".parse().unwrap()));
        assert_eq!(loaded.hand[2].card, None);
        assert_eq!(loaded.hand[0].multiplier, BigNumber::from(4u64));
        assert_eq!(loaded.hand[1].multiplier, BigNumber::ONE);
        assert_eq!(loaded.hand[2].upgrade_cost, BigNumber::from(1000u64));
    }

    #[test]
    fn ascended_dict_covers_the_deck_and_skips_bad_codes() {
        let s = played_state();
        let mut store = MemoryStore::new();
        save_state(&s, &mut store).unwrap();
        let dict: BTreeMap<String, bool> =
            serde_json::from_str(&store.get(keys::ASCENDED_DICT).unwrap()).unwrap();
        assert_eq!(dict.len(), 52);
        assert_eq!(dict.values().filter(|v| **v).count(), 2);
        assert_eq!(store.get(keys::ASCENDED_COUNT).as_deref(), Some("2"));

        store.set(keys::ASCENDED_DICT, r#"{"Ah":true,"Zq":true,"2c":false}"#.to_string());
        let loaded = load_state(&store);
        assert_eq!(loaded.ascended_count(), 1);
        assert!(loaded.ascended.contains(&"Ah".parse().unwrap()));
    }

    #[test]
    fn derived_keys_are_ignored_on_load() {
        let mut store = MemoryStore::new();
        save_state(&GameState::new(), &mut store).unwrap();
        store.set(
            keys::PRESTIGE_MULTIP,
            r#"{"sign":1,"mantissa":9.0,"exponent":9}"#.to_string(),
        );
        store.set(keys::ASCENDED_COUNT, "40".to_string());
        let loaded = load_state(&store);
        assert_eq!(loaded.prestige_multiplier(), BigNumber::ZERO);
        assert_eq!(loaded.ascended_count(), 0);
    }
}
