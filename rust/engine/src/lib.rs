//! # chipdeck-engine: Idle Card Game Economy
//!
//! The progression core of an incremental card game. A hand of slots is
//! dealt from a 52-card deck; each card scores its face value times a stack
//! of purchasable multipliers, and the hand's poker-style category scales the
//! total. Chips buy more slots, more multiplier levels, two one-time gates,
//! an automatic dealer and two meta-resets (prestige and ascension).
//!
//! ## Core Modules
//!
//! - [`number`] - Arbitrary-magnitude decimal type used for every amount
//! - [`cost`] - Geometric cost curve and max-affordable search
//! - [`cards`] / [`deck`] - Card model and seeded Fisher–Yates deck
//! - [`hand`] - Hand categories, payout table and the default ranker
//! - [`rules`] - Prices, base constants and timing formulas
//! - [`state`] - The [`state::GameState`] aggregate
//! - [`progression`] - Purchases and deals on the state
//! - [`reset`] - Prestige and ascension
//! - [`codec`] - Flat key-value persistence with per-key defaults
//! - [`events`] - Event types, sinks and the JSONL deal journal
//! - [`session`] - Clock-driven control loop (rate limit, dealer, autosave)
//! - [`errors`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use chipdeck_engine::deck::Deck;
//! use chipdeck_engine::hand::StandardRanker;
//! use chipdeck_engine::state::GameState;
//!
//! let mut state = GameState::new();
//! let mut deck = Deck::new_with_seed(42);
//!
//! // the starting ten chips buy the first slot
//! state.increment_hand_size().expect("affordable");
//! state.deal(&mut deck, &StandardRanker).expect("one card dealt");
//! assert!(state.total_chips_generated > chipdeck_engine::number::BigNumber::ZERO);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! Deals and ascension picks draw from a ChaCha20 stream seeded once:
//!
//! ```rust
//! use chipdeck_engine::deck::Deck;
//!
//! let mut a = Deck::new_with_seed(7);
//! let mut b = Deck::new_with_seed(7);
//! assert_eq!(a.deal(5), b.deal(5));
//! ```

pub mod cards;
pub mod codec;
pub mod cost;
pub mod deck;
pub mod errors;
pub mod events;
pub mod hand;
pub mod number;
pub mod progression;
pub mod reset;
pub mod rules;
pub mod session;
pub mod state;
