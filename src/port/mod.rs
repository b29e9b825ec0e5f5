//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  normalizer, matcher,   │
//!                    │  evaluator, ledger      │
//!                    └────────────┬────────────┘
//!                                 │
//!                                 ▼
//!                          ┌─────────────┐
//!                          │   Store     │
//!                          │   Adapter   │
//!                          └─────────────┘
//! ```

pub mod outbound;
