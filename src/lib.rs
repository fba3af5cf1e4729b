//! # Hikaku - Scenario Comparison and Input Resolution Engine
//!
//! **Hikaku** lets analysts build and compare analysis scenarios ("cases")
//! side by side. Each case is a bundle of interdependent form fields —
//! technology choices, costs, shares — described by a declarative schema.
//! The crate provides the two tightly coupled subsystems behind that UI:
//!
//! 1. an **input resolution engine** that turns a field schema (visibility
//!    rules, conditional defaults, validators, dynamically fetched option
//!    lists) plus a value map into a consistent per-case input state on every
//!    keystroke, and
//! 2. a **comparison state machine** that manages an ordered list of such
//!    cases in parallel, mirrors a focus selection across them, derives
//!    cross-case flags, and orchestrates saving, loading and batching against
//!    a persistence gateway.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic: any metadata source converts into the
//! canonical [`schema::ModuleSchema`] through the [`schema::IntoSchema`]
//! trait. The board owns one engine per case slot; every mutation is one of a
//! closed set of messages, and transitions hand back the side effects they
//! request so the caller stays in charge of I/O.
//!
//! ```rust,no_run
//! use hikaku::prelude::*;
//! use ahash::AHashMap;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Load a module schema (from a static bundle or a metadata fetch).
//!     let raw = std::fs::read_to_string("path/to/schema.json")?;
//!     let schema: ModuleSchema = serde_json::from_str(&raw)?;
//!
//!     // 2. Build the board: one empty case, defaults resolved.
//!     let config = ModuleConfig {
//!         module: "electricity".to_string(),
//!         sub_module: None,
//!         max_comparison_cases: 4,
//!     };
//!     let mut board = ComparisonBoard::new(config, schema, AHashMap::new())?;
//!
//!     // 3. Route keystrokes through the closed message set.
//!     board.apply(Message::SetInputValue {
//!         index: 0,
//!         name: "region".to_string(),
//!         value: "US".to_string(),
//!         flags: ResolveFlags::default(),
//!     })?;
//!
//!     // 4. Persist through the gateway seam.
//!     let mut store = MemoryGateway::new();
//!     let effects = board.apply(Message::AddComparisonCol)?;
//!     run_effects(&mut board, &mut store, effects)?;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod prelude;
pub mod schema;
pub mod state;
