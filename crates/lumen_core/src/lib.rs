//! Lumen Core
//!
//! Foundational primitives shared by the Lumen theming crates:
//!
//! - **Colors**: [`HexColor`], a 24-bit sRGB value with a canonical
//!   `#rrggbb` string form
//! - **Listeners**: single-threaded listener registries whose
//!   [`Subscription`] guards unsubscribe on drop
//! - **State Machines**: small typed transition tables with entry actions
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{HexColor, Listeners};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let color: HexColor = "#1f6feb".parse().unwrap();
//! assert_eq!(color.to_string(), "#1f6feb");
//!
//! let listeners = Listeners::<HexColor>::new();
//! let seen = Rc::new(Cell::new(0));
//! let seen_clone = seen.clone();
//! let subscription = listeners.subscribe(move |_| seen_clone.set(seen_clone.get() + 1));
//!
//! listeners.emit(&color);
//! drop(subscription);
//! listeners.emit(&color);
//! assert_eq!(seen.get(), 1);
//! ```

pub mod color;
pub mod events;
pub mod fsm;

pub use color::{ColorParseError, HexColor};
pub use events::{ListenerId, Listeners, Subscription};
pub use fsm::{StateMachine, StateMachineBuilder};
