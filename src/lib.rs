//! An ordered map backed by a skip list.
//!
//! Keys are kept on a stack of sorted linked levels. Level 0 holds every key,
//! and each key is promoted to the levels above it by repeated coin flips, so
//! searches can skip over long runs of keys without any rebalancing.
//!
//! ```
//! use skiplist_map::SkipListMap;
//!
//! let mut map = SkipListMap::new();
//! assert_eq!(map.insert(3, "three").unwrap(), None);
//! assert_eq!(map.insert(1, "one").unwrap(), None);
//! assert_eq!(map.get(&3).unwrap(), Some(&"three"));
//! assert_eq!(map.keys().collect::<Vec<_>>(), vec![&1, &3]);
//! ```

#![crate_type = "lib"]

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod error;
mod height_control;
mod iter;
mod key;
mod map;
mod node;

pub use error::{Error, Result};
pub use height_control::{GeometricalGenerator, HeightControl, DEFAULT_ITERATION_PROBABILITY};
pub use iter::{Iter, Keys};
pub use key::Key;
pub use map::SkipListMap;
