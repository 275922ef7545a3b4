//! Shopping cart: local store, derived views, and backend mirroring.
//!
//! # Architecture
//!
//! - [`Cart`] is the single source of truth; mutations are synchronous
//! - Each mutation returns a [`CartMutation`] describing the backend call it
//!   implies
//! - [`SyncAdapter`] mirrors those calls to the backend in spawned tasks and
//!   reports failures on a notice channel
//! - [`projector`] derives counts, amounts and display lines from the cart
//!   and the catalog without mutating either

pub mod projector;
mod store;
mod sync;

pub use projector::{CartItem, CartTotals, cart_amount, cart_count, cart_totals, items_with_details};
pub use store::{Cart, CartMutation};
pub use sync::{Notice, NoticeLevel, NoticeReceiver, NoticeSender, SyncAdapter, notice_channel};
