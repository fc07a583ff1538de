pub mod common;
pub mod draw;
pub mod entry;
pub mod pagination;
pub mod payout;
pub mod payout_account;

pub use common::*;
pub use draw::*;
pub use entry::*;
pub use pagination::*;
pub use payout::*;
pub use payout_account::*;
