pub mod draw_service;
pub mod entry_service;
pub mod payout_account_service;
pub mod payout_service;

pub use draw_service::*;
pub use entry_service::*;
pub use payout_account_service::*;
pub use payout_service::*;
