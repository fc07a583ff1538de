pub mod draw;
pub mod entry;
pub mod payout;
pub mod payout_account;

pub use draw::draw_config;
pub use entry::entry_config;
pub use payout::payout_config;
pub use payout_account::payout_account_config;
