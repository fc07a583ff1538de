pub mod entry_balances;
pub mod entry_grants;
pub mod jackpot_draws;
pub mod payout_accounts;
pub mod payout_batches;
pub mod payouts;

pub use entry_balances as entry_balance_entity;
pub use entry_grants as entry_grant_entity;
pub use jackpot_draws as jackpot_draw_entity;
pub use payout_accounts as payout_account_entity;
pub use payout_batches as payout_batch_entity;
pub use payouts as payout_entity;

pub use entry_grants::EntryReason;
pub use payout_accounts::PayoutMethod;
pub use payout_batches::BatchStatus;
pub use payouts::PayoutStatus;
