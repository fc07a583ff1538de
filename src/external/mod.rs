pub mod adapter;
pub mod chime;
pub mod notifier;
pub mod paypal;
pub mod simulated;
pub mod stripe;

pub use adapter::*;
pub use chime::*;
pub use notifier::*;
pub use paypal::*;
pub use simulated::*;
pub use stripe::*;
