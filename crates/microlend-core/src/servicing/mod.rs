pub mod renewal;
pub mod status;

pub use renewal::renewal_principal;
pub use status::{can_regenerate, outstanding_balance, refresh_statuses};
