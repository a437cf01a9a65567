//! Domain models for admin.

pub mod customer;
pub mod news;
pub mod order;
pub mod session;
pub mod voucher;

pub use customer::Customer;
pub use news::NewsArticle;
pub use order::{Order, OrderLine, StatusChange};
pub use session::{CurrentAdmin, keys as session_keys};
pub use voucher::{Voucher, VoucherKind};
