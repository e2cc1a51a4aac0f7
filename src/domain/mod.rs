//! Pure pricing and snapshot logic shared by the cart and checkout handlers.
pub mod cart;
pub mod order;

pub use cart::CartSummary;
pub use order::{OrderDraft, OrderItemDraft};
