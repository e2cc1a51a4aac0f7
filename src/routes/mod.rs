pub mod cart;
pub mod catalog;
pub mod chat;
pub mod checkout;
