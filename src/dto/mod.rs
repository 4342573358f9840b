pub mod cart;
pub mod catalog;
pub mod inventory;
pub mod orders;
