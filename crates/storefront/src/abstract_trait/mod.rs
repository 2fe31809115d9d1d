pub mod cart;
pub mod category;
pub mod checkout;
pub mod order;
pub mod product;
pub mod unit_of_work;
