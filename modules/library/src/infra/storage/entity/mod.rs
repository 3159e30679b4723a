//! SeaORM entities, one per table.

pub mod author;
pub mod book;
pub mod borrow_record;
pub mod category;
pub mod role;
pub mod user;
