pub mod asset;
pub mod category;
pub mod department;
pub mod employee;
pub mod history;
