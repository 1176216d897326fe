pub mod assets;
pub mod categories;
pub mod departments;
pub mod employees;
pub mod history;
