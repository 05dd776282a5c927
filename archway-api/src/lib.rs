pub mod capture;
pub mod models;
pub mod restful;
