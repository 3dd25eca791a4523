pub mod index;
pub mod nport;
pub mod report;
