pub mod create;
pub mod load;
pub mod projects;
pub mod report;
pub mod reset;
