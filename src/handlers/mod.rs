pub mod attendance;
pub mod auth;
pub mod branding;
pub mod exams;
pub mod invoices;
pub mod reports;
pub mod school;
pub mod students;
pub mod teachers;
pub mod tenants;
pub mod terms;
pub mod users;
