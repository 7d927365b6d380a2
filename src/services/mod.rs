//! Per-tenant data services. Every service re-validates the resolved
//! schema name before embedding it in SQL text; schema identifiers cannot
//! be bound as parameters, so the validator is the boundary contract each
//! call site honors.

pub mod attendance_service;
pub mod branding_service;
pub mod exam_service;
pub mod invoice_service;
pub mod report_service;
pub mod school_service;
pub mod student_service;
pub mod teacher_service;
pub mod term_service;
pub mod user_service;
