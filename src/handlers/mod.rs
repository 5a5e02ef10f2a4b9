pub mod auth;
pub mod budgets;
pub mod dashboard;
pub mod rbac;
pub mod works;
