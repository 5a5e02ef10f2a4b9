pub mod auth;
pub mod budget;
pub mod dashboard;
pub mod pipeline;
pub mod rbac;
pub mod work;
