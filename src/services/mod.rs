pub mod auth;
pub mod budget_service;
pub mod dashboard_service;
pub mod rbac_service;
pub mod work_service;
