pub mod budget_repo;
pub use budget_repo::BudgetRepository;
pub mod work_repo;
pub use work_repo::WorkRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
