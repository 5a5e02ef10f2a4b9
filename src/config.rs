// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::db::{
    BudgetRepository, DashboardRepository, RbacRepository, UserRepository, WorkRepository,
};
use crate::services::{
    auth::AuthService, budget_service::BudgetService, dashboard_service::DashboardService,
    rbac_service::RbacService, work_service::WorkService,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub rbac_service: RbacService,
    pub budget_service: BudgetService,
    pub work_service: WorkService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o grafo de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let budget_repo = BudgetRepository::new(db_pool.clone());
        let work_repo = WorkRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service =
            AuthService::new(user_repo.clone(), jwt_secret.clone(), db_pool.clone());
        let rbac_service = RbacService::new(rbac_repo, user_repo, db_pool.clone());
        let budget_service = BudgetService::new(budget_repo.clone(), db_pool.clone());
        let work_service = WorkService::new(work_repo, budget_repo, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            rbac_service,
            budget_service,
            work_service,
            dashboard_service,
        })
    }
}
