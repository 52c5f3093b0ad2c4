use std::sync::Arc;

use sqlx::PgPool;
use time::Duration as TimeDuration;

use crate::{
    auth::{
        jwt::SessionKeys,
        notifier::{LogNotifier, ResetNotifier},
        repo::{PgUserRepo, UserRepo},
        services::AuthService,
    },
    config::AppConfig,
    dashboard::{
        repo::{PgRecordRepo, RecordRepo},
        services::DashboardService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session_keys: Arc<SessionKeys>,
    pub auth: AuthService,
    pub dashboard: DashboardService,
    pub notifier: Arc<dyn ResetNotifier>,
}

impl AppState {
    /// Production wiring: both repositories share one pool.
    pub fn postgres(db: PgPool, config: Arc<AppConfig>) -> Self {
        let users = Arc::new(PgUserRepo::new(db.clone())) as Arc<dyn UserRepo>;
        let records = Arc::new(PgRecordRepo::new(db)) as Arc<dyn RecordRepo>;
        let notifier =
            Arc::new(LogNotifier::new(config.reset_token_log_delivery)) as Arc<dyn ResetNotifier>;
        Self::from_parts(config, users, records, notifier)
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        records: Arc<dyn RecordRepo>,
        notifier: Arc<dyn ResetNotifier>,
    ) -> Self {
        let session_keys = Arc::new(SessionKeys::from_config(&config.jwt));
        let auth = AuthService::new(
            users.clone(),
            config.password_policy,
            TimeDuration::minutes(config.reset_token_ttl_minutes),
        );
        let dashboard = DashboardService::new(users, records);
        Self {
            config,
            session_keys,
            auth,
            dashboard,
            notifier,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        Self::fake_with(AppConfig::for_tests()).0
    }

    /// In-memory state plus the notifier that captured reset tokens.
    pub fn fake_with(
        config: AppConfig,
    ) -> (Self, Arc<crate::memory::RecordingNotifier>) {
        use crate::memory::{MemoryStore, RecordingNotifier};

        let store = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = Self::from_parts(
            Arc::new(config),
            store.clone(),
            store,
            notifier.clone(),
        );
        (state, notifier)
    }
}
