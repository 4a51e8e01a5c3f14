use crate::config::Config;
use crate::db::Db;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
