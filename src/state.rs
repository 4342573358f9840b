use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{
    clock::{Clock, SystemClock},
    config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub clock: Arc<dyn Clock>,
    pub tx_timeout: Duration,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            orm,
            clock: Arc::new(SystemClock),
            tx_timeout: config.tx_timeout,
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
