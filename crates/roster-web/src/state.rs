use std::sync::Arc;

use roster_core::{AuthService, StudentService};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub auth: Arc<AuthService>,
    pub students: Arc<StudentService>,
}
