use std::sync::Arc;

use crate::domain::ports::inbound::{AuthService, ProjectService, ScheduleService};

/// Shared handler state. Services are held behind their inbound ports so the
/// router never sees a concrete adapter.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub project_service: Arc<dyn ProjectService>,
    pub schedule_service: Arc<dyn ScheduleService>,
}
