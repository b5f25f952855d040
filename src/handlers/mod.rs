pub mod machines;
pub mod material_requests;
pub mod orders;
pub mod recipes;
pub mod shift_reports;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub machines: Arc<crate::services::machines::MachineService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub shift_reports: Arc<crate::services::shift_reports::ShiftReportService>,
    pub material_requests: Arc<crate::services::material_requests::MaterialRequestService>,
    pub recipes: Arc<crate::services::recipes::RecipeService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let recipes = Arc::new(crate::services::recipes::RecipeService::new(db_pool.clone()));
        let material_requests = Arc::new(
            crate::services::material_requests::MaterialRequestService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
                recipes.clone(),
            ),
        );
        let orders = Arc::new(crate::services::orders::OrderService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
            Some(material_requests.clone()),
        ));
        let machines = Arc::new(crate::services::machines::MachineService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let shift_reports = Arc::new(crate::services::shift_reports::ShiftReportService::new(
            db_pool,
            Some(event_sender),
        ));

        Self {
            machines,
            orders,
            shift_reports,
            material_requests,
            recipes,
        }
    }
}
