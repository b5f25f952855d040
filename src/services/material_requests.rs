use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{
    material_request::{
        self, ActiveModel as RequestActiveModel, Entity as RequestEntity, Model as RequestModel,
    },
    material_request_item::{
        self, ActiveModel as ItemActiveModel, Entity as ItemEntity, Model as ItemModel,
    },
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::material_calc::{scale_to_batch, ComponentShare};
use crate::services::recipes::RecipeService;

pub const STATUS_OPEN: &str = "open";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaterialRequestView {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub recipe_id: Uuid,
    pub product: String,
    pub base_weight_kg: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaterialRequestItemView {
    pub id: Uuid,
    pub material_name: String,
    pub percentage: Decimal,
    pub calculated_kg: Option<Decimal>,
    pub actual_kg: Option<Decimal>,
    pub batch_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MaterialRequestDetail {
    pub request: MaterialRequestView,
    pub items: Vec<MaterialRequestItemView>,
}

/// Service owning material requests: one auto-generated per order when a
/// recipe matches, recalculated in place whenever the base weight
/// changes.
#[derive(Clone)]
pub struct MaterialRequestService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    recipes: Arc<RecipeService>,
}

impl MaterialRequestService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        recipes: Arc<RecipeService>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            recipes,
        }
    }

    /// Auto-generates a material request for a freshly created order.
    ///
    /// First matching recipe wins (oldest created_at, then lowest id);
    /// no recipe for the product is a silent no-op, not an error.
    /// Component percentages are copied verbatim; `calculated_kg` stays
    /// null until a base weight is known.
    #[instrument(skip(self), fields(order_id = %order_id, product = product))]
    pub async fn on_order_created(
        &self,
        order_id: Uuid,
        product: &str,
    ) -> Result<Option<Uuid>, ServiceError> {
        let recipes = self.recipes.recipes_for_product(product).await?;
        let recipe = match recipes.into_iter().next() {
            Some(recipe) => recipe,
            None => {
                debug!(product = product, "No recipe for product; skipping material request");
                return Ok(None);
            }
        };

        let components = self.recipes.components_for_recipe(recipe.id).await?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let request_id = Uuid::new_v4();

        let txn = db.begin().await?;

        RequestActiveModel {
            id: Set(request_id),
            order_id: Set(Some(order_id)),
            recipe_id: Set(recipe.id),
            product: Set(product.to_string()),
            base_weight_kg: Set(None),
            status: Set(STATUS_OPEN.to_string()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        for component in &components {
            ItemActiveModel {
                id: Set(Uuid::new_v4()),
                request_id: Set(request_id),
                position: Set(component.position),
                material_name: Set(component.material_name.clone()),
                percentage: Set(component.percentage),
                calculated_kg: Set(None),
                actual_kg: Set(None),
                batch_number: Set(None),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(
            request_id = %request_id,
            order_id = %order_id,
            recipe_id = %recipe.id,
            items = components.len(),
            "Material request auto-generated"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MaterialRequestCreated {
                    request_id,
                    order_id,
                    recipe_id: recipe.id,
                })
                .await
            {
                warn!(error = %e, request_id = %request_id, "Failed to send request created event");
            }
        }

        Ok(Some(request_id))
    }

    /// Persists a new base weight and recomputes every item's
    /// `calculated_kg` in place. Always a whole-set pass; idempotent for
    /// a fixed base weight.
    #[instrument(skip(self), fields(request_id = %request_id, base_weight_kg = %base_weight_kg))]
    pub async fn recalculate(
        &self,
        request_id: Uuid,
        base_weight_kg: Decimal,
    ) -> Result<MaterialRequestDetail, ServiceError> {
        if base_weight_kg < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Base weight must not be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await?;

        let request = RequestEntity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material request {} not found", request_id))
            })?;

        let mut request_active: RequestActiveModel = request.into();
        request_active.base_weight_kg = Set(Some(base_weight_kg));
        request_active.updated_at = Set(Some(now));
        let request = request_active.update(&txn).await?;

        let items = ItemEntity::find()
            .filter(material_request_item::Column::RequestId.eq(request_id))
            .order_by_asc(material_request_item::Column::Position)
            .all(&txn)
            .await?;

        let shares: Vec<ComponentShare> = items
            .iter()
            .map(|item| ComponentShare {
                material_name: item.material_name.clone(),
                percentage: item.percentage,
            })
            .collect();
        let weights = scale_to_batch(&shares, base_weight_kg);

        let mut updated_items = Vec::with_capacity(items.len());
        for (item, weight) in items.into_iter().zip(weights) {
            let mut active: ItemActiveModel = item.into();
            active.calculated_kg = Set(Some(weight.calculated_kg));
            updated_items.push(active.update(&txn).await?);
        }

        txn.commit().await?;

        info!(
            request_id = %request_id,
            items = updated_items.len(),
            "Material request recalculated"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::MaterialRequestRecalculated { request_id })
                .await
            {
                warn!(error = %e, request_id = %request_id, "Failed to send recalculated event");
            }
        }

        Ok(to_detail(request, updated_items))
    }

    pub async fn get_request(
        &self,
        request_id: Uuid,
    ) -> Result<MaterialRequestDetail, ServiceError> {
        let db = &*self.db_pool;
        let request = RequestEntity::find_by_id(request_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material request {} not found", request_id))
            })?;
        let items = self.items_for_request(request_id).await?;
        Ok(to_detail(request, items))
    }

    /// The request generated for an order, if any.
    pub async fn get_by_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<MaterialRequestDetail>, ServiceError> {
        let db = &*self.db_pool;
        let request = RequestEntity::find()
            .filter(material_request::Column::OrderId.eq(order_id))
            .order_by_asc(material_request::Column::CreatedAt)
            .one(db)
            .await?;

        match request {
            Some(request) => {
                let items = self.items_for_request(request.id).await?;
                Ok(Some(to_detail(request, items)))
            }
            None => Ok(None),
        }
    }

    /// Items in recipe order (`position`, set at copy time).
    async fn items_for_request(&self, request_id: Uuid) -> Result<Vec<ItemModel>, ServiceError> {
        let db = &*self.db_pool;
        let items = ItemEntity::find()
            .filter(material_request_item::Column::RequestId.eq(request_id))
            .order_by_asc(material_request_item::Column::Position)
            .all(db)
            .await?;
        Ok(items)
    }
}

fn to_detail(request: RequestModel, items: Vec<ItemModel>) -> MaterialRequestDetail {
    MaterialRequestDetail {
        request: MaterialRequestView {
            id: request.id,
            order_id: request.order_id,
            recipe_id: request.recipe_id,
            product: request.product,
            base_weight_kg: request.base_weight_kg,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        },
        items: items
            .into_iter()
            .map(|item| MaterialRequestItemView {
                id: item.id,
                material_name: item.material_name,
                percentage: item.percentage,
                calculated_kg: item.calculated_kg,
                actual_kg: item.actual_kg,
                batch_number: item.batch_number,
            })
            .collect(),
    }
}
