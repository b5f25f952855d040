use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{
    recipe::{self, ActiveModel as RecipeActiveModel, Entity as RecipeEntity, Model as RecipeModel},
    recipe_component::{
        self, ActiveModel as ComponentActiveModel, Entity as ComponentEntity,
        Model as ComponentModel,
    },
};
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRecipeRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 120))]
    pub product: String,
    #[validate]
    pub components: Vec<CreateRecipeComponent>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRecipeComponent {
    #[validate(length(min = 1, max = 120))]
    pub material_name: String,
    pub percentage: Decimal,
    pub weight_kg: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub name: String,
    pub product: String,
    pub created_at: DateTime<Utc>,
    pub components: Vec<RecipeComponentView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeComponentView {
    pub id: Uuid,
    pub material_name: String,
    pub percentage: Decimal,
    pub weight_kg: Option<Decimal>,
}

/// Plain store for recipes and their components. No invariants beyond
/// identity; percentage sums are deliberately not validated here (the
/// calculator normalizes).
#[derive(Clone)]
pub struct RecipeService {
    db_pool: Arc<DbPool>,
}

impl RecipeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(product = %request.product))]
    pub async fn create_recipe(
        &self,
        request: CreateRecipeRequest,
    ) -> Result<RecipeResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let recipe_id = Uuid::new_v4();

        let txn = db.begin().await?;

        let recipe = RecipeActiveModel {
            id: Set(recipe_id),
            name: Set(request.name),
            product: Set(request.product),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut components = Vec::with_capacity(request.components.len());
        for (position, component) in request.components.into_iter().enumerate() {
            let model = ComponentActiveModel {
                id: Set(Uuid::new_v4()),
                recipe_id: Set(recipe_id),
                position: Set(position as i32),
                material_name: Set(component.material_name),
                percentage: Set(component.percentage),
                weight_kg: Set(component.weight_kg),
            }
            .insert(&txn)
            .await?;
            components.push(model);
        }

        txn.commit().await?;

        info!(recipe_id = %recipe_id, components = components.len(), "Recipe created");
        Ok(to_response(recipe, components))
    }

    pub async fn get_recipe(&self, recipe_id: Uuid) -> Result<RecipeResponse, ServiceError> {
        let db = &*self.db_pool;
        let recipe = RecipeEntity::find_by_id(recipe_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", recipe_id)))?;
        let components = self.components_for_recipe(recipe_id).await?;
        Ok(to_response(recipe, components))
    }

    /// Recipes registered for a product, in stable order: oldest first,
    /// ties broken by id. The auto-generation path takes the first.
    pub async fn recipes_for_product(
        &self,
        product: &str,
    ) -> Result<Vec<RecipeModel>, ServiceError> {
        let db = &*self.db_pool;
        let recipes = RecipeEntity::find()
            .filter(recipe::Column::Product.eq(product))
            .order_by_asc(recipe::Column::CreatedAt)
            .order_by_asc(recipe::Column::Id)
            .all(db)
            .await?;
        Ok(recipes)
    }

    /// Components in recipe order. Ordering by the random UUID id would
    /// shuffle the list; `position` preserves insertion order.
    pub async fn components_for_recipe(
        &self,
        recipe_id: Uuid,
    ) -> Result<Vec<ComponentModel>, ServiceError> {
        let db = &*self.db_pool;
        let components = ComponentEntity::find()
            .filter(recipe_component::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_component::Column::Position)
            .all(db)
            .await?;
        Ok(components)
    }
}

fn to_response(recipe: RecipeModel, components: Vec<ComponentModel>) -> RecipeResponse {
    RecipeResponse {
        id: recipe.id,
        name: recipe.name,
        product: recipe.product,
        created_at: recipe.created_at,
        components: components
            .into_iter()
            .map(|c| RecipeComponentView {
                id: c.id,
                material_name: c.material_name,
                percentage: c.percentage,
                weight_kg: c.weight_kg,
            })
            .collect(),
    }
}
