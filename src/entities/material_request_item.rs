use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material_request_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub request_id: Uuid,

    /// Copied from the recipe component, keeps item order stable
    pub position: i32,

    pub material_name: String,

    /// Copied verbatim from the recipe component at request creation
    pub percentage: Decimal,

    /// Derived; recalculated in place, never re-created
    pub calculated_kg: Option<Decimal>,

    /// Manually entered by the operator
    pub actual_kg: Option<Decimal>,

    pub batch_number: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::material_request::Entity",
        from = "Column::RequestId",
        to = "super::material_request::Column::Id"
    )]
    MaterialRequest,
}

impl Related<super::material_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
