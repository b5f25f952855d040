use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "shift_report_rows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub report_id: Uuid,

    /// While this row exists and links an order, its actual_qty has been
    /// added exactly once to that order's completed_qty.
    pub order_id: Option<Uuid>,

    pub machine_number: i32,

    #[validate(length(min = 1, max = 120))]
    pub mold_product: String,

    pub product_color: Option<String>,

    pub plan_qty: i32,
    pub actual_qty: i32,

    pub cycle_seconds: Option<i32>,
    pub downtime_minutes: Option<i32>,
    pub defect_qty: Option<i32>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shift_report::Entity",
        from = "Column::ReportId",
        to = "super::shift_report::Column::Id"
    )]
    ShiftReport,
    #[sea_orm(
        belongs_to = "super::production_order::Entity",
        from = "Column::OrderId",
        to = "super::production_order::Column::Id"
    )]
    ProductionOrder,
}

impl Related<super::shift_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShiftReport.def()
    }
}

impl Related<super::production_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
