use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_machines_table::Migration),
            Box::new(m20260101_000002_create_production_orders_table::Migration),
            Box::new(m20260101_000003_create_shift_reports_table::Migration),
            Box::new(m20260101_000004_create_shift_report_rows_table::Migration),
            Box::new(m20260101_000005_create_recipes_table::Migration),
            Box::new(m20260101_000006_create_recipe_components_table::Migration),
            Box::new(m20260101_000007_create_material_requests_table::Migration),
            Box::new(m20260101_000008_create_material_request_items_table::Migration),
        ]
    }
}

mod m20260101_000001_create_machines_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_machines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Machines::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Machines::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Machines::MachineNumber)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Machines::Name).string().not_null())
                        .col(ColumnDef::new(Machines::Status).string().not_null())
                        .col(ColumnDef::new(Machines::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Machines::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Machines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Machines {
        Table,
        Id,
        MachineNumber,
        Name,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260101_000002_create_production_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_production_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::MachineId).uuid().not_null())
                        .col(ColumnDef::new(ProductionOrders::Product).string().not_null())
                        .col(
                            ColumnDef::new(ProductionOrders::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::CompletedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProductionOrders::Status).string().not_null())
                        .col(ColumnDef::new(ProductionOrders::Color).string().null())
                        .col(ColumnDef::new(ProductionOrders::MoldName).string().null())
                        .col(ColumnDef::new(ProductionOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(ProductionOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(ProductionOrders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_machine_id")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::MachineId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_status")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ProductionOrders {
        Table,
        Id,
        MachineId,
        Product,
        Quantity,
        CompletedQty,
        Status,
        Color,
        MoldName,
        Notes,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20260101_000003_create_shift_reports_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_shift_reports_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShiftReports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShiftReports::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShiftReports::ReportDate).date().not_null())
                        .col(ColumnDef::new(ShiftReports::Shift).string().not_null())
                        .col(ColumnDef::new(ShiftReports::Notes).string().null())
                        .col(ColumnDef::new(ShiftReports::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ShiftReports::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ShiftReports {
        Table,
        Id,
        ReportDate,
        Shift,
        Notes,
        CreatedAt,
    }
}

mod m20260101_000004_create_shift_report_rows_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_shift_report_rows_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShiftReportRows::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShiftReportRows::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShiftReportRows::ReportId).uuid().not_null())
                        .col(ColumnDef::new(ShiftReportRows::OrderId).uuid().null())
                        .col(
                            ColumnDef::new(ShiftReportRows::MachineNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShiftReportRows::MoldProduct)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShiftReportRows::ProductColor).string().null())
                        .col(
                            ColumnDef::new(ShiftReportRows::PlanQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ShiftReportRows::ActualQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ShiftReportRows::CycleSeconds).integer().null())
                        .col(
                            ColumnDef::new(ShiftReportRows::DowntimeMinutes)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(ShiftReportRows::DefectQty).integer().null())
                        .col(
                            ColumnDef::new(ShiftReportRows::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shift_report_rows_report_id")
                        .table(ShiftReportRows::Table)
                        .col(ShiftReportRows::ReportId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shift_report_rows_order_id")
                        .table(ShiftReportRows::Table)
                        .col(ShiftReportRows::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ShiftReportRows::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ShiftReportRows {
        Table,
        Id,
        ReportId,
        OrderId,
        MachineNumber,
        MoldProduct,
        ProductColor,
        PlanQty,
        ActualQty,
        CycleSeconds,
        DowntimeMinutes,
        DefectQty,
        CreatedAt,
    }
}

mod m20260101_000005_create_recipes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000005_create_recipes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Recipes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Recipes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Recipes::Name).string().not_null())
                        .col(ColumnDef::new(Recipes::Product).string().not_null())
                        .col(ColumnDef::new(Recipes::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipes_product")
                        .table(Recipes::Table)
                        .col(Recipes::Product)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Recipes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Recipes {
        Table,
        Id,
        Name,
        Product,
        CreatedAt,
    }
}

mod m20260101_000006_create_recipe_components_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000006_create_recipe_components_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RecipeComponents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RecipeComponents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RecipeComponents::RecipeId).uuid().not_null())
                        .col(
                            ColumnDef::new(RecipeComponents::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RecipeComponents::MaterialName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecipeComponents::Percentage)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(RecipeComponents::WeightKg).decimal().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recipe_components_recipe_id")
                        .table(RecipeComponents::Table)
                        .col(RecipeComponents::RecipeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RecipeComponents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum RecipeComponents {
        Table,
        Id,
        RecipeId,
        Position,
        MaterialName,
        Percentage,
        WeightKg,
    }
}

mod m20260101_000007_create_material_requests_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000007_create_material_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaterialRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaterialRequests::OrderId).uuid().null())
                        .col(ColumnDef::new(MaterialRequests::RecipeId).uuid().not_null())
                        .col(ColumnDef::new(MaterialRequests::Product).string().not_null())
                        .col(
                            ColumnDef::new(MaterialRequests::BaseWeightKg)
                                .decimal()
                                .null(),
                        )
                        .col(ColumnDef::new(MaterialRequests::Status).string().not_null())
                        .col(
                            ColumnDef::new(MaterialRequests::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaterialRequests::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_material_requests_order_id")
                        .table(MaterialRequests::Table)
                        .col(MaterialRequests::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaterialRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MaterialRequests {
        Table,
        Id,
        OrderId,
        RecipeId,
        Product,
        BaseWeightKg,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260101_000008_create_material_request_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000008_create_material_request_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaterialRequestItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialRequestItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequestItems::RequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequestItems::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MaterialRequestItems::MaterialName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequestItems::Percentage)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MaterialRequestItems::CalculatedKg)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequestItems::ActualKg)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequestItems::BatchNumber)
                                .string()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_material_request_items_request_id")
                        .table(MaterialRequestItems::Table)
                        .col(MaterialRequestItems::RequestId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaterialRequestItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MaterialRequestItems {
        Table,
        Id,
        RequestId,
        Position,
        MaterialName,
        Percentage,
        CalculatedKg,
        ActualKg,
        BatchNumber,
    }
}
