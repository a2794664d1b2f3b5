use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_inventory_master_table::Migration),
            Box::new(m20240101_000002_create_inventory_details_table::Migration),
        ]
    }
}

mod m20240101_000001_create_inventory_master_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_inventory_master_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryMaster::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryMaster::ProductId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InventoryMaster::ProductName).string().null())
                        .col(ColumnDef::new(InventoryMaster::Category).string().null())
                        .col(ColumnDef::new(InventoryMaster::Brand).string().null())
                        .col(
                            ColumnDef::new(InventoryMaster::StockInHand)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryMaster::UnitPrice)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(InventoryMaster::SupplierId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMaster::DateAdded)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMaster::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryMaster::Remarks).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_master_category")
                        .table(InventoryMaster::Table)
                        .col(InventoryMaster::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryMaster::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryMaster {
        Table,
        ProductId,
        ProductName,
        Category,
        Brand,
        StockInHand,
        UnitPrice,
        SupplierId,
        DateAdded,
        LastUpdated,
        Remarks,
    }
}

mod m20240101_000002_create_inventory_details_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_inventory_details_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // No foreign key: a detail may reference a product that does not exist yet.
            manager
                .create_table(
                    Table::create()
                        .table(InventoryDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryDetails::TransactionId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InventoryDetails::ProductId).big_integer().null())
                        .col(
                            ColumnDef::new(InventoryDetails::TransactionType)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryDetails::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryDetails::TransactionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryDetails::TransactionDescription)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryDetails::TransactionAmount)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(InventoryDetails::TransactionStatus)
                                .string_len(16)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryDetails::TransactionNotes)
                                .string_len(2500)
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_details_product_id")
                        .table(InventoryDetails::Table)
                        .col(InventoryDetails::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryDetails::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InventoryDetails {
        Table,
        TransactionId,
        ProductId,
        TransactionType,
        Quantity,
        TransactionDate,
        TransactionDescription,
        TransactionAmount,
        TransactionStatus,
        TransactionNotes,
    }
}
