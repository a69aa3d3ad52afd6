// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MenuScrapeResults::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MenuScrapeResults::Year).integer().not_null())
                    .col(ColumnDef::new(MenuScrapeResults::Week).integer().not_null())
                    .col(ColumnDef::new(MenuScrapeResults::LocationId).string().not_null())
                    .col(ColumnDef::new(MenuScrapeResults::RestaurantId).string().not_null())
                    .col(ColumnDef::new(MenuScrapeResults::Document).text().null())
                    .col(ColumnDef::new(MenuScrapeResults::DocumentHash).string().not_null())
                    .col(
                        ColumnDef::new(MenuScrapeResults::ScrapeTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MenuScrapeResults::ExtractionResult).json().not_null())
                    .primary_key(
                        Index::create()
                            .col(MenuScrapeResults::Year)
                            .col(MenuScrapeResults::Week)
                            .col(MenuScrapeResults::LocationId)
                            .col(MenuScrapeResults::RestaurantId),
                    )
                    .to_owned(),
            )
            .await?;

        // "current result" lookups filter on the restaurant key and sort by week
        manager
            .create_index(
                Index::create()
                    .name("idx_menu_scrape_results_restaurant")
                    .table(MenuScrapeResults::Table)
                    .col(MenuScrapeResults::LocationId)
                    .col(MenuScrapeResults::RestaurantId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MenuScrapeResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MenuScrapeResults {
    Table,
    Year,
    Week,
    LocationId,
    RestaurantId,
    Document,
    DocumentHash,
    ScrapeTimestamp,
    ExtractionResult,
}
