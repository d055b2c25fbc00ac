use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create forms table
        manager
            .create_table(
                Table::create()
                    .table(Forms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Forms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Forms::Name).string().not_null())
                    .col(ColumnDef::new(Forms::Description).text())
                    .col(ColumnDef::new(Forms::AssociationType).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Create form_fields table, cascade-deleted with their form
        manager
            .create_table(
                Table::create()
                    .table(FormFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FormFields::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FormFields::FormId).integer().not_null())
                    .col(ColumnDef::new(FormFields::Name).string().not_null())
                    .col(ColumnDef::new(FormFields::Description).text())
                    .col(ColumnDef::new(FormFields::FieldType).string().not_null())
                    .col(
                        ColumnDef::new(FormFields::Required)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(FormFields::ValidationRules).json())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-form_fields-form_id")
                            .from(FormFields::Table, FormFields::FormId)
                            .to(Forms::Table, Forms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create batches table
        manager
            .create_table(
                Table::create()
                    .table(Batches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Batches::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Batches::Code).string().unique_key())
                    .col(
                        ColumnDef::new(Batches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Batches::OwnerId).integer())
                    .col(ColumnDef::new(Batches::Country).string().not_null())
                    .col(ColumnDef::new(Batches::ProductionType).string().not_null())
                    .col(
                        ColumnDef::new(Batches::ProductionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Batches::FormGateSourced)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Batches::ClusterGroup).string().not_null())
                    .col(ColumnDef::new(Batches::Quantity).integer().not_null())
                    .col(ColumnDef::new(Batches::Uoms).string().not_null())
                    .col(
                        ColumnDef::new(Batches::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Batches::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Batches::FormId).integer())
                    .col(ColumnDef::new(Batches::FormData).json())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-batches-form_id")
                            .from(Batches::Table, Batches::FormId)
                            .to(Forms::Table, Forms::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create bags table, cascade-deleted with their batch
        manager
            .create_table(
                Table::create()
                    .table(Bags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Bags::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bags::BatchId).integer().not_null())
                    .col(ColumnDef::new(Bags::InternalLotNumber).string().not_null())
                    .col(ColumnDef::new(Bags::State).string().not_null())
                    .col(ColumnDef::new(Bags::QrCode).string().not_null())
                    .col(ColumnDef::new(Bags::ExternalLotNumber).string().not_null())
                    .col(
                        ColumnDef::new(Bags::ExternalUpdateDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bags::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Bags::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Bags::FormId).integer())
                    .col(ColumnDef::new(Bags::FormData).json())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bags-batch_id")
                            .from(Bags::Table, Bags::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bags-form_id")
                            .from(Bags::Table, Bags::FormId)
                            .to(Forms::Table, Forms::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create submissions table
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::FormId).integer().not_null())
                    .col(ColumnDef::new(Submissions::ContentType).string())
                    .col(ColumnDef::new(Submissions::ObjectId).integer())
                    .col(ColumnDef::new(Submissions::Data).json().not_null())
                    .col(
                        ColumnDef::new(Submissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::CreatedBy).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submissions-form_id")
                            .from(Submissions::Table, Submissions::FormId)
                            .to(Forms::Table, Forms::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for the lookup paths
        manager
            .create_index(
                Index::create()
                    .name("idx-form_fields-form_id")
                    .table(FormFields::Table)
                    .col(FormFields::FormId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bags-batch_id")
                    .table(Bags::Table)
                    .col(Bags::BatchId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-submissions-form_id")
                    .table(Submissions::Table)
                    .col(Submissions::FormId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx-submissions-form_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-bags-batch_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-form_fields-form_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Batches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FormFields::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Forms::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Forms {
    Table,
    Id,
    Name,
    Description,
    AssociationType,
}

#[derive(Iden)]
enum FormFields {
    Table,
    Id,
    FormId,
    Name,
    Description,
    FieldType,
    Required,
    ValidationRules,
}

#[derive(Iden)]
enum Batches {
    Table,
    Id,
    Code,
    CreatedAt,
    OwnerId,
    Country,
    ProductionType,
    ProductionDate,
    FormGateSourced,
    ClusterGroup,
    Quantity,
    Uoms,
    Status,
    CompletedAt,
    FormId,
    FormData,
}

#[derive(Iden)]
enum Bags {
    Table,
    Id,
    CreatedAt,
    BatchId,
    InternalLotNumber,
    State,
    QrCode,
    ExternalLotNumber,
    ExternalUpdateDate,
    Status,
    CompletedAt,
    FormId,
    FormData,
}

#[derive(Iden)]
enum Submissions {
    Table,
    Id,
    FormId,
    ContentType,
    ObjectId,
    Data,
    CreatedAt,
    CreatedBy,
}
