use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_directory_tables::Migration),
            Box::new(m20240601_000002_create_materials_table::Migration),
            Box::new(m20240601_000003_create_request_tables::Migration),
            Box::new(m20240601_000004_create_procedure_tables::Migration),
            Box::new(m20240601_000005_create_notifications_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_directory_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_directory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Departments::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Departments::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Departments::Description).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::FullName).string_len(255).not_null())
                        .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(16)
                                .not_null()
                                .default("USER"),
                        )
                        .col(ColumnDef::new(Users::DepartmentId).uuid().null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_users_department_id")
                                .from(Users::Table, Users::DepartmentId)
                                .to(Departments::Table, Departments::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserSessions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserSessions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserSessions::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(UserSessions::TokenHash)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(UserSessions::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserSessions::UserAgent).string_len(512).null())
                        .col(
                            ColumnDef::new(UserSessions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_sessions_user_id")
                                .from(UserSessions::Table, UserSessions::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_sessions_user_id")
                        .table(UserSessions::Table)
                        .col(UserSessions::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::Name).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Customers::Email)
                                .string_len(255)
                                .null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::Phone).string_len(32).null())
                        .col(ColumnDef::new(Customers::Address).text().null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SourceOthers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SourceOthers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SourceOthers::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(SourceOthers::Description).text().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Origins::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Origins::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Origins::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Origins::Country).string_len(128).null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Origins::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SourceOthers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(UserSessions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Departments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Departments {
        Table,
        Id,
        Name,
        Description,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        Email,
        FullName,
        PasswordHash,
        Role,
        DepartmentId,
        IsActive,
        IsVerified,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum UserSessions {
        Table,
        Id,
        UserId,
        TokenHash,
        ExpiresAt,
        UserAgent,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Address,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SourceOthers {
        Table,
        Id,
        Name,
        Description,
    }

    #[derive(DeriveIden)]
    enum Origins {
        Table,
        Id,
        Name,
        Country,
    }
}

mod m20240601_000002_create_materials_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Materials::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Materials::Name).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Materials::Code)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Materials::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Materials::Unit).string_len(32).not_null())
                        .col(ColumnDef::new(Materials::OriginId).uuid().null())
                        .col(
                            ColumnDef::new(Materials::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Materials::MaterialType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Materials::Description).text().null())
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_materials_origin_id")
                                .from(Materials::Table, Materials::OriginId)
                                .to(Origins::Table, Origins::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_materials_type_active")
                        .table(Materials::Table)
                        .col(Materials::MaterialType)
                        .col(Materials::IsActive)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
        Name,
        Code,
        Quantity,
        Unit,
        OriginId,
        IsActive,
        MaterialType,
        Status,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Origins {
        Table,
        Id,
    }
}

mod m20240601_000003_create_request_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_request_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Requests::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Requests::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Requests::Code).string_len(32).null().unique_key())
                        .col(ColumnDef::new(Requests::Title).string_len(255).not_null())
                        .col(ColumnDef::new(Requests::Description).text().null())
                        .col(ColumnDef::new(Requests::ProductLinks).json().not_null())
                        .col(ColumnDef::new(Requests::Media).json().not_null())
                        .col(ColumnDef::new(Requests::Source).string_len(32).not_null())
                        .col(ColumnDef::new(Requests::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Requests::Priority).string_len(16).not_null())
                        .col(ColumnDef::new(Requests::CustomerId).uuid().null())
                        .col(ColumnDef::new(Requests::SourceOtherId).uuid().null())
                        .col(ColumnDef::new(Requests::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Requests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Requests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requests_customer_id")
                                .from(Requests::Table, Requests::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requests_source_other_id")
                                .from(Requests::Table, Requests::SourceOtherId)
                                .to(SourceOthers::Table, SourceOthers::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requests_created_by")
                                .from(Requests::Table, Requests::CreatedBy)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requests_status")
                        .table(Requests::Table)
                        .col(Requests::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequestMaterials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequestMaterials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RequestMaterials::RequestId).uuid().not_null())
                        .col(ColumnDef::new(RequestMaterials::MaterialId).uuid().not_null())
                        .col(ColumnDef::new(RequestMaterials::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(RequestMaterials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_materials_request_id")
                                .from(RequestMaterials::Table, RequestMaterials::RequestId)
                                .to(Requests::Table, Requests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_materials_material_id")
                                .from(RequestMaterials::Table, RequestMaterials::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_request_materials_request_id")
                        .table(RequestMaterials::Table)
                        .col(RequestMaterials::RequestId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequestApprovalInfos::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequestApprovalInfos::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestApprovalInfos::RequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestApprovalInfos::ApprovalType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RequestApprovalInfos::HoldReason).text().null())
                        .col(ColumnDef::new(RequestApprovalInfos::DenyReason).text().null())
                        .col(
                            ColumnDef::new(RequestApprovalInfos::ProductionPlan)
                                .text()
                                .null(),
                        )
                        .col(ColumnDef::new(RequestApprovalInfos::Files).json().not_null())
                        .col(ColumnDef::new(RequestApprovalInfos::ApprovedBy).uuid().null())
                        .col(
                            ColumnDef::new(RequestApprovalInfos::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestApprovalInfos::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_approval_infos_request_id")
                                .from(RequestApprovalInfos::Table, RequestApprovalInfos::RequestId)
                                .to(Requests::Table, Requests::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_request_approval_infos_request_id")
                        .table(RequestApprovalInfos::Table)
                        .col(RequestApprovalInfos::RequestId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequestInputs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequestInputs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestInputs::MaterialId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(RequestInputs::RequestId).uuid().null())
                        .col(ColumnDef::new(RequestInputs::Supplier).string_len(255).not_null())
                        .col(
                            ColumnDef::new(RequestInputs::ExpectedDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(RequestInputs::Price)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(RequestInputs::Quantity).integer().not_null())
                        .col(ColumnDef::new(RequestInputs::Reason).text().null())
                        .col(
                            ColumnDef::new(RequestInputs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestInputs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_inputs_material_id")
                                .from(RequestInputs::Table, RequestInputs::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_inputs_request_id")
                                .from(RequestInputs::Table, RequestInputs::RequestId)
                                .to(Requests::Table, Requests::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RequestStatusHistories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RequestStatusHistories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestStatusHistories::RequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestStatusHistories::FromStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RequestStatusHistories::ToStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RequestStatusHistories::ChangedBy).uuid().null())
                        .col(ColumnDef::new(RequestStatusHistories::Note).text().null())
                        .col(
                            ColumnDef::new(RequestStatusHistories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_request_status_histories_request_id")
                                .from(
                                    RequestStatusHistories::Table,
                                    RequestStatusHistories::RequestId,
                                )
                                .to(Requests::Table, Requests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_request_status_histories_request_id")
                        .table(RequestStatusHistories::Table)
                        .col(RequestStatusHistories::RequestId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RequestStatusHistories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RequestInputs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RequestApprovalInfos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RequestMaterials::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Requests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Requests {
        Table,
        Id,
        Code,
        Title,
        Description,
        ProductLinks,
        Media,
        Source,
        Status,
        Priority,
        CustomerId,
        SourceOtherId,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum RequestMaterials {
        Table,
        Id,
        RequestId,
        MaterialId,
        Quantity,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum RequestApprovalInfos {
        Table,
        Id,
        RequestId,
        ApprovalType,
        HoldReason,
        DenyReason,
        ProductionPlan,
        Files,
        ApprovedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum RequestInputs {
        Table,
        Id,
        MaterialId,
        RequestId,
        Supplier,
        ExpectedDate,
        Price,
        Quantity,
        Reason,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum RequestStatusHistories {
        Table,
        Id,
        RequestId,
        FromStatus,
        ToStatus,
        ChangedBy,
        Note,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum SourceOthers {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
    }
}

mod m20240601_000004_create_procedure_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_procedure_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Procedures::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Procedures::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Procedures::Name).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Procedures::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Procedures::Description).text().null())
                        .col(
                            ColumnDef::new(Procedures::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Procedures::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_procedures_name_version")
                        .table(Procedures::Table)
                        .col(Procedures::Name)
                        .col(Procedures::Version)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Subprocesses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Subprocesses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Subprocesses::ProcedureId).uuid().not_null())
                        .col(ColumnDef::new(Subprocesses::DepartmentId).uuid().null())
                        .col(ColumnDef::new(Subprocesses::Role).string_len(64).null())
                        .col(ColumnDef::new(Subprocesses::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Subprocesses::Description).text().null())
                        .col(ColumnDef::new(Subprocesses::Step).integer().not_null())
                        .col(
                            ColumnDef::new(Subprocesses::EstimatedDurationMinutes)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Subprocesses::IsRequired)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Subprocesses::HasCost)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Subprocesses::Status)
                                .string_len(16)
                                .not_null()
                                .default("PENDING"),
                        )
                        .col(
                            ColumnDef::new(Subprocesses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Subprocesses::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_subprocesses_procedure_id")
                                .from(Subprocesses::Table, Subprocesses::ProcedureId)
                                .to(Procedures::Table, Procedures::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_subprocesses_department_id")
                                .from(Subprocesses::Table, Subprocesses::DepartmentId)
                                .to(Departments::Table, Departments::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_subprocesses_procedure_department_step")
                        .table(Subprocesses::Table)
                        .col(Subprocesses::ProcedureId)
                        .col(Subprocesses::DepartmentId)
                        .col(Subprocesses::Step)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SubprocessHistories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SubprocessHistories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SubprocessHistories::SubprocessId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SubprocessHistories::ProcedureId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SubprocessHistories::Step).integer().not_null())
                        .col(
                            ColumnDef::new(SubprocessHistories::FromStatus)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SubprocessHistories::ToStatus)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(SubprocessHistories::ChangedBy).uuid().null())
                        .col(ColumnDef::new(SubprocessHistories::Note).text().null())
                        .col(
                            ColumnDef::new(SubprocessHistories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_subprocess_histories_subprocess_id")
                                .from(SubprocessHistories::Table, SubprocessHistories::SubprocessId)
                                .to(Subprocesses::Table, Subprocesses::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SubprocessHistories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Subprocesses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Procedures::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Procedures {
        Table,
        Id,
        Name,
        Version,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Subprocesses {
        Table,
        Id,
        ProcedureId,
        DepartmentId,
        Role,
        Name,
        Description,
        Step,
        EstimatedDurationMinutes,
        IsRequired,
        HasCost,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SubprocessHistories {
        Table,
        Id,
        SubprocessId,
        ProcedureId,
        Step,
        FromStatus,
        ToStatus,
        ChangedBy,
        Note,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Departments {
        Table,
        Id,
    }
}

mod m20240601_000005_create_notifications_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                        .col(ColumnDef::new(Notifications::Title).string_len(255).not_null())
                        .col(ColumnDef::new(Notifications::Body).text().not_null())
                        .col(
                            ColumnDef::new(Notifications::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_notifications_user_id")
                                .from(Notifications::Table, Notifications::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_user_id")
                        .table(Notifications::Table)
                        .col(Notifications::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Notifications {
        Table,
        Id,
        UserId,
        Title,
        Body,
        IsRead,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }
}
