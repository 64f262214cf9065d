use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== HOUSES ==========
        manager
            .create_table(
                Table::create()
                    .table(Houses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Houses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Houses::Direction).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Houses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ========== ROOMS ==========
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rooms::HouseId).integer().not_null())
                    .col(ColumnDef::new(Rooms::NumWindows).integer().not_null().default(0))
                    .col(ColumnDef::new(Rooms::Orientation).string_len(32))
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_house")
                            .from(Rooms::Table, Rooms::HouseId)
                            .to(Houses::Table, Houses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_house_id")
                    .table(Rooms::Table)
                    .col(Rooms::HouseId)
                    .to_owned(),
            )
            .await?;

        // ========== SENSORS ==========
        manager
            .create_table(
                Table::create()
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sensors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sensors::RoomId).integer().not_null())
                    .col(ColumnDef::new(Sensors::SensorType).string_len(16).not_null())
                    .col(ColumnDef::new(Sensors::Unit).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Sensors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensors_room")
                            .from(Sensors::Table, Sensors::RoomId)
                            .to(Rooms::Table, Rooms::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sensors_room_id")
                    .table(Sensors::Table)
                    .col(Sensors::RoomId)
                    .to_owned(),
            )
            .await?;

        // ========== PERSONS ==========
        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Persons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Persons::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Persons::HouseId).integer().not_null())
                    .col(ColumnDef::new(Persons::RoomId).integer())
                    .col(
                        ColumnDef::new(Persons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persons_house")
                            .from(Persons::Table, Persons::HouseId)
                            .to(Houses::Table, Houses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_persons_room")
                            .from(Persons::Table, Persons::RoomId)
                            .to(Rooms::Table, Rooms::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ========== SENSOR LOGS ==========
        // One table for every sensor type; `sensor_type` is copied from the
        // owning sensor at insert time so per-type series never need a join.
        manager
            .create_table(
                Table::create()
                    .table(SensorLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SensorLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SensorLogs::SensorId).integer().not_null())
                    .col(ColumnDef::new(SensorLogs::SensorType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(SensorLogs::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SensorLogs::Measure).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensor_logs_sensor")
                            .from(SensorLogs::Table, SensorLogs::SensorId)
                            .to(Sensors::Table, Sensors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sensor_logs_type_time")
                    .table(SensorLogs::Table)
                    .col(SensorLogs::SensorType)
                    .col(SensorLogs::RecordedAt)
                    .col(SensorLogs::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sensor_logs_sensor_time")
                    .table(SensorLogs::Table)
                    .col(SensorLogs::SensorId)
                    .col(SensorLogs::RecordedAt)
                    .col(SensorLogs::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SensorLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sensors::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Houses::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Houses {
    Table,
    Id,
    Direction,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Rooms {
    Table,
    Id,
    HouseId,
    NumWindows,
    Orientation,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Sensors {
    Table,
    Id,
    RoomId,
    SensorType,
    Unit,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Persons {
    Table,
    Id,
    Name,
    HouseId,
    RoomId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum SensorLogs {
    Table,
    Id,
    SensorId,
    SensorType,
    RecordedAt,
    Measure,
}
