//! Record entity for SeaORM.
//!
//! One row per stored record of any kind. `id` is the encoded key, so the
//! records nested under a key are exactly those whose id starts with that
//! key's encoding followed by `.`.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use postline_core::domain::Key;
use postline_core::error::RepoError;
use postline_core::ports::StoredRecord;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "JsonBinary")]
    pub properties: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to a stored record.
impl TryFrom<Model> for StoredRecord {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let key = Key::decode(&model.id)
            .map_err(|e| RepoError::Decode(format!("record {}: {}", model.id, e)))?;
        Ok(Self {
            key,
            creation: model.created_at.into(),
            properties: model.properties,
        })
    }
}

/// Conversion from a stored record to SeaORM ActiveModel.
impl TryFrom<StoredRecord> for ActiveModel {
    type Error = RepoError;

    fn try_from(record: StoredRecord) -> Result<Self, Self::Error> {
        let id = record
            .key
            .encode()
            .map_err(|e| RepoError::Write(e.to_string()))?;
        Ok(Self {
            id: Set(id),
            kind: Set(record.key.kind().to_string()),
            created_at: Set(record.creation.into()),
            properties: Set(record.properties),
        })
    }
}
