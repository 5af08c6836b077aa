//! SeaORM entities.

pub mod record;
