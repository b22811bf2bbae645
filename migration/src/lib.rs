pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261019_000001_initial_tables;
mod m20261019_000002_link_relations;
mod m20261020_000001_link_checks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_initial_tables::Migration),
            Box::new(m20261019_000002_link_relations::Migration),
            Box::new(m20261020_000001_link_checks::Migration),
        ]
    }
}
