pub mod product;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

use crate::entities::product::Entity as Product;

/// Creates the `products` table from the entity definition when it is missing.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_product_table = schema.create_table_from_entity(Product);
    create_product_table.if_not_exists();

    db.execute(backend.build(&create_product_table)).await?;
    tracing::info!("Products schema is ready");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{sea_query::MysqlQueryBuilder, DbBackend};

    #[test]
    fn money_columns_are_double() {
        let sql = Schema::new(DbBackend::MySql)
            .create_table_from_entity(Product)
            .to_string(MysqlQueryBuilder);

        assert!(sql.contains("`price` double"), "{sql}");
        assert!(sql.contains("`discount` double"), "{sql}");
        assert!(!sql.contains("decimal"), "{sql}");
    }
}
