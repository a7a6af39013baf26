use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Jobs
    create_indexes(
        db,
        "jobs",
        vec![
            index(bson::doc! { "tenant_id": 1, "is_deleted": 1, "created_at": -1 }),
            index(bson::doc! { "tenant_id": 1, "status": 1 }),
            index(bson::doc! { "tenant_id": 1, "category": 1 }),
        ],
    )
    .await?;

    // Candidates
    create_indexes(
        db,
        "candidates",
        vec![
            index(bson::doc! { "tenant_id": 1, "is_deleted": 1, "created_at": -1 }),
            index(bson::doc! { "tenant_id": 1, "status": 1 }),
            index(bson::doc! { "tenant_id": 1, "personal_info.email": 1 }),
        ],
    )
    .await?;

    // Deals
    create_indexes(
        db,
        "deals",
        vec![
            index(bson::doc! { "tenant_id": 1, "is_deleted": 1, "created_at": -1 }),
            index(bson::doc! { "tenant_id": 1, "status": 1 }),
            index(bson::doc! { "tenant_id": 1, "stage": 1 }),
        ],
    )
    .await?;

    // Tickets
    create_indexes(
        db,
        "tickets",
        vec![
            index(bson::doc! { "tenant_id": 1, "is_deleted": 1, "created_at": -1 }),
            index(bson::doc! { "tenant_id": 1, "status": 1 }),
            index(bson::doc! { "tenant_id": 1, "category": 1 }),
            index_unique(bson::doc! { "tenant_id": 1, "ticket_id": 1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
