use mongodb::{
    bson::doc, error::ErrorKind, error::WriteFailure, options::IndexOptions, Client as MongoClient,
    Collection, Database, IndexModel,
};
use service_core::error::AppError;

use crate::models::{Order, Product, ProductList, User, UserSettings};

/// MongoDB wrapper: one client, typed collection accessors, startup indexes.
#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes");

        // Unique email closes the register existence-check/insert race at the
        // store level; a duplicate insert fails with E11000.
        let email_unique = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.users().create_index(email_unique, None).await?;

        for (name, index) in [
            (
                "lists",
                IndexModel::builder()
                    .keys(doc! { "user_id": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("user_lookup".to_string())
                            .build(),
                    )
                    .build(),
            ),
            (
                "orders",
                IndexModel::builder()
                    .keys(doc! { "user_id": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("user_lookup".to_string())
                            .build(),
                    )
                    .build(),
            ),
            (
                "settings",
                IndexModel::builder()
                    .keys(doc! { "user_id": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("user_unique".to_string())
                            .unique(true)
                            .build(),
                    )
                    .build(),
            ),
        ] {
            self.db
                .collection::<mongodb::bson::Document>(name)
                .create_index(index, None)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to create index on {} collection: {}", name, e);
                    AppError::from(e)
                })?;
        }

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection("products")
    }

    pub fn lists(&self) -> Collection<ProductList> {
        self.db.collection("lists")
    }

    pub fn orders(&self) -> Collection<Order> {
        self.db.collection("orders")
    }

    pub fn settings(&self) -> Collection<UserSettings> {
        self.db.collection("settings")
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users()
            .find_one(doc! { "email": email.to_lowercase() }, None)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.users()
            .find_one(doc! { "_id": user_id }, None)
            .await
            .map_err(AppError::from)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// True for MongoDB's E11000 duplicate-key write error.
pub fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}
