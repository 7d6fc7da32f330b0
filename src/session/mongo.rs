//! MongoDB session store
//!
//! Sessions live in a `sessions` collection as
//! `{ _id, session, expires }` documents. A TTL index on `expires` makes
//! the database itself reap stale sessions; the server never deletes them
//! explicitly.

use std::time::Duration;

use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use super::SessionData;

const COLLECTION: &str = "sessions";
const DEFAULT_DATABASE: &str = "app";

pub struct MongoStore {
    client: Client,
    sessions: Collection<Document>,
}

impl MongoStore {
    /// Connect, ping, and ensure the TTL index.
    ///
    /// The ping makes an unreachable store fail here, at startup, rather
    /// than on the first request.
    pub async fn connect(uri: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        db.run_command(doc! { "ping": 1 }).await?;

        let sessions = db.collection::<Document>(COLLECTION);
        let mut ttl_options = IndexOptions::default();
        ttl_options.expire_after = Some(Duration::ZERO);
        let ttl_index = IndexModel::builder()
            .keys(doc! { "expires": 1 })
            .options(ttl_options)
            .build();
        sessions.create_index(ttl_index).await?;

        Ok(Self { client, sessions })
    }

    /// Load a session that has not yet expired.
    ///
    /// The expiry filter matters: the TTL reaper runs on a coarse interval,
    /// so an expired document may still be present.
    pub async fn load(&self, id: &str) -> Result<Option<SessionData>, mongodb::error::Error> {
        let filter = doc! { "_id": id, "expires": { "$gt": DateTime::now() } };
        let Some(found) = self.sessions.find_one(filter).await? else {
            return Ok(None);
        };

        let data = match found.get_document("session") {
            Ok(session) => mongodb::bson::from_document(session.clone()).unwrap_or_default(),
            Err(_) => SessionData::default(),
        };
        Ok(Some(data))
    }

    /// Upsert a session with a fresh expiry.
    pub async fn save(
        &self,
        id: &str,
        data: &SessionData,
        ttl: Duration,
    ) -> Result<(), mongodb::error::Error> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires = DateTime::from_millis(
            DateTime::now().timestamp_millis().saturating_add(ttl_ms),
        );
        let session = mongodb::bson::to_document(data)?;

        self.sessions
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "session": session, "expires": expires } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Close the client's connection pool.
    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
    }
}
