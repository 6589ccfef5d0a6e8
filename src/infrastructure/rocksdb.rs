use crate::domain::order::Order;
use crate::domain::ports::OrderStore;
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for storing orders keyed by id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for store bookkeeping such as the id counter.
pub const CF_META: &str = "meta";

const LAST_ORDER_ID_KEY: &[u8] = b"last_order_id";

/// A persistent order store implementation using RocksDB.
///
/// Orders are serialized as JSON under their big-endian id. The id counter is
/// kept in a separate Column Family and written in the same batch as the
/// order, so a crash never leaves an id allocated without its order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBOrderStore {
    db: Arc<DB>,
    id_lock: Arc<Mutex<()>>,
}

impl RocksDBOrderStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("orders" and "meta") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_meta])?;

        Ok(Self {
            db: Arc::new(db),
            id_lock: Arc::new(Mutex::new(())),
        })
    }

    fn last_id(&self) -> Result<u64, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_META)
            .ok_or_else(|| StoreError::Backend("Meta column family not found".to_string()))?;

        match self.db.get_pinned_cf(&cf, LAST_ORDER_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_ref().try_into().map_err(|_| {
                    StoreError::Backend("Corrupt order id counter".to_string())
                })?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl OrderStore for RocksDBOrderStore {
    async fn save(&self, order: &mut Order) -> Result<(), StoreError> {
        let cf_orders = self
            .db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| StoreError::Backend("Orders column family not found".to_string()))?;
        let cf_meta = self
            .db
            .cf_handle(CF_META)
            .ok_or_else(|| StoreError::Backend("Meta column family not found".to_string()))?;

        let _guard = self
            .id_lock
            .lock()
            .map_err(|_| StoreError::Backend("Order id lock poisoned".to_string()))?;

        let id = self.last_id()? + 1;
        let mut stored = order.clone();
        stored.id = Some(id);
        let value = serde_json::to_vec(&stored)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_orders, id.to_be_bytes(), value);
        batch.put_cf(&cf_meta, LAST_ORDER_ID_KEY, id.to_be_bytes());
        self.db.write(batch)?;

        order.id = Some(id);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Order, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| StoreError::Backend("Orders column family not found".to_string()))?;

        match self.db.get_cf(&cf, id.to_be_bytes())? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Err(StoreError::NotFound(id)),
        }
    }
}
