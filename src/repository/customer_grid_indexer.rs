// ==========================================
// 客户批量导入管道 - 客户网格索引
// ==========================================
// 职责: 由 customer_entity / customer_address 全量重建 customer_grid_flat
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::customer::CUSTOMER_GRID_INDEX;
use crate::importer::customer_importer_trait::IndexTrigger;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct CustomerGridIndexerImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerGridIndexerImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 全量重建客户网格，返回索引行数
    pub fn rebuild_customer_grid(&self) -> RepositoryResult<usize> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM customer_grid_flat", [])?;
        let rows = tx.execute(
            r#"
            INSERT INTO customer_grid_flat (
                entity_id, name, email, website, store, group_id, address_count, indexed_at
            )
            SELECT
                e.entity_id,
                TRIM(COALESCE(e.firstname, '') || ' ' || COALESCE(e.lastname, '')),
                e.email,
                e.website,
                e.store,
                e.group_id,
                (SELECT COUNT(*) FROM customer_address a WHERE a.customer_id = e.entity_id),
                datetime('now')
            FROM customer_entity e
            "#,
            [],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(rows)
    }
}

#[async_trait]
impl IndexTrigger for CustomerGridIndexerImpl {
    async fn reindex_all(&self, index_id: &str) -> ImportResult<()> {
        if index_id != CUSTOMER_GRID_INDEX {
            return Err(ImportError::Reindex(format!("未知索引: {}", index_id)));
        }

        let rows = self
            .rebuild_customer_grid()
            .map_err(|e| ImportError::Reindex(e.to_string()))?;
        info!(index = index_id, rows, "客户网格索引重建完成");
        Ok(())
    }
}
