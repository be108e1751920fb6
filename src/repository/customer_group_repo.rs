// ==========================================
// 客户批量导入管道 - 客户组 Repository
// ==========================================
// 职责: 读取 customer_group 表与默认客户组配置（只读查询）
// 红线: Repository 不含业务规则，只做数据读写
// ==========================================

use crate::config::config_keys;
use crate::db::open_sqlite_connection;
use crate::importer::customer_importer_trait::CustomerGroupSource;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// CustomerGroupRepositoryImpl
// ==========================================
pub struct CustomerGroupRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerGroupRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 Repository
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 新增或更新客户组
    pub fn upsert_group(&self, group_id: i64, code: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO customer_group (customer_group_id, customer_group_code)
            VALUES (?1, ?2)
            ON CONFLICT(customer_group_id) DO UPDATE SET
                customer_group_code = excluded.customer_group_code
            "#,
            params![group_id, code],
        )?;
        Ok(())
    }

    /// 查询全部客户组 ID
    pub fn list_group_ids(&self) -> RepositoryResult<HashSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT customer_group_id FROM customer_group")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .map(|r| r.map(|id| id.to_string()))
            .collect::<Result<HashSet<String>, _>>()?;
        Ok(ids)
    }

    /// 查询默认客户组 ID
    ///
    /// # 规则
    /// - 优先读取 config_kv 中的 customer.default_group_id（必须是已存在的客户组）
    /// - 未配置时取最小的客户组 ID
    pub fn find_default_group_id(&self) -> RepositoryResult<String> {
        let conn = self.lock()?;

        let configured: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![config_keys::DEFAULT_GROUP_ID],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(value) = configured.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            let group_id: i64 = value.parse().map_err(|_| RepositoryError::FieldValueError {
                field: config_keys::DEFAULT_GROUP_ID.to_string(),
                message: format!("不是合法的客户组 ID: {}", value),
            })?;
            let exists: bool = conn
                .query_row(
                    "SELECT 1 FROM customer_group WHERE customer_group_id = ?1",
                    params![group_id],
                    |_row| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            if !exists {
                return Err(RepositoryError::NotFound {
                    entity: "customer_group".to_string(),
                    id: value,
                });
            }
            return Ok(group_id.to_string());
        }

        let min_id: Option<i64> =
            conn.query_row("SELECT MIN(customer_group_id) FROM customer_group", [], |row| {
                row.get(0)
            })?;
        min_id
            .map(|id| id.to_string())
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "customer_group".to_string(),
                id: "default".to_string(),
            })
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl CustomerGroupSource for CustomerGroupRepositoryImpl {
    async fn list_groups(&self) -> ImportResult<HashSet<String>> {
        self.list_group_ids()
            .map_err(|e| ImportError::GroupResolution(e.to_string()))
    }

    async fn get_default_group(&self) -> ImportResult<String> {
        self.find_default_group_id()
            .map_err(|e| ImportError::GroupResolution(e.to_string()))
    }
}
