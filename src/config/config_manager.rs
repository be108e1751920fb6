// ==========================================
// 客户批量导入管道 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)，缺省时回落到内置默认值
// ==========================================

use crate::config::import_config_trait::{ImportConfigReader, ImportSettings};
use crate::db::open_sqlite_connection;
use crate::domain::types::{EntityCode, ImportBehavior};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const REQUIRED_COLUMNS: &str = "import.customer.required_columns";
    pub const GROUP_COLUMN: &str = "import.customer.group_column";
    pub const ENTITY_CODE: &str = "import.customer.entity_code";
    pub const BEHAVIOR: &str = "import.customer.behavior";
    pub const GRID_INDEX: &str = "import.customer.grid_index";
    pub const DEFAULT_GROUP_ID: &str = "customer.default_group_id";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
    defaults: ImportSettings,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            defaults: ImportSettings::default(),
        }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 写入 global scope 的配置值（存在则覆写）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// 读取去除首尾空白后的非空配置值
    fn get_non_empty(&self, key: &str) -> ImportResult<Option<String>> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_required_columns(&self) -> ImportResult<Vec<String>> {
        // 配置项只能在固定必需列之上追加
        let mut columns = self.defaults.required_columns.clone();
        if let Some(raw) = self.get_non_empty(config_keys::REQUIRED_COLUMNS)? {
            let extra: Vec<String> = raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if extra.is_empty() {
                return Err(ImportError::ConfigValueError {
                    key: config_keys::REQUIRED_COLUMNS.to_string(),
                    value: raw,
                    message: "必需列列表不能为空".to_string(),
                });
            }
            for column in extra {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }
        Ok(columns)
    }

    async fn get_group_column(&self) -> ImportResult<String> {
        Ok(self
            .get_non_empty(config_keys::GROUP_COLUMN)?
            .unwrap_or_else(|| self.defaults.group_column.clone()))
    }

    async fn get_entity_code(&self) -> ImportResult<EntityCode> {
        match self.get_non_empty(config_keys::ENTITY_CODE)? {
            Some(raw) => raw.parse().map_err(|message| ImportError::ConfigValueError {
                key: config_keys::ENTITY_CODE.to_string(),
                value: raw.clone(),
                message,
            }),
            None => Ok(self.defaults.entity_code),
        }
    }

    async fn get_import_behavior(&self) -> ImportResult<ImportBehavior> {
        match self.get_non_empty(config_keys::BEHAVIOR)? {
            Some(raw) => raw.parse().map_err(|message| ImportError::ConfigValueError {
                key: config_keys::BEHAVIOR.to_string(),
                value: raw.clone(),
                message,
            }),
            None => Ok(self.defaults.behavior),
        }
    }

    async fn get_grid_index_id(&self) -> ImportResult<String> {
        Ok(self
            .get_non_empty(config_keys::GRID_INDEX)?
            .unwrap_or_else(|| self.defaults.grid_index_id.clone()))
    }
}
