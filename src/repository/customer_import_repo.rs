// ==========================================
// 客户批量导入管道 - 客户批量导入 Repository
// ==========================================
// 职责: 以 SQLite 作为客户存储，承接 customer_composite 批次
// 行为: APPEND，按 (email, _website) 新增或更新，从不删除
// 事务: 整个批次一个事务，任一 SQL 失败整体回滚
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::customer::{ImportBatch, NormalizedRow, CUSTOMER_GROUP_COLUMN};
use crate::importer::customer_importer_trait::{BulkImporter, BulkImporterFactory};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// 地址列前缀
const ADDRESS_PREFIX: &str = "_address_";

/// 直接落到 customer_entity 固定字段的列
const ENTITY_COLUMNS: [&str; 6] = ["email", "_website", "_store", CUSTOMER_GROUP_COLUMN, "firstname", "lastname"];

/// 单批次处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BatchSummary {
    created: usize,
    updated: usize,
    skipped: usize,
    addresses: usize,
}

// ==========================================
// CustomerImportRepositoryImpl - 导入引擎工厂
// ==========================================
pub struct CustomerImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CustomerImportRepositoryImpl {
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
}

impl BulkImporterFactory for CustomerImportRepositoryImpl {
    fn create(&self) -> ImportResult<Box<dyn BulkImporter>> {
        Ok(Box::new(SqliteBulkImporter {
            conn: Arc::clone(&self.conn),
            log_trace: Vec::new(),
            error_messages: Vec::new(),
        }))
    }
}

// ==========================================
// SqliteBulkImporter - 单次提交的导入引擎
// ==========================================
pub struct SqliteBulkImporter {
    conn: Arc<Mutex<Connection>>,
    log_trace: Vec<String>,
    error_messages: Vec<String>,
}

#[async_trait]
impl BulkImporter for SqliteBulkImporter {
    async fn process_import(&mut self, batch: &ImportBatch) -> ImportResult<()> {
        self.log_trace.push(format!(
            "开始导入: 实体={}, 行为={}, 行数={}",
            batch.entity_code,
            batch.behavior,
            batch.len()
        ));

        let mut conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::Submission(format!("数据库锁获取失败: {}", e)))?;
        let tx = conn
            .transaction()
            .map_err(|e| ImportError::Submission(RepositoryError::from(e).to_string()))?;

        // 逐行日志先暂存，提交成功后才对外可见
        let mut row_trace = Vec::new();
        let mut row_errors = Vec::new();
        let committed = import_rows_tx(&tx, &batch.rows, &mut row_trace, &mut row_errors)
            .and_then(|summary| {
                tx.commit()?;
                Ok(summary)
            });
        let summary = match committed {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "客户批次写入失败，事务已回滚");
                self.log_trace
                    .push(format!("导入失败，整批已回滚（{} 行未写入）", batch.len()));
                return Err(ImportError::Submission(e.to_string()));
            }
        };
        self.log_trace.extend(row_trace);
        self.error_messages.extend(row_errors);

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            addresses = summary.addresses,
            "客户批次已写入"
        );
        self.log_trace.push(format!(
            "导入完成: 新增 {}, 更新 {}, 跳过 {}, 地址 {}",
            summary.created, summary.updated, summary.skipped, summary.addresses
        ));
        Ok(())
    }

    fn log_trace(&self) -> Vec<String> {
        self.log_trace.clone()
    }

    fn error_messages(&self) -> Vec<String> {
        self.error_messages.clone()
    }
}

/// 在事务中逐行写入客户与地址
fn import_rows_tx(
    tx: &Transaction,
    rows: &[NormalizedRow],
    log_trace: &mut Vec<String>,
    error_messages: &mut Vec<String>,
) -> RepositoryResult<BatchSummary> {
    let mut summary = BatchSummary::default();

    for row in rows {
        let email = row.get("email").unwrap_or("").trim();
        if email.is_empty() {
            error_messages.push(format!("第 {} 行: email 为空，已跳过", row.row_number));
            summary.skipped += 1;
            continue;
        }
        let website = row.get("_website").unwrap_or("").trim();
        let store = row.get("_store").unwrap_or("").trim();

        let existing_id: Option<i64> = tx
            .query_row(
                "SELECT entity_id FROM customer_entity WHERE email = ?1 AND website = ?2",
                params![email, website],
                |r| r.get(0),
            )
            .optional()?;

        tx.execute(
            r#"
            INSERT INTO customer_entity (
                email, website, store, group_id, firstname, lastname, attributes_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(email, website) DO UPDATE SET
                store = excluded.store,
                group_id = excluded.group_id,
                firstname = COALESCE(excluded.firstname, customer_entity.firstname),
                lastname = COALESCE(excluded.lastname, customer_entity.lastname),
                attributes_json = excluded.attributes_json,
                updated_at = datetime('now')
            "#,
            params![
                email,
                website,
                store,
                row.get(CUSTOMER_GROUP_COLUMN).unwrap_or(""),
                non_empty(row.get("firstname")),
                non_empty(row.get("lastname")),
                serde_json::to_string(&extra_attributes(row))?,
            ],
        )?;

        let entity_id: i64 = match existing_id {
            Some(id) => {
                summary.updated += 1;
                log_trace.push(format!("第 {} 行: 更新客户 {}", row.row_number, email));
                id
            }
            None => {
                summary.created += 1;
                log_trace.push(format!("第 {} 行: 新增客户 {}", row.row_number, email));
                tx.last_insert_rowid()
            }
        };

        let address = address_attributes(row);
        if !address.is_empty() {
            tx.execute(
                "INSERT INTO customer_address (customer_id, attributes_json) VALUES (?1, ?2)",
                params![entity_id, serde_json::to_string(&address)?],
            )?;
            summary.addresses += 1;
            debug!(row_number = row.row_number, entity_id, "客户地址已写入");
        }
    }

    Ok(summary)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 非固定字段、非地址列 → attributes_json
fn extra_attributes(row: &NormalizedRow) -> BTreeMap<&str, &str> {
    row.values()
        .iter()
        .filter(|(k, _)| !ENTITY_COLUMNS.contains(&k.as_str()) && !k.starts_with(ADDRESS_PREFIX))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

/// `_address_*` 列去前缀后的非空值
fn address_attributes(row: &NormalizedRow) -> BTreeMap<&str, &str> {
    row.values()
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix(ADDRESS_PREFIX)
                .filter(|_| !v.trim().is_empty())
                .map(|field| (field, v.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::types::{EntityCode, ImportBehavior};
    use std::collections::HashMap;

    fn factory() -> (CustomerImportRepositoryImpl, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (CustomerImportRepositoryImpl::from_connection(Arc::clone(&conn)), conn)
    }

    fn customer(row_number: usize, pairs: &[(&str, &str)]) -> NormalizedRow {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NormalizedRow::new(row_number, values)
    }

    fn batch(rows: Vec<NormalizedRow>) -> ImportBatch {
        ImportBatch::new(EntityCode::CustomerComposite, ImportBehavior::Append, rows)
    }

    fn count(conn: &Arc<Mutex<Connection>>, table: &str) -> i64 {
        conn.lock()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_import_creates_customer_and_address() {
        let (factory, conn) = factory();
        let mut importer = factory.create().unwrap();

        importer
            .process_import(&batch(vec![customer(
                1,
                &[
                    ("email", "a@b.com"),
                    ("_website", "base"),
                    ("_store", "default"),
                    ("group_id", "1"),
                    ("firstname", "Ada"),
                    ("dob", "1990-01-01"),
                    ("_address_city", "London"),
                ],
            )]))
            .await
            .unwrap();

        assert_eq!(count(&conn, "customer_entity"), 1);
        assert_eq!(count(&conn, "customer_address"), 1);
        let attributes: String = conn
            .lock()
            .unwrap()
            .query_row("SELECT attributes_json FROM customer_entity", [], |r| r.get(0))
            .unwrap();
        assert_eq!(attributes, r#"{"dob":"1990-01-01"}"#);
        assert!(importer.error_messages().is_empty());
        assert!(importer.log_trace().iter().any(|l| l.contains("新增客户 a@b.com")));
    }

    #[tokio::test]
    async fn test_append_updates_without_delete() {
        let (factory, conn) = factory();
        let first = customer(1, &[("email", "a@b.com"), ("_website", "base"), ("_store", "default"), ("group_id", "1")]);
        let other = customer(2, &[("email", "c@d.com"), ("_website", "base"), ("_store", "default"), ("group_id", "1")]);
        factory.create().unwrap().process_import(&batch(vec![first, other])).await.unwrap();

        let changed = customer(1, &[("email", "a@b.com"), ("_website", "base"), ("_store", "default"), ("group_id", "2")]);
        let mut importer = factory.create().unwrap();
        importer.process_import(&batch(vec![changed])).await.unwrap();

        assert_eq!(count(&conn, "customer_entity"), 2);
        let group: String = conn
            .lock()
            .unwrap()
            .query_row(
                "SELECT group_id FROM customer_entity WHERE email = 'a@b.com'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(group, "2");
        assert!(importer.log_trace().iter().any(|l| l.contains("更新客户 a@b.com")));
    }

    #[tokio::test]
    async fn test_missing_email_reported_not_raised() {
        let (factory, conn) = factory();
        let mut importer = factory.create().unwrap();

        importer
            .process_import(&batch(vec![customer(
                1,
                &[("email", ""), ("_website", "base"), ("_store", "default")],
            )]))
            .await
            .unwrap();

        assert_eq!(count(&conn, "customer_entity"), 0);
        assert_eq!(importer.error_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_rolled_back_batch_reports_no_row_trace() {
        let (factory, conn) = factory();
        conn.lock()
            .unwrap()
            .execute_batch(
                r#"
                CREATE TRIGGER reject_customer BEFORE INSERT ON customer_entity
                WHEN NEW.email = 'bad@x.com'
                BEGIN
                    SELECT RAISE(ABORT, 'duplicate key');
                END;
                "#,
            )
            .unwrap();
        let mut importer = factory.create().unwrap();

        let result = importer
            .process_import(&batch(vec![
                customer(1, &[("email", "good@x.com"), ("_website", "base"), ("_store", "default")]),
                customer(2, &[("email", ""), ("_website", "base"), ("_store", "default")]),
                customer(3, &[("email", "bad@x.com"), ("_website", "base"), ("_store", "default")]),
            ]))
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate key"));
        assert_eq!(count(&conn, "customer_entity"), 0);

        let trace = importer.log_trace();
        assert!(!trace.iter().any(|l| l.contains("新增客户")));
        assert!(trace.iter().any(|l| l.contains("已回滚")));
        assert!(importer.error_messages().is_empty());
    }
}
