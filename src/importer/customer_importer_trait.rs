// ==========================================
// 客户批量导入管道 - 导入接口 Trait
// ==========================================
// 职责: 定义导入核心与外部协作方之间的接口（不包含实现）
// 外部协作方: 文件读取 / 客户组目录 / 批量导入引擎 / 索引重建
// 约定: 所有外部调用均为单次阻塞调用，核心内部不做超时与重试
// ==========================================

use crate::domain::customer::{ImportBatch, RawRow, RunResult};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;

// ==========================================
// CustomerImporter Trait
// ==========================================
// 用途: 客户导入主接口
// 实现者: CustomerImporterImpl
#[async_trait]
pub trait CustomerImporter: Send + Sync {
    /// 对已读取的行集执行完整导入管道
    ///
    /// # 参数
    /// - raw_rows: 全部行，第 0 行为表头
    ///
    /// # 返回
    /// - Ok(RunResult): 运行完成（成功或提交/重建失败）
    /// - Err: 致命错误（表头结构错误、客户组查询失败、配置错误）
    async fn run(&self, raw_rows: Vec<RawRow>) -> ImportResult<RunResult>;

    /// 读取文件后执行导入管道
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv/.xlsx/.xls）
    async fn import_file(&self, file_path: &Path) -> ImportResult<RunResult>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 表格文件读取（保留表头行作为第 0 行）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    fn parse_to_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// CustomerGroupSource Trait
// ==========================================
// 用途: 权威客户组目录（只读查询）
// 实现者: CustomerGroupRepositoryImpl
#[async_trait]
pub trait CustomerGroupSource: Send + Sync {
    /// 获取全部有效客户组 ID
    async fn list_groups(&self) -> ImportResult<HashSet<String>>;

    /// 获取系统默认客户组 ID
    async fn get_default_group(&self) -> ImportResult<String>;
}

// ==========================================
// BulkImporter Trait
// ==========================================
// 用途: 外部批量导入引擎（单个实例只服务一次提交）
// 实现者: SqliteBulkImporter
#[async_trait]
pub trait BulkImporter: Send {
    /// 提交整个批次
    ///
    /// # 返回
    /// - Ok(()): 提交成功
    /// - Err: 导入引擎内部失败
    async fn process_import(&mut self, batch: &ImportBatch) -> ImportResult<()>;

    /// 导入引擎的跟踪日志
    fn log_trace(&self) -> Vec<String>;

    /// 导入引擎的错误消息
    fn error_messages(&self) -> Vec<String>;
}

// ==========================================
// BulkImporterFactory Trait
// ==========================================
// 用途: 每次运行创建新的导入引擎实例
// 实现者: CustomerImportRepositoryImpl
pub trait BulkImporterFactory: Send + Sync {
    fn create(&self) -> ImportResult<Box<dyn BulkImporter>>;
}

// ==========================================
// IndexTrigger Trait
// ==========================================
// 用途: 派生索引重建（同步调用，不消费返回内容）
// 实现者: CustomerGridIndexerImpl
#[async_trait]
pub trait IndexTrigger: Send + Sync {
    async fn reindex_all(&self, index_id: &str) -> ImportResult<()>;
}
