// ==========================================
// 客户批量导入管道 - 命令行入口
// ==========================================
// 用法: customer-import --file customers.csv [--db path] [--json-log]
// 退出码: 0 成功；1 运行失败（提交或重建失败）；2 致命错误
// ==========================================

use anyhow::Context;
use clap::Parser;
use customer_import::config::ConfigManager;
use customer_import::importer::{CustomerImporter, CustomerImporterImpl, UniversalFileParser};
use customer_import::repository::{
    CustomerGridIndexerImpl, CustomerGroupRepositoryImpl, CustomerImportRepositoryImpl,
};
use customer_import::{db, logging};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "customer-import", version, about = "导入客户及地址数据")]
struct Cli {
    /// 导入文件（.csv/.xlsx/.xls）
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite 数据库路径（默认读取 CUSTOMER_IMPORT_DB_PATH 或用户数据目录）
    #[arg(long)]
    db: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long)]
    json_log: bool,
}

/// 默认数据库路径
fn default_db_path() -> String {
    if let Ok(path) = std::env::var("CUSTOMER_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./customer_import.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("customer-import");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("customer_import.db");
        }
    }
    path.to_string_lossy().to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_with_format(cli.json_log);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "导入中止");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let db_path = cli.db.unwrap_or_else(default_db_path);
    tracing::info!("{} v{}", customer_import::APP_NAME, customer_import::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let conn = db::open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    db::ensure_schema(&conn).context("数据库 schema 初始化失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let importer = CustomerImporterImpl::new(
        ConfigManager::from_connection(Arc::clone(&conn)),
        Box::new(UniversalFileParser),
        Arc::new(CustomerGroupRepositoryImpl::from_connection(Arc::clone(&conn))),
        Box::new(CustomerImportRepositoryImpl::from_connection(Arc::clone(&conn))),
        Box::new(CustomerGridIndexerImpl::from_connection(Arc::clone(&conn))),
    );

    let result = importer.import_file(&cli.file).await?;

    println!(
        "运行 {}: 状态 {}，行数 {}，客户组替换 {}，错误 {}，耗时 {}ms",
        result.run_id,
        result.state,
        result.total_rows,
        result.substitutions,
        result.errors().count(),
        result.elapsed_ms
    );
    Ok(result.is_success())
}
