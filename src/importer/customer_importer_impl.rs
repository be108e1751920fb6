// ==========================================
// 客户批量导入管道 - 客户导入器实现
// ==========================================
// 职责: 整合导入流程，从原始行到外部导入子系统
// 流程: 表头解析 → 行规范化 → 批量提交(append) → 网格重建 → 日志汇总
// 状态机: Start → SchemaResolved → Normalized → Submitted → Reindexed | Failed
// 红线: 表头/客户组查询失败为致命错误；提交/重建失败只记录，不中断进程
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::customer::{Diagnostic, ImportBatch, RawRow, RunResult};
use crate::domain::types::{DiagnosticLevel, DiagnosticSource, FailureStage, RunState};
use crate::importer::customer_importer_trait::{
    BulkImporterFactory, CustomerGroupSource, CustomerImporter, FileParser, IndexTrigger,
};
use crate::importer::error::ImportResult;
use crate::importer::group_directory::GroupDirectory;
use crate::importer::header_resolver::HeaderResolver;
use crate::importer::row_normalizer::RowNormalizer;
use chrono::Utc;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CustomerImporterImpl - 客户导入器实现
// ==========================================
pub struct CustomerImporterImpl<C>
where
    C: ImportConfigReader,
{
    // 配置读取器
    config: C,

    // 外部协作方
    file_parser: Box<dyn FileParser>,
    group_source: Arc<dyn CustomerGroupSource>,
    importer_factory: Box<dyn BulkImporterFactory>,
    indexer: Box<dyn IndexTrigger>,
}

impl<C> CustomerImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// 创建新的 CustomerImporter 实例
    ///
    /// # 参数
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - group_source: 客户组目录
    /// - importer_factory: 批量导入引擎工厂
    /// - indexer: 索引重建触发器
    pub fn new(
        config: C,
        file_parser: Box<dyn FileParser>,
        group_source: Arc<dyn CustomerGroupSource>,
        importer_factory: Box<dyn BulkImporterFactory>,
        indexer: Box<dyn IndexTrigger>,
    ) -> Self {
        Self {
            config,
            file_parser,
            group_source,
            importer_factory,
            indexer,
        }
    }
}

#[async_trait::async_trait]
impl<C> CustomerImporter for CustomerImporterImpl<C>
where
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, raw_rows), fields(run_id))]
    async fn run(&self, raw_rows: Vec<RawRow>) -> ImportResult<RunResult> {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(run_id = %run_id, rows = raw_rows.len(), "开始导入客户数据");

        let settings = ImportSettings::load(&self.config).await?;
        let mut state = RunState::Start;

        // === 步骤 1: 表头解析 ===
        debug!("步骤 1: 表头解析");
        let schema = HeaderResolver::new(settings.required_columns.clone())
            .resolve(&raw_rows)
            .map_err(|e| {
                error!(error = %e, "表头校验失败，导入中止");
                e
            })?;
        advance(&mut state, RunState::SchemaResolved);

        // === 步骤 2: 行规范化 ===
        // 先填充客户组缓存，之后各行并发规范化只读共享缓存
        debug!("步骤 2: 行规范化");
        let directory = GroupDirectory::new(Arc::clone(&self.group_source));
        if schema.contains(&settings.group_column) {
            directory.warm_up().await.map_err(|e| {
                error!(error = %e, "客户组目录加载失败，导入中止");
                e
            })?;
        }

        let normalizer = RowNormalizer::new(settings.group_column.clone());
        let tasks = raw_rows
            .iter()
            .skip(1)
            .enumerate()
            .map(|(idx, row)| normalizer.normalize(idx + 1, row, &schema, &directory));
        // join_all 按输入顺序返回，诊断顺序与行号一致
        let results = join_all(tasks).await;

        let mut rows = Vec::with_capacity(results.len());
        let mut diagnostics = Vec::new();
        for result in results {
            let (row, row_diagnostics) = result?;
            rows.push(row);
            diagnostics.extend(row_diagnostics);
        }
        let total_rows = rows.len();
        let substitutions = diagnostics.iter().filter(|d| d.is_substitution()).count();
        info!(rows = total_rows, substitutions, "行规范化完成");
        advance(&mut state, RunState::Normalized);

        // === 步骤 3-5: 提交、重建、导入器日志 ===
        let batch = ImportBatch::new(settings.entity_code, settings.behavior, rows);
        self.submit_and_reindex(&batch, &settings.grid_index_id, &mut state, &mut diagnostics)
            .await;

        report_diagnostics(&diagnostics);

        let elapsed_time = start_time.elapsed();
        info!(
            run_id = %run_id,
            total = total_rows,
            substitutions,
            state = %state,
            elapsed_ms = elapsed_time.as_millis(),
            "客户数据导入结束"
        );

        Ok(RunResult {
            run_id,
            started_at,
            finished_at: Utc::now(),
            elapsed_ms: elapsed_time.as_millis(),
            total_rows,
            substitutions,
            state,
            diagnostics,
        })
    }

    async fn import_file(&self, file_path: &Path) -> ImportResult<RunResult> {
        info!(file_path = %file_path.display(), "读取导入文件");
        let raw_rows = self.file_parser.parse_to_rows(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        self.run(raw_rows).await
    }
}

// 辅助方法
impl<C> CustomerImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// 提交批次，成功后重建网格索引，最后汇总导入器日志
    ///
    /// 导入器创建失败时不读取其日志
    async fn submit_and_reindex(
        &self,
        batch: &ImportBatch,
        index_id: &str,
        state: &mut RunState,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        debug!("步骤 3: 批量提交");
        let mut importer = match self.importer_factory.create() {
            Ok(importer) => importer,
            Err(e) => {
                diagnostics.push(Diagnostic::error(DiagnosticSource::Submission, e.to_string()));
                advance(state, RunState::Failed(FailureStage::Submission));
                return;
            }
        };

        match importer.process_import(batch).await {
            Ok(()) => {
                info!(
                    rows = batch.len(),
                    entity = %batch.entity_code,
                    behavior = %batch.behavior,
                    "批量提交完成"
                );
                advance(state, RunState::Submitted);

                debug!("步骤 4: 重建客户网格索引");
                diagnostics.push(Diagnostic::info(
                    DiagnosticSource::Reindex,
                    format!("正在重建客户网格索引: {}", index_id),
                ));
                match self.indexer.reindex_all(index_id).await {
                    Ok(()) => advance(state, RunState::Reindexed),
                    Err(e) => {
                        diagnostics.push(Diagnostic::error(DiagnosticSource::Reindex, e.to_string()));
                        advance(state, RunState::Failed(FailureStage::Reindex));
                    }
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(DiagnosticSource::Submission, e.to_string()));
                advance(state, RunState::Failed(FailureStage::Submission));
            }
        }

        // === 步骤 5: 导入器日志 ===
        debug!("步骤 5: 汇总导入器日志");
        for line in importer.log_trace() {
            diagnostics.push(Diagnostic::info(DiagnosticSource::ImporterTrace, line));
        }
        for message in importer.error_messages() {
            diagnostics.push(Diagnostic::error(DiagnosticSource::ImporterError, message));
        }
    }
}

/// 推进运行状态
fn advance(state: &mut RunState, next: RunState) {
    if !state.can_transition_to(next) {
        warn!(from = %state, to = %next, "非预期的状态转换");
    }
    debug!(from = %state, to = %next, "运行状态变更");
    *state = next;
}

/// 通过日志系统输出全部诊断（每条诊断一行）
fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.level {
            DiagnosticLevel::Error => error!("{}", diagnostic),
            DiagnosticLevel::Info | DiagnosticLevel::Substitution => info!("{}", diagnostic),
        }
    }
}
