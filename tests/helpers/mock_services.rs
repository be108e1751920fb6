// ==========================================
// Mock 外部协作方 - 用于集成测试
// ==========================================
// 客户组目录 / 批量导入引擎 / 索引重建，全部带调用计数
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use customer_import::domain::ImportBatch;
use customer_import::importer::{
    BulkImporter, BulkImporterFactory, CustomerGroupSource, IndexTrigger,
};
use customer_import::{ImportError, ImportResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ==========================================
// MockGroupSource
// ==========================================
pub struct MockGroupSource {
    groups: HashSet<String>,
    default_group: String,
    fail: bool,
    pub list_calls: AtomicUsize,
    pub default_calls: AtomicUsize,
}

impl MockGroupSource {
    pub fn new(groups: &[&str], default_group: &str) -> Arc<Self> {
        Arc::new(Self {
            groups: groups.iter().map(|g| g.to_string()).collect(),
            default_group: default_group.to_string(),
            fail: false,
            list_calls: AtomicUsize::new(0),
            default_calls: AtomicUsize::new(0),
        })
    }

    /// 客户组 {1,2,3}，默认 1
    pub fn standard() -> Arc<Self> {
        Self::new(&["1", "2", "3"], "1")
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            groups: HashSet::new(),
            default_group: String::new(),
            fail: true,
            list_calls: AtomicUsize::new(0),
            default_calls: AtomicUsize::new(0),
        })
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn default_calls(&self) -> usize {
        self.default_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CustomerGroupSource for MockGroupSource {
    async fn list_groups(&self) -> ImportResult<HashSet<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ImportError::GroupResolution("客户组服务不可用".to_string()));
        }
        Ok(self.groups.clone())
    }

    async fn get_default_group(&self) -> ImportResult<String> {
        self.default_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ImportError::GroupResolution("客户组服务不可用".to_string()));
        }
        Ok(self.default_group.clone())
    }
}

// ==========================================
// MockImporterFactory
// ==========================================
#[derive(Clone, Default)]
pub struct MockImporterFactory {
    pub submitted: Arc<Mutex<Vec<ImportBatch>>>,
    failure: Option<String>,
    trace: Vec<String>,
    errors: Vec<String>,
}

impl MockImporterFactory {
    pub fn new() -> Self {
        Self {
            trace: vec!["导入引擎: 已接收批次".to_string()],
            ..Self::default()
        }
    }

    /// 提交时抛出指定错误
    pub fn failing_with(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// 导入引擎附带的错误消息
    pub fn with_error_messages(mut self, errors: &[&str]) -> Self {
        self.errors = errors.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn submission_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn last_batch(&self) -> Option<ImportBatch> {
        self.submitted.lock().unwrap().last().cloned()
    }
}

struct MockImporter {
    submitted: Arc<Mutex<Vec<ImportBatch>>>,
    failure: Option<String>,
    trace: Vec<String>,
    errors: Vec<String>,
}

impl BulkImporterFactory for MockImporterFactory {
    fn create(&self) -> ImportResult<Box<dyn BulkImporter>> {
        Ok(Box::new(MockImporter {
            submitted: Arc::clone(&self.submitted),
            failure: self.failure.clone(),
            trace: self.trace.clone(),
            errors: self.errors.clone(),
        }))
    }
}

#[async_trait]
impl BulkImporter for MockImporter {
    async fn process_import(&mut self, batch: &ImportBatch) -> ImportResult<()> {
        if let Some(message) = &self.failure {
            return Err(ImportError::Submission(message.clone()));
        }
        self.submitted.lock().unwrap().push(batch.clone());
        Ok(())
    }

    fn log_trace(&self) -> Vec<String> {
        self.trace.clone()
    }

    fn error_messages(&self) -> Vec<String> {
        self.errors.clone()
    }
}

// ==========================================
// MockIndexer
// ==========================================
#[derive(Clone, Default)]
pub struct MockIndexer {
    pub calls: Arc<AtomicUsize>,
    pub index_ids: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
}

impl MockIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexTrigger for MockIndexer {
    async fn reindex_all(&self, index_id: &str) -> ImportResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.index_ids.lock().unwrap().push(index_id.to_string());
        match &self.failure {
            Some(message) => Err(ImportError::Reindex(message.clone())),
            None => Ok(()),
        }
    }
}
