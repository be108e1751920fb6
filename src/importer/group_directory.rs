// ==========================================
// 客户批量导入管道 - 客户组目录缓存
// ==========================================
// 职责: 校验客户组引用、提供默认客户组
// 缓存: 有效客户组集合与默认客户组各自在单次运行内只拉取一次
// 红线: 拉取失败直接向上传播（无客户组数据则无法可靠校验）
// ==========================================

use crate::importer::customer_importer_trait::CustomerGroupSource;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub struct GroupDirectory {
    source: Arc<dyn CustomerGroupSource>,
    groups: OnceCell<HashSet<String>>,
    default_group: OnceCell<String>,
}

impl GroupDirectory {
    /// 每次运行构造一个新实例
    pub fn new(source: Arc<dyn CustomerGroupSource>) -> Self {
        Self {
            source,
            groups: OnceCell::new(),
            default_group: OnceCell::new(),
        }
    }

    /// 判断客户组引用是否有效
    ///
    /// # 规则
    /// - 空引用一律无效（不触发外部查询）
    /// - 否则按 ID 精确匹配已缓存的客户组集合
    pub async fn is_valid_group(&self, reference: &str) -> ImportResult<bool> {
        if reference.is_empty() {
            return Ok(false);
        }
        let groups = self.groups().await?;
        Ok(groups.contains(reference))
    }

    /// 获取默认客户组 ID（首次调用时拉取并缓存）
    pub async fn default_group_id(&self) -> ImportResult<&str> {
        let id = self
            .default_group
            .get_or_try_init(|| async {
                let id = self.source.get_default_group().await?;
                info!(default_group = %id, "默认客户组已加载");
                Ok::<_, ImportError>(id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// 预先填充两个缓存，之后所有查询只读
    pub async fn warm_up(&self) -> ImportResult<()> {
        self.groups().await?;
        self.default_group_id().await?;
        Ok(())
    }

    async fn groups(&self) -> ImportResult<&HashSet<String>> {
        self.groups
            .get_or_try_init(|| async {
                let groups = self.source.list_groups().await?;
                debug!(count = groups.len(), "客户组列表已加载");
                Ok::<_, ImportError>(groups)
            })
            .await
    }
}
