//! Short code registry
//!
//! Allocates unique short codes and validates caller-supplied ones.
//! Random draws are bounded: after `max_attempts` collisions at one length
//! the length grows by one, up to `length + max_extra_length`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::get_config;
use crate::errors::{Result, ShepherdError};
use crate::storage::SeaOrmStorage;
use crate::utils::{MAX_CUSTOM_CODE_LEN, MIN_CUSTOM_CODE_LEN, generate_random_code, is_valid_custom_code};

/// 短码占用查询
#[async_trait]
pub trait CodeIndex: Send + Sync {
    /// 任意状态的链接持有该短码即返回 true
    async fn code_exists(&self, code: &str) -> Result<bool>;
}

#[async_trait]
impl CodeIndex for SeaOrmStorage {
    async fn code_exists(&self, code: &str) -> Result<bool> {
        SeaOrmStorage::code_exists(self, code).await
    }
}

/// 生成策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    pub length: usize,
    pub max_attempts: u32,
    pub max_extra_length: usize,
}

impl CodePolicy {
    pub fn from_config() -> Self {
        let links = &get_config().links;
        Self {
            length: links.code_length.max(1),
            max_attempts: links.max_code_attempts.max(1),
            max_extra_length: links.max_extra_length,
        }
    }
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            length: 6,
            max_attempts: 8,
            max_extra_length: 4,
        }
    }
}

/// 分配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedCode {
    pub code: String,
    /// 是否随机生成（false 表示用户指定）
    pub generated: bool,
}

pub struct CodeRegistry {
    index: Arc<dyn CodeIndex>,
    policy: CodePolicy,
}

impl CodeRegistry {
    pub fn new(index: Arc<dyn CodeIndex>, policy: CodePolicy) -> Self {
        Self { index, policy }
    }

    pub fn policy(&self) -> CodePolicy {
        self.policy
    }

    /// 分配短码
    ///
    /// - 指定短码：格式不合法返回 Validation，已被占用返回 Conflict
    /// - 未指定：随机生成，冲突时重抽，超过上限后加长
    pub async fn allocate(&self, requested: Option<&str>) -> Result<AllocatedCode> {
        match requested.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => self.claim(code).await,
            None => self.generate().await,
        }
    }

    async fn claim(&self, code: &str) -> Result<AllocatedCode> {
        if !is_valid_custom_code(code) {
            return Err(ShepherdError::validation(format!(
                "Invalid short code '{}': use {}-{} letters, digits or hyphens",
                code, MIN_CUSTOM_CODE_LEN, MAX_CUSTOM_CODE_LEN
            )));
        }

        if self.index.code_exists(code).await? {
            return Err(ShepherdError::conflict(format!(
                "Short code '{}' is already taken",
                code
            )));
        }

        Ok(AllocatedCode {
            code: code.to_string(),
            generated: false,
        })
    }

    async fn generate(&self) -> Result<AllocatedCode> {
        let CodePolicy {
            length,
            max_attempts,
            max_extra_length,
        } = self.policy;

        for len in length..=length + max_extra_length {
            for _ in 0..max_attempts {
                let candidate = generate_random_code(len);
                if !self.index.code_exists(&candidate).await? {
                    debug!("Generated short code {} (length {})", candidate, len);
                    return Ok(AllocatedCode {
                        code: candidate,
                        generated: true,
                    });
                }
            }
            warn!(
                "{} collisions at code length {}, growing length",
                max_attempts, len
            );
        }

        Err(ShepherdError::internal(format!(
            "Short code space exhausted after {} attempts up to length {}",
            max_attempts as usize * (max_extra_length + 1),
            length + max_extra_length
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 内存索引：taken 中的短码以及长度小于 min_free_len 的短码都视为已占用
    struct MemoryIndex {
        taken: Mutex<HashSet<String>>,
        min_free_len: usize,
        lookups: AtomicUsize,
    }

    impl MemoryIndex {
        fn new(taken: &[&str]) -> Self {
            Self {
                taken: Mutex::new(taken.iter().map(|s| s.to_string()).collect()),
                min_free_len: 0,
                lookups: AtomicUsize::new(0),
            }
        }

        fn saturated_below(len: usize) -> Self {
            Self {
                min_free_len: len,
                ..Self::new(&[])
            }
        }
    }

    #[async_trait]
    impl CodeIndex for MemoryIndex {
        async fn code_exists(&self, code: &str) -> Result<bool> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(code.len() < self.min_free_len || self.taken.lock().unwrap().contains(code))
        }
    }

    fn registry(index: Arc<MemoryIndex>, policy: CodePolicy) -> CodeRegistry {
        CodeRegistry::new(index, policy)
    }

    #[tokio::test]
    async fn test_generated_code_uses_alphabet_and_length() {
        let reg = registry(Arc::new(MemoryIndex::new(&[])), CodePolicy::default());
        let allocated = reg.allocate(None).await.unwrap();

        assert!(allocated.generated);
        assert_eq!(allocated.code.len(), 6);
        assert!(allocated.code.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_blank_request_is_treated_as_absent() {
        let reg = registry(Arc::new(MemoryIndex::new(&[])), CodePolicy::default());
        assert!(reg.allocate(Some("   ")).await.unwrap().generated);
    }

    #[tokio::test]
    async fn test_custom_code_accepted() {
        let reg = registry(Arc::new(MemoryIndex::new(&[])), CodePolicy::default());
        let allocated = reg.allocate(Some("my-code")).await.unwrap();
        assert_eq!(
            allocated,
            AllocatedCode {
                code: "my-code".to_string(),
                generated: false
            }
        );
    }

    #[tokio::test]
    async fn test_custom_code_invalid() {
        let reg = registry(Arc::new(MemoryIndex::new(&[])), CodePolicy::default());

        let too_long = "x".repeat(51);
        for bad in ["ab", "has space", "under_score", "slash/es", too_long.as_str()] {
            let err = reg.allocate(Some(bad)).await.unwrap_err();
            assert!(
                matches!(err, ShepherdError::Validation(_)),
                "{} should be invalid",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_custom_code_taken() {
        let reg = registry(Arc::new(MemoryIndex::new(&["my-code"])), CodePolicy::default());
        let err = reg.allocate(Some("my-code")).await.unwrap_err();
        assert!(matches!(err, ShepherdError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_collisions_escalate_length() {
        let index = Arc::new(MemoryIndex::saturated_below(7));
        let reg = registry(
            index.clone(),
            CodePolicy {
                length: 4,
                max_attempts: 3,
                max_extra_length: 4,
            },
        );

        let allocated = reg.allocate(None).await.unwrap();
        assert_eq!(allocated.code.len(), 7);
        // 长度 4、5、6 各 3 次失败，长度 7 第一次成功
        assert_eq!(index.lookups.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_exhaustion_is_bounded() {
        let index = Arc::new(MemoryIndex::saturated_below(usize::MAX));
        let reg = registry(
            index.clone(),
            CodePolicy {
                length: 2,
                max_attempts: 5,
                max_extra_length: 2,
            },
        );

        let err = reg.allocate(None).await.unwrap_err();
        assert!(matches!(err, ShepherdError::Internal(_)));
        assert_eq!(index.lookups.load(Ordering::SeqCst), 15);
    }
}
