//! LinkService tests
//!
//! Owner-scoped CRUD, code allocation and admin operations against a real
//! SQLite database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use chrono::Utc;
use linkshepherd::config::init_config;
use linkshepherd::errors::{Result as ShepherdResult, ShepherdError};
use linkshepherd::services::{
    CodeIndex, CodePolicy, CodeRegistry, CreateLinkRequest, LinkService, UpdateLinkRequest,
};
use linkshepherd::storage::{LinkState, RedirectMode, SeaOrmStorage, ShortLink};
use linkshepherd::utils::CODE_ALPHABET;
use tempfile::TempDir;

// =============================================================================
// Test Setup
// =============================================================================

static INIT: Once = Once::new();

fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_test_service() -> (LinkService, Arc<SeaOrmStorage>, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("links_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    let index: Arc<dyn CodeIndex> = storage.clone();
    let registry = Arc::new(CodeRegistry::new(index, CodePolicy::default()));

    (
        LinkService::new(storage.clone(), registry),
        storage,
        temp_dir,
    )
}

/// 前 `blind_lookups` 次查询一律回答“未占用”，之后才查库
///
/// 模拟另一个请求在检查与插入之间抢先写入同一短码。
struct LaggingIndex {
    storage: Arc<SeaOrmStorage>,
    blind_lookups: usize,
    lookups: AtomicUsize,
}

impl LaggingIndex {
    fn new(storage: Arc<SeaOrmStorage>, blind_lookups: usize) -> Self {
        Self {
            storage,
            blind_lookups,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CodeIndex for LaggingIndex {
    async fn code_exists(&self, code: &str) -> ShepherdResult<bool> {
        if self.lookups.fetch_add(1, Ordering::SeqCst) < self.blind_lookups {
            return Ok(false);
        }
        self.storage.code_exists(code).await
    }
}

fn service_with_index(
    storage: Arc<SeaOrmStorage>,
    index: Arc<LaggingIndex>,
    policy: CodePolicy,
) -> LinkService {
    let index: Arc<dyn CodeIndex> = index;
    LinkService::new(storage, Arc::new(CodeRegistry::new(index, policy)))
}

/// 绕过分配器直接写入一条占位链接
async fn seed_code(storage: &SeaOrmStorage, code: &str) {
    let link = ShortLink {
        id: uuid::Uuid::new_v4().to_string(),
        code: code.to_string(),
        destination: "https://seed.example.com".to_string(),
        title: None,
        mode: RedirectMode::Immediate,
        owner: Some("seeder".to_string()),
        click_count: 0,
        state: LinkState::Active,
        created_at: Utc::now(),
    };
    storage.insert_link(&link).await.unwrap();
}

fn single_char_codes() -> Vec<String> {
    CODE_ALPHABET.iter().map(|&b| (b as char).to_string()).collect()
}

fn create_request(destination: &str, code: Option<&str>) -> CreateLinkRequest {
    CreateLinkRequest {
        destination: destination.to_string(),
        title: None,
        code: code.map(str::to_string),
        mode: None,
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_with_generated_code() {
    let (service, _, _dir) = create_test_service().await;

    let result = service
        .create(Some("owner-a"), create_request("example.com/docs", None))
        .await
        .unwrap();

    assert!(result.generated_code);
    assert_eq!(result.link.code.len(), 6);
    assert!(result.link.code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(result.link.destination, "http://example.com/docs");
    assert_eq!(result.link.mode, RedirectMode::Immediate);
    assert_eq!(result.link.state, LinkState::Active);
    assert_eq!(result.link.click_count, 0);
    assert_eq!(result.link.owner.as_deref(), Some("owner-a"));
}

#[tokio::test]
async fn test_create_with_custom_code_and_mode() {
    let (service, _, _dir) = create_test_service().await;

    let result = service
        .create(
            Some("owner-a"),
            CreateLinkRequest {
                destination: "https://example.com".to_string(),
                title: Some("  Docs  ".to_string()),
                code: Some("my-code".to_string()),
                mode: Some(RedirectMode::Timed),
            },
        )
        .await
        .unwrap();

    assert!(!result.generated_code);
    assert_eq!(result.link.code, "my-code");
    assert_eq!(result.link.title.as_deref(), Some("Docs"));
    assert_eq!(result.link.mode, RedirectMode::Timed);
}

#[tokio::test]
async fn test_create_rejects_invalid_code() {
    let (service, _, _dir) = create_test_service().await;

    for bad in ["ab", "has space", "emoji😀"] {
        let err = service
            .create(Some("owner-a"), create_request("https://example.com", Some(bad)))
            .await
            .unwrap_err();
        assert!(matches!(err, ShepherdError::Validation(_)), "code {:?}", bad);
    }
}

#[tokio::test]
async fn test_create_rejects_dangerous_destination() {
    let (service, _, _dir) = create_test_service().await;

    let err = service
        .create(Some("owner-a"), create_request("javascript:alert(1)", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShepherdError::Validation(_)));

    let err = service
        .create(Some("owner-a"), create_request("   ", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShepherdError::Validation(_)));
}

#[tokio::test]
async fn test_duplicate_code_conflicts_even_when_removed() {
    let (service, _, _dir) = create_test_service().await;

    let first = service
        .create(Some("owner-a"), create_request("https://a.example.com", Some("my-code")))
        .await
        .unwrap();

    let err = service
        .create(Some("owner-b"), create_request("https://b.example.com", Some("my-code")))
        .await
        .unwrap_err();
    assert!(matches!(err, ShepherdError::Conflict(_)));

    service.remove("owner-a", &first.link.id).await.unwrap();

    let err = service
        .create(Some("owner-b"), create_request("https://b.example.com", Some("my-code")))
        .await
        .unwrap_err();
    assert!(matches!(err, ShepherdError::Conflict(_)));
}

#[tokio::test]
async fn test_preview_code_is_unused() {
    let (service, storage, _dir) = create_test_service().await;

    let code = service.preview_code().await.unwrap();
    assert_eq!(code.len(), 6);
    assert!(!storage.code_exists(&code).await.unwrap());
}

// =============================================================================
// Read / Update / Remove
// =============================================================================

#[tokio::test]
async fn test_get_by_code_hides_removed() {
    let (service, _, _dir) = create_test_service().await;

    let created = service
        .create(Some("owner-a"), create_request("https://example.com", Some("hide-me")))
        .await
        .unwrap();
    assert_eq!(service.get_by_code("hide-me").await.unwrap().id, created.link.id);

    service.remove("owner-a", &created.link.id).await.unwrap();
    assert!(matches!(
        service.get_by_code("hide-me").await,
        Err(ShepherdError::NotFound(_))
    ));
    assert!(matches!(
        service.get_by_code("never-existed").await,
        Err(ShepherdError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_for_owner_newest_first_without_removed() {
    let (service, _, _dir) = create_test_service().await;

    let first = service
        .create(Some("owner-a"), create_request("https://one.example.com", None))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = service
        .create(Some("owner-a"), create_request("https://two.example.com", None))
        .await
        .unwrap();
    service
        .create(Some("owner-b"), create_request("https://other.example.com", None))
        .await
        .unwrap();

    let links = service.list_for_owner("owner-a").await.unwrap();
    let ids: Vec<&str> = links.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec![second.link.id.as_str(), first.link.id.as_str()]);

    service.remove("owner-a", &second.link.id).await.unwrap();
    let links = service.list_for_owner("owner-a").await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].id, first.link.id);
}

#[tokio::test]
async fn test_update_partial_fields() {
    let (service, _, _dir) = create_test_service().await;

    let created = service
        .create(Some("owner-a"), create_request("https://example.com", None))
        .await
        .unwrap();

    let updated = service
        .update(
            "owner-a",
            &created.link.id,
            UpdateLinkRequest {
                title: Some("New title".to_string()),
                mode: Some(RedirectMode::Advertisement),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title.as_deref(), Some("New title"));
    assert_eq!(updated.mode, RedirectMode::Advertisement);
    assert_eq!(updated.destination, "https://example.com");
    assert_eq!(updated.code, created.link.code);

    let reloaded = service.get_by_code(&created.link.code).await.unwrap();
    assert_eq!(reloaded.mode, RedirectMode::Advertisement);
    assert_eq!(reloaded.title.as_deref(), Some("New title"));
}

#[tokio::test]
async fn test_other_owner_cannot_touch_link() {
    let (service, _, _dir) = create_test_service().await;

    let created = service
        .create(Some("owner-a"), create_request("https://example.com", None))
        .await
        .unwrap();

    let err = service
        .update(
            "owner-b",
            &created.link.id,
            UpdateLinkRequest {
                title: Some("hijack".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShepherdError::NotFound(_)));

    let err = service.remove("owner-b", &created.link.id).await.unwrap_err();
    assert!(matches!(err, ShepherdError::NotFound(_)));
}

#[tokio::test]
async fn test_owner_cannot_block_but_admin_can() {
    let (service, _, _dir) = create_test_service().await;

    let created = service
        .create(Some("owner-a"), create_request("https://example.com", None))
        .await
        .unwrap();

    let err = service
        .update(
            "owner-a",
            &created.link.id,
            UpdateLinkRequest {
                state: Some(LinkState::Blocked),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShepherdError::Forbidden(_)));

    let blocked = service
        .set_state(&created.link.id, LinkState::Blocked)
        .await
        .unwrap();
    assert_eq!(blocked.state, LinkState::Blocked);

    // 被封禁后 owner 不能再修改或删除
    let err = service
        .update(
            "owner-a",
            &created.link.id,
            UpdateLinkRequest {
                state: Some(LinkState::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShepherdError::Forbidden(_)));
    assert!(matches!(
        service.remove("owner-a", &created.link.id).await,
        Err(ShepherdError::Forbidden(_))
    ));
}

// =============================================================================
// Clicks & admin
// =============================================================================

#[tokio::test]
async fn test_increment_click_accumulates() {
    let (service, _, _dir) = create_test_service().await;

    let created = service
        .create(Some("owner-a"), create_request("https://example.com", None))
        .await
        .unwrap();

    for _ in 0..3 {
        service.increment_click(&created.link.id).await.unwrap();
    }
    let link = service.get_by_code(&created.link.code).await.unwrap();
    assert_eq!(link.click_count, 3);

    assert!(matches!(
        service.increment_click("missing-id").await,
        Err(ShepherdError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_admin_list_and_stats() {
    let (service, _, _dir) = create_test_service().await;

    let a = service
        .create(Some("owner-a"), create_request("https://a.example.com", None))
        .await
        .unwrap();
    let b = service
        .create(None, create_request("https://b.example.com", None))
        .await
        .unwrap();
    let c = service
        .create(Some("owner-b"), create_request("https://c.example.com", None))
        .await
        .unwrap();

    service.increment_click(&a.link.id).await.unwrap();
    service.increment_click(&a.link.id).await.unwrap();
    service.increment_click(&b.link.id).await.unwrap();
    service
        .set_state(&b.link.id, LinkState::Inactive)
        .await
        .unwrap();
    service.remove("owner-b", &c.link.id).await.unwrap();

    let all = service.list_all(None).await.unwrap();
    assert_eq!(all.len(), 3);

    let inactive = service.list_all(Some(LinkState::Inactive)).await.unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, b.link.id);
    assert!(inactive[0].owner.is_none());

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_links, 2);
    assert_eq!(stats.active_links, 1);
    assert_eq!(stats.total_clicks, 3);
}

// =============================================================================
// Store-enforced uniqueness
// =============================================================================

#[tokio::test]
async fn test_requested_code_lost_race_is_conflict() {
    let (_, storage, _dir) = create_test_service().await;
    let index = Arc::new(LaggingIndex::new(storage.clone(), usize::MAX));
    let service = service_with_index(storage.clone(), index, CodePolicy::default());

    let first = service
        .create(Some("owner-a"), create_request("https://a.example.com", Some("race-me")))
        .await
        .unwrap();

    // 索引看不到第一条，唯一约束兜底
    let second = service
        .create(Some("owner-b"), create_request("https://b.example.com", Some("race-me")))
        .await;
    assert!(matches!(second, Err(ShepherdError::Conflict(_))));

    let stored = storage.find_link_by_code("race-me").await.unwrap().unwrap();
    assert_eq!(stored.id, first.link.id);
    assert_eq!(stored.owner.as_deref(), Some("owner-a"));
}

#[tokio::test]
async fn test_generated_code_reallocation_is_bounded() {
    let (_, storage, _dir) = create_test_service().await;
    for code in single_char_codes() {
        seed_code(&storage, &code).await;
    }

    let index = Arc::new(LaggingIndex::new(storage.clone(), usize::MAX));
    let policy = CodePolicy {
        length: 1,
        max_attempts: 1,
        max_extra_length: 0,
    };
    let service = service_with_index(storage.clone(), index.clone(), policy);

    let result = service
        .create(Some("owner-a"), create_request("https://a.example.com", None))
        .await;
    assert!(matches!(result, Err(ShepherdError::Conflict(_))));

    // 每次分配查一次索引，共尝试 3 次后放弃
    assert_eq!(index.lookups.load(Ordering::SeqCst), 3);
    assert_eq!(storage.count_links().await.unwrap(), CODE_ALPHABET.len() as u64);
}

#[tokio::test]
async fn test_generated_code_reallocated_after_lost_race() {
    let (_, storage, _dir) = create_test_service().await;
    let mut codes = single_char_codes();
    let free = codes.pop().unwrap();
    for code in &codes {
        seed_code(&storage, code).await;
    }

    // 第一次分配拿到的短码可能已被占用，之后的分配看得到真实数据
    let index = Arc::new(LaggingIndex::new(storage.clone(), 1));
    let policy = CodePolicy {
        length: 1,
        max_attempts: 2000,
        max_extra_length: 0,
    };
    let service = service_with_index(storage.clone(), index, policy);

    let result = service
        .create(Some("owner-a"), create_request("https://a.example.com", None))
        .await
        .unwrap();
    assert!(result.generated_code);
    assert_eq!(result.link.code, free);
    assert_eq!(
        storage.count_links().await.unwrap(),
        CODE_ALPHABET.len() as u64
    );
}
