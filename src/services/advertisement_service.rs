//! Advertisement service
//!
//! Owner-scoped CRUD with image upload, plus the public random pick.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::get_config;
use crate::errors::{Result, ShepherdError};
use crate::storage::{Advertisement, SeaOrmStorage};
use crate::utils::url_validator::normalize_url;

/// 允许上传的图片扩展名
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// 上传的图片
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// 新建广告表单
#[derive(Debug, Clone, Default)]
pub struct NewAdvertisement {
    pub title: String,
    pub description: Option<String>,
    pub target_url: Option<String>,
    pub image: Option<UploadedImage>,
}

/// 从文件名取小写扩展名并校验
pub fn image_extension(file_name: &str) -> Result<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ShepherdError::validation(format!(
            "Unsupported image type '{}': allowed {}",
            file_name,
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

fn check_content_type(content_type: Option<&str>) -> Result<()> {
    match content_type {
        None => Ok(()),
        Some(ct) if matches!(ct, "image/jpeg" | "image/jpg" | "image/png" | "image/gif") => Ok(()),
        Some(ct) => Err(ShepherdError::validation(format!(
            "Unsupported content type '{}'",
            ct
        ))),
    }
}

pub struct AdvertisementService {
    storage: Arc<SeaOrmStorage>,
    upload_dir: PathBuf,
    max_size: usize,
    public_base_url: String,
}

impl AdvertisementService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let uploads = &get_config().uploads;
        Self::with_uploads(
            storage,
            PathBuf::from(&uploads.dir),
            uploads.max_size,
            uploads.public_base_url.clone(),
        )
    }

    pub fn with_uploads(
        storage: Arc<SeaOrmStorage>,
        upload_dir: PathBuf,
        max_size: usize,
        public_base_url: String,
    ) -> Self {
        Self {
            storage,
            upload_dir,
            max_size,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// 随机一条启用中的广告
    pub async fn random_active(&self) -> Result<Option<Advertisement>> {
        self.storage.random_active_advertisement().await
    }

    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<Advertisement>> {
        self.storage.list_advertisements_by_owner(owner).await
    }

    pub async fn create(&self, owner: &str, form: NewAdvertisement) -> Result<Advertisement> {
        let title = form.title.trim().to_string();
        if title.is_empty() {
            return Err(ShepherdError::validation("Advertisement title is required"));
        }
        let image = form
            .image
            .ok_or_else(|| ShepherdError::validation("Advertisement image is required"))?;
        let target_url = match form.target_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(normalize_url(url)?),
            _ => None,
        };

        let file_name = self.store_image(&image).await?;

        let ad = Advertisement {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner.to_string(),
            title,
            description: form
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            image_url: format!("{}/uploads/{}", self.public_base_url, file_name),
            target_url,
            is_active: true,
            created_at: Utc::now(),
        };

        if let Err(e) = self.storage.insert_advertisement(&ad).await {
            self.remove_image(&file_name).await;
            return Err(e);
        }
        Ok(ad)
    }

    /// 切换启用状态
    pub async fn toggle(&self, owner: &str, id: &str) -> Result<Advertisement> {
        let ad = self.owned(owner, id).await?;
        let is_active = !ad.is_active;
        self.storage.set_advertisement_active(id, is_active).await?;
        info!("Advertisement {} active={}", id, is_active);
        Ok(Advertisement { is_active, ..ad })
    }

    /// 删除广告，图片文件尽力删除
    pub async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        let ad = self.owned(owner, id).await?;
        self.storage.delete_advertisement(id).await?;

        if let Some(file_name) = ad.image_url.rsplit('/').next() {
            self.remove_image(file_name).await;
        }
        Ok(())
    }

    async fn owned(&self, owner: &str, id: &str) -> Result<Advertisement> {
        self.storage
            .find_advertisement(id)
            .await?
            .filter(|ad| ad.owner_id == owner)
            .ok_or_else(|| ShepherdError::not_found(format!("Advertisement '{}' not found", id)))
    }

    /// 写入上传目录，返回生成的文件名
    async fn store_image(&self, image: &UploadedImage) -> Result<String> {
        let ext = image_extension(&image.file_name)?;
        check_content_type(image.content_type.as_deref())?;

        if image.bytes.is_empty() {
            return Err(ShepherdError::validation("Uploaded image is empty"));
        }
        if image.bytes.len() > self.max_size {
            return Err(ShepherdError::validation(format!(
                "Image exceeds the {} byte limit",
                self.max_size
            )));
        }

        let file_name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            crate::utils::generate_random_code(8).to_lowercase(),
            ext
        );

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(self.upload_dir.join(&file_name), &image.bytes).await?;

        info!("Stored advertisement image {}", file_name);
        Ok(file_name)
    }

    async fn remove_image(&self, file_name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.upload_dir.join(file_name)).await {
            warn!("Failed to remove image {}: {}", file_name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("banner.PNG").unwrap(), "png");
        assert_eq!(image_extension("a.b.jpeg").unwrap(), "jpeg");
        assert!(image_extension("script.svg").is_err());
        assert!(image_extension("noext").is_err());
    }

    #[test]
    fn test_content_type() {
        assert!(check_content_type(None).is_ok());
        assert!(check_content_type(Some("image/gif")).is_ok());
        assert!(check_content_type(Some("text/html")).is_err());
    }
}
