use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::{Result, ShepherdError};
use crate::storage::{Report, ReportStatus, SeaOrmStorage};

#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub link_code: Option<String>,
    pub link_id: Option<String>,
    pub reporter_email: String,
    pub reason: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportUpdate {
    pub status: Option<ReportStatus>,
    pub admin_response: Option<String>,
}

/// 管理端列表项：附带被举报链接的信息
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub link_destination: Option<String>,
    pub link_title: Option<String>,
}

pub struct ReportService {
    storage: Arc<SeaOrmStorage>,
}

impl ReportService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 公开举报入口
    pub async fn submit(&self, req: NewReport) -> Result<Report> {
        let reporter_email = req.reporter_email.trim().to_lowercase();
        if !reporter_email.contains('@') {
            return Err(ShepherdError::validation("A valid reporter email is required"));
        }
        let reason = req.reason.trim().to_string();
        if reason.is_empty() {
            return Err(ShepherdError::validation("A reason is required"));
        }

        let code = req.link_code.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let id = req.link_id.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let link = match (code, id) {
            (Some(code), _) => self.storage.find_link_by_code(code).await?,
            (None, Some(id)) => self.storage.find_link_by_id(id).await?,
            (None, None) => {
                return Err(ShepherdError::validation(
                    "Either link_code or link_id is required",
                ));
            }
        }
        .ok_or_else(|| ShepherdError::not_found("Reported link not found"))?;

        let now = Utc::now();
        let report = Report {
            id: uuid::Uuid::new_v4().to_string(),
            link_id: link.id,
            link_code: link.code,
            reporter_email,
            reason,
            description: req
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            status: ReportStatus::Pending,
            admin_response: None,
            created_at: now,
            updated_at: now,
        };

        self.storage.insert_report(&report).await?;
        Ok(report)
    }

    pub async fn list(&self) -> Result<Vec<ReportView>> {
        let reports = self.storage.list_reports().await?;

        let mut views = Vec::with_capacity(reports.len());
        for report in reports {
            let link = self.storage.find_link_by_id(&report.link_id).await?;
            views.push(ReportView {
                link_destination: link.as_ref().map(|l| l.destination.clone()),
                link_title: link.and_then(|l| l.title),
                report,
            });
        }
        Ok(views)
    }

    pub async fn update(&self, id: &str, update: ReportUpdate) -> Result<Report> {
        let mut report = self
            .storage
            .find_report(id)
            .await?
            .ok_or_else(|| ShepherdError::not_found(format!("Report '{}' not found", id)))?;

        if let Some(status) = update.status {
            report.status = status;
        }
        if let Some(response) = update.admin_response {
            report.admin_response = Some(response.trim().to_string()).filter(|r| !r.is_empty());
        }
        report.updated_at = Utc::now();

        self.storage.update_report(&report).await?;
        info!("Report {} is now {}", report.id, report.status);
        Ok(report)
    }
}
