use std::sync::Arc;

use actix_web::{Responder, web};
use tracing::info;

use crate::services::{NewReport, ReportService};

use super::helpers::{created_response, error_from_shepherd};
use super::types::CreateReportBody;

/// POST /api/reports
pub async fn submit_report(
    body: web::Json<CreateReportBody>,
    reports: web::Data<Arc<ReportService>>,
) -> impl Responder {
    let body = body.into_inner();
    let request = NewReport {
        link_code: body.link_code,
        link_id: body.link_id,
        reporter_email: body.reporter_email,
        reason: body.reason,
        description: body.description,
    };

    match reports.submit(request).await {
        Ok(report) => {
            info!("Reports API: report {} filed against '{}'", report.id, report.link_code);
            created_response(report)
        }
        Err(e) => error_from_shepherd(&e),
    }
}

pub fn reports_routes() -> actix_web::Scope {
    web::scope("/reports").route("", web::post().to(submit_report))
}
