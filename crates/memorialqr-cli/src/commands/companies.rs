use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use memorialqr_core::media::{upload_all, MediaFile, UploadSummary};
use memorialqr_core::models::{filter_companies, Company, CreateCompany, UpdateCompany};
use memorialqr_core::utils::{format_date, format_optional};
use memorialqr_core::{ApiClient, Route};

use super::persons::save_png;
use crate::cli::CompanyCommands;
use crate::context::App;
use crate::output::{print_done, print_one, print_out, print_saved, Saved};

#[derive(Serialize)]
struct Location {
    location: Option<String>,
    maps_url: Option<String>,
}

fn company_row(c: &Company) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        c.id,
        c.company_code,
        c.name,
        format_optional(c.location.as_deref(), "-")
    )
}

fn company_detail(c: &Company, api: &ApiClient) -> String {
    format!(
        "{} [{}]\nID: {}  Updated: {}\nLocation: {}\nWebsite: {}\nProfile QR: {}",
        c.name,
        c.company_code,
        c.id,
        format_date(&c.updated_at.to_rfc3339()),
        c.maps_url()
            .unwrap_or_else(|| format_optional(c.location.as_deref(), "-")),
        format_optional(c.website.as_deref(), "-"),
        api.company_qr_code_url(&c.company_code),
    )
}

fn media_row(m: &MediaFile) -> String {
    let kind = if m.is_video() { "video" } else { "image" };
    format!("{}\t{}\t{}", kind, m.filename, m.url)
}

async fn upload_media(api: &ApiClient, code: &str, files: Vec<PathBuf>) -> UploadSummary {
    let summary = upload_all(files, |file| {
        let api = api.clone();
        let code = code.to_string();
        async move { api.upload_company_media(&code, &file).await }
    })
    .await;
    info!(code, successful = summary.successful, failed = summary.failed, "Media upload finished");
    summary
}

pub async fn handle(app: &App, command: CompanyCommands) -> Result<()> {
    match command {
        CompanyCommands::List { query } => {
            let api = app.enter(Route::Companies).await?;
            let companies = api.fetch_companies().await?;
            let hits = filter_companies(&companies, query.as_deref().unwrap_or_default());
            print_out(app.json, &hits, |c| company_row(c))?;
        }
        CompanyCommands::Show { id } => {
            let api = app.enter(Route::Companies).await?;
            let company = api.fetch_company(id).await?;
            print_one(app.json, company, |c| company_detail(c, &api))?;
        }
        CompanyCommands::Get { code } => {
            let api = app.enter(Route::Company { code: code.clone() }).await?;
            let company = api.fetch_company_by_code(&code).await?;
            print_one(app.json, company, |c| company_detail(c, &api))?;
        }
        CompanyCommands::Create { fields, media } => {
            let api = app.enter(Route::Companies).await?;
            let payload = CreateCompany {
                company_code: fields.code,
                name: fields.name,
                location: fields.location,
                website: fields.website,
                description: fields.description,
            };
            let company = api.create_company(&payload).await?;
            info!(id = company.id, code = %company.company_code, "Company created");
            let upload = if media.is_empty() {
                None
            } else {
                Some(upload_media(&api, &company.company_code, media).await)
            };
            print_saved(app.json, Saved { record: company, upload }, company_row)?;
        }
        CompanyCommands::Update { id, fields, media } => {
            let api = app.enter(Route::Companies).await?;
            let payload = UpdateCompany {
                name: fields.name,
                location: fields.location,
                website: fields.website,
                description: fields.description,
            };
            if payload.is_empty() && media.is_empty() {
                bail!("Nothing to update");
            }
            let company = if payload.is_empty() {
                api.fetch_company(id).await?
            } else {
                api.update_company(id, &payload).await?
            };
            let upload = if media.is_empty() {
                None
            } else {
                Some(upload_media(&api, &company.company_code, media).await)
            };
            print_saved(app.json, Saved { record: company, upload }, company_row)?;
        }
        CompanyCommands::Delete { id } => {
            let api = app.enter(Route::Companies).await?;
            api.delete_company(id).await?;
            print_done(app.json, &format!("Company {} deleted", id))?;
        }
        CompanyCommands::Media { code } => {
            let api = app.enter(Route::Company { code: code.clone() }).await?;
            let media = api.fetch_company_media(&code).await?;
            print_out(app.json, &media, media_row)?;
        }
        CompanyCommands::Upload { code, files } => {
            let api = app.enter(Route::Companies).await?;
            let summary = upload_media(&api, &code, files).await;
            if summary.all_failed() {
                bail!("{}", summary.message());
            }
            print_one(app.json, summary, |s| s.message())?;
        }
        CompanyCommands::RemoveMedia { code, media } => {
            let api = app.enter(Route::Companies).await?;
            api.remove_company_media(&code, &media).await?;
            print_done(app.json, &format!("Removed {}", media))?;
        }
        CompanyCommands::Qr { code, output } => {
            let api = app.enter(Route::Companies).await?;
            let company = api.fetch_company_by_code(&code).await?;
            let png = api.download_company_qr_code(&code).await?;
            let path = save_png(&output, &company.qr_file_name(), &png)?;
            print_done(app.json, &path.display().to_string())?;
        }
        CompanyCommands::GenerateQr { code } => {
            let api = app.enter(Route::Companies).await?;
            api.generate_company_qr_code(&code).await?;
            print_done(app.json, "QR code generated")?;
        }
        CompanyCommands::Location { code } => {
            let api = app.enter(Route::Company { code: code.clone() }).await?;
            let company = api.fetch_company_by_code(&code).await?;
            let location = Location {
                maps_url: company.maps_url(),
                location: company.location,
            };
            print_one(app.json, location, |l| {
                l.maps_url
                    .clone()
                    .unwrap_or_else(|| format_optional(l.location.as_deref(), "No location set"))
            })?;
        }
    }
    Ok(())
}
