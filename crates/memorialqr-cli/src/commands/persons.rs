use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use memorialqr_core::media::{upload_all, MediaFile, UploadSummary};
use memorialqr_core::models::{filter_persons, CreatePerson, Person, UpdatePerson};
use memorialqr_core::utils::{format_optional, truncate};
use memorialqr_core::{ApiClient, Route};

use crate::cli::PersonCommands;
use crate::context::App;
use crate::output::{print_done, print_one, print_out, print_saved, Saved};

/// Biography characters shown in the detail view
const BIOGRAPHY_PREVIEW_CHARS: usize = 80;

fn person_row(p: &Person) -> String {
    format!("{}\t{}\t{}\t{}", p.id, p.tcno, p.full_name(), p.lifespan())
}

fn person_detail(p: &Person, api: &ApiClient) -> String {
    format!(
        "{} ({})\nID: {}  TC: {}\nBiography: {}\nProfile QR: {}",
        p.full_name(),
        p.lifespan(),
        p.id,
        p.tcno,
        truncate(&format_optional(p.biography.as_deref(), "-"), BIOGRAPHY_PREVIEW_CHARS),
        api.person_qr_code_url(&p.tcno),
    )
}

fn media_row(m: &MediaFile) -> String {
    let kind = if m.is_video() { "video" } else { "image" };
    format!("{}\t{}\t{}", kind, m.filename, m.url)
}

async fn upload_images(api: &ApiClient, tcno: &str, files: Vec<PathBuf>) -> UploadSummary {
    let summary = upload_all(files, |file| {
        let api = api.clone();
        let tcno = tcno.to_string();
        async move { api.upload_person_image(&tcno, &file).await }
    })
    .await;
    info!(tcno, successful = summary.successful, failed = summary.failed, "Image upload finished");
    summary
}

fn print_upload(json: bool, summary: UploadSummary) -> Result<()> {
    if summary.all_failed() {
        bail!("{}", summary.message());
    }
    print_one(json, summary, |s| s.message())
}

pub async fn handle(app: &App, command: PersonCommands) -> Result<()> {
    match command {
        PersonCommands::List { query } => {
            let api = app.enter(Route::Persons).await?;
            let persons = api.fetch_persons().await?;
            let hits = filter_persons(&persons, query.as_deref().unwrap_or_default());
            print_out(app.json, &hits, |p| person_row(p))?;
        }
        PersonCommands::Show { id } => {
            let api = app.enter(Route::Persons).await?;
            let person = api.fetch_person(id).await?;
            print_one(app.json, person, |p| person_detail(p, &api))?;
        }
        PersonCommands::Get { tcno } => {
            let api = app.enter(Route::Person { tcno: tcno.clone() }).await?;
            let person = api.fetch_person_by_tcno(&tcno).await?;
            print_one(app.json, person, |p| person_detail(p, &api))?;
        }
        PersonCommands::Create { fields, media } => {
            let api = app.enter(Route::Persons).await?;
            let payload = CreatePerson {
                tcno: fields.tcno,
                first_name: fields.first_name,
                last_name: fields.last_name,
                birth_date: fields.birth_date,
                death_date: fields.death_date,
                biography: fields.biography,
            };
            let person = api.create_person(&payload).await?;
            info!(id = person.id, tcno = %person.tcno, "Person created");
            let upload = if media.is_empty() {
                None
            } else {
                Some(upload_images(&api, &person.tcno, media).await)
            };
            print_saved(app.json, Saved { record: person, upload }, person_row)?;
        }
        PersonCommands::Update { id, fields, media } => {
            let api = app.enter(Route::Persons).await?;
            let payload = UpdatePerson {
                first_name: fields.first_name,
                last_name: fields.last_name,
                birth_date: fields.birth_date,
                death_date: fields.death_date,
                biography: fields.biography,
            };
            if payload.is_empty() && media.is_empty() {
                bail!("Nothing to update");
            }
            let person = if payload.is_empty() {
                api.fetch_person(id).await?
            } else {
                api.update_person(id, &payload).await?
            };
            let upload = if media.is_empty() {
                None
            } else {
                Some(upload_images(&api, &person.tcno, media).await)
            };
            print_saved(app.json, Saved { record: person, upload }, person_row)?;
        }
        PersonCommands::Delete { id } => {
            let api = app.enter(Route::Persons).await?;
            api.delete_person(id).await?;
            print_done(app.json, &format!("Person {} deleted", id))?;
        }
        PersonCommands::Images { tcno } => {
            let api = app.enter(Route::Person { tcno: tcno.clone() }).await?;
            let images = api.fetch_person_images(&tcno).await?;
            print_out(app.json, &images, media_row)?;
        }
        PersonCommands::Upload { tcno, files } => {
            let api = app.enter(Route::Persons).await?;
            let summary = upload_images(&api, &tcno, files).await;
            print_upload(app.json, summary)?;
        }
        PersonCommands::RemoveImage { tcno, image } => {
            let api = app.enter(Route::Persons).await?;
            api.remove_person_image(&tcno, &image).await?;
            print_done(app.json, &format!("Removed {}", image))?;
        }
        PersonCommands::Qr { tcno, output } => {
            let api = app.enter(Route::Persons).await?;
            let person = api.fetch_person_by_tcno(&tcno).await?;
            let png = api.download_person_qr_code(&tcno).await?;
            let path = save_png(&output, &person.qr_file_name(), &png)?;
            print_done(app.json, &path.display().to_string())?;
        }
        PersonCommands::GenerateQr { tcno } => {
            let api = app.enter(Route::Persons).await?;
            api.generate_person_qr_code(&tcno).await?;
            print_done(app.json, "QR code generated")?;
        }
    }
    Ok(())
}

/// Write QR code bytes into `dir` and return the file path.
pub fn save_png(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
