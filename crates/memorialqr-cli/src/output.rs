use serde::Serialize;

use memorialqr_core::media::UploadSummary;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

pub fn print_out<T: Serialize>(json: bool, data: &[T], row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&JsonOut { ok: true, data })?);
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(json: bool, data: T, row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&JsonOut { ok: true, data })?);
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

/// Print a short confirmation, or `{"ok": true, "data": message}` in JSON mode.
pub fn print_done(json: bool, message: &str) -> anyhow::Result<()> {
    print_one(json, message, |m| m.to_string())
}

/// A created or updated record, plus the media batch uploaded with it.
#[derive(Serialize)]
pub struct Saved<T: Serialize> {
    #[serde(flatten)]
    pub record: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadSummary>,
}

pub fn print_saved<T: Serialize>(json: bool, saved: Saved<T>, row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    print_one(json, saved, |s| match &s.upload {
        Some(upload) => format!("{}\n{}", row(&s.record), upload.message()),
        None => row(&s.record),
    })
}
