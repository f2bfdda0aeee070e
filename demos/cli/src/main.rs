use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use report_core::{PersonalDetails, ReportConfig};
use report_prompt::{
    malformed_dates, record_from_str, report_file_name, report_prompt_for, summary_prompt_for,
    GenerationRequest,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Summary,
    Report,
}

#[derive(Parser, Debug)]
#[command(
    name = "report-cli",
    about = "Dựng prompt tóm tắt hoặc báo cáo y khoa từ hồ sơ bệnh nhân JSON."
)]
struct Args {
    /// Đường dẫn tới file JSON hồ sơ bệnh nhân.
    #[arg(short, long)]
    input: PathBuf,

    /// Loại văn bản cần dựng.
    #[arg(short, long, value_enum, default_value_t = Kind::Summary)]
    kind: Kind,

    /// File JSON cấu hình báo cáo (tuỳ chọn).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// In yêu cầu gửi dịch vụ sinh văn bản (prompt + schema) dạng JSON.
    #[arg(long)]
    request_json: bool,

    /// Ghi báo cáo vào thư mục này với tên Informe_<Tên>_<ngày>.md (chỉ với --kind report).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ReportConfig> {
    let Some(path) = path else {
        return Ok(ReportConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file cấu hình {path:?}"))?;
    serde_json::from_str(&data).with_context(|| format!("Cấu hình không hợp lệ {path:?}"))
}

/// Chỉ báo cáo đầy đủ mới được ghi thành file `Informe_*.md`.
fn report_output_path(
    kind: Kind,
    dir: &Path,
    personal: &PersonalDetails,
    today: NaiveDate,
) -> anyhow::Result<PathBuf> {
    match kind {
        Kind::Report => Ok(dir.join(report_file_name(personal, today))),
        Kind::Summary => anyhow::bail!("--output-dir chỉ dùng được với --kind report"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;
    let config = load_config(args.config.as_ref())?;
    let record = record_from_str(&data)?;

    if !record.has_encounters() {
        tracing::info!(patient_id = %record.id, "no encounters recorded");
    }
    for encounter in malformed_dates(&record.encounters) {
        tracing::warn!(
            encounter_id = %encounter.id,
            raw_date = %encounter.date,
            "encounter date could not be parsed; rendering raw value"
        );
    }

    let output_path = args
        .output_dir
        .as_deref()
        .map(|dir| {
            let today = chrono::Local::now().date_naive();
            report_output_path(args.kind, dir, &record.personal, today)
        })
        .transpose()?;

    let document = match args.kind {
        Kind::Summary => summary_prompt_for(&record),
        Kind::Report => report_prompt_for(&record, &config),
    };

    if args.request_json {
        let request = GenerationRequest::from_document(&document);
        println!("{}", serde_json::to_string_pretty(&request)?);
    } else {
        println!("{document}");
    }

    if let Some(path) = output_path {
        std::fs::write(&path, document.render())
            .with_context(|| format!("Không ghi được file {path:?}"))?;
        tracing::info!(path = %path.display(), "prompt document written");
    }

    Ok(())
}
