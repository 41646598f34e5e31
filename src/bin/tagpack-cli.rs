//! CLI для tagpack
//!
//! Кодирует JSON в текстовый конверт буфера, декодирует конверт обратно
//! в JSON и печатает постраничный дамп тегов.

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value as Json;
use tagpack::{
    buffer::{scan, TagRecord},
    error::ErrorExt,
    init_logging,
    transport::{decode_base64, parse_envelope},
    value::json::{from_json, table_to_json, to_json},
    BufferError, LogFormat, Settings, StackError, StatusCode, TaggedBuffer,
};
use tracing::{debug, error, trace, warn};

/// Аргументы командной строки
#[derive(Parser)]
#[command(name = "tagpack-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Encode, decode and inspect tagpack text envelopes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Файл настроек (по умолчанию `tagpack.toml`, если есть)
    #[arg(long, global = true, env = "TAGPACK_CONFIG")]
    config: Option<PathBuf>,
    /// Уровень логирования (перекрывает настройки)
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Формат логов (перекрывает настройки)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Закодировать JSON-документ в текстовый конверт
    Encode {
        /// Файл с JSON (по умолчанию stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Максимальный размер буфера в байтах
        #[arg(long)]
        max_size: Option<usize>,
    },
    /// Декодировать текстовый конверт в JSON
    Decode {
        /// Текст конверта
        #[arg(conflicts_with = "input")]
        text: Option<String>,
        /// Файл с текстом конверта
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Печатать JSON с отступами
        #[arg(long)]
        pretty: bool,
    },
    /// Показать заголовок конверта и все теги потока
    Inspect {
        /// Текст конверта
        text: String,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let status = status_of(&err);
            if let Some(root) = err.chain().find_map(|c| c.downcast_ref::<BufferError>()) {
                error!(labels = ?root.labels(), "Command failed");
            }
            eprintln!("Error: {err:#}");
            ExitCode::from(status.map_or(1, StatusCode::exit_code))
        }
    }
}

/// Код статуса первой ошибки tagpack в цепочке.
fn status_of(err: &anyhow::Error) -> Option<StatusCode> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<StackError>()
            .map(StackError::status_code)
            .or_else(|| cause.downcast_ref::<BufferError>().map(|e| e.status_code()))
    })
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("Failed to load settings")?;

    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format.into();
    }
    init_logging(settings.logging.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    match cli.command {
        Commands::Encode { input, max_size } => {
            if let Some(max_size) = max_size {
                settings.buffer.max_size = max_size;
                settings.buffer.initial_size = settings.buffer.initial_size.min(max_size);
            }
            let source = read_input(input.as_ref())?;
            println!("{}", encode(&source, &settings)?);
        }
        Commands::Decode {
            text,
            input,
            pretty,
        } => {
            let text = match text {
                Some(text) => text,
                None => read_input(input.as_ref())?,
            };
            let json = decode(&text, &settings)?;
            let out = if pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            println!("{out}");
        }
        Commands::Inspect { text } => inspect(&text)?,
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Массив пишется поэлементно, объект — парами, остальное одним значением.
fn encode(
    source: &str,
    settings: &Settings,
) -> Result<String> {
    let document: Json = serde_json::from_str(source).context("Input is not valid JSON")?;
    let mut buffer =
        TaggedBuffer::with_config(settings.buffer.clone()).context("Invalid buffer settings")?;

    match &document {
        Json::Array(items) => {
            for item in items {
                buffer.add(&from_json(item)?)?;
            }
        }
        Json::Object(map) if !map.contains_key("$type") => {
            for (key, value) in map {
                buffer.add_pair(&key.as_str().into(), &from_json(value)?)?;
            }
        }
        other => buffer.add(&from_json(other)?)?,
    }
    debug!(bytes = buffer.len(), "Document encoded");
    Ok(buffer.to_text()?)
}

fn decode(
    text: &str,
    settings: &Settings,
) -> Result<Json> {
    let mut buffer = TaggedBuffer::from_text(text, &settings.buffer)?;
    let outcome = buffer.read_outcome()?;
    if let Some(err) = &outcome.error {
        warn!(error = %err, "Stream is damaged, printing the readable part");
    }
    Ok(table_to_json(&outcome.table))
}

fn inspect(text: &str) -> Result<()> {
    let raw = decode_base64(text).context("Input is not valid base64")?;
    let envelope = parse_envelope(&raw)?;
    println!("version:  {}", envelope.version as u8);
    println!("payload:  {} bytes", envelope.payload.len());
    println!("max size: {} bytes", envelope.max_size);
    println!();

    let (records, error) = scan(envelope.payload);
    for record in &records {
        trace!(offset = record.offset, tag = ?record.tag, "Tag");
        println!("{}", format_record(record));
    }
    if let Some(err) = error {
        bail!("Stream stopped after {} tags: {err}", records.len());
    }
    Ok(())
}

fn format_record(record: &TagRecord) -> String {
    let indent = "  ".repeat(record.depth);
    let head = format!(
        "{:>6}  {indent}{:?} ({})",
        record.offset,
        record.tag,
        record.tag.as_byte()
    );
    match &record.value {
        Some(value) => format!("{head} = {}", to_json(value)),
        None => head,
    }
}
