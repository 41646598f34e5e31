use tracing_subscriber::{fmt, registry::LookupSpan, Layer};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Слой форматирования в выбранном формате.
pub fn build_layer<S, W>(
    config: &LoggingConfig,
    writer: W,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target);

    match config.format {
        LogFormat::Pretty => Box::new(layer.pretty()),
        LogFormat::Compact => Box::new(layer.compact()),
        LogFormat::Json => Box::new(layer.json().with_ansi(false)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    #[derive(Clone)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Тест проверяет, что JSON-формат пишет разбираемые строки.
    #[test]
    fn test_json_layer_writes_json() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = SharedBuf(buffer.clone());
        let cfg = LoggingConfig {
            format: LogFormat::Json,
            ..Default::default()
        };
        let layer = build_layer::<Registry, _>(&cfg, move || writer.clone());
        tracing::subscriber::with_default(Registry::default().with(layer), || {
            tracing::info!(bytes = 3, "flushed");
        });

        let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!(line["fields"]["message"], "flushed");
        assert_eq!(line["fields"]["bytes"], 3);
    }

    /// Тест проверяет, что компактный и подробный форматы не паникуют.
    #[test]
    fn test_text_layers() {
        for format in [LogFormat::Compact, LogFormat::Pretty] {
            let buffer = Arc::new(Mutex::new(Vec::new()));
            let writer = SharedBuf(buffer.clone());
            let cfg = LoggingConfig {
                format,
                with_ansi: false,
                ..Default::default()
            };
            let layer = build_layer::<Registry, _>(&cfg, move || writer.clone());
            tracing::subscriber::with_default(Registry::default().with(layer), || {
                tracing::warn!("text message");
            });
            let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
            assert!(out.contains("text message"));
        }
    }
}
