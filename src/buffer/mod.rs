//! Буфер тегированных значений.
//!
//! - [`store`] — растущее хранилище байтов с жёстким максимумом
//! - [`tagged`] — запись значений, `flush`, жизненный цикл
//! - [`reader`] — обратный разбор потока в таблицу
//! - [`refs`] — побочная таблица ссылок на объекты хоста
//! - [`sink`] — получатели сброшенных байтов

pub mod config;
pub mod reader;
pub mod refs;
pub mod sink;
pub mod store;
pub mod tagged;

pub use config::{BufferConfig, FallbackPolicy};
pub use reader::{decode_stream, scan, ReadOutcome, TagRecord};
pub use refs::RefTable;
pub use sink::{CollectSink, FlushSink};
pub use store::ByteStore;
pub use tagged::{encode_scalar, BufferMark, TaggedBuffer};
