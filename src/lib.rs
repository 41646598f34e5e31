/// Tagged value buffer: byte store, writer, reader, flush sinks.
pub mod buffer;
/// Wire codec: type tags, number classification, narrow floats, composites.
pub mod codec;
/// Settings loading from files and environment.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Logging initialization (filters and output formats).
pub mod logging;
/// Fixed-size async worker pool.
pub mod pool;
/// Base64 text transport with a versioned envelope.
pub mod transport;
/// Host value model: scalars, geometry records, tables, JSON bridge.
pub mod value;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Buffer and its configuration.
pub use buffer::{
    BufferConfig, BufferMark, ByteStore, CollectSink, FallbackPolicy, FlushSink, ReadOutcome,
    TaggedBuffer,
};
/// Wire-level tag and number kind.
pub use codec::{classify, NumberKind, TypeTag};
/// Settings.
pub use config::Settings;
/// Errors.
pub use error::{BufferError, BufferResult, SettingsError, StackError, StatusCode, TagpackResult};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig};
/// Worker pool.
pub use pool::{PoolError, WorkerPool};
/// Text transport.
pub use transport::{from_text, to_text};
/// Host values.
pub use value::{
    BrickColor, CFrame, Color3, ColorKeypoint, ColorSequence, ExternalRef, NumberKeypoint,
    NumberRange, NumberSequence, Rect, Table, UDim, UDim2, Value, Vector2, Vector3,
};
