pub mod buffer;
pub mod config;
pub mod format;
pub mod generator;
pub mod mutator;
pub mod observer;
pub mod size;
pub mod transport;

pub use buffer::ByteBuffer;
pub use config::{ConfigError, ShredderConfig};
pub use format::{FALLBACK_MEDIA_TYPE, FormatParseError, FormatTag, media_type_for_tag};
pub use generator::{GenerateError, GeneratedFile, generate, generate_format};
pub use mutator::{CORRUPTION_RATIO, Mutator, RatioCorruptor, corrupt, corruption_count};
pub use observer::{MutationObserver, WriteCountObserver};
pub use size::format_size;
pub use transport::{
    Delivery, DirectorySink, MAX_INPUT_SIZE_BYTES, Sink, TransportError, TransportPolicy,
};
