pub mod generator;
pub mod metrics;
pub mod storage;
pub mod wav;

pub use generator::{AudioGenerator, GeneratorError, HttpGenerator, MockGenerator, Waveform};
pub use metrics::{get_metrics, init_metrics};
pub use storage::{ObjectStore, OutputDir, S3Store, StorageError};
pub use wav::{write_wav, WavError};
