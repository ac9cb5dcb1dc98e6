// Domain models: snapshot, per-subsystem readings, wire payload

mod gpu;
mod network;
mod payload;
mod snapshot;
mod storage;
mod system;

pub use gpu::{GpuDetails, GpuInfo};
pub use network::{NetworkIo, NetworkStats};
pub use payload::TelemetryPayload;
pub use snapshot::{Normalized, Snapshot};
pub use storage::{DiskIo, DiskStats, DiskUsage};
pub use system::{CpuFrequency, CpuStats, MemoryStats};
