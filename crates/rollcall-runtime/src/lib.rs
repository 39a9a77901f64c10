//! Rollcall orchestration runtime
//!
//! Ties the protocol flows to concrete ports: the app context carries the
//! process-wide store and clock handles, the session lifecycle manager runs
//! the teacher side, the scan orchestration runs the student side (radio
//! plus timed store fallback), and the stats watcher polls attendance
//! counts on a fixed period. Store clients and the file identity cache
//! live here too.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod context;
pub mod disabled;
pub mod identity_file;
pub mod lifecycle;
pub mod scan;
pub mod stats;
pub mod store;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use context::{AppContext, AppContextBuilder};
pub use disabled::{DisabledAdvertiser, DisabledScanner};
pub use identity_file::FileIdentityStore;
pub use lifecycle::{SessionLifecycle, StartedSession};
pub use scan::scan_for_session;
pub use stats::{attendance_stats, watch_attendance, AttendanceStats, AttendanceWatch};
pub use store::SqliteStore;
