//! Local identity cache abstraction
//!
//! Role identity (student or teacher profile) is externally issued and
//! cached on-device: read at flow start, written on login/refresh. The
//! cache is local and synchronous; only the store and radio are async.

use std::sync::Mutex;

use crate::model::{StudentProfile, TeacherProfile};
use crate::Result;

// ----------------------------------------------------------------------------
// Identity Store Trait
// ----------------------------------------------------------------------------

/// Durable key-value cache for role identity
pub trait IdentityStore: Send + Sync {
    fn load_student(&self) -> Result<Option<StudentProfile>>;

    fn save_student(&self, profile: &StudentProfile) -> Result<()>;

    fn load_teacher(&self) -> Result<Option<TeacherProfile>>;

    fn save_teacher(&self, profile: &TeacherProfile) -> Result<()>;

    /// Forget all cached identity (logout).
    fn clear(&self) -> Result<()>;
}

// ----------------------------------------------------------------------------
// Memory Implementation
// ----------------------------------------------------------------------------

/// In-memory identity cache for tests
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<CachedIdentity>,
}

#[derive(Debug, Default, Clone)]
struct CachedIdentity {
    student: Option<StudentProfile>,
    teacher: Option<TeacherProfile>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load_student(&self) -> Result<Option<StudentProfile>> {
        Ok(self.inner.lock().expect("identity cache lock").student.clone())
    }

    fn save_student(&self, profile: &StudentProfile) -> Result<()> {
        self.inner.lock().expect("identity cache lock").student = Some(profile.clone());
        Ok(())
    }

    fn load_teacher(&self) -> Result<Option<TeacherProfile>> {
        Ok(self.inner.lock().expect("identity cache lock").teacher.clone())
    }

    fn save_teacher(&self, profile: &TeacherProfile) -> Result<()> {
        self.inner.lock().expect("identity cache lock").teacher = Some(profile.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().expect("identity cache lock") = CachedIdentity::default();
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
