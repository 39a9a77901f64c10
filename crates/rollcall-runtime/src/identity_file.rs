//! JSON-file identity cache
//!
//! Durable stand-in for the device key-value cache: one JSON document
//! holding the cached student and teacher profiles.

use std::path::{Path, PathBuf};

use rollcall_core::identity::IdentityStore;
use rollcall_core::{Result, RollcallError, StudentProfile, TeacherProfile};
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// File Store
// ----------------------------------------------------------------------------

/// File-backed implementation of [`IdentityStore`]
pub struct FileIdentityStore {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CachedIdentity {
    student: Option<StudentProfile>,
    teacher: Option<TeacherProfile>,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default on-disk location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| RollcallError::identity("no platform data directory"))?;
        Ok(base.join("rollcall").join("identity.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CachedIdentity> {
        if !self.path.exists() {
            return Ok(CachedIdentity::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| RollcallError::identity(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| RollcallError::identity(e.to_string()))
    }

    fn write(&self, cached: &CachedIdentity) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RollcallError::identity(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(cached)
            .map_err(|e| RollcallError::identity(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| RollcallError::identity(e.to_string()))
    }
}

impl IdentityStore for FileIdentityStore {
    fn load_student(&self) -> Result<Option<StudentProfile>> {
        Ok(self.read()?.student)
    }

    fn save_student(&self, profile: &StudentProfile) -> Result<()> {
        let mut cached = self.read()?;
        cached.student = Some(profile.clone());
        self.write(&cached)
    }

    fn load_teacher(&self) -> Result<Option<TeacherProfile>> {
        Ok(self.read()?.teacher)
    }

    fn save_teacher(&self, profile: &TeacherProfile) -> Result<()> {
        let mut cached = self.read()?;
        cached.teacher = Some(profile.clone());
        self.write(&cached)
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| RollcallError::identity(e.to_string()))?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::{StudentId, TeacherId};

    #[test]
    fn test_file_identity_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileIdentityStore::new(dir.path().join("identity.json"));

        assert!(cache.load_student().unwrap().is_none());

        let student = StudentProfile {
            id: StudentId::new("s-1"),
            name: "Asha".to_string(),
            email: "asha@example.edu".to_string(),
            roll_number: "41".to_string(),
            batch: "2027".to_string(),
        };
        cache.save_student(&student).unwrap();

        let teacher = TeacherProfile {
            id: TeacherId::new("t-1"),
            name: "Prof. Rao".to_string(),
            email: "rao@example.edu".to_string(),
        };
        cache.save_teacher(&teacher).unwrap();

        // saving one role does not clobber the other
        assert_eq!(cache.load_student().unwrap().unwrap(), student);
        assert_eq!(cache.load_teacher().unwrap().unwrap(), teacher);

        cache.clear().unwrap();
        assert!(cache.load_student().unwrap().is_none());
        // clearing twice is fine
        cache.clear().unwrap();
    }
}
