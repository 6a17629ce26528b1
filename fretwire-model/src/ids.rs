use crate::error::ModelError;
use uuid::Uuid;

/// Strongly typed ID for transcript segments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SegmentId(pub Uuid);

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentId {
    pub fn new() -> Self {
        SegmentId(Uuid::now_v7())
    }

    pub fn from_string(id: &str) -> Result<Self, ModelError> {
        if id.is_empty() {
            return Err(ModelError::InvalidId(
                "segment id cannot be empty".to_string(),
            ));
        }
        let uuid = id
            .parse()
            .map_err(|e| ModelError::InvalidId(format!("{id}: {e}")))?;
        Ok(SegmentId(uuid))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for SegmentId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for catalog courses
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CourseId(pub Uuid);

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseId {
    pub fn new() -> Self {
        CourseId(Uuid::now_v7())
    }

    pub fn from_string(id: &str) -> Result<Self, ModelError> {
        if id.is_empty() {
            return Err(ModelError::InvalidId(
                "course id cannot be empty".to_string(),
            ));
        }
        let uuid = id
            .parse()
            .map_err(|e| ModelError::InvalidId(format!("{id}: {e}")))?;
        Ok(CourseId(uuid))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl AsRef<Uuid> for CourseId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
