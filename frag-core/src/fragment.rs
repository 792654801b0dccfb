use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FragmentError, FragmentResult, MediaType};

/// One stored blob's descriptor.
///
/// A `Fragment` is a projection of its metadata record. Building one does not
/// persist anything; see [`crate::Fragments`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    id: String,
    owner_id: String,
    #[serde(with = "millis")]
    created: DateTime<Utc>,
    #[serde(with = "millis")]
    updated: DateTime<Utc>,
    #[serde(rename = "type")]
    content_type: String,
    size: u64,
    #[serde(skip)]
    media_type: MediaType,
}

/// Builder for [`Fragment`]. Everything except owner and type has a default.
#[derive(Debug, Clone)]
pub struct FragmentBuilder {
    owner_id: String,
    content_type: String,
    id: Option<String>,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    size: i64,
}

impl FragmentBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub fn build(self) -> FragmentResult<Fragment> {
        if self.owner_id.is_empty() {
            return Err(FragmentError::invalid("ownerId is required"));
        }
        let media_type = MediaType::parse(&self.content_type)
            .ok_or_else(|| FragmentError::unsupported_type(&self.content_type))?;
        let size = u64::try_from(self.size)
            .map_err(|_| FragmentError::invalid(format!("size must be >= 0, got {}", self.size)))?;

        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        if id.contains('/') {
            return Err(FragmentError::invalid("id must not contain '/'"));
        }

        let now = now();
        let created = self.created.map(|t| t.trunc_subsecs(3)).unwrap_or(now);
        let updated = self.updated.map(|t| t.trunc_subsecs(3)).unwrap_or(created);

        Ok(Fragment {
            id,
            owner_id: self.owner_id,
            created,
            updated,
            content_type: self.content_type,
            size,
            media_type,
        })
    }
}

/// Metadata record as read back from storage
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFragment {
    id: String,
    owner_id: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    #[serde(rename = "type")]
    content_type: String,
    size: serde_json::Value,
}

impl Fragment {
    pub fn builder(owner_id: impl Into<String>, content_type: impl Into<String>) -> FragmentBuilder {
        FragmentBuilder {
            owner_id: owner_id.into(),
            content_type: content_type.into(),
            id: None,
            created: None,
            updated: None,
            size: 0,
        }
    }

    /// New fragment with a fresh id, current timestamps and size 0
    pub fn new(owner_id: impl Into<String>, content_type: impl Into<String>) -> FragmentResult<Self> {
        Self::builder(owner_id, content_type).build()
    }

    /// Rebuild a fragment from its serialized metadata record.
    ///
    /// The record goes through the same validation as construction.
    pub fn from_json(record: &str) -> FragmentResult<Self> {
        let stored: StoredFragment = serde_json::from_str(record)
            .map_err(|e| FragmentError::invalid(format!("malformed fragment record: {e}")))?;

        let size = match &stored.size {
            serde_json::Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| FragmentError::invalid(format!("size must be an integer, got {n}")))?,
            other => return Err(FragmentError::invalid(format!("size must be a number, got {other}"))),
        };

        Self::builder(stored.owner_id, stored.content_type)
            .id(stored.id)
            .created(stored.created)
            .updated(stored.updated)
            .size(size)
            .build()
    }

    pub fn to_json(&self) -> FragmentResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FragmentError::invalid(format!("unable to serialize fragment: {e}")))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Declared type, parameters included
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Declared type without parameters (`text/html; charset=utf-8` -> `text/html`)
    pub fn mime_type(&self) -> &'static str {
        self.media_type.as_str()
    }

    pub fn is_text(&self) -> bool {
        self.media_type.is_text()
    }

    pub fn is_image(&self) -> bool {
        self.media_type.is_image()
    }

    /// Types this fragment can be served as
    pub fn formats(&self) -> Vec<&'static str> {
        self.media_type.targets().iter().map(|m| m.as_str()).collect()
    }

    /// Decide how a read should be served: `Ok(None)` returns the stored bytes
    /// as they are, `Ok(Some(target))` needs a conversion.
    ///
    /// The identity check runs before the legality check, so a fragment can
    /// always be read in its own type: the declared string or its bare base
    /// type. Other targets must be a bare member of [`Fragment::formats`];
    /// a parameterized target is only accepted when it is the declared type.
    pub fn negotiate(&self, target: Option<&str>) -> FragmentResult<Option<MediaType>> {
        let Some(requested) = target else {
            return Ok(None);
        };
        if requested == self.content_type || requested == self.mime_type() {
            return Ok(None);
        }

        MediaType::from_base_type(requested)
            .filter(|target| self.media_type.can_convert_to(*target))
            .map(Some)
            .ok_or_else(|| {
                FragmentError::unsupported_conversion(self.content_type.as_str(), requested)
            })
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    /// Refresh `updated`. It always moves forward, by 1 ms when the clock has not.
    pub(crate) fn touch(&mut self) {
        let now = now();
        self.updated = if now > self.updated {
            now
        } else {
            self.updated + Duration::milliseconds(1)
        };
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// RFC 3339 with millisecond precision and a `Z` suffix
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}
