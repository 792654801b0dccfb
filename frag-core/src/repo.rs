use bytes::Bytes;
use frag_blob::FragmentDb;
use serde::Serialize;
use tracing::{debug, error};

use crate::{convert, Fragment, FragmentError, FragmentResult};

/// Result of listing an owner's fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FragmentList {
    Ids(Vec<String>),
    Expanded(Vec<Fragment>),
}

impl FragmentList {
    pub fn len(&self) -> usize {
        match self {
            FragmentList::Ids(ids) => ids.len(),
            FragmentList::Expanded(fragments) => fragments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fragment repository over the two storage planes.
///
/// Writes that touch both planes go payload first, then metadata. There is no
/// transaction across the planes: a failed second write is reported and the
/// first one stays.
#[derive(Clone)]
pub struct Fragments {
    db: FragmentDb,
}

impl Fragments {
    pub fn new(db: FragmentDb) -> Self {
        Self { db }
    }

    /// Persist the metadata snapshot, refreshing `updated` first.
    ///
    /// `fragment` is only changed when the write succeeds.
    pub async fn save(&self, fragment: &mut Fragment) -> FragmentResult<()> {
        let mut next = fragment.clone();
        next.touch();
        self.write_metadata(&next).await?;
        *fragment = next;
        Ok(())
    }

    /// Store `data` as the fragment's payload and persist the new size.
    pub async fn set_data(&self, fragment: &mut Fragment, data: impl Into<Bytes>) -> FragmentResult<()> {
        let data = data.into();
        let mut next = fragment.clone();
        next.set_size(data.len() as u64);
        next.touch();

        self.db
            .data()
            .put(next.owner_id(), next.id(), data)
            .await
            .inspect_err(|e| {
                error!(error = %e, owner_id = next.owner_id(), id = next.id(), "payload write failed")
            })?;
        self.write_metadata(&next).await?;

        debug!(owner_id = next.owner_id(), id = next.id(), size = next.size(), "fragment data set");
        *fragment = next;
        Ok(())
    }

    /// Raw payload, `None` when it was never written
    pub async fn get_data(&self, fragment: &Fragment) -> FragmentResult<Option<Bytes>> {
        Ok(self.db.data().get(fragment.owner_id(), fragment.id()).await?)
    }

    /// Payload rendered as `target`, or as stored when `target` is `None` or names
    /// the fragment's own type.
    pub async fn get_converted_data(
        &self,
        fragment: &Fragment,
        target: Option<&str>,
    ) -> FragmentResult<Bytes> {
        let plan = fragment.negotiate(target)?;
        let data = self
            .get_data(fragment)
            .await?
            .ok_or_else(|| FragmentError::not_found(fragment.id()))?;

        let Some(to) = plan else {
            return Ok(data);
        };
        let from = fragment.media_type();
        debug!(id = fragment.id(), source_type = %from, target_type = %to, "converting fragment");

        if to.is_image() {
            tokio::task::spawn_blocking(move || convert::convert(&data, from, to))
                .await
                .map_err(|e| FragmentError::conversion_failed(from, to, e))?
        } else {
            convert::convert(&data, from, to)
        }
    }

    /// Ids of everything the owner has, or the full fragments when `expand` is set
    pub async fn by_owner(&self, owner_id: &str, expand: bool) -> FragmentResult<FragmentList> {
        if !expand {
            return Ok(FragmentList::Ids(self.db.metadata().keys(owner_id).await?));
        }

        let records = self.db.metadata().query(owner_id).await?;
        let fragments = records
            .iter()
            .map(|record| Fragment::from_json(record))
            .collect::<FragmentResult<Vec<_>>>()?;
        Ok(FragmentList::Expanded(fragments))
    }

    pub async fn by_id(&self, owner_id: &str, id: &str) -> FragmentResult<Fragment> {
        let record = self
            .db
            .metadata()
            .get(owner_id, id)
            .await?
            .ok_or_else(|| FragmentError::not_found(id))?;
        Fragment::from_json(&record)
    }

    /// Remove metadata and payload.
    ///
    /// Both deletes are attempted even when one fails; the first failure is
    /// returned and whatever was removed stays removed.
    pub async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()> {
        let (metadata, data) = tokio::join!(
            self.db.metadata().delete(owner_id, id),
            self.db.data().delete(owner_id, id),
        );

        if let Err(e) = &metadata {
            error!(error = %e, owner_id, id, "metadata delete failed");
        }
        if let Err(e) = &data {
            error!(error = %e, owner_id, id, "payload delete failed");
        }
        metadata?;
        data?;

        debug!(owner_id, id, "fragment deleted");
        Ok(())
    }

    /// Replace an existing fragment's payload. The declared type cannot change.
    pub async fn replace_data(
        &self,
        owner_id: &str,
        id: &str,
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> FragmentResult<Fragment> {
        let mut fragment = self.by_id(owner_id, id).await?;
        if content_type != fragment.content_type() {
            return Err(FragmentError::invalid(format!(
                "a fragment's type can not be changed after it is created ({} != {})",
                content_type,
                fragment.content_type()
            )));
        }
        self.set_data(&mut fragment, data).await?;
        Ok(fragment)
    }

    async fn write_metadata(&self, fragment: &Fragment) -> FragmentResult<()> {
        let record = fragment.to_json()?;
        self.db
            .metadata()
            .put(fragment.owner_id(), fragment.id(), record)
            .await
            .inspect_err(|e| {
                error!(
                    error = %e,
                    owner_id = fragment.owner_id(),
                    id = fragment.id(),
                    "metadata write failed"
                )
            })?;
        Ok(())
    }
}
