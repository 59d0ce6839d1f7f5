//! Template persistence gateway.
//!
//! Maps a serialized scene + thumbnail raster to durable storage records.
//! Remote persistence is consumed as two capability traits: a blob store
//! (upload bytes → URL) and a record store (insert/update/fetch). The
//! scene serialization is stored whole and never interpreted here.
//!
//! Implemented differently by each host environment:
//! - production: remote object storage + database tables
//! - tests: in-memory doubles

use crate::error::{PersistenceError, UploadError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Curated catalog entries rank below this; saved templates land in
/// [CURATED_RANK_FLOOR, CURATED_RANK_FLOOR + RANK_BAND).
const CURATED_RANK_FLOOR: i64 = 9900;
const RANK_BAND: i64 = 90;

/// Layout mode tag for freely positioned scenes.
pub const MODE_FREEFORM: &str = "freeform";

// ─── Records ─────────────────────────────────────────────────────────────

/// Which page of the product a template designs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageRole {
    Cover,
    Interior,
    Back,
}

/// The persisted layout descriptor: mode tag + embedded scene
/// serialization + page role, encoded as text into `grid_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescriptor {
    pub mode: String,
    pub scene_serialization: String,
    pub page_type: PageRole,
}

impl LayoutDescriptor {
    pub fn freeform(scene_serialization: String, page_type: PageRole) -> Self {
        Self {
            mode: MODE_FREEFORM.to_string(),
            scene_serialization,
            page_type,
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("layout descriptor has no unserializable values")
    }

    pub fn decode(text: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(text)
            .map_err(|e| PersistenceError::Insert(format!("invalid layout descriptor: {e}")))
    }
}

/// One persisted template artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub photo_count: u32,
    /// Encoded `LayoutDescriptor`.
    pub grid_config: String,
    pub category: String,
    pub display_order: i64,
    pub thumbnail_url: Option<String>,
}

// ─── Capability traits ───────────────────────────────────────────────────

/// Blob storage: upload bytes under a path, get a public URL back.
pub trait BlobStore {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<String, UploadError>> + Send;
}

/// Partial record mutation handed to the record store. `None` fields
/// stay untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub photo_count: Option<u32>,
    pub display_order: Option<i64>,
    pub grid_config: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Record storage: upsert + fetch of template records. The store either
/// applies a write fully or rejects it.
pub trait RecordStore {
    fn insert(
        &self,
        record: TemplateRecord,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    fn update(
        &self,
        id: &str,
        patch: RecordPatch,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    fn fetch(&self, id: &str) -> impl Future<Output = Result<TemplateRecord, PersistenceError>> + Send;
}

// ─── Gateway inputs ──────────────────────────────────────────────────────

/// Everything a save needs, gathered by the editor session.
#[derive(Debug, Clone)]
pub struct SaveTemplate {
    pub name: String,
    pub category: String,
    /// Opaque scene serialization from the surface adapter.
    pub scene: String,
    /// Encoded raster from `render_to_image`.
    pub thumbnail: Vec<u8>,
    pub page_role: PageRole,
    pub photo_count: u32,
}

/// Partial update; only supplied fields are re-uploaded/rebuilt.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub photo_count: Option<u32>,
    pub display_order: Option<i64>,
    pub thumbnail: Option<Vec<u8>>,
    pub layout: Option<(String, PageRole)>,
}

impl TemplateUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.photo_count.is_none()
            && self.display_order.is_none()
            && self.thumbnail.is_none()
            && self.layout.is_none()
    }
}

// ─── Gateway ─────────────────────────────────────────────────────────────

/// A distinguishing token for blob paths and record ids: millisecond
/// timestamp spliced with a process-unique counter, so concurrent saves
/// in the same millisecond stay distinct.
fn next_token() -> u64 {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    millis * 1000 + SEQ.fetch_add(1, Ordering::Relaxed) % 1000
}

/// Rank after all curated entries, spread across a small band so
/// concurrently created templates rarely collide.
fn saved_rank(token: u64) -> i64 {
    CURATED_RANK_FLOOR + (token % RANK_BAND as u64) as i64
}

/// Persists serialized scenes + thumbnails as template records.
pub struct TemplateGateway<B: BlobStore, R: RecordStore> {
    blobs: B,
    records: R,
}

impl<B: BlobStore, R: RecordStore> TemplateGateway<B, R> {
    pub fn new(blobs: B, records: R) -> Self {
        Self { blobs, records }
    }

    /// Persist a new template. Returns the generated record id.
    ///
    /// A failed thumbnail upload is non-fatal: the record is written
    /// with `thumbnail_url: None` and the save still succeeds. A
    /// rejected insert is the only error, and it never leaves a
    /// partially written record behind.
    pub async fn save(&self, request: SaveTemplate) -> Result<String, PersistenceError> {
        let token = next_token();
        let path = format!("templates/{}/{}_thumb.png", request.category, token);

        let thumbnail_url = match self.blobs.upload(&path, &request.thumbnail).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("saving template {:?} without thumbnail: {e}", request.name);
                None
            }
        };

        let descriptor = LayoutDescriptor::freeform(request.scene, request.page_role);
        let record = TemplateRecord {
            id: format!("tpl_{token}"),
            name: request.name,
            photo_count: request.photo_count,
            grid_config: descriptor.encode(),
            category: request.category,
            display_order: saved_rank(token),
            thumbnail_url,
        };
        let id = record.id.clone();
        self.records.insert(record).await?;
        Ok(id)
    }

    /// Update supplied fields only; everything else stays untouched.
    ///
    /// Unlike `save`, a failed thumbnail re-upload fails the whole
    /// update: the caller asked for that field, and partial success is
    /// not reported.
    pub async fn update(&self, id: &str, update: TemplateUpdate) -> Result<(), PersistenceError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut patch = RecordPatch {
            name: update.name,
            category: update.category,
            photo_count: update.photo_count,
            display_order: update.display_order,
            ..RecordPatch::default()
        };

        if let Some((scene, page_role)) = update.layout {
            patch.grid_config = Some(LayoutDescriptor::freeform(scene, page_role).encode());
        }

        if let Some(bytes) = update.thumbnail {
            // Path stays keyed by the record's (possibly updated) category.
            let existing = self.records.fetch(id).await?;
            let category = patch.category.as_deref().unwrap_or(&existing.category);
            let path = format!("templates/{}/{}_thumb.png", category, next_token());
            let url = self
                .blobs
                .upload(&path, &bytes)
                .await
                .map_err(|e| PersistenceError::Update(format!("thumbnail re-upload: {e}")))?;
            patch.thumbnail_url = Some(url);
        }

        self.records.update(id, patch).await
    }
}
