//! Integration tests: template gateway over in-memory store doubles,
//! fed with real scene serializations from the surface adapter.
//!
//! The doubles implement the capability traits on shared references, so
//! each test keeps ownership for inspection while the gateway holds a
//! borrow.

use maq_core::model::{Node, StyleDefaults};
use maq_store::error::{PersistenceError, UploadError};
use maq_store::templates::{
    BlobStore, LayoutDescriptor, PageRole, RecordPatch, RecordStore, SaveTemplate,
    TemplateGateway, TemplateRecord, TemplateUpdate,
};
use maq_surface::{NullBackend, Surface};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

// ─── Store doubles ──────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryBlobs {
    fail: AtomicBool,
    uploads: Mutex<Vec<String>>,
}

impl MemoryBlobs {
    fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

impl BlobStore for &MemoryBlobs {
    async fn upload(&self, path: &str, _bytes: &[u8]) -> Result<String, UploadError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(UploadError("storage quota exceeded".into()));
        }
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(format!("https://cdn.example/{path}"))
    }
}

#[derive(Default)]
struct MemoryRecords {
    reject_writes: AtomicBool,
    rows: Mutex<HashMap<String, TemplateRecord>>,
}

impl MemoryRecords {
    fn get(&self, id: &str) -> Option<TemplateRecord> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl RecordStore for &MemoryRecords {
    async fn insert(&self, record: TemplateRecord) -> Result<(), PersistenceError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Insert("connection reset".into()));
        }
        self.rows.lock().unwrap().insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, id: &str, patch: RecordPatch) -> Result<(), PersistenceError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Update("connection reset".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(id)
            .ok_or_else(|| PersistenceError::UnknownId(id.to_string()))?;
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(category) = patch.category {
            row.category = category;
        }
        if let Some(photo_count) = patch.photo_count {
            row.photo_count = photo_count;
        }
        if let Some(display_order) = patch.display_order {
            row.display_order = display_order;
        }
        if let Some(grid_config) = patch.grid_config {
            row.grid_config = grid_config;
        }
        if let Some(thumbnail_url) = patch.thumbnail_url {
            row.thumbnail_url = Some(thumbnail_url);
        }
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<TemplateRecord, PersistenceError> {
        self.get(id)
            .ok_or_else(|| PersistenceError::UnknownId(id.to_string()))
    }
}

// ─── Fixtures ───────────────────────────────────────────────────────────

fn page_serialization() -> String {
    let mut surface =
        Surface::new("tpl-page", 700.0, 900.0, StyleDefaults::default(), NullBackend);
    surface.add_node(Node::image("uploads/1/a.jpg").with_frame(40.0, 40.0, 300.0, 200.0));
    surface.add_node(Node::image("uploads/1/b.jpg").with_frame(360.0, 40.0, 300.0, 200.0));
    surface.serialize()
}

fn save_request() -> SaveTemplate {
    SaveTemplate {
        name: "Deux photos".into(),
        category: "albums".into(),
        scene: page_serialization(),
        thumbnail: vec![0x89, 0x50, 0x4E, 0x47],
        page_role: PageRole::Interior,
        photo_count: 2,
    }
}

// ─── Save ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_writes_record_with_thumbnail_and_rank() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);

    let id = gateway.save(save_request()).await.unwrap();

    let record = records.get(&id).unwrap();
    assert_eq!(record.name, "Deux photos");
    assert_eq!(record.category, "albums");
    assert_eq!(record.photo_count, 2);
    assert!(record.display_order >= 9900);
    assert!(record.display_order < 9990);

    let url = record.thumbnail_url.as_deref().unwrap();
    assert!(url.starts_with("https://cdn.example/templates/albums/"));
    assert!(url.ends_with("_thumb.png"));
}

#[tokio::test]
async fn save_embeds_scene_serialization_whole() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);

    let request = save_request();
    let scene = request.scene.clone();
    let id = gateway.save(request).await.unwrap();

    let record = records.get(&id).unwrap();
    let descriptor = LayoutDescriptor::decode(&record.grid_config).unwrap();
    assert_eq!(descriptor.mode, "freeform");
    assert_eq!(descriptor.page_type, PageRole::Interior);
    assert_eq!(descriptor.scene_serialization, scene);

    // The embedded blob restores losslessly.
    let restored = maq_core::deserialize_scene(&descriptor.scene_serialization).unwrap();
    assert_eq!(restored.len(), 2);
}

#[tokio::test]
async fn save_with_failing_upload_still_returns_id_and_null_thumbnail() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    blobs.fail.store(true, Ordering::SeqCst);
    let gateway = TemplateGateway::new(&blobs, &records);

    let id = gateway.save(save_request()).await.unwrap();
    assert_eq!(records.get(&id).unwrap().thumbnail_url, None);
}

#[tokio::test]
async fn rejected_insert_surfaces_error_and_writes_nothing() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    records.reject_writes.store(true, Ordering::SeqCst);
    let gateway = TemplateGateway::new(&blobs, &records);

    let result = gateway.save(save_request()).await;
    assert!(matches!(result, Err(PersistenceError::Insert(_))));
    assert_eq!(records.len(), 0);
}

#[tokio::test]
async fn concurrent_saves_get_distinct_ids_and_paths() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);

    let (a, b) = tokio::join!(gateway.save(save_request()), gateway.save(save_request()));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a, b);
    let uploads = blobs.uploads();
    assert_eq!(uploads.len(), 2);
    assert_ne!(uploads[0], uploads[1]);
}

// ─── Update ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_touches_only_supplied_fields() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);
    let id = gateway.save(save_request()).await.unwrap();
    let before = records.get(&id).unwrap();

    gateway
        .update(
            &id,
            TemplateUpdate {
                name: Some("Deux photos — retouche".into()),
                ..TemplateUpdate::default()
            },
        )
        .await
        .unwrap();

    let after = records.get(&id).unwrap();
    assert_eq!(after.name, "Deux photos — retouche");
    assert_eq!(after.grid_config, before.grid_config);
    assert_eq!(after.thumbnail_url, before.thumbnail_url);
    assert_eq!(after.display_order, before.display_order);
}

#[tokio::test]
async fn update_rebuilds_layout_descriptor() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);
    let id = gateway.save(save_request()).await.unwrap();

    gateway
        .update(
            &id,
            TemplateUpdate {
                layout: Some((page_serialization(), PageRole::Cover)),
                ..TemplateUpdate::default()
            },
        )
        .await
        .unwrap();

    let record = records.get(&id).unwrap();
    let descriptor = LayoutDescriptor::decode(&record.grid_config).unwrap();
    assert_eq!(descriptor.page_type, PageRole::Cover);
}

#[tokio::test]
async fn update_reuploads_thumbnail_under_record_category() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);
    let id = gateway.save(save_request()).await.unwrap();

    gateway
        .update(
            &id,
            TemplateUpdate {
                thumbnail: Some(vec![1, 2, 3]),
                ..TemplateUpdate::default()
            },
        )
        .await
        .unwrap();

    let record = records.get(&id).unwrap();
    assert!(
        record
            .thumbnail_url
            .as_deref()
            .unwrap()
            .contains("/templates/albums/")
    );
}

#[tokio::test]
async fn update_with_failing_reupload_fails_whole_update() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);
    let id = gateway.save(save_request()).await.unwrap();
    let before = records.get(&id).unwrap();

    blobs.fail.store(true, Ordering::SeqCst);
    let result = gateway
        .update(
            &id,
            TemplateUpdate {
                name: Some("should not land".into()),
                thumbnail: Some(vec![1]),
                ..TemplateUpdate::default()
            },
        )
        .await;

    assert!(matches!(result, Err(PersistenceError::Update(_))));
    assert_eq!(records.get(&id).unwrap(), before);
}

#[tokio::test]
async fn update_unknown_id_reports_unknown() {
    let (blobs, records) = (MemoryBlobs::default(), MemoryRecords::default());
    let gateway = TemplateGateway::new(&blobs, &records);

    let result = gateway
        .update(
            "tpl_missing",
            TemplateUpdate {
                thumbnail: Some(vec![1]),
                ..TemplateUpdate::default()
            },
        )
        .await;
    assert!(matches!(result, Err(PersistenceError::UnknownId(_))));
}
