use std::io::{Cursor, Read};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;

use simavi::application::ports::{ImageRepository, ImageStore};
use simavi::application::services::{ExportError, ExportService, generate_csv, generate_json};
use simavi::domain::{
    AnalysisStatus, CompletedAnalysis, Identity, Image, ImageId, StoragePath, UserId,
};
use simavi::infrastructure::persistence::InMemoryImageRepository;
use simavi::infrastructure::storage::ObjectImageStore;

fn analysed_image(original: &str, new_name: &str) -> Image {
    let id = ImageId::new();
    let mut image = Image::new(
        id,
        None,
        original.to_string(),
        StoragePath::for_upload("", &id, original),
        3,
        "image/jpeg".to_string(),
    );
    image.new_name = Some(new_name.to_string());
    image.objects = Some(vec!["dog".to_string(), "grass".to_string()]);
    image.analysis_status = AnalysisStatus::Completed;
    image
}

#[test]
fn given_no_images_when_generating_csv_then_only_header_is_written() {
    let csv = generate_csv(&[]).unwrap();

    assert_eq!(
        csv,
        "Original Name,New Name,Objects,Detected Text,Location,Metadata\n"
    );
}

#[test]
fn given_analysed_image_when_generating_csv_then_every_field_is_quoted() {
    let image = analysed_image("IMG_1.jpg", "Dog_001.jpg");

    let csv = generate_csv(&[image]).unwrap();

    let row = csv.lines().nth(1).unwrap();
    assert_eq!(
        row,
        r#""IMG_1.jpg","Dog_001.jpg","[""dog"",""grass""]","","","""#
    );
    assert!(csv.ends_with('\n'));
}

#[test]
fn given_quotes_and_newlines_in_text_when_generating_csv_then_row_stays_on_one_line() {
    let mut image = analysed_image("say \"cheese\".jpg", "Cheese_002.jpg");
    image.detected_text = Some("Line one\nLine two".to_string());

    let csv = generate_csv(&[image]).unwrap();

    assert_eq!(csv.lines().count(), 2);
    let row = csv.lines().nth(1).unwrap();
    assert!(row.starts_with(r#""say ""cheese"".jpg""#));
    assert!(row.contains(r#""Line one Line two""#));
}

#[test]
fn given_analysed_image_when_generating_json_then_fields_are_camel_case() {
    let image = analysed_image("IMG_1.jpg", "Dog_001.jpg");

    let json = generate_json(&[image]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let entry = &value[0];
    assert_eq!(entry["originalName"], "IMG_1.jpg");
    assert_eq!(entry["newName"], "Dog_001.jpg");
    assert_eq!(entry["analysisStatus"], "completed");
    assert_eq!(entry["objects"], r#"["dog","grass"]"#);
    assert!(entry["cloudStoragePath"].is_string());
    assert!(json.contains("\n  "));
}

struct Fixture {
    service: ExportService,
    images: Arc<InMemoryImageRepository>,
    store: Arc<ObjectImageStore>,
    identity: Identity,
    owner: UserId,
}

fn fixture() -> Fixture {
    let images = Arc::new(InMemoryImageRepository::new());
    let store = Arc::new(ObjectImageStore::in_memory());
    let owner = UserId::new();
    Fixture {
        service: ExportService::new(images.clone(), store.clone()),
        images,
        store,
        identity: Identity::User {
            user_id: owner,
            email: "owner@example.com".to_string(),
        },
        owner,
    }
}

async fn add_completed(fx: &Fixture, original: &str, new_name: &str, bytes: Option<&[u8]>) {
    let id = ImageId::new();
    let path = StoragePath::for_upload("", &id, original);
    if let Some(bytes) = bytes {
        let stream = futures::stream::iter(vec![Ok(Bytes::copy_from_slice(bytes))]).boxed();
        fx.store.store(&path, stream).await.unwrap();
    }
    let image = Image::new(
        id,
        Some(fx.owner),
        original.to_string(),
        path,
        3,
        "image/jpeg".to_string(),
    );
    fx.images.create(&image).await.unwrap();
    fx.images.begin_analysis(id).await.unwrap();
    fx.images
        .complete_analysis(
            id,
            &CompletedAnalysis {
                new_name: new_name.to_string(),
                objects: vec!["dog".to_string()],
                detected_text: None,
                location: None,
            },
        )
        .await
        .unwrap();
}

fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut reader = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut names: Vec<String> = reader.file_names().map(str::to_string).collect();
    names.sort();
    for name in &names {
        let mut contents = Vec::new();
        reader
            .by_name(name)
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert!(!contents.is_empty());
    }
    names
}

#[tokio::test]
async fn given_no_analysed_images_when_zipping_then_nothing_to_export() {
    let fx = fixture();

    let result = fx.service.zip(&fx.identity).await;

    assert!(matches!(result, Err(ExportError::NothingToExport)));
}

#[tokio::test]
async fn given_analysed_images_when_zipping_then_entries_use_new_names() {
    let fx = fixture();
    add_completed(&fx, "a.jpg", "Dog_001.jpg", Some(b"aaa")).await;
    add_completed(&fx, "b.jpg", "Cat_002.jpg", Some(b"bbb")).await;

    let archive = fx.service.zip(&fx.identity).await.unwrap();

    assert_eq!(entry_names(&archive), vec!["Cat_002.jpg", "Dog_001.jpg"]);
}

#[tokio::test]
async fn given_missing_object_when_zipping_then_it_is_skipped() {
    let fx = fixture();
    add_completed(&fx, "a.jpg", "Dog_001.jpg", Some(b"aaa")).await;
    add_completed(&fx, "gone.jpg", "Ghost_002.jpg", None).await;

    let archive = fx.service.zip(&fx.identity).await.unwrap();

    assert_eq!(entry_names(&archive), vec!["Dog_001.jpg"]);
}

#[tokio::test]
async fn given_duplicate_new_names_when_zipping_then_first_entry_wins() {
    let fx = fixture();
    add_completed(&fx, "a.jpg", "Dog_001.jpg", Some(b"aaa")).await;
    add_completed(&fx, "b.jpg", "Dog_001.jpg", Some(b"bbb")).await;

    let archive = fx.service.zip(&fx.identity).await.unwrap();

    assert_eq!(entry_names(&archive), vec!["Dog_001.jpg"]);
}

#[tokio::test]
async fn given_pending_image_when_exporting_csv_then_it_is_excluded() {
    let fx = fixture();
    add_completed(&fx, "a.jpg", "Dog_001.jpg", Some(b"aaa")).await;
    let pending_id = ImageId::new();
    fx.images
        .create(&Image::new(
            pending_id,
            Some(fx.owner),
            "pending.jpg".to_string(),
            StoragePath::for_upload("", &pending_id, "pending.jpg"),
            3,
            "image/jpeg".to_string(),
        ))
        .await
        .unwrap();

    let csv = fx.service.csv(&fx.identity).await.unwrap();

    assert_eq!(csv.lines().count(), 2);
    assert!(!csv.contains("pending.jpg"));
}
