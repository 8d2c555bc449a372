use simavi::domain::{ImageId, StoragePath};

#[test]
fn given_image_id_and_filename_when_creating_upload_path_then_format_is_prefix_uploads_uuid_name() {
    let id = ImageId::new();

    let path = StoragePath::for_upload("tenant/", &id, "holiday.jpg");

    assert_eq!(
        path.as_str(),
        format!("tenant/uploads/{}-holiday.jpg", id.as_uuid())
    );
}

#[test]
fn given_filename_with_directories_when_creating_upload_path_then_only_basename_is_kept() {
    let id = ImageId::new();

    let unix = StoragePath::for_upload("", &id, "../../etc/passwd");
    let windows = StoragePath::for_upload("", &id, r"C:\Users\me\cat.png");

    assert_eq!(unix.as_str(), format!("uploads/{}-passwd", id.as_uuid()));
    assert_eq!(windows.as_str(), format!("uploads/{}-cat.png", id.as_uuid()));
}

#[test]
fn given_two_images_when_creating_paths_then_paths_differ() {
    let path_a = StoragePath::for_upload("", &ImageId::new(), "same.jpg");
    let path_b = StoragePath::for_upload("", &ImageId::new(), "same.jpg");

    assert_ne!(path_a, path_b);
}

#[test]
fn given_storage_path_when_displayed_then_matches_as_str() {
    let path = StoragePath::from_raw("uploads/x.jpg");

    assert_eq!(format!("{path}"), path.as_str());
}
