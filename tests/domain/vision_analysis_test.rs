use simavi::domain::{VisionAnalysis, generate_filename};

#[test]
fn given_full_model_answer_when_parsing_then_fields_are_read() {
    let raw = r#"{
        "objects": ["sign", "pole"],
        "detectedText": "Main St",
        "location": "Springfield",
        "mainObject": "sign",
        "isSign": true,
        "isLocationFromMetadata": false,
        "isPrimaryObjectCentral": true
    }"#;

    let analysis = VisionAnalysis::parse(raw).unwrap();

    assert_eq!(analysis.objects(), vec!["sign", "pole"]);
    assert_eq!(analysis.detected_text().as_deref(), Some("Main St"));
    assert_eq!(analysis.location().as_deref(), Some("Springfield"));
    assert_eq!(analysis.is_sign, Some(true));
}

#[test]
fn given_answer_in_code_fence_when_parsing_then_fence_is_ignored() {
    let raw = "```json\n{\"mainObject\": \"Dog\"}\n```";

    let analysis = VisionAnalysis::parse(raw).unwrap();

    assert_eq!(analysis.main_object.as_deref(), Some("Dog"));
}

#[test]
fn given_sparse_answer_when_parsing_then_missing_fields_default() {
    let analysis = VisionAnalysis::parse("{}").unwrap();

    assert!(analysis.objects().is_empty());
    assert_eq!(analysis.detected_text(), None);
    assert_eq!(analysis.location(), None);
}

#[test]
fn given_prose_instead_of_json_when_parsing_then_error() {
    assert!(VisionAnalysis::parse("I see a dog.").is_err());
}

#[test]
fn given_model_reported_location_when_building_filename_then_location_is_not_trusted() {
    let analysis =
        VisionAnalysis::parse(r#"{"location": "Paris", "mainObject": "Tower"}"#).unwrap();

    let request = analysis.filename_request(4, "jpg");

    assert!(!request.location_is_trusted);
    assert_eq!(generate_filename(&request), "Tower_004.jpg");
}
