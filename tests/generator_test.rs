mod common;

#[test]
fn test_generate_events() {
    let output_path = std::path::PathBuf::from("test_generated_events.csv");
    common::generate_events(&output_path, 5).expect("Failed to generate CSV");

    let content = std::fs::read_to_string(&output_path).expect("Failed to read file");
    // Header + one park and one unpark per vehicle
    assert_eq!(content.lines().count(), 11);
    assert!(content.contains("park,2,2,CAR-0,2024-01-01T00:00:00Z"));
    assert!(content.contains("unpark,2,2,CAR-4,2024-01-01T05:04:00Z"));

    std::fs::remove_file(output_path).ok();
}
