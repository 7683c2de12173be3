use screenpilot_llm::{GenerateRequest, InlineImage};

#[test]
fn test_generate_request_creation() {
    let request = GenerateRequest::new("gemini-2.5-flash", "Hello");

    assert_eq!(request.model, "gemini-2.5-flash");
    assert_eq!(request.prompt, "Hello");
    assert!(request.image.is_none());
    assert!(!request.search_grounding);
}

#[test]
fn test_generate_request_with_image() {
    let image = InlineImage::new("image/jpeg", vec![1, 2, 3]);
    let request =
        GenerateRequest::new("gemini-2.5-flash", "What is on screen?").with_image(image.clone());

    assert_eq!(request.image, Some(image));
}

#[test]
fn test_generate_request_with_search_grounding() {
    let request = GenerateRequest::new("gemini-2.5-flash", "Plan").with_search_grounding(true);
    assert!(request.search_grounding);
}

#[test]
fn test_generate_request_clone() {
    let request = GenerateRequest::new("gemini-2.5-flash", "Hello").with_search_grounding(true);
    let cloned = request.clone();

    assert_eq!(cloned.model, request.model);
    assert_eq!(cloned.prompt, request.prompt);
    assert_eq!(cloned.search_grounding, request.search_grounding);
}
