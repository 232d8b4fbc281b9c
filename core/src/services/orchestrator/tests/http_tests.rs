use crate::services::orchestrator::extract_bearer;

#[test]
fn test_extract_bearer() {
    assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
    assert_eq!(extract_bearer("bearer   abc.def  "), Some("abc.def"));
    assert_eq!(extract_bearer("BEARER abc"), Some("abc"));
}

#[test]
fn test_extract_bearer_rejects_other_schemes() {
    assert_eq!(extract_bearer("Basic dXNlcjpwYXNz"), None);
    assert_eq!(extract_bearer("Bearer "), None);
    assert_eq!(extract_bearer("Bear"), None);
    assert_eq!(extract_bearer(""), None);
}
