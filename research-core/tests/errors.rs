use research_core::ResearchError;

#[test]
fn invalid_params_maps_to_json_rpc_invalid_params_code() {
    let err = ResearchError::invalid_params("missing ticker");
    assert_eq!(err.json_rpc_code(), -32602);
}

#[test]
fn task_not_found_maps_to_reserved_error_code() {
    let err = ResearchError::task_not_found("abc-123");
    assert_eq!(err.json_rpc_code(), -32001);
}

#[test]
fn retryable_statuses_match_the_documented_set() {
    for status in [429, 500, 502, 503, 504] {
        assert!(ResearchError::is_retryable_status(status));
    }
    for status in [400, 401, 403, 404] {
        assert!(!ResearchError::is_retryable_status(status));
    }
}
