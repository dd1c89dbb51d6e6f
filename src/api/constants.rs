//! Endpoint paths and headers of the document store HTTP surface

pub const DOCUMENTS_PATH: &str = "documents";
pub const RESPONSES_PATH: &str = "responses";

/// Query string asking for the full record, image payload included
pub const INCLUDE_IMAGES_QUERY: &str = "include=images";

pub const USER_AGENT: &str = "survey-studio/0.1";

pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const X_CORRELATION_ID: &str = "x-correlation-id";
}

/// Collection endpoint listing every document
pub fn documents_endpoint(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), DOCUMENTS_PATH)
}

/// Endpoint of one project's document
pub fn document_endpoint(base_url: &str, project_id: &str) -> String {
    format!(
        "{}/{}",
        documents_endpoint(base_url),
        urlencoding::encode(project_id)
    )
}

/// Endpoint of one project's document with the image payload included
pub fn full_document_endpoint(base_url: &str, project_id: &str) -> String {
    format!(
        "{}?{}",
        document_endpoint(base_url, project_id),
        INCLUDE_IMAGES_QUERY
    )
}

pub fn responses_endpoint(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), RESPONSES_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let base = "http://localhost:3001/api/";
        assert_eq!(documents_endpoint(base), "http://localhost:3001/api/documents");
        assert_eq!(
            document_endpoint(base, "project one"),
            "http://localhost:3001/api/documents/project%20one"
        );
        assert_eq!(
            full_document_endpoint(base, "p1"),
            "http://localhost:3001/api/documents/p1?include=images"
        );
        assert_eq!(responses_endpoint(base), "http://localhost:3001/api/responses");
    }
}
