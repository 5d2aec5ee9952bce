#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;
    use utoipa::openapi::{RefOr, schema::Schema};

    fn properties_of(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components are generated");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            Some(_) => panic!("{} should be an object schema", name),
            None => panic!("{} is missing from the components", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let json = serde_json::to_string(&openapi).expect("schema serializes");
        assert!(json.contains("DesignDesk"));
    }

    #[test]
    fn test_every_site_route_is_documented() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/",
            "/health",
            "/about_us/",
            "/sign_up/",
            "/sign_in/",
            "/sign_out/",
            "/settings/",
            "/change_password/",
            "/custom_password_reset/",
            "/reset/{token}/",
            "/portfolio/",
            "/portfolio/{item_id}/",
            "/orders/",
            "/orders/{order_id}/",
            "/discussions/",
            "/discussions/{discussion_id}/",
            "/add_comment/{discussion_id}/",
            "/client_dashboard/",
            "/designer_dashboard/",
            "/client_specific_view/",
            "/designer_specific_view/",
        ] {
            assert!(paths.contains_key(path), "{} is missing from the API docs", path);
        }
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = properties_of("ErrorResponse");
        for field in ["error", "code", "success", "fields"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_account_summary_hides_password_hash() {
        let properties = properties_of("AccountSummary");
        assert!(properties.iter().any(|p| p == "username"));
        assert!(properties.iter().any(|p| p == "role"));
        assert!(!properties.iter().any(|p| p.contains("password")));
    }

    #[test]
    fn test_comment_form_has_no_owner_fields() {
        let properties = properties_of("CommentForm");
        assert_eq!(properties, vec!["content".to_string()]);
    }
}
