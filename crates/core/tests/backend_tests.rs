// ═══════════════════════════════════════════════════════════════════
// Backend Tests: InMemoryBackend semantics, REST/identity helpers
// ═══════════════════════════════════════════════════════════════════

use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::json;

use trade_journal_core::backend::identity::{IdentityClient, TokenResponse};
use trade_journal_core::backend::memory::InMemoryBackend;
use trade_journal_core::backend::rest::{
    delete_outcome, describe_error_body, inserted_row, parse_rows, rpc_result, updated_row, RestBackend,
};
use trade_journal_core::backend::traits::RemoteTable;
use trade_journal_core::errors::CoreError;
use trade_journal_core::models::settings::BackendSettings;

// ═══════════════════════════════════════════════════════════════════
// In-memory backend
// ═══════════════════════════════════════════════════════════════════

mod memory {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_id_and_created_at() {
        let backend = InMemoryBackend::new();
        let row = backend
            .insert("t", json!({ "name": "a" }), None)
            .await
            .unwrap();
        assert!(row["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(row["created_at"].as_str().is_some());
        assert_eq!(row["name"], "a");
        assert_eq!(backend.row_count("t"), 1);
    }

    #[tokio::test]
    async fn created_at_is_strictly_increasing() {
        let backend = InMemoryBackend::new();
        let mut stamps = Vec::new();
        for _ in 0..20 {
            let row = backend.insert("t", json!({}), None).await.unwrap();
            stamps.push(row["created_at"].as_str().unwrap().to_string());
        }
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn select_all_orders_descending() {
        let backend = InMemoryBackend::new();
        for n in 1..=3 {
            backend.insert("t", json!({ "n": n }), None).await.unwrap();
        }
        let rows = backend.select_all("t", "created_at", None).await.unwrap();
        let ns: Vec<i64> = rows.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn unknown_table_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.select_all("nope", "created_at", None).await.unwrap().is_empty());
        assert_eq!(backend.delete_by_id("nope", "x", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn select_and_update_by_id() {
        let backend = InMemoryBackend::new();
        backend.seed("profiles", json!({ "id": "u1", "display_name": null }));

        let found = backend.select_by_id("profiles", "u1", None).await.unwrap();
        assert_eq!(found.unwrap()["id"], "u1");
        assert!(backend.select_by_id("profiles", "u2", None).await.unwrap().is_none());

        let updated = backend
            .update_by_id("profiles", "u1", json!({ "display_name": "Ana" }), None)
            .await
            .unwrap();
        assert_eq!(updated["display_name"], "Ana");
        assert_eq!(backend.rows("profiles")[0]["display_name"], "Ana");
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let backend = InMemoryBackend::new();
        let err = backend
            .update_by_id("profiles", "ghost", json!({}), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn non_object_rows_are_rejected() {
        let backend = InMemoryBackend::new();
        let err = backend.insert("t", json!([1, 2]), None).await.unwrap_err();
        assert!(matches!(err, CoreError::Backend { .. }));
    }

    #[tokio::test]
    async fn offline_fails_every_call_with_network_error() {
        let backend = InMemoryBackend::new();
        backend.set_offline(true);
        assert!(matches!(
            backend.select_all("t", "created_at", None).await,
            Err(CoreError::Network(_))
        ));
        assert!(matches!(
            backend.insert("t", json!({}), None).await,
            Err(CoreError::Network(_))
        ));
        backend.set_offline(false);
        assert!(backend.insert("t", json!({}), None).await.is_ok());
    }

    #[tokio::test]
    async fn rejected_writes_leave_reads_working() {
        let backend = InMemoryBackend::new();
        backend.seed("t", json!({ "id": "a" }));
        backend.reject_writes(Some("read-only".into()));

        assert!(backend.insert("t", json!({}), None).await.is_err());
        assert!(backend.delete_by_id("t", "a", None).await.is_err());
        assert_eq!(backend.select_all("t", "created_at", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rpc_requires_registered_function() {
        let backend = InMemoryBackend::new();
        assert!(backend.rpc("cleanup", json!({}), None).await.is_err());
        backend.register_function("cleanup");
        assert!(backend.rpc("cleanup", json!({}), None).await.is_ok());
    }

    #[tokio::test]
    async fn calls_are_logged_in_order() {
        let backend = InMemoryBackend::new();
        backend.insert("t", json!({ "id": "x" }), None).await.unwrap();
        backend.delete_by_id("t", "x", None).await.unwrap();
        assert_eq!(backend.calls(), vec!["insert t", "delete t/x"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// REST backend
// ═══════════════════════════════════════════════════════════════════

mod rest {
    use super::*;

    #[test]
    fn endpoints_are_built_from_base_url() {
        let settings = BackendSettings::new("https://demo.supabase.co/", "anon");
        let backend = RestBackend::new(&settings).unwrap();
        assert_eq!(backend.name(), "PostgREST");
        assert_eq!(
            backend.table_url("stock_operations"),
            "https://demo.supabase.co/rest/v1/stock_operations"
        );
        assert_eq!(
            backend.rpc_url("delete_stock_operation_dependents"),
            "https://demo.supabase.co/rest/v1/rpc/delete_stock_operation_dependents"
        );
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_url = BackendSettings::new("not a url", "anon");
        assert!(matches!(RestBackend::new(&bad_url), Err(CoreError::Config(_))));

        let no_key = BackendSettings::new("https://demo.supabase.co", "  ");
        assert!(matches!(RestBackend::new(&no_key), Err(CoreError::Config(_))));

        let ftp = BackendSettings::new("ftp://demo.supabase.co", "anon");
        assert!(matches!(IdentityClient::new(&ftp), Err(CoreError::Config(_))));
    }

    #[test]
    fn error_body_with_message_and_details() {
        let body = r#"{"code":"23503","message":"violates foreign key constraint","details":"Key is still referenced"}"#;
        assert_eq!(
            describe_error_body(body),
            "violates foreign key constraint (Key is still referenced)"
        );
    }

    #[test]
    fn error_body_from_identity_service() {
        assert_eq!(describe_error_body(r#"{"msg":"Invalid login credentials"}"#), "Invalid login credentials");
        assert_eq!(
            describe_error_body(r#"{"error":"invalid_grant","error_description":"Refresh token not found"}"#),
            "Refresh token not found"
        );
    }

    #[test]
    fn plain_error_body_is_passed_through() {
        assert_eq!(describe_error_body("  Bad Gateway\n"), "Bad Gateway");
        assert_eq!(describe_error_body(r#"{"hint":null}"#), r#"{"hint":null}"#);
    }
}

// ═══════════════════════════════════════════════════════════════════
// REST response mapping
// ═══════════════════════════════════════════════════════════════════

mod rest_responses {
    use super::*;

    #[test]
    fn rows_of_a_successful_select() {
        let rows = parse_rows(StatusCode::OK, r#"[{"id":"a"},{"id":"b"}]"#, "t").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["id"], "b");
    }

    #[test]
    fn non_array_body_is_a_backend_error() {
        let err = parse_rows(StatusCode::OK, r#"{"id":"a"}"#, "t").unwrap_err();
        match err {
            CoreError::Backend { table, message } => {
                assert_eq!(table, "t");
                assert!(message.starts_with("Expected an array of rows"));
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_body_is_a_deserialization_error() {
        let err = parse_rows(StatusCode::OK, "<html>", "t").unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn error_status_carries_code_and_message() {
        let err = parse_rows(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"JWT expired"}"#,
            "stock_operations",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Backend error (stock_operations): HTTP 401: JWT expired");
    }

    #[test]
    fn delete_counts_echoed_rows() {
        assert_eq!(delete_outcome(StatusCode::OK, r#"[{"id":"x"}]"#, "t", "x").unwrap(), 1);
    }

    #[test]
    fn delete_of_missing_id_counts_zero() {
        assert_eq!(delete_outcome(StatusCode::OK, "[]", "t", "x").unwrap(), 0);
    }

    #[test]
    fn delete_conflict_is_blocked() {
        let body = r#"{"code":"23503","message":"update or delete violates foreign key constraint","details":"Key is still referenced"}"#;
        match delete_outcome(StatusCode::CONFLICT, body, "t", "x").unwrap_err() {
            CoreError::DeleteBlocked { id, message } => {
                assert_eq!(id, "x");
                assert!(message.contains("Key is still referenced"));
            }
            other => panic!("expected DeleteBlocked, got {other:?}"),
        }
    }

    #[test]
    fn delete_server_error_is_a_backend_error() {
        let err = delete_outcome(StatusCode::INTERNAL_SERVER_ERROR, "boom", "t", "x").unwrap_err();
        assert!(matches!(err, CoreError::Backend { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn insert_without_echoed_row_is_an_error() {
        let err = inserted_row(StatusCode::CREATED, "[]", "t").unwrap_err();
        assert_eq!(err.to_string(), "Backend error (t): Insert returned no row");

        let row = inserted_row(StatusCode::CREATED, r#"[{"id":"new"}]"#, "t").unwrap();
        assert_eq!(row["id"], "new");
    }

    #[test]
    fn update_matching_nothing_is_not_found() {
        assert!(updated_row(StatusCode::OK, "[]", "profiles", "u1").unwrap_err().is_not_found());
        let row = updated_row(StatusCode::OK, r#"[{"id":"u1"}]"#, "profiles", "u1").unwrap();
        assert_eq!(row["id"], "u1");
    }

    #[test]
    fn rpc_empty_body_is_null() {
        assert_eq!(rpc_result(StatusCode::NO_CONTENT, "", "f").unwrap(), serde_json::Value::Null);
        assert_eq!(rpc_result(StatusCode::OK, "3", "f").unwrap(), json!(3));
        assert!(rpc_result(StatusCode::NOT_FOUND, r#"{"message":"no such function"}"#, "f").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════

mod identity {
    use super::*;

    fn grant(extra: serde_json::Value) -> TokenResponse {
        let mut body = json!({
            "access_token": "jwt",
            "refresh_token": "refresh",
            "user": { "id": "u1", "email": "a@b.c" }
        });
        if let (Some(map), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                map.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn absolute_expiry_wins() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let session = grant(json!({ "expires_in": 3600, "expires_at": 1_735_700_000 })).into_session(now);
        assert_eq!(session.expires_at, Utc.timestamp_opt(1_735_700_000, 0).single());
        assert_eq!(session.user_id(), "u1");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
    }

    #[test]
    fn relative_expiry_is_added_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let session = grant(json!({ "expires_in": 3600 })).into_session(now);
        assert_eq!(
            session.expires_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap())
        );
        assert!(!session.is_expired(now));
        assert!(session.is_expired(Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap()));
    }

    #[test]
    fn no_expiry_never_expires() {
        let session = grant(json!({})).into_session(Utc::now());
        assert_eq!(session.expires_at, None);
        assert!(!session.is_expired(Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn debug_output_hides_tokens() {
        let session = grant(json!({})).into_session(Utc::now());
        let shown = format!("{session:?}");
        assert!(!shown.contains("jwt"));
        assert!(shown.contains("<redacted>"));
    }
}
