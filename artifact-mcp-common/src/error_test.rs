//! Property-based tests for error module.
//!
//! Error messages must carry enough context for the caller to act on them,
//! and only caller-caused kinds may skip the "unexpected" prefix.

use proptest::prelude::*;

use crate::error::{Error, GcsError, GcsOperation};

fn message_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{1,100}"
}

fn asset_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,20}\\.(onnx|bin)"
}

fn gcs_location_strategy() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9-]{2,20}", "[a-z0-9/._-]{1,50}")
        .prop_map(|(bucket, object)| format!("gs://{}/{}", bucket, object))
}

fn gcs_operation_strategy() -> impl Strategy<Value = GcsOperation> {
    prop_oneof![
        Just(GcsOperation::Upload),
        Just(GcsOperation::Download),
        Just(GcsOperation::List),
    ]
}

proptest! {
    /// Asset acquisition errors always name the asset and keep the cause.
    #[test]
    fn asset_error_includes_asset_and_cause(
        asset in asset_name_strategy(),
        message in message_strategy()
    ) {
        let err = Error::asset_acquisition(&asset, &message);
        let text = err.user_message();
        prop_assert!(text.contains(&asset), "missing asset name in: {}", text);
        prop_assert!(text.contains(&message), "missing cause in: {}", text);
    }

    /// GCS failures include the object location and the operation.
    #[test]
    fn gcs_error_includes_location_and_operation(
        uri in gcs_location_strategy(),
        operation in gcs_operation_strategy(),
        message in message_strategy()
    ) {
        let err = GcsError::operation_failed(&uri, operation, &message);
        let text = err.to_string();
        prop_assert!(text.contains(&uri));
        prop_assert!(text.contains(&operation.to_string()));
        prop_assert!(text.contains(&message));
    }

    /// Infrastructure errors are reported to callers as unexpected.
    #[test]
    fn gcs_errors_surface_as_unexpected(
        uri in gcs_location_strategy(),
        message in message_strategy()
    ) {
        let err: Error = GcsError::operation_failed(&uri, GcsOperation::Download, &message).into();
        prop_assert!(!err.is_caller_error());
        prop_assert!(err.user_message().starts_with("An unexpected error occurred: "));
    }

    /// Not-found messages cross the boundary untouched.
    #[test]
    fn not_found_message_is_verbatim(message in message_strategy()) {
        let err = Error::not_found(&message);
        prop_assert!(err.is_caller_error());
        prop_assert_eq!(err.user_message(), message);
    }
}
