use std::future::{ready, Ready};

use actix_web::{FromRequest, HttpRequest};

use crate::{errors::AppError, models::domain::StoreCoordinates, vault::EncryptionMode};

pub const STORE_ID_HEADER: &str = "x-store-id";
pub const BUCKET_HEADER: &str = "x-bucket";
pub const VAULT_PASSWORD_HEADER: &str = "x-vault-password";

/// Operator coordinates and encryption mode carried on every `/api` request.
#[derive(Debug, Clone)]
pub struct TenantHeaders {
    pub coordinates: StoreCoordinates,
    pub mode: EncryptionMode,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|h| h.to_str().ok())
}

impl FromRequest for TenantHeaders {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let coordinates = StoreCoordinates::new(
            header(req, STORE_ID_HEADER).unwrap_or_default(),
            header(req, BUCKET_HEADER).unwrap_or_default(),
        );

        ready(coordinates.map(|coordinates| TenantHeaders {
            coordinates,
            mode: EncryptionMode::from_password(header(req, VAULT_PASSWORD_HEADER)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_extracts_coordinates_and_mode() {
        let req = TestRequest::default()
            .insert_header((STORE_ID_HEADER, "store-1"))
            .insert_header((BUCKET_HEADER, " fantoms "))
            .insert_header((VAULT_PASSWORD_HEADER, "hunter2"))
            .to_http_request();

        let headers = TenantHeaders::extract(&req).await.unwrap();
        assert_eq!(headers.coordinates.bucket, "fantoms");
        assert!(matches!(headers.mode, EncryptionMode::Password(_)));
    }

    #[actix_web::test]
    async fn test_missing_bucket_is_rejected() {
        let req = TestRequest::default()
            .insert_header((STORE_ID_HEADER, "store-1"))
            .to_http_request();

        let err = TenantHeaders::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn test_without_password_uses_fixed_secret() {
        let req = TestRequest::default()
            .insert_header((STORE_ID_HEADER, "store-1"))
            .insert_header((BUCKET_HEADER, "fantoms"))
            .to_http_request();

        let headers = TenantHeaders::extract(&req).await.unwrap();
        assert!(matches!(headers.mode, EncryptionMode::FixedSecret));
    }
}
