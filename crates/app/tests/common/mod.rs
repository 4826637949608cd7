#![allow(dead_code)]

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};

use kosmos_app::{Bootstrapped, bootstrap};
use kosmos_auth::{Caller, JwtClaims};
use kosmos_core::UserId;
use kosmos_infra::AppConfig;
use kosmos_parties::CreateCustomer;

pub const SECRET: &str = "integration-secret";

pub fn config() -> AppConfig {
    AppConfig {
        jwt_secret: SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn boot() -> Bootstrapped {
    bootstrap(&config())
}

pub fn mint_jwt(secret: &str, sub: UserId) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        iat: now - Duration::seconds(5),
        exp: now + Duration::minutes(10),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

/// A caller presenting a valid token for itself.
pub fn caller(id: i32) -> Caller {
    let user = UserId::new(id);
    Caller::new(user, mint_jwt(SECRET, user))
}

pub fn acme(caller: Caller) -> CreateCustomer {
    CreateCustomer {
        caller,
        customer_name: "Acme Corp".into(),
        customer_description: None,
        phone: "555-0100".into(),
        fax: None,
        general_email: Some("ap@acme.test".into()),
        website: None,
        category: "Wholesale".into(),
        is_taxable: true,
        tax_rate: 825,
    }
}
