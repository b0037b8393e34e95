//! Credential verification.
//!
//! Checks run in a fixed order and stop at the first failure:
//! shape, transport prefix, declared algorithm + MAC, expiry, activation.
//! Verification is a pure function of the presented string, the signing
//! context and `now`; it never touches storage or the network.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::Algorithm;
use jsonwebtoken::errors::ErrorKind;
use serde::Deserialize;

use crate::claims::WireClaims;
use crate::{Claims, CredentialKind, SigningContext, VerificationFailure};

/// Scheme label a transport may leave in front of the credential.
pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Deserialize)]
struct DeclaredHeader {
    alg: String,
}

#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    ctx: Arc<SigningContext>,
}

impl CredentialVerifier {
    pub fn new(ctx: Arc<SigningContext>) -> Self {
        Self { ctx }
    }

    /// Verify a credential of either kind.
    pub fn verify(&self, presented: &str) -> Result<Claims, VerificationFailure> {
        self.verify_at(presented, Utc::now())
    }

    pub fn verify_at(&self, presented: &str, now: DateTime<Utc>) -> Result<Claims, VerificationFailure> {
        let token = strip_transport_prefix(presented)?;
        let claims = self.decode_signed(token)?;
        claims.check_window(now)?;
        Ok(claims)
    }

    /// Verify and require the full access claim set.
    pub fn verify_access(&self, presented: &str) -> Result<Claims, VerificationFailure> {
        self.verify_kind_at(presented, CredentialKind::Access, Utc::now())
    }

    /// Verify and require a renewal credential (no authorization fields).
    pub fn verify_renewal(&self, presented: &str) -> Result<Claims, VerificationFailure> {
        self.verify_kind_at(presented, CredentialKind::Renewal, Utc::now())
    }

    pub fn verify_kind_at(
        &self,
        presented: &str,
        expected: CredentialKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, VerificationFailure> {
        let claims = self.verify_at(presented, now)?;
        if claims.kind() != expected {
            return Err(VerificationFailure::WrongKind { expected });
        }
        Ok(claims)
    }

    fn decode_signed(&self, token: &str) -> Result<Claims, VerificationFailure> {
        let declared = declared_algorithm(token)?;
        match declared.parse::<Algorithm>() {
            Ok(alg) if alg == self.ctx.algorithm() => {}
            _ => return Err(VerificationFailure::InvalidSignature),
        }

        let data = jsonwebtoken::decode::<WireClaims>(token, self.ctx.decoding_key(), &self.ctx.validation())
            .map_err(|e| classify(e.kind()))?;

        Claims::from_wire(data.claims)
    }
}

/// Reject empty / wrongly shaped input, then drop an exact `"Bearer "` label.
fn strip_transport_prefix(presented: &str) -> Result<&str, VerificationFailure> {
    let presented = presented.trim();
    if presented.is_empty() {
        return Err(VerificationFailure::Malformed);
    }

    let token = presented.strip_prefix(BEARER_PREFIX).unwrap_or(presented).trim();

    // header.payload.signature; an empty signature is left to the algorithm
    // check so that unsigned tokens surface as signature failures.
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(_), None) if !header.is_empty() && !payload.is_empty() => Ok(token),
        _ => Err(VerificationFailure::Malformed),
    }
}

// Decoded by hand: `jsonwebtoken::decode_header` fails on `"alg":"none"`, which must surface as InvalidSignature.
fn declared_algorithm(token: &str) -> Result<String, VerificationFailure> {
    let header = token.split('.').next().ok_or(VerificationFailure::Malformed)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| VerificationFailure::Malformed)?;
    let header: DeclaredHeader = serde_json::from_slice(&bytes).map_err(|_| VerificationFailure::Malformed)?;
    Ok(header.alg)
}

fn classify(kind: &ErrorKind) -> VerificationFailure {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => VerificationFailure::InvalidSignature,
        ErrorKind::ExpiredSignature => VerificationFailure::Expired,
        ErrorKind::ImmatureSignature => VerificationFailure::NotYetValid,
        _ => VerificationFailure::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use jsonwebtoken::{EncodingKey, Header};
    use proptest::prelude::*;
    use serde_json::json;

    use pvara_core::{OrganizationId, SubjectId};

    use super::*;
    use crate::{CredentialIssuer, Identity, Role};

    fn context(secret: &str) -> Arc<SigningContext> {
        Arc::new(SigningContext::with_default_lifetimes(secret).unwrap())
    }

    fn pair(secret: &str) -> (CredentialIssuer, CredentialVerifier) {
        let ctx = context(secret);
        (CredentialIssuer::new(ctx.clone()), CredentialVerifier::new(ctx))
    }

    fn identity() -> Identity {
        Identity::new(
            SubjectId::parse("u1").unwrap(),
            "a@b.com",
            Role::Recruiter,
            OrganizationId::parse("org1").unwrap(),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    fn forge(alg: Algorithm, secret: &str, claims: serde_json::Value) -> String {
        jsonwebtoken::encode(&Header::new(alg), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn access_round_trip_returns_identity_fields() {
        let (issuer, verifier) = pair("k1");
        let credential = issuer.issue_access_at(&identity(), t0()).unwrap();

        let claims = verifier.verify_at(credential.as_str(), t0()).unwrap();
        assert_eq!(claims.subject_id, identity().subject_id);
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
        assert_eq!(claims.role, Some(Role::Recruiter));
        assert_eq!(claims.organization_id, Some(identity().organization_id));
        assert_eq!(claims.expires_at, t0() + Duration::seconds(900));
    }

    #[test]
    fn renewal_round_trip_has_no_role_or_org() {
        let (issuer, verifier) = pair("k1");
        let credential = issuer.issue_renewal_at(&identity(), t0()).unwrap();

        let claims = verifier.verify_at(credential.as_str(), t0()).unwrap();
        assert_eq!(claims.subject_id.as_str(), "u1");
        assert!(claims.role.is_none());
        assert!(claims.organization_id.is_none());
        assert!(claims.email.is_none());
    }

    #[test]
    fn bearer_prefix_is_optional() {
        let (issuer, verifier) = pair("k1");
        let credential = issuer.issue_access_at(&identity(), t0()).unwrap();

        let with_prefix = format!("Bearer {}", credential.as_str());
        assert!(verifier.verify_at(&with_prefix, t0()).is_ok());
        assert!(verifier.verify_at(credential.as_str(), t0()).is_ok());
    }

    #[test]
    fn other_prefixes_are_not_stripped() {
        let (issuer, verifier) = pair("k1");
        let credential = issuer.issue_access_at(&identity(), t0()).unwrap();

        let wrong = format!("Token {}", credential.as_str());
        assert_eq!(verifier.verify_at(&wrong, t0()), Err(VerificationFailure::Malformed));
    }

    #[test]
    fn empty_and_misshapen_input_is_malformed() {
        let (_, verifier) = pair("k1");
        for input in ["", "   ", "Bearer ", "abc", "a.b", "a.b.c.d", ".payload.sig", "header..sig"] {
            assert_eq!(
                verifier.verify_at(input, t0()),
                Err(VerificationFailure::Malformed),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn wrong_key_is_invalid_signature() {
        let (issuer, _) = pair("k1");
        let (_, verifier) = pair("k2");
        let credential = issuer.issue_access_at(&identity(), t0()).unwrap();

        assert_eq!(
            verifier.verify_at(credential.as_str(), t0()),
            Err(VerificationFailure::InvalidSignature)
        );
    }

    #[test]
    fn algorithm_substitution_is_rejected() {
        let (_, verifier) = pair("k1");
        let claims = json!({"iss": "pvara-auth", "sub": "u1", "iat": t0().timestamp(), "exp": t0().timestamp() + 60});

        let hs512 = forge(Algorithm::HS512, "k1", claims.clone());
        assert_eq!(verifier.verify_at(&hs512, t0()), Err(VerificationFailure::InvalidSignature));

        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        let unsigned = format!("{header}.{payload}.");
        assert_eq!(verifier.verify_at(&unsigned, t0()), Err(VerificationFailure::InvalidSignature));
    }

    #[test]
    fn expired_credential_with_valid_signature_is_expired() {
        let (_, verifier) = pair("k1");
        let issued = t0() - Duration::hours(2);
        let token = forge(
            Algorithm::HS256,
            "k1",
            json!({
                "user_id": "u1", "email": "a@b.com", "role": "recruiter", "org_id": "org1",
                "iss": "pvara-auth", "sub": "u1",
                "iat": issued.timestamp(), "nbf": issued.timestamp(), "exp": issued.timestamp() + 900,
            }),
        );

        assert_eq!(verifier.verify_at(&token, t0()), Err(VerificationFailure::Expired));
    }

    #[test]
    fn future_not_before_is_not_yet_valid() {
        let (issuer, verifier) = pair("k1");
        let credential = issuer.issue_access_at(&identity(), t0() + Duration::minutes(1)).unwrap();

        assert_eq!(
            verifier.verify_at(credential.as_str(), t0()),
            Err(VerificationFailure::NotYetValid)
        );
    }

    #[test]
    fn access_lifetime_boundary() {
        let (issuer, verifier) = pair("k1");
        let credential = issuer.issue_access_at(&identity(), t0()).unwrap();

        let just_before = t0() + Duration::minutes(14) + Duration::seconds(59);
        let just_after = t0() + Duration::minutes(15) + Duration::seconds(1);

        assert!(verifier.verify_at(credential.as_str(), just_before).is_ok());
        assert_eq!(
            verifier.verify_at(credential.as_str(), just_after),
            Err(VerificationFailure::Expired)
        );
    }

    #[test]
    fn expected_kind_is_enforced() {
        let (issuer, verifier) = pair("k1");
        let access = issuer.issue_access_at(&identity(), t0()).unwrap();
        let renewal = issuer.issue_renewal_at(&identity(), t0()).unwrap();

        assert!(verifier.verify_kind_at(access.as_str(), CredentialKind::Access, t0()).is_ok());
        assert!(verifier.verify_kind_at(renewal.as_str(), CredentialKind::Renewal, t0()).is_ok());
        assert_eq!(
            verifier.verify_kind_at(renewal.as_str(), CredentialKind::Access, t0()),
            Err(VerificationFailure::WrongKind { expected: CredentialKind::Access })
        );
        assert_eq!(
            verifier.verify_kind_at(access.as_str(), CredentialKind::Renewal, t0()),
            Err(VerificationFailure::WrongKind { expected: CredentialKind::Renewal })
        );
    }

    #[test]
    fn signed_payload_with_inverted_window_is_malformed() {
        let (_, verifier) = pair("k1");
        let token = forge(
            Algorithm::HS256,
            "k1",
            json!({
                "iss": "pvara-auth", "sub": "u1",
                "iat": t0().timestamp(), "nbf": t0().timestamp() + 30, "exp": t0().timestamp() + 60,
            }),
        );
        assert_eq!(verifier.verify_at(&token, t0() + Duration::minutes(1)), Err(VerificationFailure::Malformed));
    }

    #[test]
    fn signed_payload_with_bad_claims_is_malformed() {
        let (_, verifier) = pair("k1");
        let token = forge(Algorithm::HS256, "k1", json!({"sub": "u1", "exp": t0().timestamp() + 60}));
        assert_eq!(verifier.verify_at(&token, t0()), Err(VerificationFailure::Malformed));
    }

    #[test]
    fn verification_is_shareable_across_threads() {
        let (issuer, verifier) = pair("k1");
        let token = issuer.issue_access(&identity()).unwrap().into_string();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let verifier = verifier.clone();
                let token = token.clone();
                std::thread::spawn(move || verifier.verify(&token).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::Admin),
            Just(Role::Hr),
            Just(Role::Recruiter),
            Just(Role::Candidate),
        ]
    }

    fn identity_strategy() -> impl Strategy<Value = Identity> {
        (
            "[a-z0-9]{1,16}",
            "[a-z]{1,8}@[a-z]{1,8}\\.com",
            role_strategy(),
            "[a-z0-9-]{1,12}",
        )
            .prop_map(|(subject, email, role, org)| {
                Identity::new(
                    SubjectId::parse(subject).unwrap(),
                    email,
                    role,
                    OrganizationId::parse(org).unwrap(),
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        #[test]
        fn any_identity_round_trips_through_access(identity in identity_strategy()) {
            let (issuer, verifier) = pair("prop-secret");
            let credential = issuer.issue_access_at(&identity, t0()).unwrap();
            let claims = verifier.verify_at(credential.as_str(), t0()).unwrap();

            prop_assert_eq!(&claims.subject_id, &identity.subject_id);
            prop_assert_eq!(claims.email.as_deref(), Some(identity.email.as_str()));
            prop_assert_eq!(claims.role.as_ref(), Some(&identity.role));
            prop_assert_eq!(claims.organization_id.as_ref(), Some(&identity.organization_id));
        }

        #[test]
        fn any_identity_renewal_omits_authorization_fields(identity in identity_strategy()) {
            let (issuer, verifier) = pair("prop-secret");
            let credential = issuer.issue_renewal_at(&identity, t0()).unwrap();
            let claims = verifier.verify_at(credential.as_str(), t0()).unwrap();

            prop_assert_eq!(&claims.subject_id, &identity.subject_id);
            prop_assert!(claims.role.is_none());
            prop_assert!(claims.organization_id.is_none());
        }

        #[test]
        fn foreign_key_always_fails_signature(
            identity in identity_strategy(),
            k1 in "[a-zA-Z0-9]{8,32}",
            k2 in "[a-zA-Z0-9]{8,32}",
        ) {
            prop_assume!(k1 != k2);
            let (issuer, _) = pair(&k1);
            let (_, verifier) = pair(&k2);
            let credential = issuer.issue_access_at(&identity, t0()).unwrap();

            prop_assert_eq!(
                verifier.verify_at(credential.as_str(), t0()),
                Err(VerificationFailure::InvalidSignature)
            );
        }

        #[test]
        fn any_payload_byte_change_fails_signature(
            identity in identity_strategy(),
            index in any::<prop::sample::Index>(),
        ) {
            let (issuer, verifier) = pair("prop-secret");
            let token = issuer.issue_access_at(&identity, t0()).unwrap().into_string();

            let segments: Vec<&str> = token.split('.').collect();
            let mut payload = segments[1].as_bytes().to_vec();
            let i = index.index(payload.len());
            payload[i] = if payload[i] == b'A' { b'B' } else { b'A' };
            let payload = String::from_utf8(payload).unwrap();
            let tampered = format!("{}.{}.{}", segments[0], payload, segments[2]);

            prop_assert_eq!(
                verifier.verify_at(&tampered, t0()),
                Err(VerificationFailure::InvalidSignature)
            );
        }
    }
}
