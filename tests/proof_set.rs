//! Tests for documents carrying multiple proofs.

use credibil_ldp::{
    ControllerProofPurpose, ErrorKind, LinkedDataSignature, ProofSet, SuiteTable, SuiteType,
};
use serde_json::{Value, json};
use test_utils::{Controller, Loader, document};

async fn sign_twice(loader: &Loader) -> Value {
    let alice = Controller::new("did:example:alice", SuiteType::Ed25519Signature2020)
        .expect("should create controller");
    let bob = Controller::new("did:example:bob", SuiteType::EcdsaSecp256k1Signature2019)
        .expect("should create controller");
    loader.add_controller(&alice);
    loader.add_controller(&bob);

    let purpose = ControllerProofPurpose::assertion();

    let suite = LinkedDataSignature::builder(SuiteType::Ed25519Signature2020)
        .signer(alice.keypair.clone())
        .verification_method(alice.key_id())
        .build()
        .expect("should build suite");
    let signed = ProofSet::add(&document(), &suite, &purpose).await.expect("should add proof");
    assert!(signed["proof"].is_object());

    let suite = LinkedDataSignature::builder(SuiteType::EcdsaSecp256k1Signature2019)
        .signer(bob.keypair.clone())
        .verification_method(bob.key_id())
        .build()
        .expect("should build suite");
    ProofSet::add(&signed, &suite, &purpose).await.expect("should add proof")
}

#[tokio::test]
async fn add_and_verify() {
    let loader = Loader::new();
    let signed = sign_twice(&loader).await;

    let proofs = signed["proof"].as_array().expect("should have proof array");
    assert_eq!(proofs.len(), 2);
    // the document already declares the security context
    assert!(proofs.iter().all(|p| p.get("@context").is_none()));

    let table: SuiteTable =
        [SuiteType::Ed25519Signature2020, SuiteType::EcdsaSecp256k1Signature2019]
            .into_iter()
            .collect();
    let result =
        ProofSet::verify(&signed, &table, &ControllerProofPurpose::assertion(), &loader).await;
    assert!(result.verified, "{:?}", result.error);
    assert_eq!(result.results.len(), 2);
    let security_v2 = Some(json!("https://w3id.org/security/v2"));
    assert!(result.results.iter().all(|r| r.proof.context == security_v2));
}

#[tokio::test]
async fn keeps_proof_context() {
    let alice = Controller::new("did:example:alice", SuiteType::Ed25519Signature2018)
        .expect("should create controller");
    let loader = Loader::new();
    loader.add_controller(&alice);

    let suite = LinkedDataSignature::builder(SuiteType::Ed25519Signature2018)
        .signer(alice.keypair.clone())
        .verification_method(alice.key_id())
        .build()
        .expect("should build suite");
    let purpose = ControllerProofPurpose::assertion();

    let document = json!({"@context": "https://www.w3.org/2018/credentials/v1", "name": "Alice"});
    let signed = ProofSet::add(&document, &suite, &purpose).await.expect("should add proof");
    assert_eq!(signed["proof"]["@context"], "https://w3id.org/security/v2");

    let table = SuiteTable::new().register(SuiteType::Ed25519Signature2018);
    let result = ProofSet::verify(&signed, &table, &purpose, &loader).await;
    assert!(result.verified, "{:?}", result.error);
}

#[tokio::test]
async fn only_registered_suites() {
    let loader = Loader::new();
    let signed = sign_twice(&loader).await;

    let table = SuiteTable::new().register(SuiteType::Ed25519Signature2020);
    let result =
        ProofSet::verify(&signed, &table, &ControllerProofPurpose::assertion(), &loader).await;
    assert!(result.verified, "{:?}", result.error);
    assert_eq!(result.results.len(), 1);

    let table = SuiteTable::new().register(SuiteType::Ed25519Signature2018);
    let result =
        ProofSet::verify(&signed, &table, &ControllerProofPurpose::assertion(), &loader).await;
    assert!(!result.verified);
    assert_eq!(result.error.expect("should have error").kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn other_purposes_ignored() {
    let loader = Loader::new();
    let signed = sign_twice(&loader).await;

    let table = SuiteTable::new().register(SuiteType::Ed25519Signature2020);
    let purpose = ControllerProofPurpose::new("capabilityInvocation");
    let result = ProofSet::verify(&signed, &table, &purpose, &loader).await;
    assert!(!result.verified);
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn tampered_set() {
    let loader = Loader::new();
    let mut signed = sign_twice(&loader).await;
    signed["credentialSubject"]["name"] = json!("Mallory");

    let table: SuiteTable =
        [SuiteType::Ed25519Signature2020, SuiteType::EcdsaSecp256k1Signature2019]
            .into_iter()
            .collect();
    let result =
        ProofSet::verify(&signed, &table, &ControllerProofPurpose::assertion(), &loader).await;
    assert!(!result.verified);
    assert!(result.error.is_none());
    assert!(result.results.iter().all(|r| {
        r.verification.error().map(credibil_ldp::Error::kind) == Some(ErrorKind::SignatureInvalid)
    }));
}

#[tokio::test]
async fn foreign_proofs_skipped() {
    let alice = Controller::new("did:example:alice", SuiteType::Ed25519Signature2020)
        .expect("should create controller");
    let loader = Loader::new();
    loader.add_controller(&alice);

    let mut document = document();
    document["proof"] = json!({
        "type": "DataIntegrityProof",
        "cryptosuite": "eddsa-rdfc-2022",
        "proofPurpose": "authentication",
        "domain": ["a.example", "b.example"],
        "proofValue": "z5Vfp"
    });

    let suite = LinkedDataSignature::builder(SuiteType::Ed25519Signature2020)
        .signer(alice.keypair.clone())
        .verification_method(alice.key_id())
        .build()
        .expect("should build suite");
    let purpose = ControllerProofPurpose::assertion();
    let signed = ProofSet::add(&document, &suite, &purpose).await.expect("should add proof");

    let table = SuiteTable::new().register(SuiteType::Ed25519Signature2020);
    let result = ProofSet::verify(&signed, &table, &purpose, &loader).await;
    assert!(result.verified, "{:?}", result.error);
    assert_eq!(result.results.len(), 1);
}

#[tokio::test]
async fn malformed_proof_fails_alone() {
    let loader = Loader::new();
    let mut signed = sign_twice(&loader).await;
    signed["proof"].as_array_mut().expect("should have proof array").push(json!({
        "type": "Ed25519Signature2020",
        "proofPurpose": "assertionMethod",
        "domain": ["a.example", "b.example"]
    }));

    let table: SuiteTable =
        [SuiteType::Ed25519Signature2020, SuiteType::EcdsaSecp256k1Signature2019]
            .into_iter()
            .collect();
    let result =
        ProofSet::verify(&signed, &table, &ControllerProofPurpose::assertion(), &loader).await;
    assert!(!result.verified);
    assert!(result.error.is_none());
    assert_eq!(result.results.len(), 3);

    let failed: Vec<_> = result.results.iter().filter(|r| !r.verification.is_verified()).collect();
    assert_eq!(failed.len(), 1);
    let kind = failed[0].verification.error().map(credibil_ldp::Error::kind);
    assert_eq!(kind, Some(ErrorKind::Configuration));
}

#[tokio::test]
async fn unsigned_document() {
    let result = ProofSet::verify(
        &document(),
        &SuiteTable::new(),
        &ControllerProofPurpose::assertion(),
        &Loader::new(),
    )
    .await;
    assert!(!result.verified);
    assert_eq!(result.error.expect("should have error").kind(), ErrorKind::NotFound);
}
