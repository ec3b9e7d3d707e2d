//! # JSON Object Signing and Encryption (JOSE)
//!
//! Linked Data signature suites such as `Ed25519Signature2018` encode their
//! signature as a JWS ([RFC7515]) with a detached, unencoded payload
//! ([RFC7797]). The payload (the proof's verify data) is never transmitted in
//! the token: it is recomputed by the verifier from the document and proof.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7797]: https://www.rfc-editor.org/rfc/rfc7797

pub mod jws;

pub use jws::{DetachedJws, Protected};
