//! Test data shared between the certlib crates.

// Self-signed ECDSA P-256 CA: C=CA, O=Example Org, CN=Example Issuing CA, serial 0x2A.
// Extensions: basicConstraints (critical, cA, pathLen 1), keyUsage (critical, digitalSignature),
// subjectKeyIdentifier, authorityKeyIdentifier (keyIdentifier only).
pub const CA_CERT_PEM: &str = include_str!("../test_assets/ca.crt");
pub const CA_CERT_DER: &[u8] = include_bytes!("../test_assets/ca.der");

// Leaf issued by the CA above, serial 0x1001, CN=leaf.example.com + emailAddress.
// Extensions, in order: keyUsage, extKeyUsage, subjectAltName (every GeneralName alternative
// except x400Address and ediPartyName), authorityKeyIdentifier, certificatePolicies,
// cRLDistributionPoints, authorityInfoAccess, and the unregistered 1.2.3.4.5.
pub const LEAF_CERT_PEM: &str = include_str!("../test_assets/leaf.crt");
pub const LEAF_CERT_DER: &[u8] = include_bytes!("../test_assets/leaf.der");

// v2 CRL from the CA above. Revoked: 0x1001 (reasonCode keyCompromise) and 0x00C0FFEE.
// CRL extensions: cRLNumber 7, authorityKeyIdentifier.
pub const CA_CRL_PEM: &str = include_str!("../test_assets/ca_crl.crl");
pub const CA_CRL_DER: &[u8] = include_bytes!("../test_assets/ca_crl.der");
