use super::cert::name_der;
use super::{Cardinality, FieldDescriptor, FieldLookup, FieldTable, FieldValue, SignedCrl, TbsField};
use crate::error::CodecError;
use crate::extension_store::ExtensionStore;
use crate::item::{CrlContent, RevokedEntry};

unique_slot!(CrlContent, Version, get_version, set_version, version, Version);
unique_slot!(
    CrlContent,
    TbsSignatureAlgorithm,
    get_tbs_signature_algorithm,
    set_tbs_signature_algorithm,
    signature,
    Algorithm
);
unique_slot!(CrlContent, Issuer, get_issuer, set_issuer, issuer, Name);
unique_slot!(CrlContent, ThisUpdate, get_this_update, set_this_update, this_update, Time);
unique_slot!(CrlContent, NextUpdate, get_next_update, set_next_update, next_update, Time);

fn get_issuer_der(content: &CrlContent, _: usize) -> Result<FieldLookup, CodecError> {
    name_der(content.issuer.as_ref(), "issuer")
}

fn get_revoked_certificate(content: &CrlContent, index: usize) -> Result<FieldLookup, CodecError> {
    Ok(match content.revoked.get(index) {
        Some(entry) => FieldLookup::Found {
            value: FieldValue::RevokedCertificate(entry.clone()),
            count: (index == 0).then_some(content.revoked.len()),
        },
        None => FieldLookup::NotFound,
    })
}

fn add_revoked_certificate(content: &mut CrlContent, value: FieldValue) -> Result<(), CodecError> {
    match value {
        FieldValue::RevokedCertificate(entry) => {
            content.revoked.push(entry);
            Ok(())
        }
        _ => Err(CodecError::InvalidFieldValue {
            id: TbsField::RevokedCertificate.into(),
            expected: "revoked certificate entry",
        }),
    }
}

fn get_signed_crl(content: &CrlContent, _: usize) -> Result<FieldLookup, CodecError> {
    let Some(signed) = &content.signed else {
        return Ok(FieldLookup::NotFound);
    };

    let revoked_certificates = content
        .revoked
        .iter()
        .map(|entry| {
            entry.extensions();
            entry.clone()
        })
        .collect();

    Ok(Some(FieldValue::SignedCrl(Box::new(SignedCrl {
        tbs_der: signed.tbs.clone(),
        signature_algorithm: signed.algorithm.clone(),
        signature: signed.signature.clone(),
        revoked_certificates,
    })))
    .into())
}

fn get_signature_algorithm(content: &CrlContent, _: usize) -> Result<FieldLookup, CodecError> {
    Ok(content
        .signed
        .as_ref()
        .map(|signed| FieldValue::Algorithm(signed.algorithm.clone()))
        .into())
}

fn get_signature(content: &CrlContent, _: usize) -> Result<FieldLookup, CodecError> {
    Ok(content
        .signed
        .as_ref()
        .map(|signed| FieldValue::BitString(signed.signature.clone()))
        .into())
}

impl FieldTable for CrlContent {
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::unique(TbsField::Version, get_version, set_version),
        FieldDescriptor::unique(
            TbsField::TbsSignatureAlgorithm,
            get_tbs_signature_algorithm,
            set_tbs_signature_algorithm,
        ),
        FieldDescriptor::unique(TbsField::Issuer, get_issuer, set_issuer),
        FieldDescriptor::read_only(TbsField::IssuerDer, get_issuer_der),
        FieldDescriptor::unique(TbsField::ThisUpdate, get_this_update, set_this_update),
        FieldDescriptor::unique(TbsField::NextUpdate, get_next_update, set_next_update),
        FieldDescriptor::repeatable(
            TbsField::RevokedCertificate,
            get_revoked_certificate,
            add_revoked_certificate,
        ),
        FieldDescriptor::read_only(TbsField::SignedCrl, get_signed_crl),
        FieldDescriptor::read_only(TbsField::SignatureAlgorithm, get_signature_algorithm),
        FieldDescriptor::read_only(TbsField::Signature, get_signature),
    ];

    fn extensions(&self) -> &ExtensionStore {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionStore> {
        Some(&mut self.extensions)
    }
}

// === CRL entries === //

fn get_entry_serial_number(entry: &RevokedEntry, _: usize) -> Result<FieldLookup, CodecError> {
    Ok(Some(FieldValue::Integer(entry.serial_number.clone())).into())
}

fn get_entry_revocation_date(entry: &RevokedEntry, _: usize) -> Result<FieldLookup, CodecError> {
    Ok(Some(FieldValue::Time(entry.revocation_date.clone())).into())
}

impl FieldTable for RevokedEntry {
    const FIELDS: &'static [FieldDescriptor<Self>] = &[
        FieldDescriptor::read_only(TbsField::SerialNumber, get_entry_serial_number),
        FieldDescriptor::read_only(TbsField::RevocationDate, get_entry_revocation_date),
    ];

    const EXTENSION_CARDINALITY: Cardinality = Cardinality::ReadOnly;

    fn extensions(&self) -> &ExtensionStore {
        RevokedEntry::extensions(self)
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionStore> {
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CodecError;
    use crate::field::{Cardinality, ExtensionField, FieldId, FieldLookup, FieldValue, TbsField};
    use crate::item::{CrlItem, RevokedEntry};
    use crate::registry::{ExtensionKind, ExtensionValue};
    use certlib_asn1::extension::{CrlNumber, CrlReason};
    use certlib_asn1::tlv::{self, universal};
    use certlib_asn1::{signed, Time, UtcDate};
    use pretty_assertions::assert_eq;

    fn crl() -> CrlItem {
        CrlItem::decode(certlib_test_data::CA_CRL_DER).unwrap()
    }

    #[test]
    fn revoked_certificates_are_indexed() {
        let crl = crl();
        let id: FieldId = TbsField::RevokedCertificate.into();

        let first = crl.get(&id, 0).unwrap();
        assert_eq!(first.count(), Some(2));
        let Some(FieldValue::RevokedCertificate(entry)) = first.into_value() else {
            panic!("revoked entry expected");
        };
        assert_eq!(entry.serial_number(), &[0x10, 0x01]);

        let second = crl.get(&id, 1).unwrap();
        assert_eq!(second.count(), None);
        let Some(FieldValue::RevokedCertificate(entry)) = second.into_value() else {
            panic!("revoked entry expected");
        };
        assert_eq!(entry.serial_number(), &[0x00, 0xC0, 0xFF, 0xEE]);

        assert_eq!(crl.get(&id, 2).unwrap(), FieldLookup::NotFound);
    }

    #[test]
    fn crl_extension_lookup() {
        assert_eq!(
            crl().get(&ExtensionKind::CrlNumber.into(), 0).unwrap(),
            FieldLookup::Found {
                value: FieldValue::Extension(ExtensionField::non_critical(ExtensionValue::CrlNumber(CrlNumber(7)))),
                count: Some(1)
            }
        );
    }

    #[test]
    fn signed_crl_decodes_every_entry() {
        let crl = crl();
        assert!(crl.revoked_entries().iter().all(|entry| !entry.extensions_decoded()));

        let Some(FieldValue::SignedCrl(signed_crl)) = crl.get(&TbsField::SignedCrl.into(), 0).unwrap().into_value()
        else {
            panic!("signed CRL expected");
        };
        assert_eq!(signed_crl.revoked_certificates.len(), 2);
        assert!(signed_crl
            .revoked_certificates
            .iter()
            .all(RevokedEntry::extensions_decoded));

        let parts = signed::split(certlib_test_data::CA_CRL_DER).unwrap();
        assert_eq!(signed_crl.tbs_der, parts.tbs);
        assert_eq!(
            signed::join(
                &signed_crl.tbs_der,
                &signed_crl.signature_algorithm.to_der().unwrap(),
                &tlv::encode(universal::BIT_STRING, &signed_crl.signature),
            ),
            certlib_test_data::CA_CRL_DER
        );
    }

    #[test]
    fn entry_fields_are_read_only() {
        let crl = crl();
        let entry = &crl.revoked_entries()[0];

        assert_eq!(
            RevokedEntry::cardinality(&TbsField::SerialNumber.into()),
            Some(Cardinality::ReadOnly)
        );
        assert_eq!(
            RevokedEntry::cardinality(&ExtensionKind::ReasonCode.into()),
            Some(Cardinality::ReadOnly)
        );
        assert_eq!(
            entry.get(&TbsField::SerialNumber.into(), 0).unwrap().into_value(),
            Some(FieldValue::Integer(vec![0x10, 0x01]))
        );
        assert_eq!(
            entry.get(&ExtensionKind::ReasonCode.into(), 0).unwrap().into_value(),
            Some(FieldValue::Extension(ExtensionField::non_critical(ExtensionValue::ReasonCode(
                CrlReason::KeyCompromise
            ))))
        );
        assert!(matches!(
            entry.get(&TbsField::Issuer.into(), 0),
            Err(CodecError::UnknownField { .. })
        ));
    }

    #[test]
    fn signed_envelope_fields_are_not_settable() {
        let mut crl = CrlItem::new();
        let date = Time::from_date(UtcDate::ymd(2024, 1, 1).unwrap());
        crl.set(&TbsField::NextUpdate.into(), FieldValue::Time(date)).unwrap();

        for field in [TbsField::SignedCrl, TbsField::Signature, TbsField::IssuerDer] {
            assert!(matches!(
                crl.set(&field.into(), FieldValue::Der(vec![])),
                Err(CodecError::UnsupportedOperation { .. })
            ));
        }
    }
}
