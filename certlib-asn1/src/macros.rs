macro_rules! seq_next_element {
    ($seq:ident, $struct_name:ident, $error_msg:literal) => {
        $seq.next_element()?.ok_or_else(|| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Other(concat!("[", stringify!($struct_name), "] ", $error_msg)),
                &concat!("valid ", stringify!($struct_name)),
            )
        })?
    };
    ($seq:ident, $field_type:ty, $struct_name:ident, $error_msg:literal) => {
        $seq.next_element::<$field_type>()?.ok_or_else(|| {
            serde::de::Error::invalid_value(
                serde::de::Unexpected::Other(concat!("[", stringify!($struct_name), "] ", $error_msg)),
                &concat!("valid ", stringify!($struct_name)),
            )
        })?
    };
}

/// Implements serde for a type that knows how to read and write its own DER element through
/// inherent `from_der` / `to_der` methods returning [`crate::tlv::TlvError`].
macro_rules! impl_serde_from_der {
    ($type:ident) => {
        impl serde::Serialize for $type {
            fn serialize<S>(&self, serializer: S) -> Result<<S as serde::Serializer>::Ok, <S as serde::Serializer>::Error>
            where
                S: serde::Serializer,
            {
                let der = self.to_der().map_err(serde::ser::Error::custom)?;
                serde::Serialize::serialize(&picky_asn1_der::Asn1RawDer(der), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $type {
            fn deserialize<D>(deserializer: D) -> Result<Self, <D as serde::Deserializer<'de>>::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = <picky_asn1_der::Asn1RawDer as serde::Deserialize>::deserialize(deserializer)?;
                $type::from_der(&raw.0).map_err(serde::de::Error::custom)
            }
        }
    };
    ( $( $type:ident ),+ $(,)? ) => {
        $( impl_serde_from_der! { $type } )+
    };
}
