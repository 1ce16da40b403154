use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Department {
    InternalMedicine => "internal_medicine",
    Surgery => "surgery",
    ObstetricsGynecology => "obstetrics_gynecology",
    Pediatrics => "pediatrics",
});

impl Department {
    /// Every department, in display order.
    pub const ALL: [Department; 4] = [
        Department::InternalMedicine,
        Department::Surgery,
        Department::ObstetricsGynecology,
        Department::Pediatrics,
    ];
}

impl Default for Department {
    fn default() -> Self {
        Department::InternalMedicine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn department_round_trip() {
        for (variant, s) in [
            (Department::InternalMedicine, "internal_medicine"),
            (Department::Surgery, "surgery"),
            (Department::ObstetricsGynecology, "obstetrics_gynecology"),
            (Department::Pediatrics, "pediatrics"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Department::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_the_same_codes() {
        let json = serde_json::to_string(&Department::ObstetricsGynecology).unwrap();
        assert_eq!(json, "\"obstetrics_gynecology\"");
    }

    #[test]
    fn invalid_department_returns_error() {
        assert!(Department::from_str("cardiology").is_err());
        assert!(Department::from_str("").is_err());
    }

    #[test]
    fn default_is_internal_medicine() {
        assert_eq!(Department::default(), Department::InternalMedicine);
        assert_eq!(Department::ALL.len(), 4);
    }
}
