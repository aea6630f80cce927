use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// The string form is what the store holds and what JSON carries, so the
/// serde names and the SQLite text mapping both use it.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: DatabaseError| FromSqlError::Other(Box::new(e)))
            }
        }

        impl From<$name> for Value {
            fn from(v: $name) -> Value {
                Value::Text(v.as_str().to_string())
            }
        }
    };
}

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
});

str_enum!(DayTime {
    Morning => "Morning",
    Midday => "Midday",
    Evening => "Evening",
});

str_enum!(Weekday {
    Monday => "Monday",
    Tuesday => "Tuesday",
    Wednesday => "Wednesday",
    Thursday => "Thursday",
    Friday => "Friday",
    Saturday => "Saturday",
    Sunday => "Sunday",
});

str_enum!(PatientStatus {
    Cured => "Cured",
    UnderTreatment => "Under Treatment",
});

str_enum!(PatientType {
    InPatient => "In Patient",
    OutPatient => "Out Patient",
});

str_enum!(MedicineType {
    Injection => "Inj",
    Capsule => "Capsule",
    Tablet => "Tablet",
});

str_enum!(VaccineType {
    Intramuscular => "Intramuscular",
    Intravenous => "Intravenous",
    Subcutaneous => "Subcutaneous",
});

str_enum!(PaymentStatus {
    Paid => "Paid",
    Unpaid => "Un-Paid",
});
