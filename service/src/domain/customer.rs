//! [`Customer`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer renting vehicles.
#[derive(Clone, Debug)]
pub struct Customer {
    /// ID of this [`Customer`].
    pub id: Id,

    /// First [`Name`] of this [`Customer`].
    pub first_name: Name,

    /// Last [`Name`] of this [`Customer`].
    pub last_name: Name,

    /// [`Email`] of this [`Customer`].
    ///
    /// Unique among all [`Customer`]s.
    pub email: Email,

    /// [`Phone`] of this [`Customer`].
    pub phone: Phone,

    /// [`DriverLicenseNumber`] of this [`Customer`].
    ///
    /// Unique among all [`Customer`]s.
    pub driver_license_number: DriverLicenseNumber,

    /// [`DateTime`] when this [`Customer`] was created.
    pub created_at: CreationDateTime,
}

impl Customer {
    /// Returns the first and the last [`Name`]s of this [`Customer`] joined by
    /// a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// ID of a [`Customer`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// First or last name of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format: a local part and a
        /// dotted domain separated by a single `@`.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"^[\w.!#$%&'*+/=?^`{|}~-]+@[\p{L}\p{N}-]+(\.[\p{L}\p{N}-]+)+$",
            )
            .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 254 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format: an optional leading
        /// `+` followed by at least 10 digits, dots, dashes, spaces or
        /// parentheses.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?[0-9.\-\s()]{10,}$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Driver license number of a [`Customer`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct DriverLicenseNumber(String);

impl DriverLicenseNumber {
    /// Creates a new [`DriverLicenseNumber`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`DriverLicenseNumber`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 50
    }
}

impl FromStr for DriverLicenseNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `DriverLicenseNumber`")
    }
}

/// [`DateTime`] when a [`Customer`] was created.
pub type CreationDateTime = DateTimeOf<(Customer, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Customer, DriverLicenseNumber, Email, Id, Name, Phone};

    #[test]
    fn joins_full_name() {
        let customer = Customer {
            id: Id::new(),
            first_name: Name::new("Ada").unwrap(),
            last_name: Name::new("Lovelace").unwrap(),
            email: Email::new("ada@example.com").unwrap(),
            phone: Phone::new("+1 555 010 0000").unwrap(),
            driver_license_number: DriverLicenseNumber::new("DL-1").unwrap(),
            created_at: DateTime::now().coerce(),
        };

        assert_eq!(customer.full_name(), "Ada Lovelace");
    }

    #[test]
    fn validates_name() {
        assert!(Name::new("John").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" John").is_none());
        assert!(Name::new("x".repeat(101)).is_none());
    }

    #[test]
    fn validates_email() {
        for valid in [
            "john@example.com",
            "john.doe+rent@mail.example.org",
            "j_d@sub-domain.io",
        ] {
            assert!(Email::new(valid).is_some(), "{valid}");
        }
        for invalid in [
            "",
            "john",
            "john@",
            "@example.com",
            "john@example",
            "john@@example.com",
            "john doe@example.com",
        ] {
            assert!(Email::new(invalid).is_none(), "{invalid}");
        }
    }

    #[test]
    fn validates_phone() {
        for valid in [
            "+1234567890",
            "123-456-7890",
            "(123) 456 7890",
            "+7 (912) 345.67.89",
        ] {
            assert!(Phone::new(valid).is_some(), "{valid}");
        }
        for invalid in ["", "12345", "+123-45-67", "123-456-789O", "phone"] {
            assert!(Phone::new(invalid).is_none(), "{invalid}");
        }
    }

    #[test]
    fn validates_driver_license_number() {
        assert!(DriverLicenseNumber::new("DL123456").is_some());
        assert!(DriverLicenseNumber::new("").is_none());
        assert!(DriverLicenseNumber::new(" DL1").is_none());
    }
}
