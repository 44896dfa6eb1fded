//! [`Vehicle`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily surcharge for a [`Car`] with an automatic transmission.
pub const AUTOMATIC_TRANSMISSION_SURCHARGE: Money =
    Money::new(Decimal::from_parts(10, 0, 0, false, 0));

/// Daily surcharge for a [`Motorcycle`] with an engine larger than
/// [`POWERFUL_ENGINE_SIZE`].
pub const POWERFUL_ENGINE_SURCHARGE: Money =
    Money::new(Decimal::from_parts(15, 0, 0, false, 0));

/// [`EngineSize`] (in cc) above which a [`Motorcycle`] is considered powerful.
pub const POWERFUL_ENGINE_SIZE: i32 = 1000;

/// Daily surcharge for a [`Truck`] with a four-wheel drive.
pub const FOUR_WHEEL_DRIVE_SURCHARGE: Money =
    Money::new(Decimal::from_parts(25, 0, 0, false, 0));

/// Daily surcharge for a [`Truck`] with a [`Capacity`] larger than
/// [`HEAVY_CAPACITY`].
pub const HEAVY_CAPACITY_SURCHARGE: Money =
    Money::new(Decimal::from_parts(20, 0, 0, false, 0));

/// [`Capacity`] (in kg) above which a [`Truck`] is considered heavy.
pub const HEAVY_CAPACITY: i32 = 5000;

/// Vehicle available for a rent.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// [`Brand`] of this [`Vehicle`].
    pub brand: Brand,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// Production [`Year`] of this [`Vehicle`].
    pub year: Year,

    /// Base price for a single day of renting this [`Vehicle`].
    pub daily_rate: DailyRate,

    /// Indicator whether this [`Vehicle`] may be rented.
    ///
    /// Cleared while this [`Vehicle`] has an active rental.
    pub available: bool,

    /// Type-specific [`Details`] of this [`Vehicle`].
    pub details: Details,

    /// [`DateTime`] when this [`Vehicle`] was created.
    pub created_at: CreationDateTime,
}

impl Vehicle {
    /// Returns the [`Kind`] of this [`Vehicle`].
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.details.kind()
    }

    /// Calculates the total price of renting this [`Vehicle`] for the given
    /// number of `days`.
    ///
    /// `days` are not validated: zero or negative values produce zero or
    /// negative prices.
    #[must_use]
    pub fn rental_price(&self, days: i64) -> Money {
        (self.daily_rate.into_inner() + self.details.daily_surcharge()) * days
    }
}

/// Type-specific details of a [`Vehicle`].
#[derive(Clone, Debug, From)]
pub enum Details {
    /// [`Vehicle`] is a [`Car`].
    Car(Car),

    /// [`Vehicle`] is a [`Motorcycle`].
    Motorcycle(Motorcycle),

    /// [`Vehicle`] is a [`Truck`].
    Truck(Truck),
}

impl Details {
    /// Returns the [`Kind`] of these [`Details`].
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Car(_) => Kind::Car,
            Self::Motorcycle(_) => Kind::Motorcycle,
            Self::Truck(_) => Kind::Truck,
        }
    }

    /// Returns the amount added to the daily rate of a [`Vehicle`] with these
    /// [`Details`].
    #[must_use]
    pub fn daily_surcharge(&self) -> Money {
        match self {
            Self::Car(car) => {
                if car.automatic {
                    AUTOMATIC_TRANSMISSION_SURCHARGE
                } else {
                    Money::ZERO
                }
            }
            Self::Motorcycle(moto) => {
                if moto.engine_size.0 > POWERFUL_ENGINE_SIZE {
                    POWERFUL_ENGINE_SURCHARGE
                } else {
                    Money::ZERO
                }
            }
            Self::Truck(truck) => {
                let mut surcharge = Money::ZERO;
                if truck.four_wheel_drive {
                    surcharge += FOUR_WHEEL_DRIVE_SURCHARGE;
                }
                if truck.capacity.0 > HEAVY_CAPACITY {
                    surcharge += HEAVY_CAPACITY_SURCHARGE;
                }
                surcharge
            }
        }
    }
}

/// Passenger car.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Car {
    /// Number of [`Doors`] of this [`Car`].
    pub doors: Doors,

    /// [`FuelType`] of this [`Car`].
    pub fuel_type: FuelType,

    /// Indicator whether this [`Car`] has an automatic transmission.
    pub automatic: bool,
}

/// Motorcycle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Motorcycle {
    /// [`EngineSize`] of this [`Motorcycle`].
    pub engine_size: EngineSize,

    /// [`MotorcycleType`] of this [`Motorcycle`].
    pub kind: MotorcycleType,
}

/// Cargo truck.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Truck {
    /// Cargo [`Capacity`] of this [`Truck`].
    pub capacity: Capacity,

    /// Indicator whether this [`Truck`] has a four-wheel drive.
    pub four_wheel_drive: bool,
}

define_kind! {
    #[doc = "Kind of a [`Vehicle`]."]
    enum Kind {
        #[doc = "[`Car`] vehicle."]
        Car = 1,

        #[doc = "[`Motorcycle`] vehicle."]
        Motorcycle = 2,

        #[doc = "[`Truck`] vehicle."]
        Truck = 3,
    }
}

define_kind! {
    #[doc = "Fuel type of a [`Car`]."]
    enum FuelType {
        #[doc = "Gasoline engine."]
        Gasoline = 1,

        #[doc = "Diesel engine."]
        Diesel = 2,

        #[doc = "Electric motor."]
        Electric = 3,

        #[doc = "Hybrid power unit."]
        Hybrid = 4,
    }
}

/// ID of a [`Vehicle`].
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

/// Brand of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Brand(String);

impl Brand {
    /// Creates a new [`Brand`] if the given `brand` is valid.
    #[must_use]
    pub fn new(brand: impl Into<String>) -> Option<Self> {
        let brand = brand.into();
        is_label(&brand).then_some(Self(brand))
    }
}

impl FromStr for Brand {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Brand`")
    }
}

/// Model of a [`Vehicle`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        is_label(&model).then_some(Self(model))
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Free-text category of a [`Motorcycle`] (`Sport`, `Cruiser`, etc).
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct MotorcycleType(String);

impl MotorcycleType {
    /// Creates a new [`MotorcycleType`] if the given `kind` is valid.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Option<Self> {
        let kind = kind.into();
        is_label(&kind).then_some(Self(kind))
    }
}

impl FromStr for MotorcycleType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `MotorcycleType`")
    }
}

/// Checks whether the given `label` is a non-blank string without surrounding
/// whitespace and of a reasonable length.
fn is_label(label: &str) -> bool {
    !label.is_empty() && label.trim() == label && label.len() <= 100
}

/// Production year of a [`Vehicle`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Year(i32);

impl Year {
    /// Earliest allowed [`Year`].
    pub const MIN: i32 = 1900;

    /// Creates a new [`Year`] if the given `year` is valid.
    #[must_use]
    pub fn new(year: i32) -> Option<Self> {
        (year >= Self::MIN).then_some(Self(year))
    }
}

/// Base daily price of renting a [`Vehicle`].
#[derive(Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct DailyRate(Money);

impl DailyRate {
    /// Highest allowed [`DailyRate`].
    ///
    /// Keeps [`Vehicle::rental_price()`] within the [`Decimal`] range for
    /// any number of days.
    pub const MAX: Money =
        Money::new(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

    /// Creates a new [`DailyRate`] if the given `rate` is strictly positive
    /// and doesn't exceed [`DailyRate::MAX`].
    #[must_use]
    pub fn new(rate: Money) -> Option<Self> {
        (rate.is_positive() && rate <= Self::MAX).then_some(Self(rate))
    }

    /// Returns the [`Money`] amount of this [`DailyRate`].
    #[must_use]
    pub fn into_inner(self) -> Money {
        self.0
    }
}

/// Number of doors of a [`Car`].
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Doors(i32);

impl Doors {
    /// Minimal allowed number of [`Doors`].
    pub const MIN: i32 = 2;

    /// Creates a new [`Doors`] if the given `doors` number is valid.
    #[must_use]
    pub fn new(doors: i32) -> Option<Self> {
        (doors >= Self::MIN).then_some(Self(doors))
    }
}

/// Engine displacement of a [`Motorcycle`] in cubic centimeters.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct EngineSize(i32);

impl EngineSize {
    /// Minimal allowed [`EngineSize`] in cubic centimeters.
    pub const MIN: i32 = 50;

    /// Creates a new [`EngineSize`] if the given `cc` value is valid.
    #[must_use]
    pub fn new(cc: i32) -> Option<Self> {
        (cc >= Self::MIN).then_some(Self(cc))
    }
}

/// Cargo capacity of a [`Truck`] in kilograms.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Capacity(i32);

impl Capacity {
    /// Minimal allowed [`Capacity`] in kilograms.
    pub const MIN: i32 = 1000;

    /// Creates a new [`Capacity`] if the given `kg` value is valid.
    #[must_use]
    pub fn new(kg: i32) -> Option<Self> {
        (kg >= Self::MIN).then_some(Self(kg))
    }
}

/// [`DateTime`] when a [`Vehicle`] was created.
pub type CreationDateTime = DateTimeOf<(Vehicle, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{DateTime, Money};

    use super::{
        Brand, Capacity, Car, DailyRate, Details, Doors, EngineSize, FuelType,
        Id, Kind, Model, Motorcycle, MotorcycleType, Truck, Vehicle, Year,
        AUTOMATIC_TRANSMISSION_SURCHARGE, FOUR_WHEEL_DRIVE_SURCHARGE,
        HEAVY_CAPACITY_SURCHARGE, POWERFUL_ENGINE_SURCHARGE,
    };

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn vehicle(rate: &str, details: impl Into<Details>) -> Vehicle {
        Vehicle {
            id: Id::new(),
            brand: Brand::new("Brand").unwrap(),
            model: Model::new("Model").unwrap(),
            year: Year::new(2020).unwrap(),
            daily_rate: DailyRate::new(money(rate)).unwrap(),
            available: true,
            details: details.into(),
            created_at: DateTime::now().coerce(),
        }
    }

    fn car(automatic: bool) -> Car {
        Car {
            doors: Doors::new(4).unwrap(),
            fuel_type: FuelType::Gasoline,
            automatic,
        }
    }

    fn motorcycle(cc: i32) -> Motorcycle {
        Motorcycle {
            engine_size: EngineSize::new(cc).unwrap(),
            kind: MotorcycleType::new("Sport").unwrap(),
        }
    }

    fn truck(kg: i32, four_wheel_drive: bool) -> Truck {
        Truck {
            capacity: Capacity::new(kg).unwrap(),
            four_wheel_drive,
        }
    }

    #[test]
    fn prices_manual_car_by_rate_only() {
        assert_eq!(vehicle("50", car(false)).rental_price(2), money("100"));
    }

    #[test]
    fn prices_automatic_car_with_surcharge() {
        assert_eq!(vehicle("50", car(true)).rental_price(2), money("120"));
    }

    #[test]
    fn prices_powerful_motorcycle_with_surcharge() {
        assert_eq!(
            vehicle("40", motorcycle(1200)).rental_price(5),
            money("275"),
        );
        assert_eq!(
            vehicle("40", motorcycle(1000)).rental_price(5),
            money("200"),
        );
    }

    #[test]
    fn prices_truck_with_additive_surcharges() {
        assert_eq!(
            vehicle("100", truck(6000, true)).rental_price(3),
            money("435"),
        );
        assert_eq!(
            vehicle("100", truck(6000, false)).rental_price(3),
            money("360"),
        );
        assert_eq!(
            vehicle("100", truck(5000, true)).rental_price(3),
            money("375"),
        );
        assert_eq!(
            vehicle("100", truck(2000, false)).rental_price(3),
            money("300"),
        );
    }

    #[test]
    fn surcharges_are_whole_amounts() {
        assert_eq!(AUTOMATIC_TRANSMISSION_SURCHARGE, money("10"));
        assert_eq!(POWERFUL_ENGINE_SURCHARGE, money("15"));
        assert_eq!(FOUR_WHEEL_DRIVE_SURCHARGE, money("25"));
        assert_eq!(HEAVY_CAPACITY_SURCHARGE, money("20"));
    }

    #[test]
    fn prices_highest_rate_for_any_days() {
        let v = vehicle("1000000000", truck(9000, true));

        assert_eq!(v.rental_price(2), money("2000000090"));
        assert!(v.rental_price(i64::MAX).is_positive());
        assert!(!v.rental_price(i64::MIN).is_positive());
    }

    #[test]
    fn prices_fractional_rates_exactly() {
        assert_eq!(
            vehicle("49.99", car(false)).rental_price(3),
            money("149.97"),
        );
    }

    #[test]
    fn does_not_guard_non_positive_days() {
        assert_eq!(vehicle("50", car(true)).rental_price(0), Money::ZERO);
        assert_eq!(vehicle("50", car(true)).rental_price(-1), money("-60"));
    }

    #[test]
    fn price_is_monotonic_in_days_and_rate() {
        let details: [Details; 4] = [
            car(true).into(),
            motorcycle(1500).into(),
            truck(7000, true).into(),
            truck(1000, false).into(),
        ];
        for d in details {
            for (lower, higher) in [("10", "10.01"), ("35", "80")] {
                let cheap = vehicle(lower, d.clone());
                let pricey = vehicle(higher, d.clone());
                for days in 0..30 {
                    let price = cheap.rental_price(days);
                    assert!(price <= cheap.rental_price(days + 1));
                    assert!(price <= pricey.rental_price(days));
                }
            }
        }
    }

    #[test]
    fn reports_kind() {
        assert_eq!(vehicle("1", car(false)).kind(), Kind::Car);
        assert_eq!(vehicle("1", motorcycle(125)).kind(), Kind::Motorcycle);
        assert_eq!(vehicle("1", truck(1000, false)).kind(), Kind::Truck);
        assert_eq!(Kind::Motorcycle.to_string(), "MOTORCYCLE");
    }

    #[test]
    fn parses_fuel_type_ignoring_case() {
        assert_eq!(FuelType::from_str("DIESEL").unwrap(), FuelType::Diesel);
        assert_eq!(
            FuelType::from_str("electric").unwrap(),
            FuelType::Electric,
        );
        assert_eq!(FuelType::from_str("Hybrid").unwrap(), FuelType::Hybrid);
        assert!(FuelType::from_str("steam").is_err());
    }

    #[test]
    fn validates_attributes() {
        assert!(Brand::new("Toyota").is_some());
        assert!(Brand::new("").is_none());
        assert!(Brand::new("  ").is_none());
        assert!(Model::new(" Corolla").is_none());
        assert!(MotorcycleType::new("").is_none());

        assert!(Year::new(1900).is_some());
        assert!(Year::new(1899).is_none());

        assert!(DailyRate::new(money("0.01")).is_some());
        assert!(DailyRate::new(Money::ZERO).is_none());
        assert!(DailyRate::new(money("-1")).is_none());
        assert!(DailyRate::new(DailyRate::MAX).is_some());
        assert!(DailyRate::new(money("1000000000.01")).is_none());
        assert!(
            DailyRate::new(money("79228162514264337593543950335")).is_none(),
        );

        assert!(Doors::new(2).is_some());
        assert!(Doors::new(1).is_none());
        assert!(EngineSize::new(50).is_some());
        assert!(EngineSize::new(49).is_none());
        assert!(Capacity::new(1000).is_some());
        assert!(Capacity::new(999).is_none());
    }
}
